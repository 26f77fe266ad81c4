//! The tracking session state machine and polling loop.
//!
//! ```text
//! AcquiringLocation -> LoadingCatalog -> Tracking
//!         |                  |
//!         +-----> Failed <---+
//! ```

use std::{fmt, io, path::PathBuf, time::Duration};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    catalog::{load_catalog, CatalogFetchFailure, CatalogSource, NameFilter},
    interruptor::Interruptor,
    location::{LocationSource, LocationUnavailable},
    propagation::Propagator,
    sampler::{sample, Sample, SampleStatus, SamplerConfig},
    scheduler::Scheduler,
    session::Session,
    units::{Angle, Timestamp},
    view::{render_json, render_svg, render_text, ViewConfig},
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Location(#[from] LocationUnavailable),

    #[error(transparent)]
    Catalog(#[from] CatalogFetchFailure),

    #[error("Failed to write view: {0}")]
    Output(#[from] io::Error),

    #[error("Failed to write JSON snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerState {
    AcquiringLocation,
    LoadingCatalog,
    Tracking,
    /// Terminal, no automatic retry
    Failed(String),
}

impl fmt::Display for TrackerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerState::AcquiringLocation => f.write_str("acquiring-location"),
            TrackerState::LoadingCatalog => f.write_str("loading-catalog"),
            TrackerState::Tracking => f.write_str("tracking"),
            TrackerState::Failed(reason) => write!(f, "failed ({reason})"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub catalog_source: CatalogSource,
    pub name_filter: NameFilter,
    pub location_source: LocationSource,
    pub sampler: SamplerConfig,
    pub sample_interval: Duration,
    pub refresh_interval: Duration,
    pub view: ViewConfig,
    /// Rewritten after every pass when set
    pub svg_output: Option<PathBuf>,
    /// JSON snapshots instead of the text summary
    pub json: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Job {
    Sample,
    RefreshCatalog,
    Redraw,
}

pub struct Tracker<P, W> {
    config: TrackerConfig,
    propagator: P,
    out: W,
    state: TrackerState,
}

impl<P: Propagator, W: io::Write> Tracker<P, W> {
    pub fn new(config: TrackerConfig, propagator: P, out: W) -> Self {
        Tracker {
            config,
            propagator,
            out,
            state: TrackerState::AcquiringLocation,
        }
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    fn transition(&mut self, next: TrackerState) {
        info!(from = %self.state, to = %next, "Tracker state change");
        self.state = next;
    }

    /// Acquire the observer location and the initial catalog
    pub async fn start(&mut self, heading: watch::Receiver<Angle>) -> Result<Session, SessionError> {
        self.transition(TrackerState::AcquiringLocation);
        let observer = match self.config.location_source.acquire().await {
            Ok(loc) => loc,
            Err(e) => {
                self.transition(TrackerState::Failed(e.to_string()));
                return Err(e.into());
            }
        };

        self.transition(TrackerState::LoadingCatalog);
        let catalog = match load_catalog(&self.config.catalog_source, &self.config.name_filter).await {
            Ok(c) => c,
            Err(e) => {
                self.transition(TrackerState::Failed(e.to_string()));
                return Err(e.into());
            }
        };

        self.transition(TrackerState::Tracking);
        Ok(Session::new(observer, catalog, heading))
    }

    /// One sampling pass against the current catalog snapshot, rendered to
    /// the configured outputs
    pub async fn sample_pass(&mut self, session: &Session, now: Timestamp) -> Result<SampleStatus, SessionError> {
        let catalog = session.catalog();
        let heading = session.heading();
        let sample = sample(
            &catalog,
            session.observer(),
            now,
            &self.propagator,
            &self.config.sampler,
        );
        self.render(&sample, session, heading).await?;
        Ok(sample.status())
    }

    async fn render(&mut self, sample: &Sample<'_>, session: &Session, heading: Angle) -> Result<(), SessionError> {
        if self.config.json {
            render_json(sample, session.observer(), heading, &self.config.view, &mut self.out)?;
            writeln!(self.out)?;
        } else {
            render_text(sample, session.observer(), heading, &self.config.view, &mut self.out)?;
        }
        self.out.flush()?;

        if let Some(path) = &self.config.svg_output {
            let mut svg = Vec::new();
            render_svg(sample, heading, &self.config.view, &mut svg)?;
            if let Err(e) = tokio::fs::write(path, svg).await {
                warn!(path = %path.display(), err = %e, "Failed to write sky map");
            }
        }
        Ok(())
    }

    /// Failures keep the previous catalog in place
    pub async fn refresh_catalog(&self, session: &Session) {
        match load_catalog(&self.config.catalog_source, &self.config.name_filter).await {
            Ok(catalog) => {
                debug!(records = catalog.len(), "Replacing catalog");
                session.replace_catalog(catalog);
            }
            Err(e) => warn!(err = %e, "Catalog refresh failed, keeping previous catalog"),
        }
    }

    /// Runs the scheduled tasks until interrupted. An interrupt stops the
    /// loop while it waits for the next task, an in-flight pass always
    /// completes.
    pub async fn track(&mut self, mut session: Session, intr: &Interruptor) -> Result<(), SessionError> {
        let mut scheduler = Scheduler::new();
        scheduler.add_recurring("sample", self.config.sample_interval, Duration::ZERO, Job::Sample);
        scheduler.add_recurring(
            "refresh-catalog",
            self.config.refresh_interval,
            self.config.refresh_interval,
            Job::RefreshCatalog,
        );
        let redraw = scheduler.set_triggerable("heading-changed", Job::Redraw);
        info!(tasks = ?scheduler.task_names().collect::<Vec<_>>(), "Tracking");

        let mut overhead = false;
        loop {
            let fired = tokio::select! {
                biased;
                _ = intr.interrupted() => break,
                fired = scheduler.next() => fired,
                _ = session.heading_changed() => {
                    if overhead {
                        redraw.fire();
                    }
                    continue;
                }
            };
            debug!(task = fired.name, "Running task");
            match fired.job {
                Job::Sample | Job::Redraw => {
                    let status = self.sample_pass(&session, Timestamp::now()).await?;
                    overhead = status == SampleStatus::Overhead;
                }
                Job::RefreshCatalog => self.refresh_catalog(&session).await,
            }
        }
        info!("Tracking stopped");
        Ok(())
    }
}
