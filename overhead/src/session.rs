use skytypes::prelude::ObserverLocation;
use tokio::sync::watch;

use crate::{catalog::Catalog, units::Angle};

/// Shared state of one tracking session.
///
/// Readers always take a snapshot: a sampling pass holds on to the catalog
/// it started with even if a refresh lands in the meantime.
#[derive(Debug)]
pub struct Session {
    /// Fixed once acquired
    observer: ObserverLocation,
    /// Written only by catalog refreshes
    catalog: watch::Sender<Catalog>,
    /// Written only by the heading source
    heading: watch::Receiver<Angle>,
}

impl Session {
    pub fn new(observer: ObserverLocation, catalog: Catalog, heading: watch::Receiver<Angle>) -> Self {
        let (catalog, _) = watch::channel(catalog);
        Session {
            observer,
            catalog,
            heading,
        }
    }

    pub fn observer(&self) -> &ObserverLocation {
        &self.observer
    }

    pub fn catalog(&self) -> Catalog {
        self.catalog.borrow().clone()
    }

    pub fn replace_catalog(&self, catalog: Catalog) {
        self.catalog.send_replace(catalog);
    }

    pub fn heading(&self) -> Angle {
        *self.heading.borrow()
    }

    /// Resolves when the heading source publishes a new value. Never
    /// resolves once the source has finished.
    pub async fn heading_changed(&mut self) {
        if self.heading.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
        self.heading.borrow_and_update();
    }
}
