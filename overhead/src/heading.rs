//! Device heading sources. The source is the only writer of the heading
//! channel, everything else just borrows the latest value.

use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    sync::watch,
};
use tracing::{debug, warn};

use crate::units::Angle;

/// Wrap into [0, 360), None for non-finite input
pub fn normalize_heading(degrees: f64) -> Option<Angle> {
    degrees
        .is_finite()
        .then(|| Angle::from_degrees(degrees).normalized())
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum HeadingSource {
    Fixed(Angle),
    /// One heading in degrees per line
    Stdin,
}

impl HeadingSource {
    /// Publishes headings until the source is exhausted
    pub async fn run(self, tx: watch::Sender<Angle>) -> std::io::Result<()> {
        match self {
            HeadingSource::Fixed(heading) => {
                tx.send_replace(heading.normalized());
                Ok(())
            }
            HeadingSource::Stdin => run_lines(BufReader::new(tokio::io::stdin()), &tx).await,
        }
    }
}

/// Unparsable lines are logged and skipped
pub async fn run_lines<R: AsyncBufRead + Unpin>(
    reader: R,
    tx: &watch::Sender<Angle>,
) -> std::io::Result<()> {
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.parse::<f64>().ok().and_then(normalize_heading) {
            Some(heading) => {
                debug!(%heading, "Heading update");
                tx.send_if_modified(|current| {
                    if *current == heading {
                        false
                    } else {
                        *current = heading;
                        true
                    }
                });
            }
            None => warn!(line, "Ignoring unparsable heading"),
        }
    }
    debug!("Heading source closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn normalization() {
        assert_relative_eq!(normalize_heading(-10.0).unwrap().as_degrees(), 350.0);
        assert_relative_eq!(normalize_heading(360.0).unwrap().as_degrees(), 0.0);
        assert_relative_eq!(normalize_heading(725.5).unwrap().as_degrees(), 5.5);
        assert!(normalize_heading(f64::NAN).is_none());
        assert!(normalize_heading(f64::INFINITY).is_none());
    }

    #[tokio::test]
    async fn reads_lines_and_skips_garbage() {
        let (tx, rx) = watch::channel(Angle::default());
        let input: &[u8] = b"90\nnorth\n\n  -45.5  \nNaN\n";
        run_lines(input, &tx).await.unwrap();
        assert_relative_eq!(rx.borrow().as_degrees(), 314.5);
    }

    #[tokio::test]
    async fn repeated_heading_does_not_notify() {
        let (tx, mut rx) = watch::channel(Angle::from_degrees(90.0));
        rx.borrow_and_update();
        let input: &[u8] = b"90\n450\n";
        run_lines(input, &tx).await.unwrap();
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn fixed_heading() {
        let (tx, rx) = watch::channel(Angle::default());
        HeadingSource::Fixed(Angle::from_degrees(-90.0)).run(tx).await.unwrap();
        assert_relative_eq!(rx.borrow().as_degrees(), 270.0);
    }
}
