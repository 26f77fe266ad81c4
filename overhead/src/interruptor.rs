use std::sync::Arc;
use tokio::sync::watch;

/// Set from the Ctrl-C handler, awaited by the tracking loop
#[derive(Clone, Debug)]
#[repr(transparent)]
pub struct Interruptor(Arc<watch::Sender<bool>>);

impl Interruptor {
    pub fn new() -> Self {
        Interruptor(Arc::new(watch::channel(false).0))
    }

    pub fn set(&self) {
        self.0.send_replace(true);
    }

    pub fn is_set(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once the interruptor is set, immediately if it already is
    pub async fn interrupted(&self) {
        let mut rx = self.0.subscribe();
        // The sender lives as long as self, so this cannot see a closed channel
        let _ = rx.wait_for(|set| *set).await;
    }

    /// Installs the Ctrl-C handler: the first press requests a clean stop,
    /// a second press exits immediately.
    pub fn install_ctrlc_handler(&self) -> Result<(), ctrlc::Error> {
        let intr = self.clone();
        ctrlc::set_handler(move || {
            if intr.is_set() {
                let exit_code = if cfg!(target_family = "unix") {
                    // 128 + SIGINT
                    130
                } else {
                    // STATUS_CONTROL_C_EXIT
                    -1073741510
                };
                std::process::exit(exit_code);
            } else {
                intr.set();
            }
        })
    }
}

impl Default for Interruptor {
    fn default() -> Self {
        Self::new()
    }
}
