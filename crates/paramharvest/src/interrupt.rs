//! Interrupt signal for aborting a fetch between attempts
//!
//! An [`InterruptHandle`] fires the signal, any number of [`Interrupt`]
//! clones observe it. Dropping the handle without firing means the signal
//! never fires.

use tokio::sync::watch;

/// Sending side of the interrupt signal
#[derive(Debug)]
pub struct InterruptHandle {
    tx: watch::Sender<bool>,
}

impl InterruptHandle {
    /// Fire the interrupt; all current and future waiters resolve
    pub fn interrupt(&self) {
        self.tx.send_replace(true);
    }
}

/// Receiving side of the interrupt signal
#[derive(Debug, Clone)]
pub struct Interrupt {
    rx: watch::Receiver<bool>,
}

impl Default for Interrupt {
    fn default() -> Self {
        Self::never()
    }
}

impl Interrupt {
    /// Create a connected handle and signal
    pub fn pair() -> (InterruptHandle, Interrupt) {
        let (tx, rx) = watch::channel(false);
        (InterruptHandle { tx }, Interrupt { rx })
    }

    /// A signal that never fires
    pub fn never() -> Self {
        let (_, interrupt) = Self::pair();
        interrupt
    }

    /// Returns true if the interrupt has fired
    pub fn is_interrupted(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the interrupt fires
    pub async fn triggered(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                // Handle dropped without firing
                std::future::pending::<()>().await;
            }
        }
    }
}
