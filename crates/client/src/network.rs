//! Network-reachability signal.
//!
//! The host pushes reachability changes through a [`NetworkMonitor`]; the
//! data layer reads the latest value from a [`NetworkStatus`] at the moment it
//! needs it. Nothing here polls the network.

use tokio::sync::watch;

/// Write side of the reachability signal.
#[derive(Debug)]
pub struct NetworkMonitor {
    tx: watch::Sender<bool>,
}

/// Read side of the reachability signal. Cheap to clone.
#[derive(Debug, Clone)]
pub struct NetworkStatus {
    rx: watch::Receiver<bool>,
}

impl NetworkStatus {
    pub fn channel(online: bool) -> (NetworkMonitor, NetworkStatus) {
        let (tx, rx) = watch::channel(online);
        (NetworkMonitor { tx }, NetworkStatus { rx })
    }

    /// A signal that never changes.
    pub fn fixed(online: bool) -> Self {
        Self::channel(online).1
    }

    pub fn is_online(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait for the next reachability change.
    ///
    /// Returns `None` once the monitor is gone.
    pub async fn changed(&mut self) -> Option<bool> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}

impl NetworkMonitor {
    pub fn set_online(&self, online: bool) {
        let changed = self.tx.send_if_modified(|current| {
            if *current == online {
                return false;
            }
            *current = online;
            true
        });
        if changed {
            tracing::info!(online, "network reachability changed");
        }
    }

    pub fn subscribe(&self) -> NetworkStatus {
        NetworkStatus { rx: self.tx.subscribe() }
    }
}
