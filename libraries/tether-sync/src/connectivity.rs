use std::sync::Arc;
use tokio::sync::watch;

/// Host-driven network status shared with one or more agents.
///
/// The host calls [`Connectivity::set_online`] from whatever network
/// notification it has; agents only see real transitions.
#[derive(Debug, Clone)]
pub struct Connectivity {
    tx: Arc<watch::Sender<bool>>,
}

impl Connectivity {
    pub fn new(initially_online: bool) -> Self {
        let (tx, _rx) = watch::channel(initially_online);
        Self { tx: Arc::new(tx) }
    }

    /// Report the current network status. Returns true if this changed it.
    pub fn set_online(&self, online: bool) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        })
    }

    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    pub(crate) fn watch(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::new(true)
    }
}
