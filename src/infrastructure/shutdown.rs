use tokio::sync::watch;

/// Broadcast shutdown flag. Cloned freely; every listener sees the trigger
/// exactly once, including listeners created after it fired.
#[derive(Clone)]
pub struct Shutdown {
    sender: watch::Sender<bool>,
}

pub struct ShutdownListener {
    receiver: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self { sender }
    }

    pub fn listener(&self) -> ShutdownListener {
        ShutdownListener {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn trigger(&self) {
        let _ = self.sender.send(true);
    }

    /// Routes SIGINT and SIGTERM into the shutdown flag.
    pub fn install_signal_handlers(&self) {
        let ctrl_c = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!(target: "lifecycle", "SIGINT received");
                ctrl_c.trigger();
            }
        });

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let term = self.clone();
            tokio::spawn(async move {
                if let Ok(mut sig) = signal(SignalKind::terminate()) {
                    sig.recv().await;
                    tracing::info!(target: "lifecycle", "SIGTERM received");
                    term.trigger();
                }
            });
        }
    }
}

impl ShutdownListener {
    /// Completes when shutdown has been triggered. Immediate if it already
    /// was.
    pub async fn notified(&mut self) {
        if *self.receiver.borrow() {
            return;
        }
        let _ = self.receiver.changed().await;
    }

    pub fn is_triggered(&self) -> bool {
        *self.receiver.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn listeners_observe_the_trigger() {
        let shutdown = Shutdown::new();
        let mut early = shutdown.listener();
        assert!(!early.is_triggered());

        shutdown.trigger();
        early.notified().await;
        assert!(early.is_triggered());

        // A listener created after the fact resolves immediately too.
        let mut late = shutdown.listener();
        late.notified().await;
        assert!(late.is_triggered());
    }
}
