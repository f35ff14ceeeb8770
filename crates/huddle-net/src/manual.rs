use tokio::sync::mpsc;

/// Reachability source driven by hand, for tests and for front-ends that
/// expose an explicit offline switch.
#[derive(Clone)]
pub struct ManualReachability {
    tx: mpsc::Sender<bool>,
}

impl ManualReachability {
    /// Returns the switch and the stream of reports it produces.
    pub fn new() -> (Self, mpsc::Receiver<bool>) {
        let (tx, rx) = mpsc::channel(16);
        (Self { tx }, rx)
    }

    /// Report a reachability change. Returns `false` once nobody listens.
    pub async fn set(&self, is_connected: bool) -> bool {
        self.tx.send(is_connected).await.is_ok()
    }
}
