// ─── Progress Reporting ───
// Push-style sink the installers forward download state into. The presentation
// layer consumes the other end; nothing in this crate polls.

use serde::Serialize;
use tokio::sync::mpsc;

/// One progress tick, tagged with the project the install belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressUpdate {
    pub project_id: String,
    /// Human-readable stage label, e.g. "Downloading Modpack".
    pub step: String,
    /// 0.0 – 100.0.
    pub percent: f64,
    pub bytes_done: u64,
    pub bytes_total: Option<u64>,
    /// Instantaneous transfer rate in bytes per second.
    pub rate: f64,
}

/// Abstract sink for install progress.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// Channel-backed reporter: updates are delivered to the receiver as they
/// occur. A closed receiver silently drops further updates.
pub struct ChannelReporter {
    tx: mpsc::UnboundedSender<ProgressUpdate>,
}

impl ChannelReporter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressReporter for ChannelReporter {
    fn report(&self, update: ProgressUpdate) {
        let _ = self.tx.send(update);
    }
}

/// Reporter that discards everything.
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn report(&self, _update: ProgressUpdate) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_reporter_delivers_updates_in_order() {
        let (reporter, mut rx) = ChannelReporter::new();

        for percent in [0.0, 50.0, 100.0] {
            reporter.report(ProgressUpdate {
                project_id: "sodium".into(),
                step: "Downloading Mod".into(),
                percent,
                bytes_done: percent as u64,
                bytes_total: Some(100),
                rate: 1024.0,
            });
        }

        assert_eq!(rx.recv().await.unwrap().percent, 0.0);
        assert_eq!(rx.recv().await.unwrap().percent, 50.0);
        let last = rx.recv().await.unwrap();
        assert_eq!(last.percent, 100.0);
        assert_eq!(last.project_id, "sodium");
    }

    #[test]
    fn dropped_receiver_does_not_panic() {
        let (reporter, rx) = ChannelReporter::new();
        drop(rx);
        reporter.report(ProgressUpdate {
            project_id: "p".into(),
            step: "s".into(),
            percent: 0.0,
            bytes_done: 0,
            bytes_total: None,
            rate: 0.0,
        });
    }
}
