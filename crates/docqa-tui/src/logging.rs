//! Tracing setup: a daily log file plus a layer that mirrors core events into
//! the activity panel.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::model::activity::ActivityEntry;

/// Directory for log files: `<cache_dir>/docqa/logs`.
pub fn log_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docqa")
        .join("logs")
}

/// Daily-rotated `docqa.log.*` files in `dir`, created if missing.
fn file_appender(dir: &Path) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("docqa.log")
        .build(dir)
}

/// Install the global subscriber. The terminal belongs to the UI, so nothing
/// is written to stdout/stderr; keep the guard alive until exit to flush.
pub fn init(
    verbose: bool,
    activity_tx: mpsc::UnboundedSender<ActivityEntry>,
) -> anyhow::Result<WorkerGuard> {
    let dir = log_dir();
    let file_appender = file_appender(&dir)
        .map_err(|e| anyhow::anyhow!("cannot log to {}: {e}", dir.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("docqa_core={default_level},docqa_tui={default_level}")));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(ActivityLayer::new(activity_tx))
        .init();

    Ok(guard)
}

/// Forwards INFO and above from the core crate to the activity panel.
///
/// Core logs user-driven steps (loads, switches, exports) at DEBUG; the app
/// writes its own line for those. Only background work surfaces here.
pub struct ActivityLayer {
    sender: mpsc::UnboundedSender<ActivityEntry>,
}

impl ActivityLayer {
    pub fn new(sender: mpsc::UnboundedSender<ActivityEntry>) -> Self {
        Self { sender }
    }
}

impl<S> Layer<S> for ActivityLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if *meta.level() > Level::INFO || !meta.target().starts_with("docqa_core") {
            return;
        }
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        // Receiver gone means the UI is shutting down
        let _ = self
            .sender
            .send(ActivityEntry::new(*meta.level(), visitor.finish()));
    }
}

/// Renders `message` followed by the remaining fields as `key=value`.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else {
            format!("{}{}", self.message, self.fields)
        }
    }
}

impl tracing::field::Visit for MessageVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_events_reach_activity_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let subscriber = tracing_subscriber::registry().with(ActivityLayer::new(tx));
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "docqa_core::gateway", key = "a.pdf", "mirrored upload");
            tracing::debug!(target: "docqa_core::gateway", "too chatty");
            tracing::info!(target: "hyper::client", "not ours");
        });

        let entry = rx.try_recv().unwrap();
        assert_eq!(entry.level, Level::INFO);
        assert_eq!(entry.message, "mirrored upload key=a.pdf");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn unusable_log_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();
        assert!(file_appender(&blocker.join("logs")).is_err());
    }

    #[test]
    fn log_dir_is_created_on_demand() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("docqa").join("logs");
        assert!(file_appender(&logs).is_ok());
        assert!(logs.is_dir());
    }
}
