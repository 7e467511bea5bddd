use std::fmt;

use crossbeam_channel::Sender;
use tracing::field::{Field, Visit};
use tracing::Subscriber;
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// One captured tracing event, ready for the log panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEnvelope {
    pub level: String,
    pub message: String,
    /// Structured fields in the order they were recorded.
    pub fields: Vec<(String, String)>,
}

impl LogEnvelope {
    pub fn display_line(&self) -> String {
        let mut line = format!("{:<5} {}", self.level, self.message);
        for (key, value) in &self.fields {
            line.push_str(&format!(" {key}={value}"));
        }
        line
    }
}

/// Forwards every event to the terminal UI instead of writing to the
/// terminal, which is in raw mode while the UI runs.
#[derive(Clone)]
pub struct LogCaptureLayer {
    sender: Sender<LogEnvelope>,
}

impl LogCaptureLayer {
    pub fn new(sender: Sender<LogEnvelope>) -> Self {
        Self { sender }
    }
}

impl<S> Layer<S> for LogCaptureLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        let envelope = LogEnvelope {
            level: metadata.level().to_string(),
            message: visitor
                .message
                .unwrap_or_else(|| metadata.target().to_string()),
            fields: visitor.fields,
        };
        // The UI may already be gone during shutdown.
        let _ = self.sender.send(envelope);
    }
}

/// Events here carry dotted names plus `%`/`?` formatted fields, so strings
/// and debug output cover everything recorded.
#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Vec<(String, String)>,
}

impl FieldVisitor {
    fn push(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = Some(value);
        } else {
            self.fields.push((field.name().to_string(), value));
        }
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.push(field, format!("{value:?}"));
    }
}
