use tracing::{error, info, warn};

/// Severity of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Destination for discrepancy reports.
///
/// The checker never prints directly; everything goes through a sink so
/// callers can capture, test, or redirect the output.
pub trait DiagnosticSink {
    fn emit(&mut self, severity: Severity, message: String);
}

/// Sink that forwards diagnostics to `tracing` events.
#[derive(Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&mut self, severity: Severity, message: String) {
        match severity {
            Severity::Info => info!("{message}"),
            Severity::Warning => warn!("{message}"),
            Severity::Error => error!("{message}"),
        }
    }
}

/// Sink that collects diagnostics in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub messages: Vec<(Severity, String)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages emitted at `Severity::Error`.
    pub fn errors(&self) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|(severity, _)| *severity == Severity::Error)
            .map(|(_, message)| message.as_str())
            .collect()
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&mut self, severity: Severity, message: String) {
        self.messages.push((severity, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_collects_in_order() {
        let mut sink = MemorySink::new();
        sink.emit(Severity::Error, "first".to_string());
        sink.emit(Severity::Info, "second".to_string());
        sink.emit(Severity::Error, "third".to_string());

        assert_eq!(sink.messages.len(), 3);
        assert_eq!(sink.errors(), vec!["first", "third"]);
    }
}
