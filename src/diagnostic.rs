use std::fmt;
use crate::config::Verbosity;


/// A degraded-input notice produced while rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub verbosity: Verbosity,
    pub message: String
}


pub(crate) struct Diagnostics {
    verbosity: Verbosity,
    entries: Vec<Diagnostic>
}

impl Diagnostics {
    pub(crate) fn new(verbosity: Verbosity) -> Self {
        Diagnostics {
            verbosity,
            entries: Vec::new()
        }
    }

    /// Record and trace `args` when the configured verbosity reaches `level`.
    pub(crate) fn report(&mut self, level: Verbosity, args: fmt::Arguments<'_>) {
        if level == Verbosity::None || self.verbosity < level {
            return;
        }
        let message = args.to_string();
        match level {
            Verbosity::Debug => tracing::debug!(target: "teddy", "{}", message),
            _ => tracing::warn!(target: "teddy", verbosity = level.level(), "{}", message)
        }
        self.entries.push(Diagnostic { verbosity: level, message });
    }

    pub(crate) fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }
}
