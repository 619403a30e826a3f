use crate::fields::FieldTable;
use crate::stepper::InvalidValuePolicy;

/// Where a [`Page`](crate::Page) gets its field table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSource {
    /// An explicit table.
    Table(FieldTable),
    /// Elements of the page markup carrying `data-step`.
    Markup,
}

impl Default for FieldSource {
    fn default() -> Self {
        Self::Table(FieldTable::scoring_form())
    }
}

/// Construction options for a [`Page`](crate::Page).
///
/// The defaults bind the scoring form's fields, propagate not-a-number values
/// and leave tracing off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOptions {
    pub fields: FieldSource,
    pub invalid_values: InvalidValuePolicy,
    pub trace: bool,
    pub trace_events: bool,
    pub trace_steppers: bool,
    pub trace_stderr: bool,
    pub trace_log_limit: usize,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            fields: FieldSource::default(),
            invalid_values: InvalidValuePolicy::default(),
            trace: false,
            trace_events: true,
            trace_steppers: true,
            trace_stderr: true,
            trace_log_limit: 10_000,
        }
    }
}

impl PageOptions {
    pub fn with_fields(mut self, table: FieldTable) -> Self {
        self.fields = FieldSource::Table(table);
        self
    }

    pub fn with_markup_fields(mut self) -> Self {
        self.fields = FieldSource::Markup;
        self
    }

    pub fn with_invalid_values(mut self, policy: InvalidValuePolicy) -> Self {
        self.invalid_values = policy;
        self
    }

    /// Turns tracing on, collecting lines without echoing them to stderr.
    pub fn with_quiet_trace(mut self) -> Self {
        self.trace = true;
        self.trace_stderr = false;
        self
    }

    pub fn with_trace_log_limit(mut self, max_entries: usize) -> Self {
        self.trace_log_limit = max_entries;
        self
    }
}
