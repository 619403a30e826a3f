use std::collections::VecDeque;

use crate::{Error, Result};

#[derive(Debug, Clone)]
pub(crate) struct TraceState {
    pub(crate) enabled: bool,
    pub(crate) events: bool,
    pub(crate) steppers: bool,
    pub(crate) logs: VecDeque<String>,
    pub(crate) log_limit: usize,
    pub(crate) to_stderr: bool,
}

impl Default for TraceState {
    fn default() -> Self {
        Self {
            enabled: false,
            events: true,
            steppers: true,
            logs: VecDeque::new(),
            log_limit: 10_000,
            to_stderr: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TraceCategory {
    Event,
    Stepper,
}

impl TraceState {
    pub(crate) fn set_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::InvalidConfig(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.log_limit = max_entries;
        while self.logs.len() > self.log_limit {
            self.logs.pop_front();
        }
        Ok(())
    }

    pub(crate) fn wants(&self, category: TraceCategory) -> bool {
        self.enabled
            && match category {
                TraceCategory::Event => self.events,
                TraceCategory::Stepper => self.steppers,
            }
    }

    pub(crate) fn line(&mut self, category: TraceCategory, line: String) {
        if !self.wants(category) {
            return;
        }
        if self.to_stderr {
            eprintln!("{line}");
        }
        if self.logs.len() >= self.log_limit {
            self.logs.pop_front();
        }
        self.logs.push_back(line);
    }

    pub(crate) fn take(&mut self) -> Vec<String> {
        self.logs.drain(..).collect()
    }
}
