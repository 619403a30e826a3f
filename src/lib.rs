//! Labeled numeric stepper controls bound to an in-memory page model.
//!
//! A stepper field is a pair of elements: an input holding an integer and a
//! label showing a formatted copy of it. [`Stepper`] reads the input, applies a
//! fixed step and writes both elements back. [`Page`] parses page markup, binds
//! one stepper per entry of a [`FieldTable`] and dispatches the
//! `show_value_<Field>` / `add_one_<Field>` / `subtract_one_<Field>` entry points
//! that the markup's inline handlers call.
//!
//! ```
//! use stepper_binding::Page;
//!
//! let html = r#"
//!   <input type="range" id="Income" value="50000">
//!   <span id="slider_value_Income"></span>
//!   <button id="more" onclick="add_one_Income()">+</button>
//! "#;
//! let mut page = Page::from_html_with_options(
//!     html,
//!     stepper_binding::PageOptions::default().with_fields(
//!         stepper_binding::FieldTable::new(vec![stepper_binding::FieldSpec::new(
//!             "Income",
//!             10000,
//!             stepper_binding::Formatter::Currency,
//!         )])?,
//!     ),
//! )?;
//! page.click("#more")?;
//! page.assert_value("#Income", "60000")?;
//! page.assert_text("#slider_value_Income", "$60000")?;
//! # Ok::<(), stepper_binding::Error>(())
//! ```

use std::error::Error as StdError;
use std::fmt;

mod config;
mod dom;
mod entry;
mod fields;
mod format;
mod html;
mod number;
mod page;
mod stepper;
mod trace;

pub use config::{FieldSource, PageOptions};
pub use dom::{Dom, NodeId};
pub use entry::{Action, EntryPoint};
pub use fields::{FieldSpec, FieldTable, LABEL_ID_PREFIX};
pub use format::Formatter;
pub use html::parse_html;
pub use number::{StepValue, parse_int};
pub use page::{FieldSnapshot, Page};
pub use stepper::{ElementHost, InvalidValuePolicy, MemoryHost, SlotId, Stepper};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    ElementNotFound(String),
    UnsupportedSelector(String),
    UnknownField(String),
    UnknownEntryPoint(String),
    HandlerParse(String),
    InvalidValue {
        field: String,
        raw: String,
    },
    InvalidConfig(String),
    TypeMismatch {
        selector: String,
        expected: String,
        actual: String,
    },
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HtmlParse(msg) => write!(f, "html parse error: {msg}"),
            Self::ElementNotFound(id) => write!(f, "element not found: {id}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::UnknownField(field) => write!(f, "unknown stepper field: {field}"),
            Self::UnknownEntryPoint(name) => write!(f, "unknown entry point: {name}"),
            Self::HandlerParse(msg) => write!(f, "handler parse error: {msg}"),
            Self::InvalidValue { field, raw } => {
                write!(f, "invalid value for {field}: {raw:?} is not an integer")
            }
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::TypeMismatch {
                selector,
                expected,
                actual,
            } => write!(
                f,
                "type mismatch for {selector}: expected {expected}, actual {actual}"
            ),
            Self::AssertionFailed {
                selector,
                expected,
                actual,
                dom_snippet,
            } => write!(
                f,
                "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
            ),
        }
    }
}

impl StdError for Error {}

pub(crate) fn truncate_chars(value: &str, max_chars: usize) -> String {
    let mut it = value.chars();
    let mut out = String::new();
    for _ in 0..max_chars {
        let Some(ch) = it.next() else {
            return out;
        };
        out.push(ch);
    }
    if it.next().is_some() {
        out.push_str("...");
    }
    out
}
