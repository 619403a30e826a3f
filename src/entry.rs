use std::fmt;
use std::str::FromStr;

use fancy_regex::Regex;

use crate::{Error, Result};

/// The three operations every stepper field exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ShowValue,
    AddOne,
    SubtractOne,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::ShowValue, Action::AddOne, Action::SubtractOne];

    pub fn prefix(self) -> &'static str {
        match self {
            Self::ShowValue => "show_value_",
            Self::AddOne => "add_one_",
            Self::SubtractOne => "subtract_one_",
        }
    }
}

/// A public entry point name such as `add_one_Income`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryPoint {
    pub action: Action,
    pub field: String,
}

impl EntryPoint {
    pub fn new(action: Action, field: impl Into<String>) -> Self {
        Self {
            action,
            field: field.into(),
        }
    }

    pub fn parse(name: &str) -> Result<Self> {
        let name = name.trim();
        for action in Action::ALL {
            if let Some(field) = name.strip_prefix(action.prefix()) {
                if field.is_empty() {
                    break;
                }
                return Ok(Self::new(action, field));
            }
        }
        Err(Error::UnknownEntryPoint(name.to_string()))
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.action.prefix(), self.field)
    }
}

impl FromStr for EntryPoint {
    type Err = Error;

    fn from_str(src: &str) -> Result<Self> {
        Self::parse(src)
    }
}

/// Argument passed by an inline handler call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HandlerArg {
    None,
    /// `this.value`: the value of the element the handler is attached to.
    ThisValue,
    /// A quoted string or integer literal, unquoted.
    Literal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HandlerCall {
    pub(crate) entry: EntryPoint,
    pub(crate) arg: HandlerArg,
}

/// Parses inline handler attributes like
/// `show_value_Income(this.value); add_one_CCDebt()`.
#[derive(Debug, Clone)]
pub(crate) struct HandlerParser {
    call: Regex,
    literal: Regex,
}

impl HandlerParser {
    pub(crate) fn new() -> Result<Self> {
        let call = Regex::new(r"^(?:javascript:)?\s*([A-Za-z_$][\w$]*)\s*\(\s*(.*?)\s*\)$")
            .map_err(|err| Error::HandlerParse(err.to_string()))?;
        let literal = Regex::new(r#"^(?:'([^']*)'|"([^"]*)"|([+-]?\d+))$"#)
            .map_err(|err| Error::HandlerParse(err.to_string()))?;
        Ok(Self { call, literal })
    }

    pub(crate) fn parse(&self, src: &str) -> Result<Vec<HandlerCall>> {
        let mut calls = Vec::new();
        for statement in split_statements(src)? {
            let statement = statement.trim();
            if statement.is_empty() {
                continue;
            }
            let captures = self
                .call
                .captures(statement)
                .map_err(|err| Error::HandlerParse(err.to_string()))?
                .ok_or_else(|| {
                    Error::HandlerParse(format!("expected an entry point call: {statement}"))
                })?;
            let name = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
            let raw_arg = captures.get(2).map(|m| m.as_str()).unwrap_or_default();
            calls.push(HandlerCall {
                entry: EntryPoint::parse(name)?,
                arg: self.parse_arg(raw_arg)?,
            });
        }
        Ok(calls)
    }

    fn parse_arg(&self, raw: &str) -> Result<HandlerArg> {
        if raw.is_empty() {
            return Ok(HandlerArg::None);
        }
        if raw == "this.value" {
            return Ok(HandlerArg::ThisValue);
        }
        let captures = self
            .literal
            .captures(raw)
            .map_err(|err| Error::HandlerParse(err.to_string()))?
            .ok_or_else(|| Error::HandlerParse(format!("unsupported handler argument: {raw}")))?;
        let literal = (1..=3)
            .find_map(|group| captures.get(group))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        Ok(HandlerArg::Literal(literal))
    }
}

fn split_statements(src: &str) -> Result<Vec<&str>> {
    let mut out = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0usize;
    for (i, ch) in src.char_indices() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None => match ch {
                '\'' | '"' => quote = Some(ch),
                ';' => {
                    out.push(&src[start..i]);
                    start = i + 1;
                }
                _ => {}
            },
        }
    }
    if quote.is_some() {
        return Err(Error::HandlerParse(format!("unterminated string in handler: {src}")));
    }
    out.push(&src[start..]);
    Ok(out)
}
