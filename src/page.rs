use crate::config::{FieldSource, PageOptions};
use crate::dom::{Dom, NodeId};
use crate::entry::{Action, EntryPoint, HandlerArg, HandlerParser};
use crate::fields::FieldTable;
use crate::html::parse_html;
use crate::number::{StepValue, parse_int};
use crate::stepper::Stepper;
use crate::trace::{TraceCategory, TraceState};
use crate::{Error, Result, truncate_chars};

/// Current state of one bound field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSnapshot {
    pub id: String,
    pub value: String,
    pub label: String,
}

/// A parsed page with one [`Stepper`] bound per field.
///
/// Every field's input and label are resolved when the page is built, so a
/// page that exists never fails an operation on a missing element.
#[derive(Debug)]
pub struct Page {
    dom: Dom,
    fields: FieldTable,
    steppers: Vec<Stepper<NodeId>>,
    handlers: HandlerParser,
    trace: TraceState,
}

impl Page {
    pub fn from_html(html: &str) -> Result<Self> {
        Self::from_html_with_options(html, PageOptions::default())
    }

    pub fn from_html_with_options(html: &str, options: PageOptions) -> Result<Self> {
        let dom = parse_html(html)?;
        let fields = match options.fields {
            FieldSource::Table(table) => table,
            FieldSource::Markup => FieldTable::from_dom(&dom)?,
        };

        let mut steppers = Vec::with_capacity(fields.len());
        for spec in fields.iter() {
            let input = dom
                .by_id(&spec.id)
                .ok_or_else(|| Error::ElementNotFound(spec.id.clone()))?;
            let label_id = spec.label_id();
            let label = dom
                .by_id(&label_id)
                .ok_or(Error::ElementNotFound(label_id))?;
            steppers.push(
                Stepper::new(spec.clone(), input, label).with_policy(options.invalid_values),
            );
        }

        let mut trace = TraceState {
            enabled: options.trace,
            events: options.trace_events,
            steppers: options.trace_steppers,
            to_stderr: options.trace_stderr,
            ..TraceState::default()
        };
        trace.set_log_limit(options.trace_log_limit)?;

        Ok(Self {
            dom,
            fields,
            steppers,
            handlers: HandlerParser::new()?,
            trace,
        })
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn fields(&self) -> &FieldTable {
        &self.fields
    }

    pub fn field_ids(&self) -> Vec<&str> {
        self.steppers.iter().map(Stepper::id).collect()
    }

    pub fn stepper(&self, field: &str) -> Result<&Stepper<NodeId>> {
        let index = self.stepper_index(field)?;
        Ok(&self.steppers[index])
    }

    pub fn show_value(&mut self, field: &str, value: &StepValue) -> Result<()> {
        let index = self.stepper_index(field)?;
        let stepper = &self.steppers[index];
        stepper.display(&mut self.dom, value)?;
        let label = self.dom.text_content(stepper.label());
        self.trace.line(
            TraceCategory::Stepper,
            format!("[stepper] show_value_{field} value={value} label={label}"),
        );
        Ok(())
    }

    pub fn add_one(&mut self, field: &str) -> Result<StepValue> {
        self.step(field, Action::AddOne)
    }

    pub fn subtract_one(&mut self, field: &str) -> Result<StepValue> {
        self.step(field, Action::SubtractOne)
    }

    /// Calls an entry point by its public name, e.g. `add_one_Income`.
    ///
    /// `show_value_*` needs an argument, which is parsed as an integer. The
    /// stepping entry points ignore it.
    pub fn invoke(&mut self, name: &str, arg: Option<&str>) -> Result<()> {
        let entry = EntryPoint::parse(name)?;
        self.call(&entry, arg)
    }

    pub fn call(&mut self, entry: &EntryPoint, arg: Option<&str>) -> Result<()> {
        match entry.action {
            Action::ShowValue => {
                let raw = arg.ok_or_else(|| {
                    Error::HandlerParse(format!("{entry} requires a value argument"))
                })?;
                self.show_value(&entry.field, &parse_int(raw))
            }
            Action::AddOne | Action::SubtractOne => {
                self.step(&entry.field, entry.action).map(|_| ())
            }
        }
    }

    /// Runs the element's inline `onclick` handler, if it has one.
    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.is_disabled(target) {
            return Ok(());
        }
        self.dispatch(target, selector, "click")
    }

    /// Moves a slider: sets the input's value, then runs its `oninput` and
    /// `onchange` handlers.
    pub fn slide(&mut self, selector: &str, value: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let tag = self.dom.tag_name(target).unwrap_or_default();
        if tag != "input" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input".into(),
                actual: tag.to_string(),
            });
        }
        if self.is_disabled(target) || self.dom.attr(target, "readonly").is_some() {
            return Ok(());
        }

        self.dom.set_value(target, value)?;
        self.dispatch(target, selector, "input")?;
        self.dispatch(target, selector, "change")
    }

    pub fn value(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        self.dom.value(target)
    }

    pub fn text(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.text_content(target))
    }

    pub fn snapshot(&self) -> Vec<FieldSnapshot> {
        self.steppers
            .iter()
            .map(|stepper| FieldSnapshot {
                id: stepper.id().to_string(),
                value: self.dom.value(stepper.input()).unwrap_or_default(),
                label: self.dom.text_content(stepper.label()),
            })
            .collect()
    }

    pub fn to_html(&self) -> String {
        self.dom.dump_node(self.dom.root())
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.text_content(target);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.value(target)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace.enabled = enabled;
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace.to_stderr = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace.events = enabled;
    }

    pub fn set_trace_steppers(&mut self, enabled: bool) {
        self.trace.steppers = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        self.trace.set_log_limit(max_entries)
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        self.trace.take()
    }

    pub(crate) fn step(&mut self, field: &str, action: Action) -> Result<StepValue> {
        let index = self.stepper_index(field)?;
        let stepper = &self.steppers[index];
        let before = self.dom.value(stepper.input())?;
        let next = match action {
            Action::AddOne => stepper.increment(&mut self.dom)?,
            Action::SubtractOne => stepper.decrement(&mut self.dom)?,
            Action::ShowValue => {
                return Err(Error::UnknownEntryPoint(format!(
                    "{}{field} does not step",
                    action.prefix()
                )));
            }
        };
        self.trace.line(
            TraceCategory::Stepper,
            format!(
                "[stepper] {}{field} {before:?} -> {next}",
                action.prefix()
            ),
        );
        Ok(next)
    }

    fn dispatch(&mut self, target: NodeId, selector: &str, event: &str) -> Result<()> {
        let handler = self
            .dom
            .attr(target, &format!("on{event}"))
            .map(str::to_string);
        self.trace.line(
            TraceCategory::Event,
            format!(
                "[event] {event} target={selector} handler={}",
                handler.as_deref().unwrap_or("-")
            ),
        );
        let Some(handler) = handler else {
            return Ok(());
        };

        for call in self.handlers.parse(&handler)? {
            let arg = match call.arg {
                HandlerArg::None => None,
                HandlerArg::ThisValue => Some(self.dom.value(target)?),
                HandlerArg::Literal(literal) => Some(literal),
            };
            self.call(&call.entry, arg.as_deref())?;
        }
        self.trace.line(
            TraceCategory::Event,
            format!("[event] done {event} target={selector}"),
        );
        Ok(())
    }

    fn stepper_index(&self, field: &str) -> Result<usize> {
        self.steppers
            .iter()
            .position(|stepper| stepper.id() == field)
            .ok_or_else(|| Error::UnknownField(field.to_string()))
    }

    fn select_one(&self, selector: &str) -> Result<NodeId> {
        let trimmed = selector.trim();
        let id = trimmed
            .strip_prefix('#')
            .filter(|id| !id.is_empty() && id.chars().all(is_id_selector_char))
            .ok_or_else(|| Error::UnsupportedSelector(selector.to_string()))?;
        self.dom
            .by_id(id)
            .ok_or_else(|| Error::ElementNotFound(selector.to_string()))
    }

    fn is_disabled(&self, node: NodeId) -> bool {
        self.dom.attr(node, "disabled").is_some()
    }

    fn node_snippet(&self, node_id: NodeId) -> String {
        truncate_chars(&self.dom.dump_node(node_id), 200)
    }
}

fn is_id_selector_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '-' || ch == '_'
}
