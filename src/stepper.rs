use std::fmt;

use crate::dom::{Dom, NodeId};
use crate::fields::FieldSpec;
use crate::number::{StepValue, parse_int};
use crate::{Error, Result};

/// Storage for the two elements a stepper drives.
///
/// Handles are resolved once when a [`Stepper`] is bound, so a host never
/// looks elements up by id at call time.
pub trait ElementHost {
    type Handle: Copy + fmt::Debug;

    fn read_value(&self, handle: Self::Handle) -> Result<String>;
    fn write_value(&mut self, handle: Self::Handle, value: &str) -> Result<()>;
    fn write_text(&mut self, handle: Self::Handle, text: &str) -> Result<()>;
}

impl ElementHost for Dom {
    type Handle = NodeId;

    fn read_value(&self, handle: NodeId) -> Result<String> {
        self.value(handle)
    }

    fn write_value(&mut self, handle: NodeId, value: &str) -> Result<()> {
        self.set_value(handle, value)
    }

    fn write_text(&mut self, handle: NodeId, text: &str) -> Result<()> {
        self.set_text_content(handle, text)
    }
}

/// What a stepper does when its input does not hold an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidValuePolicy {
    /// Write the not-a-number marker back and display it.
    #[default]
    Propagate,
    /// Fail with [`Error::InvalidValue`] and leave both elements untouched.
    Reject,
    /// Step from this value instead.
    Reset(i64),
}

/// One field's stepper, bound to its input and label handles.
#[derive(Debug, Clone)]
pub struct Stepper<H> {
    spec: FieldSpec,
    input: H,
    label: H,
    policy: InvalidValuePolicy,
}

impl<H: Copy + fmt::Debug> Stepper<H> {
    pub fn new(spec: FieldSpec, input: H, label: H) -> Self {
        Self {
            spec,
            input,
            label,
            policy: InvalidValuePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: InvalidValuePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    pub fn id(&self) -> &str {
        &self.spec.id
    }

    pub fn input(&self) -> H {
        self.input
    }

    pub fn label(&self) -> H {
        self.label
    }

    /// Renders `value` into the label.
    pub fn display<E>(&self, host: &mut E, value: &StepValue) -> Result<()>
    where
        E: ElementHost<Handle = H>,
    {
        host.write_text(self.label, &self.spec.format.format(value))
    }

    pub fn increment<E>(&self, host: &mut E) -> Result<StepValue>
    where
        E: ElementHost<Handle = H>,
    {
        self.step_by(host, StepValue::offset)
    }

    pub fn decrement<E>(&self, host: &mut E) -> Result<StepValue>
    where
        E: ElementHost<Handle = H>,
    {
        self.step_by(host, StepValue::offset_back)
    }

    /// Reads the stored value as an integer, honoring the invalid-value policy.
    pub fn current<E>(&self, host: &E) -> Result<StepValue>
    where
        E: ElementHost<Handle = H>,
    {
        let raw = host.read_value(self.input)?;
        let parsed = parse_int(&raw);
        if !parsed.is_nan() {
            return Ok(parsed);
        }
        match self.policy {
            InvalidValuePolicy::Propagate => Ok(parsed),
            InvalidValuePolicy::Reject => Err(Error::InvalidValue {
                field: self.spec.id.clone(),
                raw,
            }),
            InvalidValuePolicy::Reset(fallback) => Ok(StepValue::from(fallback)),
        }
    }

    fn step_by<E>(
        &self,
        host: &mut E,
        apply: fn(&StepValue, i64) -> StepValue,
    ) -> Result<StepValue>
    where
        E: ElementHost<Handle = H>,
    {
        let next = apply(&self.current(host)?, self.spec.step);
        host.write_value(self.input, &next.to_string())?;
        self.display(host, &next)?;
        Ok(next)
    }
}

/// Slot handle into a [`MemoryHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

/// Page-free host: a flat list of value/text slots.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    slots: Vec<Slot>,
}

#[derive(Debug, Clone, Default)]
struct Slot {
    value: String,
    text: String,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_slot(&mut self, value: &str) -> SlotId {
        self.slots.push(Slot {
            value: value.to_string(),
            text: String::new(),
        });
        SlotId(self.slots.len() - 1)
    }

    pub fn value(&self, slot: SlotId) -> Option<&str> {
        self.slots.get(slot.0).map(|s| s.value.as_str())
    }

    pub fn text(&self, slot: SlotId) -> Option<&str> {
        self.slots.get(slot.0).map(|s| s.text.as_str())
    }

    pub fn set_value(&mut self, slot: SlotId, value: &str) -> Result<()> {
        self.write_value(slot, value)
    }

    fn slot_mut(&mut self, slot: SlotId) -> Result<&mut Slot> {
        self.slots
            .get_mut(slot.0)
            .ok_or_else(|| Error::ElementNotFound(format!("slot {}", slot.0)))
    }
}

impl ElementHost for MemoryHost {
    type Handle = SlotId;

    fn read_value(&self, handle: SlotId) -> Result<String> {
        self.value(handle)
            .map(str::to_string)
            .ok_or_else(|| Error::ElementNotFound(format!("slot {}", handle.0)))
    }

    fn write_value(&mut self, handle: SlotId, value: &str) -> Result<()> {
        self.slot_mut(handle)?.value = value.to_string();
        Ok(())
    }

    fn write_text(&mut self, handle: SlotId, text: &str) -> Result<()> {
        self.slot_mut(handle)?.text = text.to_string();
        Ok(())
    }
}
