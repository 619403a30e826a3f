use std::collections::HashSet;

use crate::dom::Dom;
use crate::format::Formatter;
use crate::{Error, Result};

/// Label elements are found at `LABEL_ID_PREFIX + field id`.
pub const LABEL_ID_PREFIX: &str = "slider_value_";

/// One stepper field: the input's element id, its step and its label format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub id: String,
    pub step: i64,
    pub format: Formatter,
}

impl FieldSpec {
    pub fn new(id: impl Into<String>, step: i64, format: Formatter) -> Self {
        Self {
            id: id.into(),
            step,
            format,
        }
    }

    pub fn label_id(&self) -> String {
        format!("{LABEL_ID_PREFIX}{}", self.id)
    }
}

const SCORING_FORM_FIELDS: &[(&str, i64, Formatter)] = &[
    ("Income", 10_000, Formatter::Currency),
    ("YearCurrentAddress", 1, Formatter::Plain),
    ("YearsCurrentEmployer", 1, Formatter::Plain),
    ("NumberOfCards", 1, Formatter::Plain),
    ("CCDebt", 1_000, Formatter::Currency),
    ("LoanAmount", 10_000, Formatter::Currency),
    ("SalePrice", 10_000, Formatter::Currency),
];

/// Validated, ordered set of fields. Ids are unique and non-empty, steps are
/// strictly positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTable {
    fields: Vec<FieldSpec>,
}

impl FieldTable {
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self> {
        let mut seen = HashSet::new();
        for field in &fields {
            if field.id.is_empty() {
                return Err(Error::InvalidConfig("field id must not be empty".into()));
            }
            if field.id.chars().any(char::is_whitespace) {
                return Err(Error::InvalidConfig(format!(
                    "field id {:?} must not contain white space",
                    field.id
                )));
            }
            if field.step <= 0 {
                return Err(Error::InvalidConfig(format!(
                    "field {} has step {}; steps must be positive",
                    field.id, field.step
                )));
            }
            if !seen.insert(field.id.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "duplicate field id {}",
                    field.id
                )));
            }
        }
        Ok(Self { fields })
    }

    /// The loan scoring form's seven sliders.
    pub fn scoring_form() -> Self {
        Self {
            fields: SCORING_FORM_FIELDS
                .iter()
                .map(|(id, step, format)| FieldSpec::new(*id, *step, *format))
                .collect(),
        }
    }

    /// Builds a table from every element carrying `data-step`, in document
    /// order. `data-format` selects the formatter and defaults to plain.
    pub fn from_dom(dom: &Dom) -> Result<Self> {
        let mut fields = Vec::new();
        for node in dom.elements() {
            let Some(raw_step) = dom.attr(node, "data-step") else {
                continue;
            };
            let id = dom.attr(node, "id").ok_or_else(|| {
                Error::InvalidConfig(format!(
                    "element with data-step={raw_step:?} has no id"
                ))
            })?;
            let step = raw_step.trim().parse::<i64>().map_err(|_| {
                Error::InvalidConfig(format!(
                    "field {id} has data-step={raw_step:?}; expected an integer"
                ))
            })?;
            let format = dom
                .attr(node, "data-format")
                .unwrap_or_default()
                .parse::<Formatter>()?;
            fields.push(FieldSpec::new(id, step, format));
        }
        Self::new(fields)
    }

    pub fn get(&self, id: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Default for FieldTable {
    fn default() -> Self {
        Self::scoring_form()
    }
}
