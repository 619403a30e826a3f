use std::fmt;
use std::str::FromStr;

use crate::Error;
use crate::number::StepValue;

/// How a stepper's value is rendered into its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Formatter {
    /// Decimal digits, e.g. `3` or `-2`.
    #[default]
    Plain,
    /// Decimal digits after a `$`, e.g. `$60000` or `$-10000`.
    Currency,
}

impl Formatter {
    pub fn format(self, value: &StepValue) -> String {
        match self {
            Self::Plain => value.to_string(),
            Self::Currency => format!("${value}"),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Currency => "currency",
        }
    }
}

impl fmt::Display for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Formatter {
    type Err = Error;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        match src.trim().to_ascii_lowercase().as_str() {
            "" | "plain" => Ok(Self::Plain),
            "currency" => Ok(Self::Currency),
            other => Err(Error::InvalidConfig(format!(
                "unknown formatter {other:?} (expected plain or currency)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_prefixes_dollar_sign_before_sign() {
        assert_eq!(Formatter::Currency.format(&StepValue::from(60000)), "$60000");
        assert_eq!(Formatter::Currency.format(&StepValue::from(-10000)), "$-10000");
        assert_eq!(Formatter::Currency.format(&StepValue::NotANumber), "$NaN");
    }

    #[test]
    fn plain_is_bare_digits() {
        assert_eq!(Formatter::Plain.format(&StepValue::from(2)), "2");
        assert_eq!(Formatter::Plain.format(&StepValue::from(-1)), "-1");
        assert_eq!(Formatter::Plain.format(&StepValue::NotANumber), "NaN");
    }

    #[test]
    fn names_round_trip_through_from_str() -> crate::Result<()> {
        assert_eq!("Currency".parse::<Formatter>()?, Formatter::Currency);
        assert_eq!("".parse::<Formatter>()?, Formatter::Plain);
        assert!(matches!(
            "percent".parse::<Formatter>(),
            Err(Error::InvalidConfig(_))
        ));
        Ok(())
    }
}
