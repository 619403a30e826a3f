use std::fmt;

use num_bigint::BigInt;
use num_traits::Num;

/// An integer read from a stepper's input, or the not-a-number marker left by
/// parsing content that does not start with a digit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StepValue {
    Number(BigInt),
    NotANumber,
}

impl StepValue {
    pub fn is_nan(&self) -> bool {
        matches!(self, Self::NotANumber)
    }

    /// Adds `delta`; not-a-number absorbs any step.
    pub fn offset(&self, delta: i64) -> Self {
        match self {
            Self::Number(value) => Self::Number(value + BigInt::from(delta)),
            Self::NotANumber => Self::NotANumber,
        }
    }

    /// Subtracts `delta`; not-a-number absorbs any step.
    pub fn offset_back(&self, delta: i64) -> Self {
        match self {
            Self::Number(value) => Self::Number(value - BigInt::from(delta)),
            Self::NotANumber => Self::NotANumber,
        }
    }
}

impl From<i64> for StepValue {
    fn from(value: i64) -> Self {
        Self::Number(BigInt::from(value))
    }
}

impl From<BigInt> for StepValue {
    fn from(value: BigInt) -> Self {
        Self::Number(value)
    }
}

impl fmt::Display for StepValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::NotANumber => f.write_str("NaN"),
        }
    }
}

/// Base-10 integer prefix parse.
///
/// Leading white space and line terminators are skipped, one optional `+` or
/// `-` sign is accepted, and digits are read up to the first non-digit. Input
/// with no digits after that yields [`StepValue::NotANumber`]. There is no hex
/// prefix detection, so `"0x1A"` parses as `0`.
pub fn parse_int(src: &str) -> StepValue {
    let src = src.trim_start_matches(is_js_whitespace);
    let (negative, rest) = match src.as_bytes().first() {
        Some(b'-') => (true, &src[1..]),
        Some(b'+') => (false, &src[1..]),
        _ => (false, src),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return StepValue::NotANumber;
    }

    match BigInt::from_str_radix(&rest[..digits_len], 10) {
        Ok(value) if negative => StepValue::Number(-value),
        Ok(value) => StepValue::Number(value),
        Err(_) => StepValue::NotANumber,
    }
}

fn is_js_whitespace(ch: char) -> bool {
    // U+0085 is Unicode white space but not a JS StrWhiteSpaceChar; U+FEFF is
    // the reverse.
    ch == '\u{FEFF}' || (ch.is_whitespace() && ch != '\u{0085}')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(value: i64) -> StepValue {
        StepValue::from(value)
    }

    #[test]
    fn parses_plain_digits() {
        assert_eq!(parse_int("50000"), num(50000));
        assert_eq!(parse_int("0"), num(0));
        assert_eq!(parse_int("007"), num(7));
    }

    #[test]
    fn skips_leading_whitespace_and_line_terminators() {
        assert_eq!(parse_int("   42"), num(42));
        assert_eq!(parse_int("\t\n\r 3"), num(3));
        assert_eq!(parse_int("\u{00A0}\u{FEFF}\u{2028}9"), num(9));
        assert_eq!(parse_int("\u{0085}9"), StepValue::NotANumber);
    }

    #[test]
    fn stops_at_first_non_digit() {
        assert_eq!(parse_int("12.7"), num(12));
        assert_eq!(parse_int("1e3"), num(1));
        assert_eq!(parse_int("250 dollars"), num(250));
        assert_eq!(parse_int("0x1A"), num(0));
    }

    #[test]
    fn accepts_one_sign() {
        assert_eq!(parse_int("-10000"), num(-10000));
        assert_eq!(parse_int("+15"), num(15));
        assert_eq!(parse_int("-0"), num(0));
        assert_eq!(parse_int("--1"), StepValue::NotANumber);
        assert_eq!(parse_int("- 1"), StepValue::NotANumber);
        assert_eq!(parse_int("-"), StepValue::NotANumber);
    }

    #[test]
    fn non_numeric_yields_marker() {
        assert_eq!(parse_int("abc"), StepValue::NotANumber);
        assert_eq!(parse_int(""), StepValue::NotANumber);
        assert_eq!(parse_int("   "), StepValue::NotANumber);
        assert_eq!(parse_int("$500"), StepValue::NotANumber);
        assert_eq!(parse_int("NaN"), StepValue::NotANumber);
    }

    #[test]
    fn values_past_i64_stay_exact() {
        let raw = "99999999999999999999999";
        let parsed = parse_int(raw);
        assert_eq!(parsed.to_string(), raw);
        assert_eq!(parsed.offset(1).to_string(), "100000000000000000000000");
    }

    #[test]
    fn not_a_number_absorbs_steps() {
        assert_eq!(StepValue::NotANumber.offset(10000), StepValue::NotANumber);
        assert_eq!(StepValue::NotANumber.to_string(), "NaN");
    }
}
