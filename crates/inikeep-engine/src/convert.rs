//! Conversions between stored text and typed values.
//!
//! Reads are lenient: text that is not a number converts to zero instead of
//! failing, and only the leading numeric part of a value is looked at
//! (`"42px"` reads as `42`). Booleans are integers, nonzero meaning true, so
//! `"true"` reads as `false`.

/// A type that can be stored as an INI value
pub trait IniValue: Sized {
    /// Convert stored text; never fails
    fn from_raw(raw: &str) -> Self;

    /// Canonical text written for this value
    fn to_raw(&self) -> String;
}

impl IniValue for String {
    fn from_raw(raw: &str) -> Self {
        raw.to_string()
    }

    fn to_raw(&self) -> String {
        self.clone()
    }
}

impl IniValue for i64 {
    fn from_raw(raw: &str) -> Self {
        parse_int(raw)
    }

    fn to_raw(&self) -> String {
        self.to_string()
    }
}

impl IniValue for f64 {
    fn from_raw(raw: &str) -> Self {
        parse_float(raw)
    }

    fn to_raw(&self) -> String {
        self.to_string()
    }
}

impl IniValue for bool {
    fn from_raw(raw: &str) -> Self {
        parse_int(raw) != 0
    }

    fn to_raw(&self) -> String {
        if *self { "1" } else { "0" }.to_string()
    }
}

/// Leading optional sign and decimal digits; saturates instead of overflowing
pub fn parse_int(raw: &str) -> i64 {
    let text = raw.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let mut value: i64 = 0;
    for digit in digits.bytes().take_while(u8::is_ascii_digit) {
        let digit = i64::from(digit - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }
    value
}

/// Longest leading floating point literal, or `0.0` when there is none
pub fn parse_float(raw: &str) -> f64 {
    let text = raw.trim_start();
    float_prefix(text)
        .and_then(|prefix| prefix.parse().ok())
        .unwrap_or(0.0)
}

fn float_prefix(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut pos = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        pos += 1;
    }

    let rest = &text[pos..];
    for word in ["infinity", "inf", "nan"] {
        if rest
            .get(..word.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(word))
        {
            return Some(&text[..pos + word.len()]);
        }
    }

    let int_digits = count_digits(&bytes[pos..]);
    pos += int_digits;
    let mut frac_digits = 0;
    if bytes.get(pos) == Some(&b'.') {
        frac_digits = count_digits(&bytes[pos + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            pos += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        let mut exp = pos + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = count_digits(&bytes[exp.min(bytes.len())..]);
        if exp_digits > 0 {
            pos = exp + exp_digits;
        }
    }

    Some(&text[..pos])
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("42", 42)]
    #[case("  -17", -17)]
    #[case("+8", 8)]
    #[case("12abc", 12)]
    #[case("3.9", 3)]
    #[case("abc", 0)]
    #[case("", 0)]
    #[case("-", 0)]
    #[case("99999999999999999999999", i64::MAX)]
    #[case("-99999999999999999999999", i64::MIN)]
    fn test_parse_int(#[case] input: &str, #[case] expected: i64) {
        assert_eq!(parse_int(input), expected);
    }

    #[rstest]
    #[case("1.5", 1.5)]
    #[case("  -0.25", -0.25)]
    #[case("2e3", 2000.0)]
    #[case("2e", 2.0)]
    #[case("1.25E-2xyz", 0.0125)]
    #[case(".5", 0.5)]
    #[case("7.", 7.0)]
    #[case("7", 7.0)]
    #[case("abc", 0.0)]
    #[case(".", 0.0)]
    #[case("", 0.0)]
    fn test_parse_float(#[case] input: &str, #[case] expected: f64) {
        assert_eq!(parse_float(input), expected);
    }

    #[test]
    fn test_parse_float_specials() {
        assert_eq!(parse_float("inf"), f64::INFINITY);
        assert_eq!(parse_float("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_float("NaN").is_nan());
    }

    #[rstest]
    #[case("1", true)]
    #[case("-3", true)]
    #[case("0", false)]
    #[case("true", false)]
    #[case("", false)]
    fn test_bool_is_nonzero_integer(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(bool::from_raw(input), expected);
    }

    #[test]
    fn test_canonical_text() {
        assert_eq!(true.to_raw(), "1");
        assert_eq!(false.to_raw(), "0");
        assert_eq!((-5i64).to_raw(), "-5");
        assert_eq!(1.5f64.to_raw(), "1.5");
        assert_eq!(2.0f64.to_raw(), "2");
        assert_eq!("plain".to_string().to_raw(), "plain");
    }

    #[test]
    fn test_float_text_reads_back() {
        for value in [0.1, -123.456, 1e-7, 6.02e23, f64::MAX] {
            assert_eq!(f64::from_raw(&value.to_raw()), value);
        }
    }
}
