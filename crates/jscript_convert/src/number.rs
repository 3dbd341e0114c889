//! Number formatting and parsing.
//!
//! Formatting follows the language's Number-to-String rules: the shortest
//! digit string that round-trips, laid out in fixed notation for decimal
//! exponents in `-6 < n <= 21` and in exponential notation otherwise.

use crate::error::ConversionError;

/// Largest value a valid array index can take. `2^32 - 1` is reserved for
/// the `length` of a full array.
const MAX_ARRAY_INDEX: u32 = u32::MAX - 1;

// ============================================================================
// Number -> String
// ============================================================================

/// Format a number the way the language's `ToString` does.
pub fn number_to_string(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value == 0.0 {
        // Covers -0 as well.
        return "0".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() };
    }

    let mut out = String::new();
    if value < 0.0 {
        out.push('-');
    }
    let (digits, n) = shortest_digits(value.abs());
    let k = digits.len() as i32;

    if k <= n && n <= 21 {
        out.push_str(&digits);
        out.extend(std::iter::repeat('0').take((n - k) as usize));
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        out.push_str(int);
        out.push('.');
        out.push_str(frac);
    } else if -6 < n && n <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat('0').take((-n) as usize));
        out.push_str(&digits);
    } else {
        let (first, rest) = digits.split_at(1);
        out.push_str(first);
        if !rest.is_empty() {
            out.push('.');
            out.push_str(rest);
        }
        out.push('e');
        let exponent = n - 1;
        if exponent >= 0 {
            out.push('+');
        }
        out.push_str(&exponent.to_string());
    }
    out
}

/// Shortest round-tripping decimal digits of a positive finite value, and
/// the exponent `n` such that the value is `0.d1d2... * 10^n`.
fn shortest_digits(value: f64) -> (String, i32) {
    // `{:e}` renders the shortest representation that parses back to the
    // same value, as `d.ddde[-]x`.
    let formatted = format!("{value:e}");
    let (mantissa, exponent) = formatted.split_once('e').unwrap_or((formatted.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let mut digits: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();
    while digits.len() > 1 && digits.ends_with('0') {
        digits.pop();
    }
    (digits, exponent + 1)
}

// ============================================================================
// String -> Number
// ============================================================================

/// Whitespace and line terminators as the language defines them.
pub fn is_js_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\u{000B}'
            | '\u{000C}'
            | '\r'
            | ' '
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

/// Parse a string the way `ToNumber` does. Surrounding whitespace is
/// ignored, an empty string is `0`, and anything that is not a complete
/// numeric literal is `NaN`.
pub fn string_to_number(text: &str) -> f64 {
    let text = text.trim_matches(is_js_whitespace);
    if text.is_empty() {
        return 0.0;
    }

    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return parse_hex(hex);
    }

    let (negative, unsigned) = match text.as_bytes()[0] {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let magnitude = if unsigned == "Infinity" {
        f64::INFINITY
    } else if is_decimal_literal(unsigned) {
        unsigned.parse::<f64>().unwrap_or(f64::NAN)
    } else {
        return f64::NAN;
    };

    if negative {
        -magnitude
    } else {
        magnitude
    }
}

fn parse_hex(digits: &str) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    let mut value = 0.0f64;
    for c in digits.chars() {
        match c.to_digit(16) {
            Some(d) => value = value * 16.0 + d as f64,
            None => return f64::NAN,
        }
    }
    value
}

/// `digits [. digits] [(e|E) [+|-] digits]` with at least one mantissa digit.
fn is_decimal_literal(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;
    let mut mantissa_digits = 0;

    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
        mantissa_digits += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            mantissa_digits += 1;
        }
    }
    if mantissa_digits == 0 {
        return false;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        let exponent_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exponent_start {
            return false;
        }
    }
    i == bytes.len()
}

// ============================================================================
// Array indices
// ============================================================================

/// The array index a property key denotes, if it is in canonical form
/// (`"0"`, `"17"`, but not `"017"`, `"+1"` or `"4294967295"`).
pub fn array_index(key: &str) -> Option<u32> {
    let bytes = key.as_bytes();
    if bytes.is_empty() || bytes.len() > 10 || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    if bytes.len() > 1 && bytes[0] == b'0' {
        return None;
    }
    key.parse::<u32>().ok().filter(|&index| index <= MAX_ARRAY_INDEX)
}

/// The array index a number denotes, if it is an integral value in range.
pub fn array_index_from_number(value: f64) -> Option<u32> {
    if value >= 0.0 && value <= MAX_ARRAY_INDEX as f64 && value.fract() == 0.0 {
        Some(value as u32)
    } else {
        None
    }
}

/// Validate a value assigned to an array's `length`.
pub fn array_length(value: f64) -> Result<u32, ConversionError> {
    if value >= 0.0 && value <= u32::MAX as f64 && value.fract() == 0.0 {
        Ok(value as u32)
    } else {
        Err(ConversionError::InvalidArrayLength { value: number_to_string(value) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_in_fixed_notation() {
        assert_eq!(number_to_string(0.0), "0");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(100.0), "100");
        assert_eq!(number_to_string(-42.0), "-42");
        assert_eq!(number_to_string(1e20), "100000000000000000000");
        assert_eq!(number_to_string(1e21), "1e+21");
    }

    #[test]
    fn test_fractions() {
        assert_eq!(number_to_string(123.456), "123.456");
        assert_eq!(number_to_string(0.5), "0.5");
        assert_eq!(number_to_string(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(number_to_string(0.000001), "0.000001");
        assert_eq!(number_to_string(1e-7), "1e-7");
        assert_eq!(number_to_string(1.5e-7), "1.5e-7");
    }

    #[test]
    fn test_extremes() {
        assert_eq!(number_to_string(5e-324), "5e-324");
        assert_eq!(number_to_string(f64::MAX), "1.7976931348623157e+308");
        assert_eq!(number_to_string(f64::NAN), "NaN");
        assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_string_to_number_forms() {
        assert_eq!(string_to_number(""), 0.0);
        assert_eq!(string_to_number("  \u{00A0}\n"), 0.0);
        assert_eq!(string_to_number(" 12 "), 12.0);
        assert_eq!(string_to_number("-1.5e3"), -1500.0);
        assert_eq!(string_to_number("+.5"), 0.5);
        assert_eq!(string_to_number("5."), 5.0);
        assert_eq!(string_to_number("0x1F"), 31.0);
        assert_eq!(string_to_number("-Infinity"), f64::NEG_INFINITY);
    }

    #[test]
    fn test_string_to_number_rejects() {
        for text in ["abc", ".", "1e", "1e+", "inf", "infinity", "NaN", "1_000", "0x", "0xG", "-0x10", "1 2", "e5"] {
            assert!(string_to_number(text).is_nan(), "{text:?} should be NaN");
        }
    }

    #[test]
    fn test_array_index() {
        assert_eq!(array_index("0"), Some(0));
        assert_eq!(array_index("17"), Some(17));
        assert_eq!(array_index("4294967294"), Some(4294967294));
        assert_eq!(array_index("4294967295"), None);
        assert_eq!(array_index("017"), None);
        assert_eq!(array_index("+1"), None);
        assert_eq!(array_index("1.0"), None);
        assert_eq!(array_index(""), None);
        assert_eq!(array_index_from_number(3.0), Some(3));
        assert_eq!(array_index_from_number(3.5), None);
        assert_eq!(array_index_from_number(-1.0), None);
    }

    #[test]
    fn test_array_length() {
        assert_eq!(array_length(10.0), Ok(10));
        assert_eq!(array_length(4294967295.0), Ok(u32::MAX));
        assert!(array_length(-1.0).is_err());
        assert!(array_length(1.5).is_err());
    }
}
