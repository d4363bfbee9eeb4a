//! Time literal parsing.
//!
//! Time literals appear in two places: as action durations in the DSL
//! (`Action PUMP (L, "10s")`) and inside transition conditions
//! (`X1.t > 2s`). Both normalize to seconds as `f64`.

/// Parses a time literal with an explicit unit: `<n>s` or `<n>ms`.
///
/// Returns `None` for anything else, including bare numbers.
///
/// # Examples
///
/// ```
/// # use grafcet_core::duration::parse_time_literal;
/// assert_eq!(parse_time_literal("2s"), Some(2.0));
/// assert_eq!(parse_time_literal("250ms"), Some(0.25));
/// assert_eq!(parse_time_literal("2"), None);
/// ```
pub fn parse_time_literal(text: &str) -> Option<f64> {
    let text = text.trim();
    let (digits, scale) = if let Some(digits) = text.strip_suffix("ms") {
        (digits, 1000.0)
    } else if let Some(digits) = text.strip_suffix('s') {
        (digits, 1.0)
    } else {
        return None;
    };

    parse_unsigned_decimal(digits).map(|value| value / scale)
}

/// Parses an action duration: a time literal, or a bare number of seconds.
///
/// # Examples
///
/// ```
/// # use grafcet_core::duration::parse_duration;
/// assert_eq!(parse_duration("1.5s"), Some(1.5));
/// assert_eq!(parse_duration("3"), Some(3.0));
/// assert_eq!(parse_duration("soon"), None);
/// ```
pub fn parse_duration(text: &str) -> Option<f64> {
    parse_time_literal(text).or_else(|| parse_unsigned_decimal(text.trim()))
}

/// Accepts `123` and `12.5` but rejects signs, exponents and `inf`/`nan`.
fn parse_unsigned_decimal(text: &str) -> Option<f64> {
    let mut parts = text.splitn(2, '.');
    let whole = parts.next().unwrap_or_default();
    let fraction = parts.next();

    let digits_only = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    let valid = digits_only(whole) && fraction.is_none_or(digits_only);

    if valid { text.parse().ok() } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_literal_units() {
        assert_eq!(parse_time_literal("5s"), Some(5.0));
        assert_eq!(parse_time_literal("1.5s"), Some(1.5));
        assert_eq!(parse_time_literal("200ms"), Some(0.2));
        assert_eq!(parse_time_literal(" 10s "), Some(10.0));
    }

    #[test]
    fn test_time_literal_rejects_malformed() {
        assert_eq!(parse_time_literal("s"), None);
        assert_eq!(parse_time_literal("ms"), None);
        assert_eq!(parse_time_literal("-2s"), None);
        assert_eq!(parse_time_literal("1e3s"), None);
        assert_eq!(parse_time_literal("X1s"), None);
        assert_eq!(parse_time_literal("1.s"), None);
    }

    #[test]
    fn test_duration_accepts_bare_seconds() {
        assert_eq!(parse_duration("7"), Some(7.0));
        assert_eq!(parse_duration("0.5"), Some(0.5));
        assert_eq!(parse_duration("500ms"), Some(0.5));
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("inf"), None);
    }
}
