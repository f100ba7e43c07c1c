use crate::error::AppError;

pub fn require_valid_id(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} must be a valid ID")));
    }
    Ok(())
}

/// Lenient integer parse: leading whitespace, optional sign, then leading
/// digits. Anything without a digit prefix yields 0.
pub fn parse_int_or_zero(value: &str) -> i64 {
    let s = value.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits: &str = {
        let end = rest
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return 0;
    }
    // Saturate rather than fail on absurdly long digit strings.
    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_valid_id() {
        assert!(require_valid_id("id", "").is_err());
        assert!(require_valid_id("id", "7").is_ok());
    }

    #[test]
    fn test_parse_int_or_zero() {
        assert_eq!(parse_int_or_zero("5"), 5);
        assert_eq!(parse_int_or_zero(" 12"), 12);
        assert_eq!(parse_int_or_zero("-3"), -3);
        assert_eq!(parse_int_or_zero("+4"), 4);
        assert_eq!(parse_int_or_zero("3.9"), 3);
        assert_eq!(parse_int_or_zero("7abc"), 7);
        assert_eq!(parse_int_or_zero("abc"), 0);
        assert_eq!(parse_int_or_zero(""), 0);
        assert_eq!(parse_int_or_zero("-"), 0);
    }
}
