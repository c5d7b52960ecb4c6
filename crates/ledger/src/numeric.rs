//! Numeric interpretation of free-form operator input.
//!
//! Every quantity and price in the ledger is stored as the text the operator
//! typed. Totals and price bounds read it through [`numeric`], which never
//! fails: anything that is not a number counts as zero.

/// Interpret `raw` as a number, returning `0.0` when it is not one.
///
/// Surrounding whitespace is ignored and the longest leading decimal number
/// is taken, so `"12 cuốn"` reads as `12`. Empty, non-numeric and non-finite
/// input all read as `0`.
///
/// ```
/// use booklist_ledger::numeric;
///
/// assert_eq!(numeric("3.5"), 3.5);
/// assert_eq!(numeric(" 12 cuốn"), 12.0);
/// assert_eq!(numeric(""), 0.0);
/// assert_eq!(numeric("abc"), 0.0);
/// ```
pub fn numeric(raw: &str) -> f64 {
    let trimmed = raw.trim();
    let prefix = &trimmed[..number_prefix_len(trimmed)];
    match prefix.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Render a derived quantity the way it is shown to operators.
///
/// Whole numbers print without a fractional part and negative zero prints
/// as `0`.
pub fn format_quantity(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

/// Length in bytes of the leading `[sign] digits [. digits] [e [sign] digits]`
/// run of `s`, or 0 when no digit is present.
fn number_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if digits == 0 {
        return 0;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_start {
            end = exp_end;
        }
    }

    end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_numbers() {
        assert_eq!(numeric("5"), 5.0);
        assert_eq!(numeric("-2"), -2.0);
        assert_eq!(numeric("+7"), 7.0);
        assert_eq!(numeric("0.25"), 0.25);
        assert_eq!(numeric(".5"), 0.5);
        assert_eq!(numeric("5."), 5.0);
        assert_eq!(numeric("1e3"), 1000.0);
    }

    #[test]
    fn test_empty_and_garbage_are_zero() {
        assert_eq!(numeric(""), 0.0);
        assert_eq!(numeric("   "), 0.0);
        assert_eq!(numeric("abc"), 0.0);
        assert_eq!(numeric("-"), 0.0);
        assert_eq!(numeric("."), 0.0);
        assert_eq!(numeric("custom"), 0.0);
    }

    #[test]
    fn test_non_finite_is_zero() {
        assert_eq!(numeric("inf"), 0.0);
        assert_eq!(numeric("NaN"), 0.0);
        assert_eq!(numeric("infinity"), 0.0);
        assert_eq!(numeric("1e999"), 0.0);
    }

    #[test]
    fn test_leading_number_is_taken() {
        assert_eq!(numeric("12abc"), 12.0);
        assert_eq!(numeric("50000đ"), 50000.0);
        assert_eq!(numeric("1,000"), 1.0);
        assert_eq!(numeric("2e"), 2.0);
        assert_eq!(numeric("3e+"), 3.0);
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(8.0), "8");
        assert_eq!(format_quantity(8.5), "8.5");
        assert_eq!(format_quantity(-3.0), "-3");
        assert_eq!(format_quantity(-0.0), "0");
    }
}
