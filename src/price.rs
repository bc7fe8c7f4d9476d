//! Price normalization - display strings to comparable integers

/// Convert a site-formatted price ("PKR 12,345") into an integer.
///
/// Every non-digit character is discarded, decimal points included, so
/// "12.50" becomes 1250. Empty input, input without digits, and digit runs
/// too long for a `u64` all yield 0.
pub fn normalize(price_text: Option<&str>) -> u64 {
    let Some(text) = price_text else {
        return 0;
    };

    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return 0;
    }

    digits.parse().unwrap_or(0)
}

/// Format an integer with comma thousands separators: 12345 -> "12,345".
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_currency_with_separators() {
        assert_eq!(normalize(Some("PKR 12,345")), 12345);
        assert_eq!(normalize(Some("Rs. 9,500")), 9500);
    }

    #[test]
    fn test_normalize_unknown_is_zero() {
        assert_eq!(normalize(Some("")), 0);
        assert_eq!(normalize(None), 0);
        assert_eq!(normalize(Some("PKR")), 0);
    }

    #[test]
    fn test_normalize_drops_decimal_point() {
        assert_eq!(normalize(Some("12.50")), 1250);
    }

    #[test]
    fn test_normalize_overflow_is_zero() {
        assert_eq!(normalize(Some("99999999999999999999999")), 0);
    }

    #[test]
    fn test_normalize_idempotent() {
        for input in ["PKR 15,000", "", "abc", "12.50", "0", "007", "Rs 1 2 3"] {
            let once = normalize(Some(input));
            let twice = normalize(Some(once.to_string().as_str()));
            assert_eq!(once, twice, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(12345), "12,345");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }
}
