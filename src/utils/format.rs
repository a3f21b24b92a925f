//! Number formatting for report output (thousands separators, pounds).

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

pub fn format_count(value: usize) -> String {
    group_thousands(&value.to_string())
}

/// `1234.5` -> `1,234.50`
pub fn format_decimal(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut out = String::new();
    // -0.00 不顯示負號
    if value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

pub fn format_currency(value: f64) -> String {
    let body = format_decimal(value, 2);
    match body.strip_prefix('-') {
        Some(positive) => format!("-£{}", positive),
        None => format!("£{}", body),
    }
}

/// Quantities are usually whole numbers; only show decimals when present.
pub fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 {
        format_decimal(value, 0)
    } else {
        format_decimal(value, 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "£0.00");
        assert_eq!(format_currency(1234.5), "£1,234.50");
        assert_eq!(format_currency(-12.25), "-£12.25");
        assert_eq!(format_currency(-0.001), "£0.00");
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(1200.0), "1,200");
        assert_eq!(format_quantity(2.5), "2.50");
    }
}
