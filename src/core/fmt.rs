/// Format a dollar amount for explanation text (no decimals, commas,
/// millions abbreviated).
pub fn format_currency(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let sign = if rounded < 0 { "-" } else { "" };
    let magnitude = rounded.abs();
    if magnitude >= 1_000_000 {
        return format!("{sign}${:.2}M", magnitude as f64 / 1_000_000.0);
    }
    if magnitude < 1_000 {
        return format!("{sign}${magnitude}");
    }
    let digits = magnitude.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();
    format!("{sign}${grouped}")
}

/// Format a percentage value (already in percent units) with no decimals.
pub fn format_percent(percent: f64) -> String {
    format!("{percent:.0}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_currency() {
        assert_eq!(format_currency(1234.0), "$1,234");
        assert_eq!(format_currency(1_000_000.0), "$1.00M");
        assert_eq!(format_currency(50.0), "$50");
        assert_eq!(format_currency(999.5), "$1,000");
        assert_eq!(format_currency(-1234.0), "-$1,234");
        assert_eq!(format_currency(-50.0), "-$50");
    }

    #[test]
    fn formats_percent() {
        assert_eq!(format_percent(12.0), "12%");
        assert_eq!(format_percent(30.5), "31%");
    }
}
