/// Format a float as a currency amount with thousands separators: ₹1,234.56
pub fn money(val: f64, symbol: &str) -> String {
    format_amount(val, symbol, 2)
}

/// Same as [`money`] but rounded to whole units: ₹1,235
pub fn money_whole(val: f64, symbol: &str) -> String {
    format_amount(val, symbol, 0)
}

fn format_amount(val: f64, symbol: &str, decimals: usize) -> String {
    let rounded = format!("{:.*}", decimals, val.abs());
    let negative = val < 0.0 && rounded.chars().any(|c| c.is_ascii_digit() && c != '0');
    let (int_part, dec_part) = match rounded.split_once('.') {
        Some((i, d)) => (i, Some(d)),
        None => (rounded.as_str(), None),
    };

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    let sign = if negative { "-" } else { "" };
    match dec_part {
        Some(d) => format!("{sign}{symbol}{with_commas}.{d}"),
        None => format!("{sign}{symbol}{with_commas}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(1234.56, "$"), "$1,234.56");
        assert_eq!(money(-500.00, "$"), "-$500.00");
        assert_eq!(money(0.0, "$"), "$0.00");
        assert_eq!(money(1000000.99, "$"), "$1,000,000.99");
        assert_eq!(money(42.10, "\u{20b9}"), "\u{20b9}42.10");
    }

    #[test]
    fn test_money_whole() {
        assert_eq!(money_whole(1234.56, "$"), "$1,235");
        assert_eq!(money_whole(-999.4, "$"), "-$999");
        assert_eq!(money_whole(-0.2, "$"), "$0");
    }
}
