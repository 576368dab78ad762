//! Display formatting for prices.

/// Format a price in rupiah: `Rp 20.000`, `Rp 1.250,5`.
pub fn format_price(price: f64) -> String {
    format!("Rp {}", format_number(price))
}

/// Group thousands with `.` and use `,` for up to three decimals, the way
/// Indonesian locales write numbers.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let scaled = (value.abs() * 1000.0).round() as u128;
    let integer = scaled / 1000;
    let fraction = scaled % 1000;

    let digits = integer.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 5);
    if value < 0.0 && scaled > 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }

    if fraction > 0 {
        let decimals = format!("{:03}", fraction);
        out.push(',');
        out.push_str(decimals.trim_end_matches('0'));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_price(20000.0), "Rp 20.000");
        assert_eq!(format_price(1_250_000.0), "Rp 1.250.000");
        assert_eq!(format_price(999.0), "Rp 999");
        assert_eq!(format_price(0.0), "Rp 0");
    }

    #[test]
    fn keeps_up_to_three_decimals() {
        assert_eq!(format_number(1250.5), "1.250,5");
        assert_eq!(format_number(0.125), "0,125");
        assert_eq!(format_number(2.0004), "2");
    }

    #[test]
    fn negative_values() {
        assert_eq!(format_number(-1500.0), "-1.500");
        assert_eq!(format_number(-0.0001), "0");
    }
}
