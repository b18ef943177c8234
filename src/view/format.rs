//! Display formatting for amounts, dates and counts

use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};

/// Format an amount as US dollars, e.g. `$1,234.50`
///
/// Rounds half away from zero to whole cents.
pub fn format_currency(amount: Decimal) -> String {
    let mut cents = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = cents.is_sign_negative() && !cents.is_zero();
    cents = cents.abs();
    cents.rescale(2);

    let text = cents.to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if negative { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, fraction)
}

/// Format a sale time, e.g. `Jan 1, 2024, 09:15 AM`; `-` when unknown
pub fn format_date(at: Option<NaiveDateTime>) -> String {
    match at {
        Some(at) => at.format("%b %-d, %Y, %I:%M %p").to_string(),
        None => "-".to_string(),
    }
}

/// `1 unit sold` / `N units sold`
pub fn units_sold_label(quantity: u64) -> String {
    if quantity == 1 {
        "1 unit sold".to_string()
    } else {
        format!("{} units sold", quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(Decimal::ZERO), "$0.00");
        assert_eq!(format_currency(Decimal::new(35, 1)), "$3.50");
        assert_eq!(format_currency(Decimal::new(2600, 2)), "$26.00");
        assert_eq!(format_currency(Decimal::new(123450, 2)), "$1,234.50");
        assert_eq!(format_currency(Decimal::from(1_000_000)), "$1,000,000.00");
        assert_eq!(format_currency(Decimal::new(-42, 1)), "-$4.20");
    }

    #[test]
    fn test_format_currency_rounding() {
        let avg = Decimal::from(26) / Decimal::from(3);
        assert_eq!(format_currency(avg), "$8.67");
        assert_eq!(format_currency(Decimal::new(1005, 3)), "$1.01");
        assert_eq!(format_currency(Decimal::new(-4, 3)), "$0.00");
    }

    #[test]
    fn test_format_date() {
        let at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(9, 15, 0)
            .unwrap();
        assert_eq!(format_date(Some(at)), "Jan 1, 2024, 09:15 AM");

        let evening = NaiveDate::from_ymd_opt(2024, 12, 25)
            .unwrap()
            .and_hms_opt(18, 5, 0)
            .unwrap();
        assert_eq!(format_date(Some(evening)), "Dec 25, 2024, 06:05 PM");
        assert_eq!(format_date(None), "-");
    }

    #[test]
    fn test_units_sold_label() {
        assert_eq!(units_sold_label(0), "0 units sold");
        assert_eq!(units_sold_label(1), "1 unit sold");
        assert_eq!(units_sold_label(3), "3 units sold");
    }
}
