// Numeric and date parsing for rent, budget and term fields
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Months added to the elapsed-month count when re-terming a month-to-month lease
pub const MONTH_TO_MONTH_TERM_PADDING: i64 = 13;

/// Fractional digits kept when converting an annual free-rent figure to monthly
pub const FREE_RENT_SCALE: u32 = 10;

/// Parses a decimal amount, tolerating surrounding whitespace and `,` group separators
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let cleaned: String = trimmed.chars().filter(|&c| c != ',').collect();
    Decimal::from_str(&cleaned).ok()
}

/// Converts an annual amount into its monthly figure, rounded to ten fractional
/// digits and rendered without trailing zeros
pub fn monthly_from_annual(text: &str) -> Option<String> {
    let annual = parse_decimal(text)?;
    let monthly = (annual / Decimal::from(12)).round_dp(FREE_RENT_SCALE);
    Some(monthly.normalize().to_string())
}

/// Parses a `yyyy-MM-dd` start date
pub fn parse_start_date(text: &str) -> Option<NaiveDate> {
    if text.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

/// Term in months for a month-to-month lease that started on `start`:
/// whole 30-day periods elapsed up to `today`, plus the fixed padding
pub fn month_to_month_term(start: NaiveDate, today: NaiveDate) -> i64 {
    let days = (today - start).num_days();
    days / 30 + MONTH_TO_MONTH_TERM_PADDING
}

/// Key used to compare budget account references
#[derive(Debug, Clone, PartialEq)]
pub enum AccountKey {
    Numeric(f32),
    /// Reference text that does not convert to a number; only matches identical text
    Text(String),
}

impl AccountKey {
    pub fn from_reference(text: &str) -> Self {
        let trimmed = text.trim();
        match trimmed.parse::<f32>() {
            Ok(value) if value.is_finite() => AccountKey::Numeric(value),
            _ => AccountKey::Text(trimmed.to_uppercase()),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, AccountKey::Numeric(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_variants() {
        assert_eq!(parse_decimal("250.00"), Some(Decimal::new(25000, 2)));
        assert_eq!(parse_decimal(" 1,250 "), Some(Decimal::from(1250)));
        assert_eq!(parse_decimal("-3.5"), Some(Decimal::new(-35, 1)));
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("abc"), None);
    }

    #[test]
    fn test_decimal_equality_ignores_scale() {
        assert_eq!(parse_decimal("250"), parse_decimal("250.00"));
    }

    #[test]
    fn test_monthly_from_annual() {
        assert_eq!(monthly_from_annual("120"), Some("10".to_string()));
        assert_eq!(monthly_from_annual("100"), Some("8.3333333333".to_string()));
        assert_eq!(monthly_from_annual("1.20"), Some("0.1".to_string()));
        assert_eq!(monthly_from_annual("0"), Some("0".to_string()));
        assert_eq!(monthly_from_annual("n/a"), None);
    }

    #[test]
    fn test_parse_start_date() {
        assert_eq!(
            parse_start_date("2020-01-15"),
            NaiveDate::from_ymd_opt(2020, 1, 15)
        );
        assert_eq!(parse_start_date("2020-1-15"), None);
        assert_eq!(parse_start_date("15/01/2020"), None);
        assert_eq!(parse_start_date("2020-02-30"), None);
    }

    #[test]
    fn test_month_to_month_term() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(month_to_month_term(start, start), 13);
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(); // 60 days
        assert_eq!(month_to_month_term(start, today), 15);
        let today = NaiveDate::from_ymd_opt(2024, 1, 30).unwrap(); // 29 days
        assert_eq!(month_to_month_term(start, today), 13);
    }

    #[test]
    fn test_account_key() {
        assert_eq!(AccountKey::from_reference("4010"), AccountKey::Numeric(4010.0));
        assert_eq!(AccountKey::from_reference(" 4010.0 "), AccountKey::Numeric(4010.0));
        assert_eq!(
            AccountKey::from_reference("rev-a"),
            AccountKey::Text("REV-A".to_string())
        );
        assert!(!AccountKey::from_reference("NaN").is_numeric());
    }
}
