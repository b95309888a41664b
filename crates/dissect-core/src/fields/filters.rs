//! Value filters available in field templates.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::FieldError;

/// Default input format of `parse_date`.
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

/// A filter applied to a rendered value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Normalize a monetary amount to a plain decimal (`1.234,56` -> `1234.56`).
    ParseMonetary,
    /// Parse a date with a strftime-style format and emit it as `YYYY-MM-DD`.
    ParseDate(Option<String>),
    /// Strip surrounding whitespace.
    Trim,
}

impl Filter {
    /// Apply the filter.
    pub fn apply(&self, value: &str) -> Result<String, FieldError> {
        match self {
            Filter::ParseMonetary => parse_monetary(value).map(|d| d.to_string()),
            Filter::ParseDate(format) => {
                let format = format.as_deref().unwrap_or(DEFAULT_DATE_FORMAT);
                parse_date(value, format).map(|d| d.format("%Y-%m-%d").to_string())
            }
            Filter::Trim => Ok(value.trim().to_string()),
        }
    }
}

/// Parse a monetary amount written with either decimal convention.
///
/// When both `,` and `.` occur, the one three characters from the end is the
/// decimal point and the other is a thousands separator. A lone `,` is the
/// decimal point. Spaces are thousands separators.
pub fn parse_monetary(value: &str) -> Result<Decimal, FieldError> {
    let mut s: String = value.chars().filter(|c| !c.is_whitespace()).collect();

    if s.contains(',') && s.contains('.') {
        match s.chars().rev().nth(2) {
            Some('.') => s = s.replace(',', ""),
            Some(',') => s = s.replace('.', "").replace(',', "."),
            _ => {}
        }
    } else if s.contains(',') {
        s = s.replace(',', ".");
    }

    Decimal::from_str(&s).map_err(|_| FieldError::Filter {
        filter: "parse_monetary".to_string(),
        value: value.to_string(),
    })
}

/// Parse a date with a strftime-style format.
pub fn parse_date(value: &str, format: &str) -> Result<NaiveDate, FieldError> {
    NaiveDate::parse_from_str(value.trim(), format).map_err(|_| FieldError::Filter {
        filter: "parse_date".to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_monetary() {
        let cases = [
            ("1,234.56", "1234.56"),
            ("1.234,56", "1234.56"),
            ("12,50", "12.50"),
            ("12.50", "12.50"),
            ("1 234.50", "1234.50"),
            ("42", "42"),
        ];
        for (input, expected) in cases {
            assert_eq!(parse_monetary(input).unwrap().to_string(), expected, "input: {}", input);
        }
    }

    #[test]
    fn test_parse_monetary_rejects_text() {
        assert!(matches!(
            parse_monetary("twelve"),
            Err(FieldError::Filter { .. })
        ));
        assert!(parse_monetary("").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("15/11/2023", DEFAULT_DATE_FORMAT).unwrap(),
            NaiveDate::from_ymd_opt(2023, 11, 15).unwrap()
        );
        assert_eq!(
            Filter::ParseDate(Some("%d.%m.%Y".to_string())).apply("01.02.2024").unwrap(),
            "2024-02-01"
        );
        assert!(parse_date("2023-11-15", DEFAULT_DATE_FORMAT).is_err());
    }
}
