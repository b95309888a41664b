//! Field data types and value validation.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FieldError;

lazy_static! {
    static ref HTTP_URL: Regex = Regex::new(
        r"^https?://[^\s/?#]+(?:[/?#]\S*)?$"
    ).unwrap();
}

/// Data type of a document field in the document-management system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Url,
    Date,
    Boolean,
    Integer,
    Float,
    Monetary,
    DocumentLink,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Url => "url",
            DataType::Date => "date",
            DataType::Boolean => "boolean",
            DataType::Integer => "integer",
            DataType::Float => "float",
            DataType::Monetary => "monetary",
            DataType::DocumentLink => "documentlink",
        }
    }

    /// Check that a rendered value converts to this type.
    pub fn validate(&self, value: &str) -> Result<(), FieldError> {
        let invalid = |reason: &str| FieldError::Conversion {
            data_type: self.as_str().to_string(),
            reason: reason.to_string(),
        };

        match self {
            DataType::String => Ok(()),
            DataType::Url => HTTP_URL
                .is_match(value)
                .then_some(())
                .ok_or_else(|| invalid("expected an http(s) URL")),
            DataType::Date => NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(|_| ())
                .map_err(|_| invalid("expected ISO YYYY-MM-DD")),
            DataType::Boolean => match value.to_lowercase().as_str() {
                "true" | "false" | "yes" | "no" => Ok(()),
                _ => Err(invalid("expected true, false, yes or no")),
            },
            DataType::Integer => value
                .trim()
                .parse::<i64>()
                .map(|_| ())
                .map_err(|_| invalid("not an integer")),
            DataType::Float => value
                .trim()
                .parse::<f64>()
                .map(|_| ())
                .map_err(|_| invalid("not a number")),
            DataType::Monetary => Decimal::from_str(value.trim())
                .map(|_| ())
                .map_err(|_| invalid("not a decimal amount")),
            DataType::DocumentLink => serde_json::from_str::<Vec<u64>>(value)
                .map(|_| ())
                .map_err(|_| invalid("expected a JSON list of document ids")),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(DataType::String),
            "url" => Ok(DataType::Url),
            "date" => Ok(DataType::Date),
            "boolean" => Ok(DataType::Boolean),
            "integer" => Ok(DataType::Integer),
            "float" => Ok(DataType::Float),
            "monetary" => Ok(DataType::Monetary),
            "documentlink" => Ok(DataType::DocumentLink),
            _ => Err(format!("unknown data type \"{}\"", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_values() {
        let cases = [
            (DataType::String, "anything"),
            (DataType::Url, "https://example.com/doc?id=1"),
            (DataType::Date, "2023-11-15"),
            (DataType::Boolean, "Yes"),
            (DataType::Integer, "42"),
            (DataType::Float, "4.2"),
            (DataType::Monetary, "1234.56"),
            (DataType::DocumentLink, "[1, 2, 3]"),
        ];
        for (data_type, value) in cases {
            assert!(data_type.validate(value).is_ok(), "{} should accept {}", data_type, value);
        }
    }

    #[test]
    fn test_invalid_values() {
        let cases = [
            (DataType::Url, "example.com"),
            (DataType::Date, "15/11/2023"),
            (DataType::Boolean, "maybe"),
            (DataType::Integer, "4.2"),
            (DataType::Float, "four"),
            (DataType::Monetary, "1.234,56"),
            (DataType::DocumentLink, "[1, \"two\"]"),
        ];
        for (data_type, value) in cases {
            assert!(
                matches!(data_type.validate(value), Err(FieldError::Conversion { .. })),
                "{} should reject {}",
                data_type,
                value
            );
        }
    }

    #[test]
    fn test_names_round_trip() {
        for name in ["string", "url", "date", "boolean", "integer", "float", "monetary", "documentlink"] {
            assert_eq!(name.parse::<DataType>().unwrap().as_str(), name);
        }
        assert!("text".parse::<DataType>().is_err());
        assert_eq!(serde_json::to_string(&DataType::DocumentLink).unwrap(), "\"documentlink\"");
    }
}
