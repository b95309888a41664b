//! Placeholder kinds and the regex each one expands to.

use crate::error::ExpressionError;

/// A placeholder kind from the fixed matcher table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// One or more Unicode letters.
    Word,
    /// One or more ASCII digits.
    Int,
    /// Digits with thousands separators and an optional fractional part.
    Number,
}

/// Decimal separator convention for `number` placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecimalSymbol {
    /// `1,234.56`
    #[default]
    Dot,
    /// `1.234,56`
    Comma,
}

impl DecimalSymbol {
    /// Parse a placeholder argument (`dot` or `comma`).
    pub fn from_arg(arg: &str) -> Option<Self> {
        match arg.to_lowercase().as_str() {
            "dot" => Some(DecimalSymbol::Dot),
            "comma" => Some(DecimalSymbol::Comma),
            _ => None,
        }
    }
}

impl Matcher {
    /// Look up a kind name, case-insensitively.
    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind.to_lowercase().as_str() {
            "word" => Some(Matcher::Word),
            "int" | "integer" => Some(Matcher::Int),
            "number" | "decimal" => Some(Matcher::Number),
            _ => None,
        }
    }

    /// Build the named capture group for a placeholder of this kind.
    pub fn to_regex(&self, name: &str, kind: &str, args: &[&str]) -> Result<String, ExpressionError> {
        match self {
            Matcher::Word => {
                no_args(kind, args)?;
                Ok(format!(r"(?P<{}>\p{{L}}+)", name))
            }
            Matcher::Int => {
                no_args(kind, args)?;
                Ok(format!(r"(?P<{}>[0-9]+)", name))
            }
            Matcher::Number => {
                let symbol = match args {
                    [] => DecimalSymbol::default(),
                    [arg] => DecimalSymbol::from_arg(arg).ok_or_else(|| {
                        ExpressionError::InvalidArgument {
                            kind: kind.to_string(),
                            reason: format!("decimal symbol must be \"dot\" or \"comma\", got \"{}\"", arg),
                        }
                    })?,
                    _ => {
                        return Err(ExpressionError::InvalidArgument {
                            kind: kind.to_string(),
                            reason: format!("expected at most one argument, got {}", args.len()),
                        })
                    }
                };
                Ok(match symbol {
                    DecimalSymbol::Dot => format!(r"(?P<{}>[0-9 ,]+(?:\.[0-9]*)?)", name),
                    DecimalSymbol::Comma => format!(r"(?P<{}>[0-9 .]+(?:,[0-9]*)?)", name),
                })
            }
        }
    }
}

fn no_args(kind: &str, args: &[&str]) -> Result<(), ExpressionError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(ExpressionError::InvalidArgument {
            kind: kind.to_string(),
            reason: "takes no arguments".to_string(),
        })
    }
}
