//! Simple expression compiler.
//!
//! A simple expression is literal text with wildcards and typed placeholders:
//!
//! - `*` matches any text (non-greedy), `?` matches one character
//! - `<name:kind[:arg]>` captures a value of the given kind as `name`
//! - a backslash before `<`, `>`, `*` or `?` makes it literal
//! - whitespace in literal text matches any amount of whitespace
//!
//! `Total: <amount:number:comma>` becomes
//! `Total:\s+(?P<amount>[0-9 .]+(?:,[0-9]*)?)`.

use super::matchers::Matcher;
use super::patterns::{PLACEHOLDER_NAME, WHITESPACE_RUN};
use crate::error::ExpressionError;

const DELIMITERS: [char; 4] = ['<', '>', '*', '?'];

/// Compile a simple expression into regex source with one named group per
/// placeholder.
pub fn compile_simple(expr: &str) -> Result<String, ExpressionError> {
    let mut regex = String::new();
    let mut literal = String::new();
    let mut placeholder: Option<String> = None;
    let mut names: Vec<String> = Vec::new();

    let mut chars = expr.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next_if(|n| DELIMITERS.contains(n)) {
                match placeholder.as_mut() {
                    Some(body) => body.push(escaped),
                    None => literal.push(escaped),
                }
                continue;
            }
        }

        if let Some(body) = placeholder.as_mut() {
            if c == '>' {
                let body = std::mem::take(body);
                placeholder = None;
                regex.push_str(&placeholder_to_regex(&body, &mut names)?);
            } else {
                body.push(c);
            }
            continue;
        }

        match c {
            '<' => {
                flush_literal(&mut regex, &mut literal);
                placeholder = Some(String::new());
            }
            '*' => {
                flush_literal(&mut regex, &mut literal);
                regex.push_str(".*?");
            }
            '?' => {
                flush_literal(&mut regex, &mut literal);
                regex.push('.');
            }
            // A stray closing bracket has nothing to close
            '>' => {}
            _ => literal.push(c),
        }
    }

    if placeholder.is_some() {
        return Err(ExpressionError::UnterminatedPlaceholder);
    }
    flush_literal(&mut regex, &mut literal);

    Ok(regex)
}

/// Escape literal text, letting each whitespace run match any whitespace.
fn flush_literal(regex: &mut String, literal: &mut String) {
    if literal.is_empty() {
        return;
    }
    let escaped: Vec<String> = WHITESPACE_RUN.split(literal.as_str()).map(regex::escape).collect();
    regex.push_str(&escaped.join(r"\s+"));
    literal.clear();
}

fn placeholder_to_regex(body: &str, names: &mut Vec<String>) -> Result<String, ExpressionError> {
    let parts: Vec<&str> = body.trim().split(':').collect();
    if parts.len() < 2 {
        return Err(ExpressionError::MissingPlaceholderKind {
            placeholder: body.trim().to_string(),
        });
    }

    let name = parts[0];
    let kind = parts[1];
    let args = &parts[2..];

    let invalid_name = |reason: &str| ExpressionError::InvalidPlaceholderName {
        name: name.to_string(),
        reason: reason.to_string(),
    };
    if name.is_empty() {
        return Err(invalid_name("name can not be empty"));
    }
    if !PLACEHOLDER_NAME.is_match(name) {
        return Err(invalid_name("name can not contain special characters"));
    }
    if names.iter().any(|n| n == name) {
        return Err(invalid_name("name is used more than once"));
    }

    let matcher = Matcher::from_kind(kind)
        .ok_or_else(|| ExpressionError::UnknownPlaceholderKind(kind.to_lowercase()))?;
    let group = matcher.to_regex(name, &kind.to_lowercase(), args)?;

    names.push(name.to_string());
    Ok(group)
}
