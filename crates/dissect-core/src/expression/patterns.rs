//! Static regex patterns used while compiling simple expressions.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Placeholder names are ASCII identifiers
    pub static ref PLACEHOLDER_NAME: Regex = Regex::new(
        r"^[A-Za-z][A-Za-z0-9_]*$"
    ).unwrap();

    // Any run of whitespace in literal text
    pub static ref WHITESPACE_RUN: Regex = Regex::new(
        r"\s+"
    ).unwrap();
}
