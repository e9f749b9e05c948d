//! Tokenizing and value classification for command lines.

use crate::error::{ProtocolError, Result};

/// A command line split into its qualifier and argument tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine<'a> {
    pub qualifier: &'a str,
    pub arguments: Vec<&'a str>,
}

/// Split a line on runs of spaces. Returns `None` for a blank line.
///
/// Only `' '` separates tokens; tabs and other whitespace stay inside them.
pub fn tokenize(line: &str) -> Option<ParsedLine<'_>> {
    let mut tokens = line.split(' ').filter(|token| !token.is_empty());
    let qualifier = tokens.next()?;
    Some(ParsedLine {
        qualifier,
        arguments: tokens.collect(),
    })
}

/// A numeric wire value and its class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedValue {
    /// Canonical value handed to validators and callbacks.
    pub value: f64,
    /// The exact value when the text is a whole number in the `i64` or `u64`
    /// range. Integer kinds are stored from this, so magnitudes above 2^53
    /// are not rounded.
    pub whole: Option<i128>,
}

impl ParsedValue {
    /// The text was a strict integer form.
    pub fn is_integer(&self) -> bool {
        self.whole.is_some()
    }
}

/// Classify `text` as an integer or real value.
///
/// Integers are parsed first and strictly: an optional sign followed by
/// digits only, so `1.0` is a real. Whole numbers beyond `u64` fall through
/// to the real parse. Reals must consume the whole text and be finite.
pub fn parse_value(text: &str) -> Option<ParsedValue> {
    let whole = text
        .parse::<i64>()
        .map(i128::from)
        .or_else(|_| text.parse::<u64>().map(i128::from));
    if let Ok(whole) = whole {
        return Some(ParsedValue {
            value: whole as f64,
            whole: Some(whole),
        });
    }

    text.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(|value| ParsedValue { value, whole: None })
}

/// One `name=value` argument token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArgumentToken<'a> {
    pub token: &'a str,
    pub name: &'a str,
    pub value: ParsedValue,
}

/// Split a token at its first `=` and classify the value.
pub fn parse_argument(token: &str) -> Result<ArgumentToken<'_>> {
    let (name, text) = token
        .split_once('=')
        .ok_or_else(|| ProtocolError::InvalidArgument(token.to_string()))?;

    if text.is_empty() {
        return Err(ProtocolError::InvalidArgument(format!(
            "{token} incomplete pair"
        )));
    }

    let value = parse_value(text).ok_or_else(|| {
        ProtocolError::InvalidArgument(format!("{token} value is not numeric"))
    })?;

    Ok(ArgumentToken { token, name, value })
}
