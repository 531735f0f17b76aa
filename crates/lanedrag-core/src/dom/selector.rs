//! A small subset of CSS selectors for picking draggables and lanes.
//!
//! Supported: comma-separated compound selectors made of a tag name or `*`,
//! `#id`, `.class`, `[attr]` and `[attr=value]`. Combinators are rejected.

use super::element::Element;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Selector parse errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected character {found:?} at offset {offset}")]
    Unexpected { found: char, offset: usize },
    #[error("combinators are not supported: {0:?}")]
    Unsupported(String),
    #[error("unterminated attribute selector in {0:?}")]
    Unterminated(String),
}

/// A single condition of a compound selector.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Condition {
    Tag(String),
    Id(String),
    Class(String),
    HasAttribute(String),
    AttributeEquals(String, String),
}

impl Condition {
    fn matches(&self, element: &Element) -> bool {
        match self {
            Condition::Tag(tag) => element.tag().eq_ignore_ascii_case(tag),
            Condition::Id(id) => element.attribute("id") == Some(id.as_str()),
            Condition::Class(class) => element.has_class(class),
            Condition::HasAttribute(name) => element.has_attribute(name),
            Condition::AttributeEquals(name, value) => element.attribute(name) == Some(value.as_str()),
        }
    }
}

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Selector {
    source: String,
    alternatives: Vec<Vec<Condition>>,
}

impl Selector {
    /// Parse a selector list such as `.card, li[data-id]`.
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Err(SelectorError::Empty);
        }

        let mut alternatives = Vec::new();
        let mut offset = source.len() - source.trim_start().len();
        for part in trimmed.split(',') {
            let compound = part.trim();
            if compound.is_empty() {
                return Err(SelectorError::Empty);
            }
            if compound.contains(char::is_whitespace) && !compound.contains('[') {
                return Err(SelectorError::Unsupported(compound.to_string()));
            }
            let lead = part.len() - part.trim_start().len();
            alternatives.push(parse_compound(compound, offset + lead)?);
            offset += part.len() + 1;
        }

        Ok(Self {
            source: trimmed.to_string(),
            alternatives,
        })
    }

    /// The selector text as given.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Check whether an element matches any alternative.
    pub fn matches(&self, element: &Element) -> bool {
        self.alternatives
            .iter()
            .any(|conditions| conditions.iter().all(|c| c.matches(element)))
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(chars: &[(usize, char)], mut i: usize) -> (String, usize) {
    let mut ident = String::new();
    while i < chars.len() && is_ident_char(chars[i].1) {
        ident.push(chars[i].1);
        i += 1;
    }
    (ident, i)
}

fn parse_compound(compound: &str, base: usize) -> Result<Vec<Condition>, SelectorError> {
    let chars: Vec<(usize, char)> = compound.char_indices().collect();
    let unexpected = |i: usize| {
        let (at, found) = chars[i];
        SelectorError::Unexpected {
            found,
            offset: base + at,
        }
    };

    let mut conditions = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        match chars[i].1 {
            '*' if i == 0 => i += 1,
            '#' | '.' => {
                let marker = chars[i].1;
                let (ident, next) = take_ident(&chars, i + 1);
                if ident.is_empty() {
                    return Err(match chars.get(i + 1) {
                        Some(_) => unexpected(i + 1),
                        None => unexpected(i),
                    });
                }
                conditions.push(if marker == '#' {
                    Condition::Id(ident)
                } else {
                    Condition::Class(ident)
                });
                i = next;
            }
            '[' => {
                let close = chars[i..]
                    .iter()
                    .position(|&(_, c)| c == ']')
                    .map(|p| p + i)
                    .ok_or_else(|| SelectorError::Unterminated(compound.to_string()))?;
                let inner: String = chars[i + 1..close].iter().map(|&(_, c)| c).collect();
                conditions.push(parse_attribute(&inner, compound)?);
                i = close + 1;
            }
            c if is_ident_char(c) && i == 0 => {
                let (ident, next) = take_ident(&chars, i);
                conditions.push(Condition::Tag(ident));
                i = next;
            }
            c if c.is_whitespace() || c == '>' || c == '+' || c == '~' => {
                return Err(SelectorError::Unsupported(compound.to_string()));
            }
            _ => return Err(unexpected(i)),
        }
    }
    Ok(conditions)
}

fn parse_attribute(inner: &str, compound: &str) -> Result<Condition, SelectorError> {
    let (name, value) = match inner.split_once('=') {
        Some((name, value)) => (name.trim(), Some(value.trim())),
        None => (inner.trim(), None),
    };
    if name.is_empty() || !name.chars().all(is_ident_char) {
        return Err(SelectorError::Unsupported(compound.to_string()));
    }
    Ok(match value {
        None => Condition::HasAttribute(name.to_string()),
        Some(value) => {
            let unquoted = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            Condition::AttributeEquals(name.to_string(), unquoted.to_string())
        }
    })
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Selector {
    type Error = SelectorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Selector> for String {
    fn from(selector: Selector) -> Self {
        selector.source
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
