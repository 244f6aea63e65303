//! Case-insensitive title patterns.

use crate::error::{Error, Result};
use regex::{Regex, RegexBuilder};
use std::fmt;

/// A required regex plus optional `any_of` / `none_of` guards.
///
/// The guards express conditions such as "mentions *auditor*, also mentions
/// *report* or *responsibilities*, but never *internal*" without look-around.
/// All three are matched case-insensitively anywhere in the text.
#[derive(Debug, Clone)]
pub struct TitlePattern {
    required: Regex,
    any_of: Option<Regex>,
    none_of: Option<Regex>,
}

fn compile(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| Error::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

impl TitlePattern {
    /// Compile the required pattern.
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            required: compile(pattern)?,
            any_of: None,
            none_of: None,
        })
    }

    /// Additionally require a match of `pattern`.
    pub fn with_any_of(mut self, pattern: &str) -> Result<Self> {
        self.any_of = Some(compile(pattern)?);
        Ok(self)
    }

    /// Reject text matching `pattern`.
    pub fn with_none_of(mut self, pattern: &str) -> Result<Self> {
        self.none_of = Some(compile(pattern)?);
        Ok(self)
    }

    /// Test `text` against all three parts.
    pub fn is_match(&self, text: &str) -> bool {
        self.required.is_match(text)
            && self.any_of.as_ref().map_or(true, |re| re.is_match(text))
            && !self.none_of.as_ref().is_some_and(|re| re.is_match(text))
    }

    /// The required pattern as written.
    pub fn as_str(&self) -> &str {
        self.required.as_str()
    }
}

impl fmt::Display for TitlePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.required.as_str())?;
        if let Some(re) = &self.any_of {
            write!(f, " with /{}/", re.as_str())?;
        }
        if let Some(re) = &self.none_of {
            write!(f, " without /{}/", re.as_str())?;
        }
        Ok(())
    }
}
