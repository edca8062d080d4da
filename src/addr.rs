//! Token addresses: (line, field, subfield) triples.
//!
//! Lines and fields are 0-based everywhere in the crate; track numbers are
//! the only 1-based quantity. `Display` prints addresses 1-based because
//! messages and tooltips follow source-line conventions.

use std::fmt;

/// Location of one token (or subtoken) in a file.
///
/// `subfield` selects a space-separated subtoken within the field; 0 is the
/// first subtoken, which for an ordinary token is the whole token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address {
    pub line: usize,
    pub field: usize,
    pub subfield: usize,
}

impl Address {
    pub fn new(line: usize, field: usize) -> Self {
        Self {
            line,
            field,
            subfield: 0,
        }
    }

    pub fn with_subfield(line: usize, field: usize, subfield: usize) -> Self {
        Self {
            line,
            field,
            subfield,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, field {}", self.line + 1, self.field + 1)?;
        if self.subfield > 0 {
            write!(f, ", subfield {}", self.subfield + 1)?;
        }
        Ok(())
    }
}
