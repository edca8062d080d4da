//! Typed errors and warnings.
//!
//! Structural errors abort spine derivation for a whole file; index and
//! query errors fail a single call. Warnings are collected during analysis
//! and never abort anything. Messages print source lines 1-based, while
//! index errors echo the caller's 0-based arguments unchanged.

use std::fmt;

use thiserror::Error;

use crate::spine::track::TrackId;

/// Spined line whose field count disagrees with the active spine count.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {}: {} fields where {} spines are active", .line + 1, .found, .expected)]
pub struct ParseError {
    pub line: usize,
    pub expected: usize,
    pub found: usize,
}

/// Malformed spine-manipulator arrangement on an interpretation line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManipulatorError {
    /// `*v` with no adjacent `*v` partner.
    #[error("line {}, field {}: *v merge needs at least two adjacent spines", .line + 1, .field + 1)]
    IsolatedMerge { line: usize, field: usize },

    /// `*x` run that is not exactly an adjacent pair.
    #[error("line {}, field {}: *x exchange must be an adjacent pair, found a run of {}", .line + 1, .field + 1, .run)]
    UnpairedExchange { line: usize, field: usize, run: usize },

    /// Non-exclusive interpretation token on a line where no spines are
    /// active. Only `**NAME` tokens may open a spine section.
    #[error("line {}: spine directive with no active spines", .line + 1)]
    NoActiveSpines { line: usize },
}

/// Any failure of the spine derivation pass. Raw line access stays valid
/// when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Manipulator(#[from] ManipulatorError),

    /// `**NAME` applied to a track that is already named differently.
    #[error("line {}, field {}: track {} is already **{}, cannot redeclare as **{}", .line + 1, .field + 1, .track, .existing, .requested)]
    ExclusiveInterpretationRedefinition {
        line: usize,
        field: usize,
        track: TrackId,
        existing: String,
        requested: String,
    },
}

/// Out-of-range address component, reported with the indices as given.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("line index {line} out of range (file has {len} lines)")]
    LineOutOfRange { line: usize, len: usize },

    #[error("field index {field} out of range on line {line} ({count} fields)")]
    FieldOutOfRange {
        line: usize,
        field: usize,
        count: usize,
    },

    #[error("subfield index {subfield} out of range at line {line}, field {field} ({count} subtokens)")]
    SubfieldOutOfRange {
        line: usize,
        field: usize,
        subfield: usize,
        count: usize,
    },
}

/// Failure of a derived query: bad address, or no analysis to query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error(transparent)]
    Index(#[from] IndexError),

    /// The file was never analyzed, or an edit invalidated the analysis.
    #[error("no spine analysis available; run analyze() first")]
    Unanalyzed,
}

/// Non-fatal finding recorded during analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisWarning {
    /// Track reached end of file without a `*-` terminator.
    UnterminatedTrack {
        track: TrackId,
        ex_interp: Option<String>,
        created: usize,
    },
}

impl fmt::Display for AnalysisWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisWarning::UnterminatedTrack {
                track,
                ex_interp,
                created,
            } => match ex_interp {
                Some(name) => write!(
                    f,
                    "track {} (**{}, opened at line {}) has no terminator",
                    track,
                    name,
                    created + 1
                ),
                None => write!(
                    f,
                    "track {} (opened at line {}) has no terminator",
                    track,
                    created + 1
                ),
            },
        }
    }
}

/// Failure to obtain bytes for a named input.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("unsupported uri scheme: {uri}")]
    UnsupportedScheme { uri: String },

    #[error("{path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Failure to pull Humdrum text out of a foreign container.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("embedded data extraction failed: {0}")]
pub struct ExtractionError(pub String);

/// Any failure while loading an input end to end.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}
