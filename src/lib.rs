//! Humdrum file parsing with spine-topology tracking.
//!
//! A Humdrum file is tab-delimited text whose columns (spines) split,
//! merge, exchange, appear, and disappear mid-file under `*^`, `*v`,
//! `*x`, `*+`, `*-`, and `**NAME` directives. This crate parses such
//! files totally, derives which persistent track every position on every
//! line belongs to, resolves null `.` tokens to the values they stand
//! for, and renders analyzed files as aligned HTML tables.
//!
//! The flow is [`HumdrumFile::parse`] (never fails), then
//! [`HumdrumFile::analyze`] (typed structural errors), then derived
//! queries such as [`HumdrumFile::active_tracks`] and
//! [`HumdrumFile::resolved_value_at`]. Raw line access works whether or
//! not analysis succeeded. I/O stays behind the [`fetch`] traits.

pub mod addr;
pub mod error;
pub mod fetch;
pub mod file;
pub mod record;
pub mod render;
pub mod resolve;
pub mod spine;

pub use addr::Address;
pub use error::{
    AnalysisWarning, ExtractionError, FetchError, IndexError, LoadError, ManipulatorError,
    ParseError, QueryError, StructuralError,
};
pub use file::HumdrumFile;
pub use record::{LineKind, Manipulator, Record, Token};
pub use resolve::{DotTable, EMPTY_VALUE, Origin, Resolved};
pub use spine::{SpineAnalysis, SpineState, Track, TrackId, TrackRegistry};
