//! Spine topology: persistent track identity plus the per-line state pass.

pub mod topology;
pub mod track;

pub use topology::{SpineAnalysis, SpineState};
pub use track::{Track, TrackId, TrackRegistry};
