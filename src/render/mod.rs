//! Read-only renderers over an analyzed file.

pub mod html;

pub use html::{TableOptions, css, render_table};
