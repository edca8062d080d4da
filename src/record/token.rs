//! Tokens and manipulator classification.

/// Spine-structure directives recognized on interpretation lines.
///
/// Every directive announces a change that takes effect on the line after
/// the one carrying it, except `Exclusive` on a section-opening line, which
/// creates its spine immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Manipulator<'a> {
    /// `**NAME`: opens a spine on a section-opening line, or names a spine
    /// added by `*+`. Carries the name without the `**` sigil.
    Exclusive(&'a str),
    /// `*-`: removes this spine position.
    Terminate,
    /// `*^`: this position becomes two.
    Split,
    /// `*v`: a run of adjacent positions collapses into one.
    Merge,
    /// `*x`: this position swaps with its pair.
    Exchange,
    /// `*+`: a brand-new spine appears to the right of this position.
    Add,
}

/// A single tab-delimited field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
}

impl Token {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Null data token: exactly `.`.
    pub fn is_null(&self) -> bool {
        self.text == "."
    }

    /// No-op interpretation placeholder: exactly `*`.
    pub fn is_noop(&self) -> bool {
        self.text == "*"
    }

    /// Classify as a spine manipulator, if it is one. A bare `*` and
    /// ordinary interpretations like `*clefG2` return `None`.
    pub fn manipulator(&self) -> Option<Manipulator<'_>> {
        match self.text.as_str() {
            "*-" => Some(Manipulator::Terminate),
            "*^" => Some(Manipulator::Split),
            "*v" => Some(Manipulator::Merge),
            "*x" => Some(Manipulator::Exchange),
            "*+" => Some(Manipulator::Add),
            other => other.strip_prefix("**").map(Manipulator::Exclusive),
        }
    }

    pub fn is_manipulator(&self) -> bool {
        self.manipulator().is_some()
    }

    /// Space-separated subtokens (chord members and the like). A token
    /// without spaces yields itself once.
    pub fn subtokens(&self) -> impl Iterator<Item = &str> {
        self.text.split(' ')
    }
}
