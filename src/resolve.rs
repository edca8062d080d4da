//! Null-token resolution: the pass after spine analysis.
//!
//! A `.` on a data line stands for the most recent non-null data token on
//! the same spine lineage. This pass walks the file once, keeping one
//! last-seen address per live position, and replays the edit scripts the
//! topology pass recorded, so splits duplicate history, merges keep the
//! leftmost branch's, exchanges swap it, and fresh spines start blank.
//!
//! Resolution is total. A dot with no history resolves to [`EMPTY_VALUE`],
//! never to an error.

use crate::addr::Address;
use crate::record::{LineKind, Record};
use crate::spine::topology::{LineEffect, SpineAnalysis, SpineEdit};

/// What a dot with no inherited value resolves to.
pub const EMPTY_VALUE: &str = "";

/// How one data token resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    /// Not a null token; the token is its own value.
    Literal,
    /// Null token inheriting the token at this address.
    Inherited(Address),
    /// Null token with no earlier value on its lineage.
    Empty,
}

/// Provenance of the value a token shows, as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The token supplies its own value.
    Own(Address),
    /// Null token inheriting from this address.
    Inherited(Address),
    /// Null token resolving to [`EMPTY_VALUE`].
    Empty,
}

/// Per-line resolution table. Only data lines have rows.
#[derive(Debug, Clone, Default)]
pub struct DotTable {
    lines: Vec<Option<Vec<Resolved>>>,
}

impl DotTable {
    /// Run the resolution pass over the records the analysis was built
    /// from.
    pub fn build(records: &[Record], spines: &SpineAnalysis) -> DotTable {
        let mut last: Vec<Option<Address>> = Vec::new();
        let mut lines: Vec<Option<Vec<Resolved>>> = Vec::with_capacity(records.len());

        for rec in records {
            match spines.effect(rec.line) {
                Some(LineEffect::Open(n)) => {
                    last = vec![None; *n];
                    lines.push(None);
                }
                Some(LineEffect::Edits(script)) => {
                    last = replay(script, &last);
                    lines.push(None);
                }
                _ => {
                    if rec.kind == LineKind::Data {
                        lines.push(Some(resolve_line(rec, &mut last)));
                    } else {
                        lines.push(None);
                    }
                }
            }
        }
        DotTable { lines }
    }

    /// Resolution of the token at (line, field). `None` for out-of-range
    /// addresses and for non-data lines.
    pub fn resolution(&self, line: usize, field: usize) -> Option<Resolved> {
        self.lines.get(line)?.as_ref()?.get(field).copied()
    }
}

fn resolve_line(rec: &Record, last: &mut [Option<Address>]) -> Vec<Resolved> {
    let mut row = Vec::with_capacity(rec.fields.len());
    for (j, tok) in rec.fields.iter().enumerate() {
        if tok.is_null() {
            row.push(match last.get(j).copied().flatten() {
                Some(addr) => Resolved::Inherited(addr),
                None => Resolved::Empty,
            });
        } else {
            row.push(Resolved::Literal);
            if let Some(slot) = last.get_mut(j) {
                *slot = Some(Address::new(rec.line, j));
            }
        }
    }
    row
}

/// Apply one interpretation line's edit script to the last-seen vector.
/// Script arity was validated by the topology pass.
fn replay(script: &[SpineEdit], last: &[Option<Address>]) -> Vec<Option<Address>> {
    let mut next = Vec::with_capacity(last.len());
    let mut i = 0;
    for edit in script {
        match edit {
            SpineEdit::Keep => {
                next.push(last[i]);
                i += 1;
            }
            SpineEdit::Split => {
                next.push(last[i]);
                next.push(last[i]);
                i += 1;
            }
            SpineEdit::Merge(n) => {
                next.push(last[i]);
                i += n;
            }
            SpineEdit::Exchange => {
                next.push(last[i + 1]);
                next.push(last[i]);
                i += 2;
            }
            SpineEdit::Insert => {
                next.push(last[i]);
                next.push(None);
                i += 1;
            }
            SpineEdit::Terminate => {
                i += 1;
            }
        }
    }
    debug_assert_eq!(i, last.len());
    next
}
