//! Spine topology: the forward pass that decides, line by line, which
//! track every tab-separated position belongs to.
//!
//! The pass walks records in order and keeps a vector of live positions.
//! Directives on an interpretation line describe a change that takes
//! effect on the *following* line, so the snapshot stored for a line with
//! active spines is taken before its directives are applied. The one
//! exception is a section-opening line (no spines active, every token
//! `**NAME`): its spines exist on the line itself, so the snapshot there
//! is taken after creation.
//!
//! Besides the per-line snapshots the pass records a [`LineEffect`] edit
//! script per line. The dot resolver replays those scripts instead of
//! re-reading manipulator tokens, so both passes always agree on what a
//! line did to the topology.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{AnalysisWarning, ManipulatorError, ParseError, StructuralError};
use crate::record::{LineKind, Manipulator, Record};
use crate::spine::track::{TrackId, TrackRegistry};

/// Identity of one spine position on one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpineState {
    pub track: TrackId,
    /// Ordinal among this track's live positions on the line: 0 when the
    /// track occupies a single position, else 1-based left to right.
    pub subtrack: u32,
    /// Dotted split lineage rooted at the track id, e.g. `3`, `3.1`,
    /// `3.1.2`. Splits append `.1` / `.2`; merges fall back to the common
    /// prefix of the merged branches.
    pub lineage: String,
}

/// One group of an interpretation line's edit script. Groups are applied
/// left to right; each consumes the stated number of pre-line positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SpineEdit {
    /// Position passes through unchanged (includes `**NAME` renames).
    Keep,
    /// `*^`: one position in, two out.
    Split,
    /// `*v` run: n positions in, one out.
    Merge(usize),
    /// `*x` pair: two positions in, same two out, swapped.
    Exchange,
    /// `*+`: one position in, itself plus a fresh spine out.
    Insert,
    /// `*-`: one position in, none out.
    Terminate,
}

/// What a line did to the position vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LineEffect {
    /// No topology change.
    None,
    /// Section opening: n spines came into existence with no predecessors.
    Open(usize),
    /// Interpretation line with active spines; the edit script to replay.
    Edits(Vec<SpineEdit>),
}

/// Everything the forward pass derives: per-line snapshots, per-line edit
/// scripts, the track registry, and non-fatal warnings.
#[derive(Debug, Clone)]
pub struct SpineAnalysis {
    states: Vec<Vec<SpineState>>,
    effects: Vec<LineEffect>,
    tracks: TrackRegistry,
    warnings: Vec<AnalysisWarning>,
}

impl SpineAnalysis {
    /// Run the pass over a full file. Fails on the first structural
    /// problem; the error names the offending line.
    pub fn analyze(records: &[Record]) -> Result<SpineAnalysis, StructuralError> {
        let mut registry = TrackRegistry::new();
        let mut current: Vec<Position> = Vec::new();
        let mut states = Vec::with_capacity(records.len());
        let mut effects = Vec::with_capacity(records.len());

        for rec in records {
            match rec.kind {
                LineKind::GlobalComment | LineKind::Bibliographic => {
                    states.push(snapshot(&current));
                    effects.push(LineEffect::None);
                }
                LineKind::Interpretation if current.is_empty() => {
                    open_section(rec, &mut current, &mut registry)?;
                    states.push(snapshot(&current));
                    effects.push(LineEffect::Open(current.len()));
                }
                LineKind::Interpretation => {
                    check_width(rec, current.len())?;
                    states.push(snapshot(&current));
                    let effect = apply_directives(rec, &mut current, &mut registry)?;
                    effects.push(effect);
                }
                LineKind::LocalComment | LineKind::Barline | LineKind::Data => {
                    check_width(rec, current.len())?;
                    states.push(snapshot(&current));
                    effects.push(LineEffect::None);
                }
            }
        }

        let warnings = registry.unterminated_warnings();
        Ok(SpineAnalysis {
            states,
            effects,
            tracks: registry,
            warnings,
        })
    }

    /// Spine states as of the given line, one entry per field of a spined
    /// line. `None` when the line is out of range.
    pub fn states(&self, line: usize) -> Option<&[SpineState]> {
        self.states.get(line).map(Vec::as_slice)
    }

    /// Track ids live at the given line, in position order. A track split
    /// into several positions appears once per position.
    pub fn active_tracks(&self, line: usize) -> Option<Vec<TrackId>> {
        self.states(line)
            .map(|states| states.iter().map(|s| s.track).collect())
    }

    pub fn registry(&self) -> &TrackRegistry {
        &self.tracks
    }

    /// Highest track number the file ever reaches.
    pub fn max_tracks(&self) -> u32 {
        self.tracks.len() as u32
    }

    pub fn warnings(&self) -> &[AnalysisWarning] {
        &self.warnings
    }

    pub(crate) fn effect(&self, line: usize) -> Option<&LineEffect> {
        self.effects.get(line)
    }
}

/// Evolving identity of one position while the pass runs. The subtrack
/// ordinal is not part of the evolving state; it depends on sibling counts
/// and is computed per snapshot.
#[derive(Debug, Clone)]
struct Position {
    track: TrackId,
    lineage: String,
}

fn check_width(rec: &Record, active: usize) -> Result<(), ParseError> {
    if rec.field_count() != active {
        return Err(ParseError {
            line: rec.line,
            expected: active,
            found: rec.field_count(),
        });
    }
    Ok(())
}

/// All-`**` line with no active spines: create one track per field.
fn open_section(
    rec: &Record,
    current: &mut Vec<Position>,
    registry: &mut TrackRegistry,
) -> Result<(), StructuralError> {
    for tok in &rec.fields {
        match tok.manipulator() {
            Some(Manipulator::Exclusive(name)) => {
                let id = registry.create(Some(name.to_string()), rec.line);
                current.push(Position {
                    track: id,
                    lineage: id.to_string(),
                });
            }
            _ => {
                return Err(ManipulatorError::NoActiveSpines { line: rec.line }.into());
            }
        }
    }
    Ok(())
}

/// Interpretation line over active spines: validate the manipulator
/// arrangement, build the edit script, then apply it.
fn apply_directives(
    rec: &Record,
    current: &mut Vec<Position>,
    registry: &mut TrackRegistry,
) -> Result<LineEffect, StructuralError> {
    let dirs: Vec<Option<Manipulator>> = rec.fields.iter().map(|t| t.manipulator()).collect();

    // 1) Build the script, scanning merge and exchange runs as units.
    let mut script: Vec<SpineEdit> = Vec::new();
    let mut j = 0;
    while j < dirs.len() {
        match dirs[j] {
            Some(Manipulator::Merge) => {
                let mut k = j;
                while k < dirs.len() && dirs[k] == Some(Manipulator::Merge) {
                    k += 1;
                }
                let run = k - j;
                if run < 2 {
                    return Err(ManipulatorError::IsolatedMerge {
                        line: rec.line,
                        field: j,
                    }
                    .into());
                }
                script.push(SpineEdit::Merge(run));
                j = k;
            }
            Some(Manipulator::Exchange) => {
                let mut k = j;
                while k < dirs.len() && dirs[k] == Some(Manipulator::Exchange) {
                    k += 1;
                }
                let run = k - j;
                if run != 2 {
                    return Err(ManipulatorError::UnpairedExchange {
                        line: rec.line,
                        field: j,
                        run,
                    }
                    .into());
                }
                script.push(SpineEdit::Exchange);
                j = k;
            }
            Some(Manipulator::Split) => {
                script.push(SpineEdit::Split);
                j += 1;
            }
            Some(Manipulator::Add) => {
                script.push(SpineEdit::Insert);
                j += 1;
            }
            Some(Manipulator::Terminate) => {
                script.push(SpineEdit::Terminate);
                j += 1;
            }
            Some(Manipulator::Exclusive(name)) => {
                // Mid-section `**NAME` names the track at this position;
                // the position itself passes through.
                let id = current[j].track;
                if let Err(existing) = registry.set_ex_interp(id, name) {
                    return Err(StructuralError::ExclusiveInterpretationRedefinition {
                        line: rec.line,
                        field: j,
                        track: id,
                        existing,
                        requested: name.to_string(),
                    });
                }
                script.push(SpineEdit::Keep);
                j += 1;
            }
            None => {
                script.push(SpineEdit::Keep);
                j += 1;
            }
        }
    }

    // 2) Apply it. Each group consumes positions left to right.
    let mut next: Vec<Position> = Vec::with_capacity(current.len());
    let mut terminated: Vec<TrackId> = Vec::new();
    let mut i = 0;
    for edit in &script {
        match edit {
            SpineEdit::Keep => {
                next.push(current[i].clone());
                i += 1;
            }
            SpineEdit::Split => {
                let parent = &current[i];
                next.push(Position {
                    track: parent.track,
                    lineage: format!("{}.1", parent.lineage),
                });
                next.push(Position {
                    track: parent.track,
                    lineage: format!("{}.2", parent.lineage),
                });
                i += 1;
            }
            SpineEdit::Merge(n) => {
                let group = &current[i..i + n];
                next.push(Position {
                    track: group[0].track,
                    lineage: merged_lineage(group),
                });
                i += n;
            }
            SpineEdit::Exchange => {
                next.push(current[i + 1].clone());
                next.push(current[i].clone());
                i += 2;
            }
            SpineEdit::Insert => {
                next.push(current[i].clone());
                let id = registry.create(None, rec.line);
                next.push(Position {
                    track: id,
                    lineage: id.to_string(),
                });
                i += 1;
            }
            SpineEdit::Terminate => {
                terminated.push(current[i].track);
                i += 1;
            }
        }
    }
    debug_assert_eq!(i, current.len());

    // A track closes only when a `*-` removed its last live position.
    let alive: BTreeSet<TrackId> = next.iter().map(|p| p.track).collect();
    for id in terminated {
        if !alive.contains(&id) {
            registry.terminate(id, rec.line);
        }
    }

    *current = next;
    Ok(LineEffect::Edits(script))
}

/// Merged lineage: segment-wise longest common prefix of the group, or the
/// leftmost track's bare id when the branches share nothing.
fn merged_lineage(group: &[Position]) -> String {
    let first: Vec<&str> = group[0].lineage.split('.').collect();
    let mut len = first.len();
    for pos in &group[1..] {
        let common = pos
            .lineage
            .split('.')
            .zip(&first)
            .take_while(|(a, b)| a == *b)
            .count();
        len = len.min(common);
    }
    if len == 0 {
        group[0].track.to_string()
    } else {
        first[..len].join(".")
    }
}

/// Snapshot the live positions, assigning subtrack ordinals: 0 for a
/// track's only position, else 1-based left to right.
fn snapshot(current: &[Position]) -> Vec<SpineState> {
    let mut totals: BTreeMap<TrackId, u32> = BTreeMap::new();
    for pos in current {
        *totals.entry(pos.track).or_insert(0) += 1;
    }
    let mut seen: BTreeMap<TrackId, u32> = BTreeMap::new();
    current
        .iter()
        .map(|pos| {
            let subtrack = if totals[&pos.track] == 1 {
                0
            } else {
                let n = seen.entry(pos.track).or_insert(0);
                *n += 1;
                *n
            };
            SpineState {
                track: pos.track,
                subtrack,
                lineage: pos.lineage.clone(),
            }
        })
        .collect()
}
