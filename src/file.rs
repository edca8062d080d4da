//! In-memory Humdrum file: raw records plus derived spine and dot state.
//!
//! `parse` is total and keeps every input line. `analyze` derives the
//! spine topology and the null-token table; when it fails, raw access
//! keeps working and only derived queries are off the table. Any edit
//! drops the derived state, so derived queries return
//! [`QueryError::Unanalyzed`] until `analyze` runs again.

use std::fmt;

use crate::addr::Address;
use crate::error::{AnalysisWarning, IndexError, QueryError, StructuralError};
use crate::record::{LineKind, Record, Token};
use crate::resolve::{DotTable, EMPTY_VALUE, Origin, Resolved};
use crate::spine::topology::{SpineAnalysis, SpineState};
use crate::spine::track::{TrackId, TrackRegistry};

#[derive(Debug, Clone)]
struct Derived {
    spines: SpineAnalysis,
    dots: DotTable,
}

/// A Humdrum file held fully in memory.
#[derive(Debug, Clone, Default)]
pub struct HumdrumFile {
    records: Vec<Record>,
    derived: Option<Derived>,
}

impl HumdrumFile {
    /// Parse text into records. Never fails; structural problems are
    /// reported by [`HumdrumFile::analyze`]. Splits on `\n` and strips a
    /// carriage return before it, so newline-terminated LF input
    /// round-trips byte for byte through [`fmt::Display`].
    pub fn parse(text: &str) -> HumdrumFile {
        let records = text
            .lines()
            .enumerate()
            .map(|(i, l)| Record::from_line(i, l))
            .collect();
        HumdrumFile {
            records,
            derived: None,
        }
    }

    /// Parse and analyze in one step.
    pub fn parse_analyzed(text: &str) -> Result<HumdrumFile, StructuralError> {
        let mut file = Self::parse(text);
        file.analyze()?;
        Ok(file)
    }

    // ---- raw access ----------------------------------------------------

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn record(&self, line: usize) -> Result<&Record, IndexError> {
        self.records.get(line).ok_or(IndexError::LineOutOfRange {
            line,
            len: self.records.len(),
        })
    }

    pub fn kind(&self, line: usize) -> Result<LineKind, IndexError> {
        Ok(self.record(line)?.kind)
    }

    pub fn raw(&self, line: usize) -> Result<&str, IndexError> {
        Ok(&self.record(line)?.raw)
    }

    pub fn field_count(&self, line: usize) -> Result<usize, IndexError> {
        Ok(self.record(line)?.field_count())
    }

    /// Whole text of one field.
    pub fn field_text(&self, line: usize, field: usize) -> Result<&str, IndexError> {
        Ok(&self.field(line, field)?.text)
    }

    /// Bounds-checked lookup of one token. The address's subfield selects
    /// a space-separated subtoken; 0 is the first.
    pub fn token_at(&self, addr: &Address) -> Result<&str, IndexError> {
        let text = self.field_text(addr.line, addr.field)?;
        match text.split(' ').nth(addr.subfield) {
            Some(sub) => Ok(sub),
            None => Err(IndexError::SubfieldOutOfRange {
                line: addr.line,
                field: addr.field,
                subfield: addr.subfield,
                count: text.split(' ').count(),
            }),
        }
    }

    /// Value of the first `!!!key: value` record with the given key, with
    /// surrounding whitespace trimmed.
    pub fn bib_value(&self, key: &str) -> Option<&str> {
        self.records
            .iter()
            .filter(|r| r.kind == LineKind::Bibliographic)
            .find_map(|r| {
                let (k, v) = r.raw.strip_prefix("!!!")?.split_once(':')?;
                (k.trim() == key).then(|| v.trim())
            })
    }

    // ---- derivation ----------------------------------------------------

    /// Derive spine topology and the null-token table. Idempotent while
    /// the file is unchanged. On error the file stays readable raw.
    pub fn analyze(&mut self) -> Result<(), StructuralError> {
        if self.derived.is_some() {
            return Ok(());
        }
        let spines = SpineAnalysis::analyze(&self.records)?;
        let dots = DotTable::build(&self.records, &spines);
        self.derived = Some(Derived { spines, dots });
        Ok(())
    }

    pub fn is_analyzed(&self) -> bool {
        self.derived.is_some()
    }

    // ---- derived queries -----------------------------------------------

    /// Highest track number the file reaches.
    pub fn max_tracks(&self) -> Result<u32, QueryError> {
        Ok(self.derived()?.spines.max_tracks())
    }

    pub fn registry(&self) -> Result<&TrackRegistry, QueryError> {
        Ok(self.derived()?.spines.registry())
    }

    /// Exclusive interpretation of a track. `Ok(None)` when the track is
    /// unknown or not yet named.
    pub fn ex_interp(&self, id: TrackId) -> Result<Option<&str>, QueryError> {
        Ok(self.derived()?.spines.registry().ex_interp(id))
    }

    /// Track ids live at a line, one per spine position, left to right.
    pub fn active_tracks(&self, line: usize) -> Result<Vec<TrackId>, QueryError> {
        let derived = self.derived()?;
        derived
            .spines
            .active_tracks(line)
            .ok_or_else(|| self.line_range_error(line))
    }

    /// Spine states at a line, one per spine position.
    pub fn spine_states(&self, line: usize) -> Result<&[SpineState], QueryError> {
        let derived = self.derived()?;
        derived
            .spines
            .states(line)
            .ok_or_else(|| self.line_range_error(line))
    }

    /// State of one spine position.
    pub fn spine_state(&self, line: usize, field: usize) -> Result<&SpineState, QueryError> {
        let states = self.spine_states(line)?;
        states.get(field).ok_or(QueryError::Index(
            IndexError::FieldOutOfRange {
                line,
                field,
                count: states.len(),
            },
        ))
    }

    /// Warnings collected by the last analysis.
    pub fn warnings(&self) -> Result<&[AnalysisWarning], QueryError> {
        Ok(self.derived()?.spines.warnings())
    }

    /// Value a token stands for: the token itself when it is not null,
    /// the inherited token for a null data token, [`EMPTY_VALUE`] for a
    /// null with no history.
    pub fn resolved_value_at(&self, line: usize, field: usize) -> Result<&str, QueryError> {
        let derived = self.derived()?;
        let own = self.field_text(line, field).map_err(QueryError::Index)?;
        Ok(match derived.dots.resolution(line, field) {
            Some(Resolved::Inherited(a)) => &self.records[a.line].fields[a.field].text,
            Some(Resolved::Empty) => EMPTY_VALUE,
            _ => own,
        })
    }

    /// Where the value at (line, field) comes from.
    pub fn origin_of(&self, line: usize, field: usize) -> Result<Origin, QueryError> {
        let derived = self.derived()?;
        self.field(line, field).map_err(QueryError::Index)?;
        Ok(match derived.dots.resolution(line, field) {
            Some(Resolved::Inherited(a)) => Origin::Inherited(a),
            Some(Resolved::Empty) => Origin::Empty,
            _ => Origin::Own(Address::new(line, field)),
        })
    }

    // ---- edits ---------------------------------------------------------

    /// Replace one field's text. The line is re-tokenized (the new text
    /// may change the line's kind or field count) and the derived state is
    /// dropped.
    pub fn change_field(
        &mut self,
        line: usize,
        field: usize,
        new_text: &str,
    ) -> Result<(), IndexError> {
        self.field(line, field)?;
        let rec = &mut self.records[line];
        rec.fields[field].text = new_text.to_string();
        rec.retokenize();
        self.derived = None;
        Ok(())
    }

    /// Append one source line, classified as in [`HumdrumFile::parse`].
    /// Drops the derived state.
    pub fn append_line(&mut self, text: &str) {
        let line = self.records.len();
        self.records.push(Record::from_line(line, text));
        self.derived = None;
    }

    // ---- internals -----------------------------------------------------

    fn derived(&self) -> Result<&Derived, QueryError> {
        self.derived.as_ref().ok_or(QueryError::Unanalyzed)
    }

    fn field(&self, line: usize, field: usize) -> Result<&Token, IndexError> {
        let rec = self.record(line)?;
        rec.fields.get(field).ok_or(IndexError::FieldOutOfRange {
            line,
            field,
            count: rec.field_count(),
        })
    }

    fn line_range_error(&self, line: usize) -> QueryError {
        QueryError::Index(IndexError::LineOutOfRange {
            line,
            len: self.records.len(),
        })
    }
}

impl fmt::Display for HumdrumFile {
    /// Emits the raw lines unchanged, one `\n` after each.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rec in &self.records {
            writeln!(f, "{}", rec.raw)?;
        }
        Ok(())
    }
}
