//! Line model: prefix classification and tab tokenization.
//!
//! Classification is total. Any sequence of characters is some kind of
//! line, so parsing alone never fails; structural problems surface later,
//! during spine analysis.

pub mod token;

pub use token::{Manipulator, Token};

/// Line classification by prefix, checked longest prefix first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `!!!key: value` reference record.
    Bibliographic,
    /// `!!` comment spanning the whole line.
    GlobalComment,
    /// `!` comment, one field per spine.
    LocalComment,
    /// `*` or `**` directives, one field per spine.
    Interpretation,
    /// `=` measure line, one field per spine.
    Barline,
    /// Everything else, one field per spine.
    Data,
}

impl LineKind {
    pub fn classify(text: &str) -> LineKind {
        if text.starts_with("!!!") {
            LineKind::Bibliographic
        } else if text.starts_with("!!") {
            LineKind::GlobalComment
        } else if text.starts_with('!') {
            LineKind::LocalComment
        } else if text.starts_with('*') {
            LineKind::Interpretation
        } else if text.starts_with('=') {
            LineKind::Barline
        } else {
            LineKind::Data
        }
    }

    /// Spined kinds carry one tab-separated token per active spine position.
    pub fn is_spined(self) -> bool {
        matches!(
            self,
            LineKind::LocalComment | LineKind::Interpretation | LineKind::Barline | LineKind::Data
        )
    }
}

/// One source line: raw text plus its classified, tokenized form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub line: usize,
    pub kind: LineKind,
    pub raw: String,
    pub fields: Vec<Token>,
}

impl Record {
    /// Tokenize one line. Spined kinds split on tabs; whole-line kinds keep
    /// the text as a single token.
    pub fn from_line(line: usize, text: &str) -> Record {
        let kind = LineKind::classify(text);
        let fields = if kind.is_spined() {
            text.split('\t').map(Token::new).collect()
        } else {
            vec![Token::new(text)]
        };
        Record {
            line,
            kind,
            raw: text.to_string(),
            fields,
        }
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Rebuild and reclassify after a token edit. An edit may change the
    /// line's prefix or introduce tabs, so the whole line is re-derived.
    pub(crate) fn retokenize(&mut self) {
        let raw = if self.kind.is_spined() {
            self.fields
                .iter()
                .map(|t| t.text.as_str())
                .collect::<Vec<_>>()
                .join("\t")
        } else {
            self.fields
                .first()
                .map(|t| t.text.clone())
                .unwrap_or_default()
        };
        *self = Record::from_line(self.line, &raw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn classifies_by_longest_prefix() {
        assert_eq!(LineKind::classify("!!!COM: Bach"), LineKind::Bibliographic);
        assert_eq!(LineKind::classify("!! a remark"), LineKind::GlobalComment);
        assert_eq!(LineKind::classify("! fingering"), LineKind::LocalComment);
        assert_eq!(LineKind::classify("**kern"), LineKind::Interpretation);
        assert_eq!(LineKind::classify("*clefG2"), LineKind::Interpretation);
        assert_eq!(LineKind::classify("=1"), LineKind::Barline);
        assert_eq!(LineKind::classify("4c"), LineKind::Data);
        assert_eq!(LineKind::classify(""), LineKind::Data);
    }

    #[test]
    fn spined_lines_split_on_tabs() {
        let rec = Record::from_line(0, "4c\t4e\t4g");
        assert_eq!(rec.kind, LineKind::Data);
        assert_eq!(rec.field_count(), 3);
        assert_eq!(rec.fields[1].text, "4e");
    }

    #[test]
    fn comments_stay_whole() {
        let rec = Record::from_line(0, "!! has\ta tab");
        assert_eq!(rec.kind, LineKind::GlobalComment);
        assert_eq!(rec.field_count(), 1);
        assert_eq!(rec.fields[0].text, "!! has\ta tab");
    }

    #[test]
    fn retokenize_reclassifies() {
        let mut rec = Record::from_line(3, "4c");
        rec.fields[0].text = "*-".to_string();
        rec.retokenize();
        assert_eq!(rec.kind, LineKind::Interpretation);
        assert_eq!(rec.raw, "*-");
        assert_eq!(rec.line, 3);
    }

    #[test]
    fn retokenize_splits_introduced_tabs() {
        let mut rec = Record::from_line(0, "4c");
        rec.fields[0].text = "4c\t4e".to_string();
        rec.retokenize();
        assert_eq!(rec.field_count(), 2);
        assert_eq!(rec.raw, "4c\t4e");
    }
}
