//! HTML table rendering of an analyzed file.
//!
//! Every track becomes one column, so a rendered file keeps its columns
//! aligned even while spines split and merge: a track occupying several
//! positions on a line gets a small nested table inside its cell.
//! Whole-line records span all columns.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::QueryError;
use crate::file::HumdrumFile;
use crate::record::{LineKind, Manipulator, Record};
use crate::resolve::Origin;
use crate::spine::track::TrackId;

/// `*>name` section label (an anchor target).
static LABEL_ANCHOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\*>([^\[\]]+)$").unwrap());
/// `*>name[a,b,...]` expansion list (links to labels).
static LABEL_LINKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\*>(.*)\[(.*)\]$").unwrap());

/// Rendering switches, one per CLI flag.
#[derive(Debug, Clone, Copy)]
pub struct TableOptions {
    /// Wrap the table in a complete HTML page with the stylesheet inlined.
    pub full_page: bool,
    /// Emit class attributes on rows. Off leaves bare, unstyled markup.
    pub classes: bool,
    /// Append the raw file in a textarea below the table.
    pub textarea: bool,
    /// Put resolved-value tooltips on null data tokens.
    pub resolve_titles: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            full_page: false,
            classes: true,
            textarea: false,
            resolve_titles: false,
        }
    }
}

const CSS: &str = r#".humhi:hover { background: #d0d0ff; }

td { padding-right: 10px; }

.humdat      { color: black; }
.humbar      { background-color: #eeeeee; }
.humexinterp { color: magenta; }
.hummanip    { color: #f62217; }
.huminterp   { color: #9f000f; }
.humref      { color: green; }
.humgcom     { color: blue; }
.humlcom     { color: #7d1b7e; }
"#;

const PAGE: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>__TITLE__</title>
<style>
__CSS__</style>
</head>
<body>
__BODY__</body>
</html>
"#;

/// Stylesheet for the table classes, for callers embedding the bare table
/// in their own page.
pub fn css() -> &'static str {
    CSS
}

/// Render the file as an HTML table. The file must be analyzed; the
/// column layout comes from the spine states.
pub fn render_table(file: &HumdrumFile, opts: &TableOptions) -> Result<String, QueryError> {
    let tracks = file.max_tracks()?;
    let span = tracks.max(1) as usize;

    let mut body = String::new();
    body.push_str("<table cellpadding=\"0\" cellspacing=\"0\">\n");
    for rec in file.records() {
        render_row(&mut body, file, rec, opts, tracks, span)?;
    }
    body.push_str("</table>\n");

    if opts.textarea {
        let rows = file.len().clamp(4, 40);
        body.push_str(&format!(
            "<textarea wrap=\"off\" rows=\"{}\" cols=\"80\">\n{}</textarea>\n",
            rows,
            escape_html(&file.to_string())
        ));
    }

    if opts.full_page {
        let title = file.bib_value("OTL").unwrap_or("Humdrum table");
        Ok(fill_page(&escape_html(title), &body))
    } else {
        Ok(body)
    }
}

/// Fill the page template. Each marker is substituted once, left to
/// right; filled-in text is never rescanned, so a title or body that
/// contains a marker stays literal.
fn fill_page(title: &str, body: &str) -> String {
    let mut out = String::with_capacity(PAGE.len() + CSS.len() + body.len());
    let mut rest = PAGE;
    for (marker, value) in [("__TITLE__", title), ("__CSS__", CSS), ("__BODY__", body)] {
        if let Some((before, after)) = rest.split_once(marker) {
            out.push_str(before);
            out.push_str(value);
            rest = after;
        }
    }
    out.push_str(rest);
    out
}

fn render_row(
    body: &mut String,
    file: &HumdrumFile,
    rec: &Record,
    opts: &TableOptions,
    tracks: u32,
    span: usize,
) -> Result<(), QueryError> {
    if opts.classes {
        body.push_str(&format!("<tr class=\"{}\">", row_class(rec)));
    } else {
        body.push_str("<tr>");
    }

    if rec.kind.is_spined() {
        let states = file.spine_states(rec.line)?;
        for track in (1..=tracks).map(TrackId) {
            let positions: Vec<usize> = states
                .iter()
                .enumerate()
                .filter(|(_, s)| s.track == track)
                .map(|(j, _)| j)
                .collect();
            match positions.as_slice() {
                [] => body.push_str("<td></td>"),
                [j] => {
                    body.push_str("<td>");
                    body.push_str(&token_html(file, rec, *j, opts)?);
                    body.push_str("</td>");
                }
                many => {
                    // Sub-spines of one track share the track's column.
                    body.push_str("<td><table cellpadding=\"0\" cellspacing=\"0\"><tr valign=\"top\">");
                    for (n, j) in many.iter().enumerate() {
                        if n > 0 {
                            body.push_str("<td width=\"10\"></td>");
                        }
                        body.push_str("<td width=\"70\">");
                        body.push_str(&token_html(file, rec, *j, opts)?);
                        body.push_str("</td>");
                    }
                    body.push_str("</tr></table></td>");
                }
            }
        }
    } else {
        body.push_str(&format!(
            "<td colspan=\"{}\">{}</td>",
            span,
            escape_token(&rec.raw)
        ));
    }

    body.push_str("</tr>\n");
    Ok(())
}

fn row_class(rec: &Record) -> &'static str {
    match rec.kind {
        LineKind::GlobalComment => "humhi humgcom",
        LineKind::Bibliographic => "humhi humref",
        LineKind::LocalComment => "humhi humlcom",
        LineKind::Barline => "humhi humbar",
        LineKind::Data => "humhi humdat",
        LineKind::Interpretation => {
            if rec.raw.starts_with("**") {
                "humhi humexinterp"
            } else if rec.fields.iter().any(|t| {
                matches!(t.manipulator(), Some(m) if !matches!(m, Manipulator::Exclusive(_)))
            }) {
                "humhi hummanip"
            } else {
                "humhi huminterp"
            }
        }
    }
}

fn token_html(
    file: &HumdrumFile,
    rec: &Record,
    field: usize,
    opts: &TableOptions,
) -> Result<String, QueryError> {
    let token = &rec.fields[field];

    if rec.kind == LineKind::Interpretation {
        if let Some(caps) = LABEL_LINKS.captures(&token.text) {
            let mut out = String::from("*&gt;");
            out.push_str(&escape_html(&caps[1]));
            out.push('[');
            for (n, name) in caps[2].split(',').enumerate() {
                if n > 0 {
                    out.push(',');
                }
                let esc = escape_html(name);
                out.push_str(&format!("<a href=\"#{}\">{}</a>", esc, esc));
            }
            out.push(']');
            return Ok(out);
        }
        if let Some(caps) = LABEL_ANCHOR.captures(&token.text) {
            return Ok(format!(
                "<a name=\"{}\"></a>{}",
                escape_html(&caps[1]),
                escape_token(&token.text)
            ));
        }
    }

    let mut html = escape_token(&token.text);
    if opts.resolve_titles && rec.kind == LineKind::Data && token.is_null() {
        let title = match file.origin_of(rec.line, field)? {
            Origin::Inherited(addr) => {
                format!("{} (from {})", file.resolved_value_at(rec.line, field)?, addr)
            }
            Origin::Empty => "no prior value".to_string(),
            Origin::Own(_) => String::new(),
        };
        if !title.is_empty() {
            html = format!("<span title=\"{}\">{}</span>", escape_html(&title), html);
        }
    }
    Ok(html)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape for a table cell: markup neutralized, spaces hardened so
/// multi-part tokens keep their spacing.
fn escape_token(text: &str) -> String {
    escape_html(text).replace(' ', "&nbsp;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzed(text: &str) -> HumdrumFile {
        HumdrumFile::parse_analyzed(text).unwrap()
    }

    #[test]
    fn one_column_per_track() {
        let file = analyzed("**kern\t**dynam\n4c\tp\n*-\t*-");
        let html = render_table(&file, &TableOptions::default()).unwrap();
        assert!(html.contains("<td>**kern</td><td>**dynam</td>"));
        assert!(html.contains("<td>4c</td><td>p</td>"));
    }

    #[test]
    fn whole_line_rows_span_all_columns() {
        let file = analyzed("!!!OTL: Test piece\n**kern\t**dynam\n!! note\n4c\tp\n*-\t*-");
        let html = render_table(&file, &TableOptions::default()).unwrap();
        assert!(html.contains("<td colspan=\"2\">!!!OTL:&nbsp;Test&nbsp;piece</td>"));
        assert!(html.contains("<td colspan=\"2\">!!&nbsp;note</td>"));
    }

    #[test]
    fn split_track_shares_its_column() {
        let file = analyzed("**kern\n*^\n4c\t4e\n*v\t*v\n*-");
        let html = render_table(&file, &TableOptions::default()).unwrap();
        let data_row = html
            .lines()
            .find(|l| l.contains("4c"))
            .expect("data row rendered");
        assert!(data_row.contains("<td><table"));
        assert!(data_row.contains("<td width=\"70\">4c</td>"));
        assert!(data_row.contains("<td width=\"70\">4e</td>"));
    }

    #[test]
    fn row_classes_follow_line_kind() {
        let file = analyzed("**kern\n*clefG2\n*^\n=1\t=1\n4c\t4e\n*v\t*v\n*-");
        let html = render_table(&file, &TableOptions::default()).unwrap();
        assert!(html.contains("<tr class=\"humhi humexinterp\">"));
        assert!(html.contains("<tr class=\"humhi huminterp\">"));
        assert!(html.contains("<tr class=\"humhi hummanip\">"));
        assert!(html.contains("<tr class=\"humhi humbar\">"));
        assert!(html.contains("<tr class=\"humhi humdat\">"));
    }

    #[test]
    fn classes_can_be_switched_off() {
        let file = analyzed("**kern\n4c\n*-");
        let opts = TableOptions {
            classes: false,
            ..TableOptions::default()
        };
        let html = render_table(&file, &opts).unwrap();
        assert!(!html.contains("class="));
        assert!(html.contains("<tr><td>4c</td></tr>"));
    }

    #[test]
    fn null_tokens_get_tooltips_when_asked() {
        let file = analyzed("**kern\n4c\n.\n*-");
        let opts = TableOptions {
            resolve_titles: true,
            ..TableOptions::default()
        };
        let html = render_table(&file, &opts).unwrap();
        assert!(html.contains("<span title=\"4c (from line 2, field 1)\">.</span>"));

        let plain = render_table(&file, &TableOptions::default()).unwrap();
        assert!(!plain.contains("<span title="));
    }

    #[test]
    fn dot_without_history_says_so() {
        let file = analyzed("**kern\n.\n*-");
        let opts = TableOptions {
            resolve_titles: true,
            ..TableOptions::default()
        };
        let html = render_table(&file, &opts).unwrap();
        assert!(html.contains("<span title=\"no prior value\">.</span>"));
    }

    #[test]
    fn labels_become_anchors_and_links() {
        let file = analyzed("**kern\n*>norep[A,B]\n*>A\n4c\n*>B\n4e\n*-");
        let html = render_table(&file, &TableOptions::default()).unwrap();
        assert!(html.contains("<a name=\"A\"></a>*&gt;A"));
        assert!(html.contains("<a name=\"B\"></a>*&gt;B"));
        assert!(html.contains("*&gt;norep[<a href=\"#A\">A</a>,<a href=\"#B\">B</a>]"));
    }

    #[test]
    fn markup_in_tokens_is_escaped() {
        let file = analyzed("**kern\n<script>\n*-");
        let html = render_table(&file, &TableOptions::default()).unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn full_page_uses_the_title_record() {
        let file = analyzed("!!!OTL: Air\n**kern\n4c\n*-");
        let opts = TableOptions {
            full_page: true,
            ..TableOptions::default()
        };
        let html = render_table(&file, &opts).unwrap();
        assert!(html.starts_with("<!doctype html>"));
        assert!(html.contains("<title>Air</title>"));
        assert!(html.contains(".humdat"));
        assert!(html.ends_with("</html>\n"));
    }

    #[test]
    fn a_title_containing_a_marker_stays_literal() {
        let file = analyzed("!!!OTL: __BODY__ suite\n**kern\n4c\n*-");
        let opts = TableOptions {
            full_page: true,
            ..TableOptions::default()
        };
        let html = render_table(&file, &opts).unwrap();
        assert!(html.contains("<title>__BODY__ suite</title>"));
        // The body is rendered exactly once, not re-expanded into the title.
        assert_eq!(html.matches("<table cellpadding").count(), 1);
    }

    #[test]
    fn textarea_appends_the_raw_file() {
        let file = analyzed("**kern\n4c\n*-");
        let opts = TableOptions {
            textarea: true,
            ..TableOptions::default()
        };
        let html = render_table(&file, &opts).unwrap();
        assert!(html.contains("<textarea wrap=\"off\""));
        assert!(html.contains("**kern\n4c\n*-\n</textarea>"));
    }

    #[test]
    fn unanalyzed_files_are_refused() {
        let file = HumdrumFile::parse("**kern\n4c\n*-");
        let err = render_table(&file, &TableOptions::default()).unwrap_err();
        assert_eq!(err, QueryError::Unanalyzed);
    }
}
