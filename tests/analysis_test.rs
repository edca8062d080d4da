// Spine analysis through the public API: lifecycle, manipulators, errors.

use humspine::{
    Address, AnalysisWarning, HumdrumFile, IndexError, LineKind, ManipulatorError, ParseError,
    QueryError, StructuralError, TrackId,
};
use pretty_assertions::assert_eq;

fn analyzed(text: &str) -> HumdrumFile {
    HumdrumFile::parse_analyzed(text).expect("file should analyze")
}

fn track_numbers(file: &HumdrumFile, line: usize) -> Vec<u32> {
    file.active_tracks(line)
        .unwrap()
        .iter()
        .map(|t| t.0)
        .collect()
}

#[test]
fn single_spine_lifecycle() {
    let file = analyzed("**kern\n4c\n*-");
    assert_eq!(file.max_tracks().unwrap(), 1);
    assert_eq!(file.ex_interp(TrackId(1)).unwrap(), Some("kern"));
    assert_eq!(track_numbers(&file, 0), vec![1]);
    assert_eq!(track_numbers(&file, 1), vec![1]);
    // The terminator announces a change for the following line, so the
    // track is still present on the `*-` line itself.
    assert_eq!(track_numbers(&file, 2), vec![1]);
    assert!(file.registry().unwrap().is_terminated(TrackId(1)));
    assert!(file.warnings().unwrap().is_empty());
}

#[test]
fn two_spines_with_the_same_name_are_distinct_tracks() {
    let file = analyzed("**kern\t**kern\n4c\t4e\n*-\t*-");
    assert_eq!(file.max_tracks().unwrap(), 2);
    assert_eq!(file.field_count(1).unwrap(), 2);
    assert_eq!(track_numbers(&file, 1), vec![1, 2]);
    let registry = file.registry().unwrap();
    assert_eq!(
        registry.with_ex_interp("kern"),
        vec![TrackId(1), TrackId(2)]
    );
    assert!(file.warnings().unwrap().is_empty());
}

#[test]
fn split_positions_share_the_track() {
    let file = analyzed("**kern\n*^\n4c\t4c\n*v\t*v\n*-");
    // On the split line itself there is still one position.
    assert_eq!(track_numbers(&file, 1), vec![1]);
    let states = file.spine_states(2).unwrap();
    assert_eq!(states.len(), 2);
    assert_eq!(states[0].track, TrackId(1));
    assert_eq!(states[1].track, TrackId(1));
    assert_eq!(states[0].subtrack, 1);
    assert_eq!(states[1].subtrack, 2);
    // Both branches still answer to the track's name.
    assert_eq!(file.ex_interp(states[0].track).unwrap(), Some("kern"));
    assert_eq!(file.field_count(2).unwrap(), states.len());
    // After the merge the track is down to a single position again.
    assert_eq!(file.spine_state(4, 0).unwrap().subtrack, 0);
}

#[test]
fn merge_keeps_the_leftmost_track() {
    let file = analyzed("**kern\t**kern\n*v\t*v\n4c\n*-");
    assert_eq!(track_numbers(&file, 1), vec![1, 2]);
    assert_eq!(track_numbers(&file, 2), vec![1]);
    // Track 2 was consumed by the merge and never saw a `*-`; the `*-`
    // closes only the surviving track 1.
    assert_eq!(
        file.warnings().unwrap(),
        &[AnalysisWarning::UnterminatedTrack {
            track: TrackId(2),
            ex_interp: Some("kern".into()),
            created: 0,
        }]
    );
}

#[test]
fn every_open_track_warns_at_end_of_file() {
    // No `*-` anywhere: the surviving track and the merged-away one are
    // both still open when the file ends.
    let file = analyzed("**kern\t**kern\n*v\t*v\n4c");
    assert_eq!(
        file.warnings().unwrap(),
        &[
            AnalysisWarning::UnterminatedTrack {
                track: TrackId(1),
                ex_interp: Some("kern".into()),
                created: 0,
            },
            AnalysisWarning::UnterminatedTrack {
                track: TrackId(2),
                ex_interp: Some("kern".into()),
                created: 0,
            },
        ]
    );
}

#[test]
fn every_spined_line_matches_its_states() {
    // Every manipulator in one file: `*+` with a later `**fig` naming the
    // new spine, a split, a merge, and an exchange.
    let file = analyzed(
        "!!!COM: Anon.\n**kern\t**dynam\n*+\t*\n*\t**fig\t*\n=1\t=1\t=1\n4c\t6 5\tp\n!one\t!two\t!three\n*^\t*\t*\n4c\t4e\t.\tf\n*v\t*v\t*\t*\n*x\t*x\t*\n=2\t=2\t=2\n.\t.\t.\n*-\t*-\t*-",
    );
    for rec in file.records() {
        if rec.kind.is_spined() {
            assert_eq!(
                rec.field_count(),
                file.spine_states(rec.line).unwrap().len(),
                "line {} out of step with its states",
                rec.line
            );
        }
    }
    assert_eq!(file.max_tracks().unwrap(), 3);
    assert_eq!(file.ex_interp(TrackId(3)).unwrap(), Some("fig"));
    assert!(file.warnings().unwrap().is_empty());
}

#[test]
fn sections_reuse_nothing() {
    let file = analyzed("**kern\n4c\n*-\n!! interlude\n**dynam\np\n*-");
    assert_eq!(track_numbers(&file, 1), vec![1]);
    assert_eq!(track_numbers(&file, 5), vec![2]);
    assert_eq!(file.max_tracks().unwrap(), 2);
    assert_eq!(file.spine_states(3).unwrap().len(), 0);
    let registry = file.registry().unwrap();
    assert_eq!(registry.with_ex_interp("kern"), vec![TrackId(1)]);
    assert_eq!(registry.with_ex_interp("dynam"), vec![TrackId(2)]);
}

#[test]
fn parse_is_total_and_raw_access_survives_failed_analysis() {
    let mut file = HumdrumFile::parse("**kern\n4c\t4e");
    let err = file.analyze().unwrap_err();
    assert_eq!(
        err,
        StructuralError::Parse(ParseError {
            line: 1,
            expected: 1,
            found: 2,
        })
    );
    // Raw access is untouched by the failure.
    assert_eq!(file.len(), 2);
    assert_eq!(file.raw(1).unwrap(), "4c\t4e");
    assert_eq!(file.field_text(1, 1).unwrap(), "4e");
    assert_eq!(file.kind(1).unwrap(), LineKind::Data);
    // Derived queries are not.
    assert_eq!(file.active_tracks(0).unwrap_err(), QueryError::Unanalyzed);
    assert!(!file.is_analyzed());
}

#[test]
fn malformed_manipulator_lines_are_rejected() {
    let lone_merge = HumdrumFile::parse_analyzed("**kern\t**kern\n*v\t*\n4c\t4e").unwrap_err();
    assert_eq!(
        lone_merge,
        StructuralError::Manipulator(ManipulatorError::IsolatedMerge { line: 1, field: 0 })
    );

    let triple_exchange =
        HumdrumFile::parse_analyzed("**a\t**b\t**c\n*x\t*x\t*x\n.\t.\t.").unwrap_err();
    assert_eq!(
        triple_exchange,
        StructuralError::Manipulator(ManipulatorError::UnpairedExchange {
            line: 1,
            field: 0,
            run: 3,
        })
    );

    let no_spines = HumdrumFile::parse_analyzed("*clefG2").unwrap_err();
    assert_eq!(
        no_spines,
        StructuralError::Manipulator(ManipulatorError::NoActiveSpines { line: 0 })
    );
}

#[test]
fn renaming_a_track_is_rejected_with_both_names() {
    let err = HumdrumFile::parse_analyzed("**kern\n**dynam\n4c\n*-").unwrap_err();
    match err {
        StructuralError::ExclusiveInterpretationRedefinition {
            line,
            field,
            track,
            existing,
            requested,
        } => {
            assert_eq!((line, field, track), (1, 0, TrackId(1)));
            assert_eq!(existing, "kern");
            assert_eq!(requested, "dynam");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn line_classification_and_reference_records() {
    let file = HumdrumFile::parse(
        "!!!COM: Bach, Johann Sebastian\n!!!OTL:  Aus meines Herzens Grunde \n!! a global comment\n**kern\n!local\n=1\n4c\n*-",
    );
    assert_eq!(file.kind(0).unwrap(), LineKind::Bibliographic);
    assert_eq!(file.kind(2).unwrap(), LineKind::GlobalComment);
    assert_eq!(file.kind(3).unwrap(), LineKind::Interpretation);
    assert_eq!(file.kind(4).unwrap(), LineKind::LocalComment);
    assert_eq!(file.kind(5).unwrap(), LineKind::Barline);
    assert_eq!(file.kind(6).unwrap(), LineKind::Data);
    assert_eq!(file.bib_value("COM"), Some("Bach, Johann Sebastian"));
    assert_eq!(file.bib_value("OTL"), Some("Aus meines Herzens Grunde"));
    assert_eq!(file.bib_value("OPS"), None);
}

#[test]
fn token_addressing_is_bounds_checked() {
    let file = analyzed("**kern\t**kern\n4c 4e 4g\t2d\n*-\t*-");
    assert_eq!(file.token_at(&Address::new(1, 0)).unwrap(), "4c");
    assert_eq!(file.token_at(&Address::with_subfield(1, 0, 2)).unwrap(), "4g");
    assert_eq!(file.token_at(&Address::new(1, 1)).unwrap(), "2d");
    assert_eq!(file.field_text(1, 0).unwrap(), "4c 4e 4g");

    assert_eq!(
        file.token_at(&Address::new(9, 0)).unwrap_err(),
        IndexError::LineOutOfRange { line: 9, len: 3 }
    );
    assert_eq!(
        file.token_at(&Address::new(1, 2)).unwrap_err(),
        IndexError::FieldOutOfRange {
            line: 1,
            field: 2,
            count: 2,
        }
    );
    assert_eq!(
        file.token_at(&Address::with_subfield(1, 1, 1)).unwrap_err(),
        IndexError::SubfieldOutOfRange {
            line: 1,
            field: 1,
            subfield: 1,
            count: 1,
        }
    );
}

#[test]
fn edits_drop_the_analysis_until_rerun() {
    let mut file = analyzed("**kern\n4c\n.\n*-");
    assert!(file.is_analyzed());

    file.change_field(1, 0, "4g").unwrap();
    assert!(!file.is_analyzed());
    assert_eq!(file.resolved_value_at(2, 0).unwrap_err(), QueryError::Unanalyzed);
    // Raw access reflects the edit immediately.
    assert_eq!(file.field_text(1, 0).unwrap(), "4g");

    file.analyze().unwrap();
    assert_eq!(file.resolved_value_at(2, 0).unwrap(), "4g");
}

#[test]
fn an_edit_may_change_a_lines_kind() {
    let mut file = analyzed("**kern\n4c");
    assert_eq!(file.warnings().unwrap().len(), 1);

    file.change_field(1, 0, "*-").unwrap();
    assert_eq!(file.kind(1).unwrap(), LineKind::Interpretation);
    file.analyze().unwrap();
    assert!(file.warnings().unwrap().is_empty());
    assert!(file.registry().unwrap().is_terminated(TrackId(1)));
}

#[test]
fn an_edit_may_break_the_file() {
    let mut file = analyzed("**kern\n4c\n*-");
    file.change_field(1, 0, "4c\t4e").unwrap();
    let err = file.analyze().unwrap_err();
    assert_eq!(
        err,
        StructuralError::Parse(ParseError {
            line: 1,
            expected: 1,
            found: 2,
        })
    );
    assert_eq!(file.raw(1).unwrap(), "4c\t4e");
}

#[test]
fn appended_lines_join_the_next_analysis() {
    let mut file = analyzed("**kern\n4c");
    file.append_line("4d");
    file.append_line("*-");
    assert_eq!(file.len(), 4);
    file.analyze().unwrap();
    assert_eq!(track_numbers(&file, 3), vec![1]);
    assert!(file.warnings().unwrap().is_empty());
}

#[test]
fn unterminated_tracks_are_reported_not_fatal() {
    let file = analyzed("**kern\t**dynam\n4c\tp\n*-\t*");
    let warnings = file.warnings().unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(
        warnings[0].to_string(),
        "track 2 (**dynam, opened at line 1) has no terminator"
    );
}

#[test]
fn newline_terminated_input_round_trips() {
    let text = "!!!COM: Anon.\n**kern\t**dynam\n4c\tp\n.\t.\n*-\t*-\n";
    let file = HumdrumFile::parse(text);
    assert_eq!(file.to_string(), text);
}

#[test]
fn empty_input_is_a_valid_empty_file() {
    let mut file = HumdrumFile::parse("");
    assert!(file.is_empty());
    file.analyze().unwrap();
    assert_eq!(file.max_tracks().unwrap(), 0);
    assert_eq!(file.to_string(), "");
}
