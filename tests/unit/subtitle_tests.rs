/*!
 * Tests for SRT parsing and subtitle import
 */

use cutdraft::errors::DraftError;
use cutdraft::materials::{TextBorder, TextStyle};
use cutdraft::segments::ClipSettings;
use cutdraft::subtitle::{SubtitleCues, parse_cues};
use cutdraft::{Document, SEC, SubtitleImportOptions, TextSegment, TrackOptions, TrackType};

use crate::common::{self, SAMPLE_SRT, range};

#[test]
fn test_parse_cues_with_bom_and_crlf_should_parse() {
    let srt = "\u{feff}1\r\n00:00:00,500 --> 00:00:01,000\r\nHi\r\n";
    let cues = parse_cues(srt).unwrap();
    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0].seq_num, 1);
    assert_eq!(cues[0].start, SEC / 2);
    assert_eq!(cues[0].text, "Hi");
}

#[test]
fn test_parse_cues_with_bad_index_should_report_line() {
    let srt = "1\n00:00:00,000 --> 00:00:01,000\nok\n\nabc\n00:00:02,000 --> 00:00:03,000\nno\n";
    let error = parse_cues(srt).unwrap_err();
    assert!(matches!(error, DraftError::InvalidSubtitleFormat { line: 5, .. }));
}

#[test]
fn test_cue_reader_should_stop_after_first_error() {
    let srt = "1\nnot a timestamp\ntext\n\n2\n00:00:02,000 --> 00:00:03,000\nfine\n";
    let results: Vec<_> = SubtitleCues::new(srt).collect();
    assert_eq!(results.len(), 1);
    assert!(results[0].is_err());
}

#[test]
fn test_empty_cue_should_be_skipped() {
    let srt = "1\n00:00:00,000 --> 00:00:01,000\n\n2\n00:00:02,000 --> 00:00:03,000\nkept\n";
    let cues = parse_cues(srt).unwrap();
    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0].seq_num, 2);
}

#[test]
fn test_cue_display_should_round_trip() {
    let cues = parse_cues(SAMPLE_SRT).unwrap();
    let rendered: String = cues.iter().map(|c| format!("{}\n", c)).collect();
    assert_eq!(parse_cues(&rendered).unwrap(), cues);
}

#[test]
fn test_import_srt_should_create_track_and_segments() {
    let mut document = Document::new(1920, 1080, 30);
    document
        .import_srt(SAMPLE_SRT, "subtitle", &SubtitleImportOptions::default())
        .unwrap();

    let track = &document.tracks()[0];
    assert_eq!(track.track_type, TrackType::Text);
    assert_eq!(track.name, "subtitle");
    assert_eq!(track.render_index, 15999);
    assert_eq!(track.len(), 3);
    assert_eq!(track.segments()[1].target_timerange, range(5, 4));
    assert_eq!(document.duration(), 14 * SEC);

    let exported = document.export();
    let text = &exported["materials"]["texts"][1];
    assert_eq!(text["fixed_width"], 1344);
    assert!(text["content"].as_str().unwrap().contains("It contains\\nmultiple lines."));
    assert_eq!(exported["tracks"][0]["segments"][0]["clip"]["transform"]["y"], -0.8);
}

#[test]
fn test_import_srt_on_portrait_canvas_should_narrow_text_box() {
    let mut document = Document::new(1080, 1920, 30);
    document
        .import_srt(SAMPLE_SRT, "subtitle", &SubtitleImportOptions::default())
        .unwrap();
    assert_eq!(document.export()["materials"]["texts"][0]["fixed_width"], 648);
}

#[test]
fn test_import_srt_should_apply_offset() {
    let mut document = Document::new(1920, 1080, 30);
    let options = SubtitleImportOptions {
        time_offset: 2 * SEC,
        ..SubtitleImportOptions::default()
    };
    document.import_srt(SAMPLE_SRT, "subs", &options).unwrap();
    assert_eq!(document.tracks()[0].segments()[0].start(), 3 * SEC);
}

#[test]
fn test_import_srt_should_reuse_existing_track() {
    let mut document = Document::new(1920, 1080, 30);
    document
        .add_track(TrackType::Text, Some("subs"), TrackOptions::relative(1))
        .unwrap();
    document
        .import_srt(SAMPLE_SRT, "subs", &SubtitleImportOptions::default())
        .unwrap();
    assert_eq!(document.tracks().len(), 1);
    assert_eq!(document.tracks()[0].render_index, 15001);
}

#[test]
fn test_import_srt_with_reference_should_copy_style() {
    let style = TextStyle {
        size: 12.0,
        bold: true,
        ..TextStyle::default()
    };
    let mut reference = TextSegment::new("ref", range(0, 1), style)
        .unwrap()
        .with_clip(ClipSettings::at_y(0.5));
    reference.add_bubble("e_bubble", "r_bubble");

    let options = SubtitleImportOptions {
        style_reference: Some(reference.clone()),
        clip_settings: None,
        ..SubtitleImportOptions::default()
    };
    let mut document = Document::new(1920, 1080, 30);
    document.import_srt(SAMPLE_SRT, "subs", &options).unwrap();

    let exported = document.export();
    let segments = exported["tracks"][0]["segments"].as_array().unwrap();
    assert_eq!(segments[0]["clip"]["transform"]["y"], 0.5);
    let bubble_ids: Vec<&str> = segments
        .iter()
        .map(|s| s["extra_material_refs"][0].as_str().unwrap())
        .collect();
    assert_eq!(bubble_ids.len(), 3);
    assert!(!bubble_ids.contains(&reference.extra_material_refs()[0].as_str()));
    assert_ne!(bubble_ids[0], bubble_ids[1]);
    assert_eq!(exported["materials"]["effects"].as_array().unwrap().len(), 3);
}

#[test]
fn test_import_srt_with_reference_and_border_should_apply_overrides() {
    let reference = TextSegment::new("ref", range(0, 1), TextStyle::default())
        .unwrap()
        .with_clip(ClipSettings::at_y(0.5));
    let options = SubtitleImportOptions {
        style_reference: Some(reference),
        clip_settings: None,
        border: Some(TextBorder::new("#FF0000", 1.0, 40.0).unwrap()),
        ..SubtitleImportOptions::default()
    };
    let mut document = Document::new(1920, 1080, 30);
    document.import_srt(SAMPLE_SRT, "subs", &options).unwrap();

    let exported = document.export();
    let text = &exported["materials"]["texts"][0];
    assert_eq!(text["fixed_width"], 1344);
    assert_eq!(text["check_flag"].as_i64().unwrap() & 8, 8);
    let content: serde_json::Value = serde_json::from_str(text["content"].as_str().unwrap()).unwrap();
    assert_eq!(content["styles"][0]["strokes"][0]["content"]["solid"]["color"][0], 1.0);
    assert_eq!(exported["tracks"][0]["segments"][0]["clip"]["transform"]["y"], 0.5);
}

#[test]
fn test_import_srt_without_clip_or_reference_should_fail() {
    let options = SubtitleImportOptions {
        clip_settings: None,
        ..SubtitleImportOptions::default()
    };
    let mut document = Document::new(1920, 1080, 30);
    assert!(matches!(
        document.import_srt(SAMPLE_SRT, "subs", &options),
        Err(DraftError::InvalidParameter(_))
    ));
}

#[test]
fn test_import_srt_with_malformed_input_should_leave_document_unchanged() {
    let mut document = common::build_sample_document();
    let before = document.export();
    let broken = format!("{}\n4\n00:00:20,000 -> 00:00:21,000\nbad arrow\n", SAMPLE_SRT);

    let result = document.import_srt(&broken, "subs", &SubtitleImportOptions::default());
    assert!(matches!(result, Err(DraftError::InvalidSubtitleFormat { .. })));
    assert_eq!(document.export(), before);
}

#[test]
fn test_import_srt_colliding_with_existing_text_should_fail_atomically() {
    let mut document = common::build_sample_document();
    let before = document.export();
    // "title" already holds text at [1s, 4s)
    let result = document.import_srt(SAMPLE_SRT, "title", &SubtitleImportOptions::default());
    assert!(matches!(result, Err(DraftError::SegmentOverlap { .. })));
    assert_eq!(document.export(), before);
}
