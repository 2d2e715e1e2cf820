/*!
 * Tests for imported tracks and the replacement operations
 */

use serde_json::json;

use cutdraft::errors::DraftError;
use cutdraft::materials::{MediaMaterial, VideoMaterial};
use cutdraft::{Document, ExtendMode, ImportTrackOptions, SEC, ShrinkMode, TimeRange, TrackType};

use crate::common::{self, text_content};

fn video_handle(document: &Document) -> cutdraft::TrackHandle {
    document.get_imported_track(TrackType::Video, None, None).unwrap()
}

fn text_handle(document: &Document) -> cutdraft::TrackHandle {
    document.get_imported_track(TrackType::Text, None, None).unwrap()
}

fn media(name: &str, duration_secs: i64) -> MediaMaterial {
    common::video(name, duration_secs).into()
}

fn segment_range(document: &Document, handle: cutdraft::TrackHandle, index: usize) -> TimeRange {
    document.imported_track(handle).unwrap().segments()[index].target_timerange
}

#[test]
fn test_get_imported_track_should_filter_by_type_name_and_index() {
    let document = common::load_template();
    let handle = document.get_imported_track(TrackType::Text, Some("captions"), Some(0)).unwrap();
    assert_eq!(document.imported_track(handle).unwrap().name, "captions");

    assert!(matches!(
        document.get_imported_track(TrackType::Video, None, Some(1)),
        Err(DraftError::TrackNotFound(_))
    ));
    assert!(matches!(
        document.get_imported_track(TrackType::Text, Some("nope"), None),
        Err(DraftError::TrackNotFound(_))
    ));
}

#[test]
fn test_get_imported_track_with_several_matches_should_be_ambiguous() {
    let mut template = common::template_json();
    let mut second = template["tracks"][0].clone();
    second["name"] = json!("other");
    template["tracks"].as_array_mut().unwrap().push(second);
    let document = Document::from_json_str(&template.to_string()).unwrap();

    assert!(matches!(
        document.get_imported_track(TrackType::Text, None, None),
        Err(DraftError::AmbiguousTrack(_))
    ));
    assert!(document.get_imported_track(TrackType::Text, None, Some(1)).is_ok());
}

#[test]
fn test_imported_render_index_should_be_segment_maximum() {
    let document = common::load_template();
    let sticker = document.get_imported_track(TrackType::Sticker, None, None).unwrap();
    assert_eq!(document.imported_track(sticker).unwrap().render_index, 14003);
    assert_eq!(document.imported_track(text_handle(&document)).unwrap().render_index, 15001);
}

#[test]
fn test_replace_text_should_rescale_styles() {
    let mut document = common::load_template();
    let handle = text_handle(&document);
    document.replace_text(handle, 0, &["Hello"], true).unwrap();

    let content = text_content(&document, "plain");
    assert_eq!(content["text"], "Hello");
    assert_eq!(content["styles"][0]["range"], json!([1, 3]));
    assert_eq!(content["styles"][0]["size"], 5.0);
}

#[test]
fn test_replace_text_without_recalc_should_keep_styles() {
    let mut document = common::load_template();
    let handle = text_handle(&document);
    document.replace_text(handle, 0, &["Hello"], false).unwrap();
    assert_eq!(text_content(&document, "plain")["styles"][0]["range"], json!([2, 6]));
}

#[test]
fn test_replace_text_on_plain_record_with_two_texts_should_fail() {
    let mut document = common::load_template();
    let handle = text_handle(&document);
    assert!(matches!(
        document.replace_text(handle, 0, &["a", "b"], true),
        Err(DraftError::TextCountMismatch(_))
    ));
}

#[test]
fn test_replace_text_on_template_should_fill_slots_in_order() {
    let mut document = common::load_template();
    let handle = text_handle(&document);
    document.replace_text(handle, 1, &["Top"], true).unwrap();

    assert_eq!(text_content(&document, "slot_a")["text"], "Top");
    assert_eq!(text_content(&document, "slot_a")["styles"][0]["range"], json!([0, 3]));
    assert_eq!(text_content(&document, "slot_b")["text"], "Second");
}

#[test]
fn test_replace_text_with_too_many_texts_should_change_nothing() {
    let mut document = common::load_template();
    let handle = text_handle(&document);
    let before = document.export();
    assert!(matches!(
        document.replace_text(handle, 1, &["a", "b", "c"], true),
        Err(DraftError::TextCountMismatch(_))
    ));
    assert_eq!(document.export(), before);
}

#[test]
fn test_replace_text_with_bad_track_or_index_should_fail() {
    let mut document = common::load_template();
    let video = video_handle(&document);
    let text = text_handle(&document);
    assert!(matches!(
        document.replace_text(video, 0, &["x"], true),
        Err(DraftError::TypeMismatch(_))
    ));
    assert!(matches!(
        document.replace_text(text, 5, &["x"], true),
        Err(DraftError::IndexOutOfRange { index: 5, len: 2 })
    ));
}

#[test]
fn test_replace_by_seg_with_shorter_material_should_cut_tail() {
    let mut document = common::load_template();
    let handle = video_handle(&document);
    let material = media("short.mp4", 3);
    document
        .replace_material_by_seg(handle, 0, &material, None, ShrinkMode::CutTail, &[ExtendMode::CutMaterialTail])
        .unwrap();

    let segment = &document.imported_track(handle).unwrap().segments()[0];
    assert_eq!(segment.target_timerange, TimeRange::new(0, 3 * SEC).unwrap());
    assert_eq!(segment.source_timerange, Some(TimeRange::new(0, 3 * SEC).unwrap()));
    assert_eq!(segment.material_id, material.material_id());
    assert!(document.materials().contains_id(material.material_id()));
    assert_eq!(segment_range(&document, handle, 1).start, 6 * SEC);
}

#[test]
fn test_replace_by_seg_with_cut_tail_align_should_pull_later_segments() {
    let mut document = common::load_template();
    let handle = video_handle(&document);
    document
        .replace_material_by_seg(handle, 0, &media("short.mp4", 3), None, ShrinkMode::CutTailAlign, &[])
        .unwrap();
    assert_eq!(segment_range(&document, handle, 1).start, 4 * SEC);
    assert_eq!(document.duration(), 8 * SEC);
}

#[test]
fn test_replace_by_seg_with_blocked_extend_should_leave_document_unchanged() {
    let mut document = common::load_template();
    let handle = video_handle(&document);
    let before = document.export();
    let material = media("long.mp4", 8);

    let result = document.replace_material_by_seg(
        handle,
        0,
        &material,
        None,
        ShrinkMode::CutTail,
        &[ExtendMode::ExtendTail, ExtendMode::ExtendHead],
    );
    assert!(matches!(result, Err(DraftError::ExtensionFailed { target, .. }) if target == 8 * SEC));
    assert_eq!(document.export(), before);
    assert!(!document.materials().contains_id(material.material_id()));
}

#[test]
fn test_replace_by_seg_with_push_tail_should_move_next_segment() {
    let mut document = common::load_template();
    let handle = video_handle(&document);
    document
        .replace_material_by_seg(handle, 0, &media("long.mp4", 8), None, ShrinkMode::CutTail, &[ExtendMode::PushTail])
        .unwrap();
    assert_eq!(segment_range(&document, handle, 0).duration, 8 * SEC);
    assert_eq!(segment_range(&document, handle, 1).start, 8 * SEC);
    assert_eq!(document.duration(), 12 * SEC);
    assert_eq!(document.export()["duration"], 12 * SEC);
}

#[test]
fn test_replace_by_seg_with_extend_head_should_start_earlier() {
    let mut document = common::load_template();
    let handle = video_handle(&document);
    document
        .replace_material_by_seg(handle, 1, &media("five.mp4", 5), None, ShrinkMode::CutTail, &[ExtendMode::ExtendHead])
        .unwrap();
    assert_eq!(segment_range(&document, handle, 1), TimeRange::new(5 * SEC, 5 * SEC).unwrap());
}

#[test]
fn test_replace_by_seg_with_cut_material_tail_should_keep_length() {
    let mut document = common::load_template();
    let handle = video_handle(&document);
    document
        .replace_material_by_seg(handle, 0, &media("long.mp4", 8), None, ShrinkMode::CutTail, &[ExtendMode::CutMaterialTail])
        .unwrap();
    let segment = &document.imported_track(handle).unwrap().segments()[0];
    assert_eq!(segment.duration(), 5 * SEC);
    assert_eq!(segment.source_timerange, Some(TimeRange::new(0, 5 * SEC).unwrap()));
}

#[test]
fn test_replace_by_seg_with_photo_should_keep_segment_length() {
    let mut document = common::load_template();
    let handle = video_handle(&document);
    let photo: MediaMaterial = VideoMaterial::photo("/media/still.png", 800, 600).into();
    document
        .replace_material_by_seg(handle, 1, &photo, None, ShrinkMode::CutTail, &[ExtendMode::CutMaterialTail])
        .unwrap();
    assert_eq!(segment_range(&document, handle, 1), TimeRange::new(6 * SEC, 4 * SEC).unwrap());
}

#[test]
fn test_replace_by_seg_with_wrong_kind_should_fail() {
    let mut document = common::load_template();
    let video = video_handle(&document);
    let text = text_handle(&document);
    let sound: MediaMaterial = common::audio("a.mp3", 5).into();

    assert!(matches!(
        document.replace_material_by_seg(video, 0, &sound, None, ShrinkMode::CutTail, &[]),
        Err(DraftError::TypeMismatch(_))
    ));
    assert!(matches!(
        document.replace_material_by_seg(text, 0, &media("a.mp4", 5), None, ShrinkMode::CutTail, &[]),
        Err(DraftError::TypeMismatch(_))
    ));
    assert!(matches!(
        document.replace_material_by_seg(video, 2, &media("a.mp4", 5), None, ShrinkMode::CutTail, &[]),
        Err(DraftError::IndexOutOfRange { index: 2, len: 2 })
    ));
}

#[test]
fn test_replace_by_seg_with_source_past_end_should_fail() {
    let mut document = common::load_template();
    let handle = video_handle(&document);
    let source = TimeRange::new(4 * SEC, 2 * SEC).unwrap();
    assert!(matches!(
        document.replace_material_by_seg(handle, 0, &media("a.mp4", 5), Some(source), ShrinkMode::CutTail, &[]),
        Err(DraftError::InvalidRange(_))
    ));
}

#[test]
fn test_replace_by_name_should_update_metadata_in_place() {
    let mut document = common::load_template();
    let replacement = common::video("new.mp4", 12);
    document
        .replace_material_by_name("clip.mp4", &replacement.clone().into(), false)
        .unwrap();

    let record = &document.imported_materials()["videos"][0];
    assert_eq!(record["id"], "v1");
    assert_eq!(record["material_name"], "new.mp4");
    assert_eq!(record["path"], "/media/new.mp4");
    assert_eq!(record["duration"], 12 * SEC);
    assert_eq!(record["crop"], json!({ "upper_left_x": 0.0 }));

    // segments keep their ranges
    let handle = video_handle(&document);
    assert_eq!(segment_range(&document, handle, 0).duration, 5 * SEC);

    document
        .replace_material_by_name("new.mp4", &replacement.into(), true)
        .unwrap();
    assert!(document.imported_materials()["videos"][0]["crop"].get("lower_right_x").is_some());
}

#[test]
fn test_replace_by_name_with_unknown_or_duplicate_name_should_fail() {
    let mut document = common::load_template();
    assert!(matches!(
        document.replace_material_by_name("missing.mp4", &media("x.mp4", 1), false),
        Err(DraftError::MaterialNotFound(_))
    ));
    assert!(matches!(
        document.replace_material_by_name("clip.mp4", &common::audio("x.mp3", 1).into(), false),
        Err(DraftError::MaterialNotFound(_))
    ));

    let mut template = common::template_json();
    let mut twin = template["materials"]["videos"][0].clone();
    twin["id"] = json!("v2");
    template["materials"]["videos"].as_array_mut().unwrap().push(twin);
    let mut document = Document::from_json_str(&template.to_string()).unwrap();
    assert!(matches!(
        document.replace_material_by_name("clip.mp4", &media("x.mp4", 1), false),
        Err(DraftError::AmbiguousMaterial(_))
    ));
}

#[test]
fn test_inspect_materials_should_list_decorations() {
    let document = common::load_template();
    let inspection = document.inspect_materials();
    assert_eq!(inspection.stickers.len(), 1);
    assert_eq!(inspection.stickers[0].resource_id, "r_sticker");
    assert_eq!(inspection.bubbles[0].effect_id.as_deref(), Some("e_bubble"));
    assert_eq!(inspection.flower_texts[0].name, "Gold");

    let listing = inspection.to_string();
    assert!(listing.contains("Cloud"));
    assert!(listing.contains("r_flower"));
}

#[test]
fn test_import_track_should_copy_referenced_materials() {
    let source = common::load_template();
    let handle = text_handle(&source);
    let mut target = Document::new(1080, 1920, 30);
    target.import_track(&source, handle, ImportTrackOptions::default()).unwrap();

    let imported = target.imported_materials();
    assert_eq!(imported["texts"].as_array().unwrap().len(), 1);
    assert_eq!(imported["text_templates"][0]["id"], "tpl");
    assert_eq!(imported["effects"][0]["id"], "bubble_1");
    assert!(imported.get("stickers").is_none());
    assert_eq!(target.imported_tracks()[0].render_index, 15001);
}

#[test]
fn test_import_track_should_apply_offset_name_and_index() {
    let source = common::load_template();
    let handle = video_handle(&source);
    let mut target = Document::new(1920, 1080, 30);
    let options = ImportTrackOptions {
        offset: -SEC,
        new_name: Some("broll".to_string()),
        relative_index: Some(3),
    };
    target.import_track(&source, handle, options).unwrap();

    let track = &target.imported_tracks()[0];
    assert_eq!(track.name, "broll");
    assert_eq!(track.render_index, 3);
    assert_eq!(track.segments()[0].start(), 0);
    assert_eq!(track.segments()[1].start(), 5 * SEC);
}

#[test]
fn test_import_track_with_missing_material_should_name_it() {
    let mut template = common::template_json();
    template["materials"]["speeds"].as_array_mut().unwrap().pop();
    let source = Document::from_json_str(&template.to_string()).unwrap();
    let handle = video_handle(&source);

    let mut target = Document::new(1920, 1080, 30);
    let result = target.import_track(&source, handle, ImportTrackOptions::default());
    match result {
        Err(DraftError::MissingMaterial(ids)) => assert_eq!(ids, vec!["sp2".to_string()]),
        other => panic!("expected a missing material, got {:?}", other.map(|_| ())),
    }
    assert!(target.imported_tracks().is_empty());
    assert!(target.imported_materials().is_empty());
}

#[test]
fn test_imported_track_should_not_alias_source() {
    let source = common::load_template();
    let handle = video_handle(&source);
    let mut target = Document::new(1920, 1080, 30);
    target.import_track(&source, handle, ImportTrackOptions::default()).unwrap();

    let target_handle = video_handle(&target);
    target
        .replace_material_by_seg(target_handle, 0, &media("short.mp4", 2), None, ShrinkMode::CutTail, &[])
        .unwrap();

    let original = &source.imported_track(handle).unwrap().segments()[0];
    assert_eq!(original.material_id, "v1");
    assert_eq!(original.duration(), 5 * SEC);
}
