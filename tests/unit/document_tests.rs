/*!
 * Tests for document export and persistence
 */

use std::fs;

use cutdraft::app_config::{AppFlavor, Config};
use cutdraft::errors::DraftError;
use cutdraft::materials::catalog;
use cutdraft::{Document, SEC, TrackOptions, TrackType};

use crate::common::{self, range};

#[test]
fn test_export_should_carry_canvas_and_duration() {
    let document = common::build_sample_document();
    let exported = document.export();
    assert_eq!(exported["canvas_config"]["width"], 1920);
    assert_eq!(exported["canvas_config"]["height"], 1080);
    assert_eq!(exported["canvas_config"]["ratio"], "original");
    assert_eq!(exported["fps"], 30);
    assert_eq!(exported["duration"], 10 * SEC);
    assert_eq!(document.duration(), 10 * SEC);
}

#[test]
fn test_export_should_order_tracks_by_render_index() {
    let mut document = Document::new(1920, 1080, 30);
    document
        .add_track(TrackType::Text, Some("front"), TrackOptions::relative(2))
        .unwrap()
        .add_track(TrackType::Effect, None, TrackOptions::default())
        .unwrap()
        .add_track(TrackType::Video, None, TrackOptions::default())
        .unwrap();

    let exported = document.export();
    let names: Vec<&str> = exported["tracks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["video", "effect", "front"]);
}

#[test]
fn test_effect_track_should_stamp_render_index() {
    let mut document = Document::new(1920, 1080, 30);
    document.add_track(TrackType::Effect, None, TrackOptions::relative(4)).unwrap();
    document
        .add_effect(&catalog::video_effect("flash").unwrap(), range(0, 2), None, None)
        .unwrap();

    let exported = document.export();
    let segment = &exported["tracks"][0]["segments"][0];
    assert_eq!(segment["render_index"], 10004);
    assert_eq!(exported["materials"]["video_effects"][0]["apply_target_type"], 2);
}

#[test]
fn test_add_filter_with_bad_intensity_should_fail() {
    let mut document = Document::new(1920, 1080, 30);
    document.add_track(TrackType::Filter, None, TrackOptions::default()).unwrap();
    let result = document.add_filter(&catalog::filter("warm").unwrap(), range(0, 2), None, 150.0);
    assert!(matches!(result, Err(DraftError::InvalidParameter(_))));
    assert!(document.materials().is_empty());
}

#[test]
fn test_flavor_should_pick_mask_key() {
    let config = Config {
        flavor: AppFlavor::JianYing,
        ..Config::default()
    };
    let exported = Document::from_config(&config).export();
    assert!(exported["materials"].get("masks").is_some());
    assert!(exported["materials"].get("common_mask").is_none());
}

#[test]
fn test_dumps_should_use_four_space_indent_and_keep_unicode() {
    let mut document = Document::new(1080, 1920, 30);
    document.add_track(TrackType::Text, None, TrackOptions::default()).unwrap();
    document
        .add_segment(
            cutdraft::TextSegment::new("你好", range(0, 1), Default::default()).unwrap(),
            None,
        )
        .unwrap();
    let text = document.dumps().unwrap();
    assert!(text.starts_with("{\n    \""));
    assert!(text.contains("你好"));
}

#[test]
fn test_save_without_path_should_fail() {
    let document = Document::new(1920, 1080, 30);
    assert!(matches!(document.save(), Err(DraftError::NoSavePath)));
}

#[test]
fn test_dump_and_load_template_should_remember_path() -> anyhow::Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("draft_content.json");
    common::build_sample_document().dump(&path)?;

    let loaded = Document::load_template(&path)?;
    assert_eq!(loaded.save_path(), Some(path.as_path()));
    assert_eq!(loaded.imported_tracks().len(), 3);
    loaded.save()?;
    assert!(fs::read_to_string(&path)?.contains("\"tracks\""));
    Ok(())
}

#[test]
fn test_from_json_str_with_missing_keys_should_fail() {
    for text in [
        "[]",
        r#"{"materials": {}, "tracks": []}"#,
        r#"{"canvas_config": {"width": 1, "height": 1}, "tracks": []}"#,
        r#"{"canvas_config": {"width": 1, "height": 1}, "materials": {}, "tracks": [{"type": "hologram"}]}"#,
    ] {
        assert!(
            matches!(Document::from_json_str(text), Err(DraftError::InvalidTemplate(_))),
            "{} should be rejected",
            text
        );
    }
}

#[test]
fn test_bytes_should_restore_track_lookup() {
    let document = common::build_sample_document();
    let mut restored = Document::from_bytes(&document.to_bytes().unwrap()).unwrap();
    assert_eq!(restored.export(), document.export());

    // the name index is rebuilt, so a duplicate name is still a no-op
    restored
        .add_track(TrackType::Text, Some("title"), TrackOptions::default())
        .unwrap();
    assert_eq!(restored.tracks().len(), 3);
}
