/*!
 * Template workflow: load a draft from disk, edit it and save it back
 */

use serde_json::json;

use cutdraft::materials::{MediaMaterial, VideoMaterial};
use cutdraft::{Document, ExtendMode, ImportTrackOptions, SEC, ShrinkMode, TrackType};

use crate::common;

#[test]
fn test_load_edit_save_should_persist_changes() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "draft_content.json", &common::template_json().to_string()).unwrap();

    let mut document = Document::load_template(&path).unwrap();
    let text = document.get_imported_track(TrackType::Text, Some("captions"), None).unwrap();
    document.replace_text(text, 0, &["Hi"], true).unwrap();

    let video = document.get_imported_track(TrackType::Video, None, None).unwrap();
    let replacement: MediaMaterial = VideoMaterial::new("/media/new.mp4", 12 * SEC, 1280, 720).unwrap().into();
    document
        .replace_material_by_seg(video, 0, &replacement, None, ShrinkMode::CutTail, &[ExtendMode::CutMaterialTail])
        .unwrap();
    document.save().unwrap();

    let saved = Document::load_template(&path).unwrap();
    assert_eq!(common::text_content(&saved, "plain")["text"], json!("Hi"));

    let exported = saved.export();
    let videos = exported["materials"]["videos"].as_array().unwrap();
    assert!(videos.iter().any(|v| v["path"] == json!("/media/new.mp4")));
    assert_eq!(exported["canvas_config"]["width"], json!(1080));
}

#[test]
fn test_import_into_new_document_should_carry_materials() {
    common::init_logging();
    let template = common::load_template();
    let mut document = Document::new(1080, 1920, 30);

    let video = template.get_imported_track(TrackType::Video, None, None).unwrap();
    let text = template.get_imported_track(TrackType::Text, None, None).unwrap();
    document
        .import_track(&template, video, ImportTrackOptions::default())
        .unwrap()
        .import_track(
            &template,
            text,
            ImportTrackOptions {
                offset: 2 * SEC,
                new_name: Some("lower".to_string()),
                relative_index: Some(5),
            },
        )
        .unwrap();

    let exported = document.export();
    let ids = |category: &str| -> Vec<String> {
        exported["materials"][category]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["id"].as_str().unwrap().to_string())
            .collect()
    };
    assert_eq!(ids("videos"), vec!["v1"]);
    assert_eq!(ids("speeds"), vec!["sp1", "sp2"]);
    assert_eq!(ids("texts"), vec!["plain"]);
    assert_eq!(ids("text_templates"), vec!["tpl"]);
    assert_eq!(ids("effects"), vec!["bubble_1"]);

    let tracks = exported["tracks"].as_array().unwrap();
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[1]["name"], json!("lower"));
    assert_eq!(tracks[1]["segments"][0]["render_index"], json!(15005));
    assert_eq!(tracks[1]["segments"][0]["target_timerange"]["start"], json!(2 * SEC));
    assert_eq!(exported["duration"], json!(10 * SEC));
}

#[test]
fn test_replace_text_in_imported_copy_should_leave_template_untouched() {
    common::init_logging();
    let template = common::load_template();
    let mut document = Document::new(1080, 1920, 30);
    let handle = template.get_imported_track(TrackType::Text, None, None).unwrap();
    document.import_track(&template, handle, ImportTrackOptions::default()).unwrap();

    let copy = document.get_imported_track(TrackType::Text, None, None).unwrap();
    document.replace_text(copy, 0, &["Changed"], false).unwrap();

    assert_eq!(common::text_content(&document, "plain")["text"], json!("Changed"));
    assert_eq!(common::text_content(&template, "plain")["text"], json!("0123456789"));
}

#[test]
fn test_dump_to_other_path_should_keep_origin_untouched() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let original_text = common::template_json().to_string();
    let path = common::create_test_file(dir.path(), "draft_content.json", &original_text).unwrap();

    let mut document = Document::load_template(&path).unwrap();
    let handle = document.get_imported_track(TrackType::Text, None, None).unwrap();
    document.replace_text(handle, 0, &["Elsewhere"], true).unwrap();

    let copy_path = dir.path().join("copy.json");
    document.dump(&copy_path).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), original_text);
    let copy = Document::load_template(&copy_path).unwrap();
    assert_eq!(common::text_content(&copy, "plain")["text"], json!("Elsewhere"));
    assert_eq!(copy.save_path(), Some(copy_path.as_path()));
}
