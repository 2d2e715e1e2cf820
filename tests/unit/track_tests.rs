/*!
 * Tests for track creation and segment placement
 */

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use cutdraft::errors::DraftError;
use cutdraft::materials::TextStyle;
use cutdraft::materials::catalog::{self, AnimationKind, AnimationTarget};
use cutdraft::segments::{MediaOptions, SegmentKind, VideoSegment};
use cutdraft::{Document, SEC, StickerSegment, TextSegment, TimeRange, TrackOptions, TrackType};

use crate::common::{self, range};

#[test]
fn test_add_track_with_existing_name_should_be_noop() {
    let mut document = Document::new(1920, 1080, 30);
    document
        .add_track(TrackType::Text, Some("subs"), TrackOptions::relative(3))
        .unwrap()
        .add_track(TrackType::Text, Some("subs"), TrackOptions::relative(7))
        .unwrap();
    assert_eq!(document.tracks().len(), 1);
    assert_eq!(document.tracks()[0].render_index, 15003);
}

#[test]
fn test_add_unnamed_track_twice_should_fail() {
    let mut document = Document::new(1920, 1080, 30);
    document.add_track(TrackType::Video, None, TrackOptions::default()).unwrap();
    let result = document.add_track(TrackType::Video, None, TrackOptions::default());
    assert!(matches!(result, Err(DraftError::DuplicateTrackType(_))));
    assert_eq!(document.tracks()[0].name, "video");
}

#[test]
fn test_absolute_index_should_win_over_relative() {
    let mut document = Document::new(1920, 1080, 30);
    let options = TrackOptions {
        mute: true,
        relative_index: 5,
        absolute_index: Some(42),
    };
    document.add_track(TrackType::Sticker, Some("s"), options).unwrap();
    let track = &document.tracks()[0];
    assert_eq!(track.render_index, 42);
    assert!(track.mute);
}

#[test]
fn test_add_segment_with_overlap_should_leave_document_unchanged() {
    let mut document = common::build_sample_document();
    let before = document.export();

    let clip = common::video("other.mp4", 10);
    let overlapping = VideoSegment::new(&clip, range(4, 2), MediaOptions::default()).unwrap();
    let result = document.add_segment(overlapping, None);

    assert!(matches!(result, Err(DraftError::SegmentOverlap { .. })));
    assert_eq!(document.export(), before);
    assert!(!document.materials().contains_id(&clip.material_id));
}

#[test]
fn test_add_segment_without_track_should_fail() {
    let mut document = Document::new(1920, 1080, 30);
    let sticker = StickerSegment::new("7226264888031284539", range(0, 1));
    assert!(matches!(
        document.add_segment(sticker, None),
        Err(DraftError::TrackNotFound(_))
    ));
}

#[test]
fn test_add_segment_with_two_candidate_tracks_should_require_name() {
    let mut document = Document::new(1920, 1080, 30);
    document
        .add_track(TrackType::Text, Some("a"), TrackOptions::default())
        .unwrap()
        .add_track(TrackType::Text, Some("b"), TrackOptions::relative(1))
        .unwrap();

    let segment = TextSegment::new("hi", range(0, 1), TextStyle::default()).unwrap();
    assert!(matches!(
        document.add_segment(segment.clone(), None),
        Err(DraftError::AmbiguousTrack(_))
    ));
    document.add_segment(segment, Some("b")).unwrap();
    assert_eq!(document.get_track(SegmentKind::Text, Some("b")).unwrap().len(), 1);
}

#[test]
fn test_add_segment_to_track_of_other_type_should_fail() {
    let mut document = common::build_sample_document();
    let sticker = StickerSegment::new("7226264888031284539", range(20, 1));
    assert!(matches!(
        document.add_segment(sticker, Some("title")),
        Err(DraftError::TypeMismatch(_))
    ));
}

#[test]
fn test_segments_sharing_material_should_register_it_once() {
    let document = common::build_sample_document();
    let exported = document.export();
    assert_eq!(exported["materials"]["videos"].as_array().unwrap().len(), 1);
    // one speed per media segment
    assert_eq!(exported["materials"]["speeds"].as_array().unwrap().len(), 3);
}

#[test]
fn test_video_decorations_should_reference_in_add_order() {
    let clip = common::video("clip.mp4", 10);
    let mut segment = VideoSegment::new(&clip, range(0, 5), MediaOptions::default()).unwrap();
    let fade_in = catalog::animation(AnimationTarget::Video, AnimationKind::Intro, "fade_in").unwrap();
    segment
        .add_filter(&catalog::filter("warm").unwrap(), 80.0)
        .unwrap()
        .add_animation(&fade_in, None)
        .unwrap()
        .add_effect(&catalog::video_effect("vhs").unwrap(), None)
        .unwrap();
    let refs = segment.extra_material_refs().to_vec();
    assert_eq!(refs.len(), 4);

    let mut document = Document::new(1920, 1080, 30);
    document.add_track(TrackType::Video, None, TrackOptions::default()).unwrap();
    document.add_segment(segment, None).unwrap();

    let exported = document.export();
    let materials = &exported["materials"];
    assert_eq!(exported["tracks"][0]["segments"][0]["extra_material_refs"], serde_json::json!(refs));
    assert_eq!(materials["speeds"][0]["id"], refs[0].as_str());
    assert_eq!(materials["effects"][0]["id"], refs[1].as_str());
    assert_eq!(materials["material_animations"][0]["id"], refs[2].as_str());
    assert_eq!(materials["video_effects"][0]["id"], refs[3].as_str());
}

#[test]
fn test_second_mask_should_be_rejected() {
    let clip = common::video("clip.mp4", 10);
    let mut segment = VideoSegment::new(&clip, range(0, 5), MediaOptions::default()).unwrap();
    let circle = catalog::mask("circle").unwrap();
    segment.add_mask(&circle, Default::default()).unwrap();
    assert!(segment.add_mask(&circle, Default::default()).is_err());
}

#[test]
fn test_speed_with_source_range_should_retime_target() {
    let clip = common::video("clip.mp4", 20);
    let options = MediaOptions {
        source_timerange: Some(range(0, 10)),
        speed: Some(2.0),
        ..MediaOptions::default()
    };
    let segment = VideoSegment::new(&clip, range(1, 1), options).unwrap();
    assert_eq!(segment.target_timerange, TimeRange::new(SEC, 5 * SEC).unwrap());

    let past_end = MediaOptions {
        source_timerange: Some(range(15, 10)),
        ..MediaOptions::default()
    };
    assert!(matches!(
        VideoSegment::new(&clip, range(0, 10), past_end),
        Err(DraftError::InvalidRange(_))
    ));
}

#[test]
fn test_random_placements_should_keep_track_sorted_and_disjoint() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut document = Document::new(1920, 1080, 30);
    document.add_track(TrackType::Sticker, None, TrackOptions::default()).unwrap();

    let mut accepted: Vec<TimeRange> = Vec::new();
    for _ in 0..200 {
        let start = rng.random_range(0..1_000) * 1_000;
        let duration = rng.random_range(1..50) * 1_000;
        let target = TimeRange::new(start, duration).unwrap();
        let result = document.add_segment(StickerSegment::new("r", target), None);

        let collides = accepted.iter().any(|r| r.overlaps(&target));
        assert_eq!(result.is_err(), collides, "placement of {} disagreed", target);
        if !collides {
            accepted.push(target);
        }
    }

    let track = document.get_track(SegmentKind::Sticker, None).unwrap();
    assert_eq!(track.len(), accepted.len());
    for pair in track.segments().windows(2) {
        assert!(pair[0].end() <= pair[1].start());
    }
}
