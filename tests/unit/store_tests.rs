/*!
 * Tests for the draft cache, export queue and uploader
 */

use chrono::Duration;
use serde_json::json;

use cutdraft::store::{DraftCache, ExportQueue, LocalDirUploader, MemoryDraftCache, TaskStatus, Uploader};
use cutdraft::{TextSegment, TrackOptions, TrackType};
use cutdraft::materials::TextStyle;

use crate::common;

#[test]
fn test_cache_get_should_return_independent_copy() {
    let cache = MemoryDraftCache::new("test", Duration::hours(1));
    let document = common::build_sample_document();
    cache.put("draft", &document).unwrap();

    let mut first = cache.get("draft").unwrap().unwrap();
    first
        .add_track(TrackType::Text, Some("extra"), TrackOptions::default())
        .unwrap()
        .add_segment(
            TextSegment::new("Later", common::range(20, 2), TextStyle::default()).unwrap(),
            Some("extra"),
        )
        .unwrap();

    let second = cache.get("draft").unwrap().unwrap();
    assert_eq!(second.export(), document.export());
    assert_ne!(first.export(), second.export());
}

#[test]
fn test_cache_get_with_unknown_key_should_count_miss() {
    let cache = MemoryDraftCache::new("test", Duration::hours(1));
    assert!(cache.get("absent").unwrap().is_none());

    cache.put("present", &common::build_sample_document()).unwrap();
    assert!(cache.get("present").unwrap().is_some());

    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hit_rate(), 0.5);
}

#[test]
fn test_cache_put_should_replace_previous_entry() {
    let cache = MemoryDraftCache::default();
    cache.put("draft", &common::build_sample_document()).unwrap();
    let empty = cutdraft::Document::new(1080, 1920, 25);
    cache.put("draft", &empty).unwrap();

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get("draft").unwrap().unwrap().export(), empty.export());
}

#[test]
fn test_get_or_create_should_store_new_document_once() {
    let cache = MemoryDraftCache::new("test", Duration::hours(1));
    let created = cache.get_or_create("fresh", 1080, 1920, 30).unwrap();
    assert_eq!(created.export()["canvas_config"]["width"], json!(1080));
    assert_eq!(cache.len(), 1);

    let again = cache.get_or_create("fresh", 1920, 1080, 60).unwrap();
    assert_eq!(again.export()["canvas_config"]["width"], json!(1080));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_cache_remove_and_clear_should_drop_entries() {
    let cache = MemoryDraftCache::new("test", Duration::hours(1));
    cache.put("a", &common::build_sample_document()).unwrap();
    cache.put("b", &common::build_sample_document()).unwrap();

    assert!(cache.remove("a"));
    assert!(!cache.remove("a"));
    assert_eq!(cache.len(), 1);

    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.stats().hits + cache.stats().misses, 0);
}

#[test]
fn test_queue_should_run_one_task_at_a_time() {
    let mut queue = ExportQueue::new(3);
    let first = queue.submit("draft_a", json!({ "resolution": 1080 }));
    let second = queue.submit("draft_b", json!({}));
    assert_eq!(queue.pending_len(), 2);

    let running = queue.next_task().unwrap().task_id.clone();
    assert_eq!(running, first);
    assert_eq!(queue.status(&first), Some(&TaskStatus::Running));
    assert!(queue.next_task().is_none());

    queue.complete(&first).unwrap();
    assert_eq!(queue.status(&first), Some(&TaskStatus::Completed));

    let next = queue.next_task().unwrap();
    assert_eq!(next.task_id, second);
    assert_eq!(next.draft_key, "draft_b");
}

#[test]
fn test_queue_fail_should_retry_until_limit() {
    let mut queue = ExportQueue::new(3);
    let task_id = queue.submit("draft", json!({}));

    for attempt in 1..=3 {
        queue.next_task().unwrap();
        let status = queue.fail(&task_id, "render crashed").unwrap();
        assert_eq!(status, TaskStatus::Pending, "attempt {}", attempt);
        assert_eq!(queue.task(&task_id).unwrap().retries, attempt);
    }

    queue.next_task().unwrap();
    let status = queue.fail(&task_id, "render crashed").unwrap();
    assert_eq!(status, TaskStatus::Failed("render crashed".to_string()));
    assert_eq!(queue.pending_len(), 0);
    assert!(queue.next_task().is_none());
}

#[test]
fn test_queue_fail_with_idle_task_should_error() {
    let mut queue = ExportQueue::default();
    let task_id = queue.submit("draft", json!({}));
    assert!(queue.fail(&task_id, "nope").is_err());
    assert_eq!(queue.status(&task_id), Some(&TaskStatus::Pending));
}

#[test]
fn test_queue_purge_finished_should_keep_live_tasks() {
    let mut queue = ExportQueue::new(0);
    let done = queue.submit("a", json!({}));
    let failed = queue.submit("b", json!({}));
    let running = queue.submit("c", json!({}));
    let waiting = queue.submit("d", json!({}));

    queue.next_task().unwrap();
    queue.complete(&done).unwrap();
    queue.next_task().unwrap();
    assert_eq!(
        queue.fail(&failed, "disk full").unwrap(),
        TaskStatus::Failed("disk full".to_string())
    );
    queue.next_task().unwrap();

    assert_eq!(queue.purge_finished(), 2);
    assert!(queue.status(&done).is_none());
    assert!(queue.status(&failed).is_none());
    assert_eq!(queue.status(&running), Some(&TaskStatus::Running));
    assert_eq!(queue.status(&waiting), Some(&TaskStatus::Pending));
    assert_eq!(queue.purge_finished(), 0);

    queue.complete(&running).unwrap();
    assert_eq!(queue.next_task().unwrap().task_id, waiting);
}

#[test]
fn test_uploader_should_write_file_and_return_file_url() {
    let dir = common::create_temp_dir().unwrap();
    let uploader = LocalDirUploader::new(dir.path());
    let document = common::build_sample_document();
    let bytes = document.dumps().unwrap().into_bytes();

    let url = uploader.upload("draft_content.json", &bytes).unwrap();
    assert_eq!(url.scheme(), "file");
    let path = url.to_file_path().unwrap();
    assert_eq!(std::fs::read(path).unwrap(), bytes);
}
