/*!
 * # cutdraft
 *
 * A library for building and editing draft projects of a desktop video
 * editor.
 *
 * ## Features
 *
 * - Typed tracks and segments with overlap-free placement
 * - Material registry with identifier-based references
 * - Canonical JSON export of the whole project
 * - Template mode: load an existing draft, import tracks from it and replace
 *   materials or text while keeping everything else as it was
 * - SRT subtitle import
 *
 * ## Architecture
 *
 * - `time_util`: micro-unit time values and ranges
 * - `materials`: material types, the effect catalog and the registry
 * - `segments`: segment builders for each track type
 * - `track`: authored tracks
 * - `template`: tracks carried over from a loaded draft, and retiming
 * - `document`: the draft document and its editing operations
 * - `subtitle`: SRT parsing
 * - `store`: in-process cache, export queue and uploader
 * - `app_config`: configuration management
 * - `errors`: error types
 */

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod app_config;
pub mod document;
pub mod errors;
pub mod materials;
pub mod segments;
pub mod store;
pub mod subtitle;
pub mod template;
pub mod time_util;
pub mod track;

pub use app_config::Config;
pub use document::{Document, ImportTrackOptions, SubtitleImportOptions, TrackOptions};
pub use errors::{AppError, DraftError};
pub use materials::{AudioMaterial, MaterialRegistry, MediaMaterial, VideoMaterial};
pub use segments::{AudioSegment, Segment, StickerSegment, TextSegment, VideoSegment};
pub use template::{ExtendMode, ShrinkMode, TrackHandle};
pub use time_util::{SEC, TimeRange, parse_time, timerange, trange};
pub use track::TrackType;
