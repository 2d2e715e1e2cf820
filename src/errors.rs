/*!
 * Error types for the cutdraft library.
 *
 * Every fallible document operation returns a [`DraftError`]. Variants carry
 * the offending name, identifier, index or line so that callers can point at
 * the exact thing to fix. The CLI wraps these in [`AppError`].
 */

use thiserror::Error;

/// Errors raised by the document model and its template subsystem
#[derive(Error, Debug)]
pub enum DraftError {
    /// A time string could not be parsed
    #[error("Invalid time format: '{0}'")]
    InvalidTimeFormat(String),

    /// A subtitle timestamp did not match `HH:MM:SS,mmm`
    #[error("Invalid subtitle timestamp: '{0}'")]
    InvalidTimestamp(String),

    /// A time range with negative duration, or one exceeding its material
    #[error("Invalid time range: {0}")]
    InvalidRange(String),

    /// No track matched the lookup
    #[error("Track not found: {0}")]
    TrackNotFound(String),

    /// More than one track matched the lookup
    #[error("Ambiguous track: {0}")]
    AmbiguousTrack(String),

    /// A nameless track was requested while one of the same type already exists
    #[error("A track of type '{0}' already exists, a name is required for the new one")]
    DuplicateTrackType(String),

    /// The new segment intersects an existing one on the same track
    #[error("Segment [{start}, {end}) overlaps an existing segment on track '{track}'")]
    SegmentOverlap {
        /// Track the segment was added to
        track: String,
        /// Start of the rejected segment
        start: i64,
        /// End of the rejected segment
        end: i64,
    },

    /// An effect parameter list or option was rejected
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// No imported material matched the lookup
    #[error("Material not found: {0}")]
    MaterialNotFound(String),

    /// More than one imported material matched the lookup
    #[error("Ambiguous material: {0}")]
    AmbiguousMaterial(String),

    /// A track references materials missing from its source document
    #[error("Source document is missing referenced materials: {}", .0.join(", "))]
    MissingMaterial(Vec<String>),

    /// None of the extend policies could lengthen the segment
    #[error("Could not extend segment to {target} us, tried: {tried}")]
    ExtensionFailed {
        /// Required duration in micro-units
        target: i64,
        /// Policies that were attempted
        tried: String,
    },

    /// Replacement text count does not fit the text material
    #[error("Text count mismatch: {0}")]
    TextCountMismatch(String),

    /// Subtitle cue input is malformed
    #[error("Invalid subtitle format at line {line}: '{content}'")]
    InvalidSubtitleFormat {
        /// 1-based line number
        line: usize,
        /// Offending line content
        content: String,
    },

    /// Segment, track or material kinds are incompatible
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// Segment index outside of a track
    #[error("Segment index {index} out of range [0, {len})")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of segments on the track
        len: usize,
    },

    /// A loaded document is structurally unusable
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// `save` was called on a document without an origin path
    #[error("No save path set, the document was not loaded from a file")]
    NoSavePath,

    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the document model
    #[error("Draft error: {0}")]
    Draft(#[from] DraftError),

    /// Error in the configuration file
    #[error("Config error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
