/*!
 * In-process stand-ins for the services around the document model.
 *
 * The request layer keeps documents in a cache between calls, hands finished
 * drafts to an export queue and uploads rendered files. Only the contracts
 * matter to the model; the implementations here keep everything in memory
 * or on the local disk.
 */

pub mod cache;
pub mod queue;
pub mod upload;

pub use cache::{CacheStats, DraftCache, MemoryDraftCache};
pub use queue::{ExportQueue, ExportTask, TaskStatus};
pub use upload::{LocalDirUploader, Uploader};
