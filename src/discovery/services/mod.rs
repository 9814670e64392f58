//! Application services orchestrating discovery operations.

mod error;
mod export;
mod notes;
mod sessions;

pub use error::{DiscoveryServiceError, DiscoveryServiceResult};
pub use export::{DiscoveryExportService, ExportPayload};
pub use notes::{AddNoteRequest, DiscoveryNoteService, NoteChanges};
pub use sessions::{CreateSessionRequest, DiscoverySessionService, SaveResponseRequest};
