pub mod document_model;
pub mod export_model;
pub mod grant_model;

pub use document_model::{DocumentEntry, PendingWrite, SelectedDocument};
pub use export_model::{ExportOutcome, ExportPhase};
pub use grant_model::{DirectoryHandle, GrantFlags};
