pub mod documents;
pub mod draft_store;
pub mod export;
pub mod uploader;

pub use documents::DraftDocument;
pub use draft_store::{
    DcDraftStore, DraftState, DraftStore, InvoiceDraftStore, LoadedDraft, PoDraftStore,
};
pub use uploader::{BatchUploader, PendingBatch};
