// src/store/mod.rs
// =============================================================================
// Everything the crawler persists under the output directory.
//
// Submodules:
// - checkpoint: _progress/progress.json (resume state)
// - output: one text file per crawled page
// - credentials: .key + .config (encrypted login)
// =============================================================================

mod checkpoint;
mod credentials;
mod output;

pub use checkpoint::CheckpointStore;
pub use credentials::CredentialStore;
pub use output::ContentWriter;
