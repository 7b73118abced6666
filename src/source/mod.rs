//! Document sources that resolve a section name to its raw document.

mod blob;
mod directory;
pub mod document;
mod remote;
mod single_file;
mod source_trait;

pub use blob::{BlobError, BlobStore, Cipher, MemoryBlobStore};
pub use directory::DirectorySource;
pub use remote::{BucketPath, RemoteSource};
pub use single_file::{DocumentSnapshot, SingleFileSource};
pub use source_trait::DocumentSource;

/// File name used for a section's document.
pub fn section_file_name(section_name: &str) -> String {
    format!("{}.yml", section_name)
}
