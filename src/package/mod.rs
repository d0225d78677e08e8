//! Persisted configuration of managed repositories.

mod entry;
mod store;

pub use entry::PackageEntry;
pub use store::PackageStore;
