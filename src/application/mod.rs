//! Application layer - use cases built on top of the repository manager.
//!
//! - [`SharedRepositoryManager`] serializes access to one repository and
//!   offloads blocking work.
//! - [`SetupFlow`] performs the first installation and cleans up on failure.
//! - [`UpdateEntity`] reports and switches versions of an installed repository.

mod operations;
mod setup;
mod update;

pub use operations::{RepositoryOperations, SharedRepositoryManager};
pub use setup::{SetupError, SetupErrorKind, SetupFlow, SetupOutcome};
pub use update::{RestartRequired, SHORT_HASH_LEN, UpdateEntity, UpdateError, UpdateStatus, display_version};

#[cfg(test)]
pub use operations::MockRepositoryOperations;
