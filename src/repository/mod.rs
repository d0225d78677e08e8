//! A single managed repository: identity, on-disk layout and lifecycle.

mod error;
mod kind;
mod manager;
mod url;

pub use error::{RepositoryError, Result};
pub use kind::RepositoryType;
pub use manager::{COMPONENTS_DIR, RepositoryManager};
pub use url::{slug, unique_id};

pub use crate::version::UpdateStrategy;
