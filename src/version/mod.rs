//! Version parsing and resolution.

mod resolver;
mod strategy;
mod tag;

pub use resolver::VersionResolver;
pub use strategy::UpdateStrategy;
pub use tag::{Identifier, ParsedTag, TagVersion};
