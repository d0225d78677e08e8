//! CLI command handlers.

pub mod config;
mod paths;

mod add;
mod check;
mod list;
mod remove;
mod strategy;
mod update;

pub use add::add;
pub use check::check;
pub use config::Config;
pub use list::list;
pub use paths::{Paths, default_root, resolve_root};
pub use remove::remove;
pub use strategy::strategy;
pub use update::update;
