pub mod application;
pub mod commands;
pub mod git;
pub mod package;
pub mod repository;
pub mod runtime;
pub mod version;
