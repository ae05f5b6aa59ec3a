pub mod changeset;
pub mod config;
pub mod engine;
pub mod error;
pub mod imports;
pub mod manifest;
pub mod normalize;
pub mod registry;
pub mod runner;
pub mod selector;
pub mod severity;
pub mod tier;
pub mod types;

pub use error::{Result, ReviewError};
