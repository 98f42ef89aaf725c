//! Data models for the BaseCard backend.
//!
//! Field names match the Mini App's JSON contract.

mod card;
mod collection;
mod metadata;
mod program;
mod quest;

pub use card::*;
pub use collection::*;
pub use metadata::*;
pub use program::*;
pub use quest::*;
