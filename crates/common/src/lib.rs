//! Identifiers shared by every crate in the game store workspace.

mod types;

pub use types::{AggregateId, GameId, UserId};
