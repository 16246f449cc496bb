//! Library aggregate: the games a user owns.

mod aggregate;
mod events;

pub use aggregate::{Library, LibraryEntry};
pub use events::{GamesGrantedData, GamesRevokedData, LibraryEvent, LibraryOpenedData};
