//! Domain layer of the game store.
//!
//! This crate provides:
//! - Aggregate and DomainEvent traits, and the CommandHandler that loads
//!   and persists single aggregates
//! - UnitOfWork, which commits several aggregates as one unit
//! - The Wallet, Cart, Library and PurchaseRecord aggregates
//! - The catalog and user directory collaborators

pub mod aggregate;
pub mod cart;
pub mod catalog;
pub mod command;
pub mod error;
pub mod library;
pub mod purchase;
pub mod unit_of_work;
pub mod users;
pub mod value_objects;
pub mod wallet;

pub use aggregate::{Aggregate, DomainEvent};
pub use cart::{Cart, CartEvent};
pub use catalog::{Catalog, CatalogItem, GameUpdate, InMemoryCatalog, NewGame};
pub use command::{CommandHandler, CommandResult};
pub use common::{AggregateId, GameId, UserId};
pub use error::{CommerceError, DomainError};
pub use library::{Library, LibraryEntry, LibraryEvent};
pub use purchase::{PurchaseEvent, PurchaseRecord};
pub use unit_of_work::UnitOfWork;
pub use users::{InMemoryUserDirectory, UserDirectory, UserRef};
pub use value_objects::{CatalogItemRef, Money, checked_total_of, total_of};
pub use wallet::{Wallet, WalletEvent};
