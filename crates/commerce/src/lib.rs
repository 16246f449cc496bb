//! Store operations for the game store.
//!
//! This crate coordinates the domain aggregates into the operations users
//! see:
//! - [`AccountService`] registers users and opens their wallet, cart and library
//! - [`WalletLedger`] handles deposits and balance reads
//! - [`CartService`] adds and removes games
//! - [`CheckoutCoordinator`] turns a cart into a purchase in one commit
//! - [`RefundCoordinator`] reverses a purchase in one commit
//!
//! Every write for a user runs under that user's lock from [`UserLocks`].

pub mod accounts;
pub mod cart;
pub mod checkout;
pub mod context;
pub mod ledger;
pub mod library;
pub mod locks;
pub mod refund;
pub mod storefront;

pub use accounts::AccountService;
pub use cart::CartService;
pub use checkout::{CheckoutCoordinator, CheckoutPhase};
pub use context::StoreContext;
pub use ledger::WalletLedger;
pub use library::LibraryService;
pub use locks::{UserGuard, UserLocks};
pub use refund::RefundCoordinator;
pub use storefront::Storefront;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, domain::DomainError>;
