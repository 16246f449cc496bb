//! Read model views for the query side.

pub mod purchase_history;

pub use purchase_history::{PurchaseHistoryView, PurchaseSummary};
