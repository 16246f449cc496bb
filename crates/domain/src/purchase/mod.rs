//! Purchase record aggregate: the receipt of one checkout.

mod aggregate;
mod events;

pub use aggregate::PurchaseRecord;
pub use events::{PurchaseCompletedData, PurchaseEvent, PurchaseRefundedData};
