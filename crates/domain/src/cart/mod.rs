//! Cart aggregate: the games a user intends to buy.

mod aggregate;
mod events;

pub use aggregate::Cart;
pub use events::{CartClearedData, CartEvent, CartOpenedData, ItemAddedData, ItemRemovedData};
