//! Wallet aggregate: one currency balance per user.

mod aggregate;
mod events;

pub use aggregate::Wallet;
pub use events::{
    FundsCreditedData, FundsDebitedData, FundsDepositedData, WalletEvent, WalletOpenedData,
};
