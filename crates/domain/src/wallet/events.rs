//! Wallet domain events.

use common::{AggregateId, UserId};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;
use crate::value_objects::Money;

/// Events that can occur on a wallet aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum WalletEvent {
    /// Wallet was opened with a zero balance.
    WalletOpened(WalletOpenedData),

    /// User added funds.
    FundsDeposited(FundsDepositedData),

    /// A checkout took funds.
    FundsDebited(FundsDebitedData),

    /// A refund returned funds.
    FundsCredited(FundsCreditedData),
}

impl DomainEvent for WalletEvent {
    fn event_type(&self) -> &'static str {
        match self {
            WalletEvent::WalletOpened(_) => "WalletOpened",
            WalletEvent::FundsDeposited(_) => "FundsDeposited",
            WalletEvent::FundsDebited(_) => "FundsDebited",
            WalletEvent::FundsCredited(_) => "FundsCredited",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletOpenedData {
    pub wallet_id: AggregateId,
    pub owner: UserId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundsDepositedData {
    pub amount: Money,

    /// Balance after the deposit.
    pub balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundsDebitedData {
    /// The purchase that was paid for.
    pub purchase_id: AggregateId,
    pub amount: Money,
    pub balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundsCreditedData {
    /// The refunded purchase.
    pub purchase_id: AggregateId,
    pub amount: Money,
    pub balance: Money,
}

impl WalletEvent {
    pub fn opened(wallet_id: AggregateId, owner: UserId) -> Self {
        WalletEvent::WalletOpened(WalletOpenedData { wallet_id, owner })
    }

    pub fn deposited(amount: Money, balance: Money) -> Self {
        WalletEvent::FundsDeposited(FundsDepositedData { amount, balance })
    }

    pub fn debited(purchase_id: AggregateId, amount: Money, balance: Money) -> Self {
        WalletEvent::FundsDebited(FundsDebitedData {
            purchase_id,
            amount,
            balance,
        })
    }

    pub fn credited(purchase_id: AggregateId, amount: Money, balance: Money) -> Self {
        WalletEvent::FundsCredited(FundsCreditedData {
            purchase_id,
            amount,
            balance,
        })
    }
}
