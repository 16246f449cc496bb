//! Wallet aggregate implementation.

use common::{AggregateId, UserId};
use event_store::Version;

use crate::aggregate::Aggregate;
use crate::error::CommerceError;
use crate::value_objects::Money;

use super::WalletEvent;

/// A user's stored balance.
///
/// The balance never goes below zero: debits larger than the balance are
/// rejected before any event is produced.
#[derive(Debug, Clone, Default)]
pub struct Wallet {
    id: Option<AggregateId>,
    version: Version,
    owner: Option<UserId>,
    balance: Money,
}

impl Aggregate for Wallet {
    type Event = WalletEvent;
    type Error = CommerceError;

    fn aggregate_type() -> &'static str {
        "Wallet"
    }

    fn id(&self) -> Option<AggregateId> {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            WalletEvent::WalletOpened(data) => {
                self.id = Some(data.wallet_id);
                self.owner = Some(data.owner);
                self.balance = Money::zero();
            }
            WalletEvent::FundsDeposited(data) => self.balance += data.amount,
            WalletEvent::FundsDebited(data) => self.balance -= data.amount,
            WalletEvent::FundsCredited(data) => self.balance += data.amount,
        }
    }
}

// Query methods
impl Wallet {
    pub fn owner(&self) -> Option<UserId> {
        self.owner
    }

    pub fn balance(&self) -> Money {
        self.balance
    }
}

// Command methods (return events)
impl Wallet {
    /// Opens the wallet for `owner` with a zero balance.
    pub fn open(
        &self,
        wallet_id: AggregateId,
        owner: UserId,
    ) -> Result<Vec<WalletEvent>, CommerceError> {
        if self.id.is_some() {
            return Err(CommerceError::invalid_input("wallet already opened"));
        }
        Ok(vec![WalletEvent::opened(wallet_id, owner)])
    }

    /// Adds funds. The amount must be strictly positive.
    pub fn deposit(&self, amount: Money) -> Result<Vec<WalletEvent>, CommerceError> {
        self.ensure_open()?;
        if !amount.is_positive() {
            return Err(CommerceError::InvalidAmount { amount });
        }
        let balance = self.add_to_balance(amount)?;
        Ok(vec![WalletEvent::deposited(amount, balance)])
    }

    /// Takes funds for a purchase.
    ///
    /// A zero amount is accepted so that free checkouts still leave a trace
    /// on the wallet.
    pub fn debit(
        &self,
        purchase_id: AggregateId,
        amount: Money,
    ) -> Result<Vec<WalletEvent>, CommerceError> {
        self.ensure_open()?;
        if amount.is_negative() {
            return Err(CommerceError::InvalidAmount { amount });
        }
        if self.balance < amount {
            return Err(CommerceError::InsufficientFunds {
                balance: self.balance,
                required: amount,
            });
        }
        Ok(vec![WalletEvent::debited(
            purchase_id,
            amount,
            self.balance - amount,
        )])
    }

    /// Returns funds from a refunded purchase. There is no upper bound.
    pub fn credit(
        &self,
        purchase_id: AggregateId,
        amount: Money,
    ) -> Result<Vec<WalletEvent>, CommerceError> {
        self.ensure_open()?;
        if amount.is_negative() {
            return Err(CommerceError::InvalidAmount { amount });
        }
        let balance = self.add_to_balance(amount)?;
        Ok(vec![WalletEvent::credited(purchase_id, amount, balance)])
    }

    fn add_to_balance(&self, amount: Money) -> Result<Money, CommerceError> {
        self.balance
            .checked_add(amount)
            .ok_or(CommerceError::AmountOverflow {
                current: self.balance,
                amount,
            })
    }
}
