//! Command handling infrastructure.

use std::marker::PhantomData;

use common::AggregateId;
use event_store::{EventStore, Version};

use crate::aggregate::Aggregate;
use crate::error::DomainError;
use crate::unit_of_work::UnitOfWork;

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult<A: Aggregate> {
    /// The aggregate after applying the new events.
    pub aggregate: A,

    /// The events that were generated and persisted.
    pub events: Vec<A::Event>,

    /// The new version of the aggregate after the command.
    pub new_version: Version,
}

/// Loads aggregates from the event store and runs single-aggregate commands
/// against them.
///
/// Operations spanning several aggregates load through the handlers and
/// commit through a [`UnitOfWork`] instead.
pub struct CommandHandler<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    store: S,
    _phantom: PhantomData<A>,
}

impl<S, A> Clone for CommandHandler<S, A>
where
    S: EventStore + Clone,
    A: Aggregate,
{
    fn clone(&self) -> Self {
        Self::new(self.store.clone())
    }
}

impl<S, A> CommandHandler<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    /// Creates a new command handler with the given event store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    /// Returns a reference to the underlying event store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads an aggregate by replaying its events.
    ///
    /// If the aggregate doesn't exist, returns a default instance.
    pub async fn load(&self, aggregate_id: AggregateId) -> Result<A, DomainError> {
        let events = self.store.get_events_for_aggregate(aggregate_id).await?;

        let mut aggregate = A::default();
        for envelope in events {
            let event: A::Event = envelope.decode()?;
            aggregate.apply(event);
            aggregate.set_version(envelope.version);
        }

        Ok(aggregate)
    }

    /// Loads an aggregate, returning None if it was never opened.
    pub async fn load_existing(&self, aggregate_id: AggregateId) -> Result<Option<A>, DomainError> {
        let aggregate = self.load(aggregate_id).await?;
        if aggregate.id().is_some() {
            Ok(Some(aggregate))
        } else {
            Ok(None)
        }
    }

    /// Executes a command and persists the resulting events.
    ///
    /// The command function receives the current aggregate state and returns
    /// either a list of events to apply, or an error.
    pub async fn execute<F>(
        &self,
        aggregate_id: AggregateId,
        command_fn: F,
    ) -> Result<CommandResult<A>, DomainError>
    where
        F: FnOnce(&A) -> Result<Vec<A::Event>, A::Error>,
        DomainError: From<A::Error>,
    {
        let mut aggregate = self.load(aggregate_id).await?;
        let current_version = aggregate.version();

        let events = command_fn(&aggregate)?;

        if events.is_empty() {
            return Ok(CommandResult {
                aggregate,
                events: vec![],
                new_version: current_version,
            });
        }

        let mut uow = UnitOfWork::new();
        uow.stage(aggregate_id, &aggregate, &events)?;
        let new_version = uow
            .commit(&self.store)
            .await?
            .pop()
            .unwrap_or(current_version);

        aggregate.apply_events(events.iter().cloned());
        aggregate.set_version(new_version);

        Ok(CommandResult {
            aggregate,
            events,
            new_version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommerceError;
    use crate::value_objects::Money;
    use crate::wallet::{Wallet, WalletEvent};
    use common::UserId;
    use event_store::InMemoryEventStore;

    #[tokio::test]
    async fn test_execute_creates_aggregate() {
        let store = InMemoryEventStore::new();
        let handler: CommandHandler<_, Wallet> = CommandHandler::new(store);
        let wallet_id = AggregateId::new();
        let owner = UserId::new();

        let result = handler
            .execute(wallet_id, |wallet| wallet.open(wallet_id, owner))
            .await
            .unwrap();

        assert_eq!(result.events.len(), 1);
        assert_eq!(result.new_version, Version::first());
        assert_eq!(result.aggregate.id(), Some(wallet_id));
        assert_eq!(result.aggregate.owner(), Some(owner));
    }

    #[tokio::test]
    async fn test_execute_updates_aggregate() {
        let store = InMemoryEventStore::new();
        let handler: CommandHandler<_, Wallet> = CommandHandler::new(store);
        let wallet_id = AggregateId::new();

        handler
            .execute(wallet_id, |wallet| wallet.open(wallet_id, UserId::new()))
            .await
            .unwrap();

        let result = handler
            .execute(wallet_id, |wallet| wallet.deposit(Money::from_cents(4200)))
            .await
            .unwrap();

        assert_eq!(result.new_version, Version::new(2));
        assert_eq!(result.aggregate.balance(), Money::from_cents(4200));

        let reloaded = handler.load(wallet_id).await.unwrap();
        assert_eq!(reloaded.balance(), Money::from_cents(4200));
        assert_eq!(reloaded.version(), Version::new(2));
    }

    #[tokio::test]
    async fn test_execute_returns_error_on_invalid_command() {
        let store = InMemoryEventStore::new();
        let handler: CommandHandler<_, Wallet> = CommandHandler::new(store.clone());
        let wallet_id = AggregateId::new();

        let result = handler
            .execute(wallet_id, |wallet| wallet.deposit(Money::from_cents(100)))
            .await;

        assert!(matches!(
            result,
            Err(DomainError::Commerce(CommerceError::NotFound { .. }))
        ));
        assert_eq!(store.event_count().await, 0);
    }

    #[tokio::test]
    async fn test_load_existing_returns_none_for_new() {
        let store = InMemoryEventStore::new();
        let handler: CommandHandler<_, Wallet> = CommandHandler::new(store);

        let result = handler.load_existing(AggregateId::new()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_empty_events_returns_without_persisting() {
        let store = InMemoryEventStore::new();
        let handler: CommandHandler<_, Wallet> = CommandHandler::new(store.clone());

        let result = handler
            .execute(AggregateId::new(), |_| Ok::<Vec<WalletEvent>, CommerceError>(vec![]))
            .await
            .unwrap();

        assert!(result.events.is_empty());
        assert_eq!(result.new_version, Version::initial());
        assert_eq!(store.event_count().await, 0);
    }
}
