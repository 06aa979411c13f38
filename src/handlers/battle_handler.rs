//! Battle Vote Handler
//!
//! Records a joke battle as a win (1.0) for one joke and a loss (0.0) for the
//! other. Each joke's battle stat is a running win rate.

use std::sync::Arc;

use crate::domain::{DomainError, OperationContext, StatDomain};
use crate::error::AppError;
use crate::store::DocumentStore;
use crate::updater::{AggregateStatUpdater, ApplyOptions, UpdateMode};

use super::{battle_key, BattleVoteCommand, BattleVoteResult};

const WIN: f64 = 1.0;
const LOSS: f64 = 0.0;

/// Handler for battle votes
pub struct BattleVoteHandler {
    store: Arc<dyn DocumentStore>,
    updater: AggregateStatUpdater,
    mode: UpdateMode,
}

impl BattleVoteHandler {
    pub fn new(store: Arc<dyn DocumentStore>, mode: UpdateMode, options: ApplyOptions) -> Self {
        Self {
            store,
            updater: AggregateStatUpdater::new(StatDomain::BATTLE_OUTCOME).with_options(options),
            mode,
        }
    }

    /// Execute the vote command
    ///
    /// The two stats are independent records: the winner's update lands even
    /// if the loser's fails afterwards.
    pub async fn execute(
        &self,
        command: BattleVoteCommand,
        context: &OperationContext,
    ) -> Result<BattleVoteResult, AppError> {
        if command.winner_id == command.loser_id {
            return Err(DomainError::SelfBattle(command.winner_id).into());
        }

        let winner_key = battle_key(&command.winner_id)?;
        let loser_key = battle_key(&command.loser_id)?;

        let winner = self
            .updater
            .apply(&*self.store, &winner_key, WIN, self.mode)
            .await?;

        let loser = match self
            .updater
            .apply(&*self.store, &loser_key, LOSS, self.mode)
            .await
        {
            Ok(stat) => stat,
            Err(e) => {
                tracing::warn!(
                    winner = %command.winner_id,
                    loser = %command.loser_id,
                    correlation_id = ?context.correlation_id,
                    "Winner recorded but loser update failed: {}",
                    e
                );
                return Err(e.into());
            }
        };

        tracing::info!(
            winner = %command.winner_id,
            loser = %command.loser_id,
            winner_rate = winner.value,
            loser_rate = loser.value,
            correlation_id = ?context.correlation_id,
            "Battle vote recorded"
        );

        Ok(BattleVoteResult { winner, loser })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::RunningStat;
    use crate::store::InMemoryStore;

    fn handler(store: Arc<InMemoryStore>) -> BattleVoteHandler {
        BattleVoteHandler::new(
            store,
            UpdateMode::Strict,
            ApplyOptions::default().with_base_delay(Duration::ZERO),
        )
    }

    #[tokio::test]
    async fn test_battle_vote_updates_win_rates() {
        let store = Arc::new(InMemoryStore::new());
        store.insert("jokes/a/battle", RunningStat::new(0.0, 0)).await;
        store.insert("jokes/b/battle", RunningStat::new(1.0, 1)).await;

        let result = handler(store)
            .execute(BattleVoteCommand::new("a", "b"), &OperationContext::new())
            .await
            .unwrap();

        assert_eq!(result.winner, RunningStat::new(1.0, 1));
        assert_eq!(result.loser, RunningStat::new(0.5, 2));
    }

    #[tokio::test]
    async fn test_self_battle_is_rejected() {
        let store = Arc::new(InMemoryStore::new());

        let result = handler(store.clone())
            .execute(BattleVoteCommand::new("a", "a"), &OperationContext::new())
            .await;

        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::SelfBattle(_)))
        ));
        assert_eq!(store.counters().reads, 0);
    }

    #[tokio::test]
    async fn test_missing_loser_keeps_winner_update() {
        let store = Arc::new(InMemoryStore::new());
        store.insert("jokes/a/battle", RunningStat::new(0.0, 0)).await;

        let result = handler(store.clone())
            .execute(BattleVoteCommand::new("a", "ghost"), &OperationContext::new())
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(
            store.get("jokes/a/battle").await.unwrap().stat,
            RunningStat::new(1.0, 1)
        );
    }
}
