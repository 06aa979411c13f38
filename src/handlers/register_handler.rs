//! Register Joke Handler
//!
//! Creates the empty rating and battle statistics of a newly submitted joke.

use std::sync::Arc;

use crate::domain::{OperationContext, StatDomain};
use crate::error::AppError;
use crate::store::DocumentStore;
use crate::updater::AggregateStatUpdater;

use super::{battle_key, rating_key, RegisterJokeCommand, RegisterJokeResult};

/// Handler for joke registration
pub struct RegisterJokeHandler {
    store: Arc<dyn DocumentStore>,
    ratings: AggregateStatUpdater,
    battles: AggregateStatUpdater,
}

impl RegisterJokeHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            ratings: AggregateStatUpdater::new(StatDomain::STAR_RATING),
            battles: AggregateStatUpdater::new(StatDomain::BATTLE_OUTCOME),
        }
    }

    /// Execute the register command
    pub async fn execute(
        &self,
        command: RegisterJokeCommand,
        context: &OperationContext,
    ) -> Result<RegisterJokeResult, AppError> {
        let rating_key = rating_key(&command.joke_id)?;
        let battle_key = battle_key(&command.joke_id)?;

        // A registration interrupted between the two writes leaves one stat
        // behind; a retry keeps it and creates the other.
        let (rating, rating_created) = self.ratings.ensure(&*self.store, &rating_key).await?;
        let (battle, battle_created) = self.battles.ensure(&*self.store, &battle_key).await?;

        if !rating_created && !battle_created {
            return Err(AppError::AlreadyExists(rating_key));
        }

        tracing::info!(
            joke_id = %command.joke_id,
            correlation_id = ?context.correlation_id,
            "Joke stats registered"
        );

        Ok(RegisterJokeResult {
            joke_id: command.joke_id,
            rating,
            battle,
        })
    }
}
