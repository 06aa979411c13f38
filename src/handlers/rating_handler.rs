//! Rate Joke Handler
//!
//! Folds one star rating into a joke's running average.

use std::sync::Arc;

use crate::domain::{OperationContext, StatDomain};
use crate::error::AppError;
use crate::store::DocumentStore;
use crate::updater::{AggregateStatUpdater, ApplyOptions, UpdateMode};

use super::{rating_key, RateJokeCommand, RateJokeResult};

/// Handler for star ratings
pub struct RateJokeHandler {
    store: Arc<dyn DocumentStore>,
    updater: AggregateStatUpdater,
    mode: UpdateMode,
}

impl RateJokeHandler {
    pub fn new(store: Arc<dyn DocumentStore>, mode: UpdateMode, options: ApplyOptions) -> Self {
        Self {
            store,
            updater: AggregateStatUpdater::new(StatDomain::STAR_RATING).with_options(options),
            mode,
        }
    }

    /// Execute the rate command
    pub async fn execute(
        &self,
        command: RateJokeCommand,
        context: &OperationContext,
    ) -> Result<RateJokeResult, AppError> {
        let key = rating_key(&command.joke_id)?;

        let next = self
            .updater
            .apply(&*self.store, &key, command.rating, self.mode)
            .await?;

        tracing::info!(
            joke_id = %command.joke_id,
            rating = command.rating,
            average = next.value,
            count = next.count,
            mode = %self.mode,
            user = ?context.request_user_id,
            correlation_id = ?context.correlation_id,
            "Joke rated"
        );

        Ok(RateJokeResult {
            joke_id: command.joke_id,
            value: next.value,
            count: next.count,
        })
    }
}
