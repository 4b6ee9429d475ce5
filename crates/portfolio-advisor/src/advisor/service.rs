use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use super::config::AdvisorConfig;
use super::domain::QuestionnaireAnswers;
use super::engine::{AdvisorEngine, Recommendation};
use super::intake::{AnswerGuard, IntakeError};

/// Service composing the answer guard and the advisor engine.
pub struct RecommendationService {
    guard: Arc<AnswerGuard>,
    engine: Arc<AdvisorEngine>,
}

impl Default for RecommendationService {
    fn default() -> Self {
        Self::new(AdvisorConfig::default())
    }
}

impl RecommendationService {
    pub fn new(config: AdvisorConfig) -> Self {
        Self::with_guard(AnswerGuard::default(), config)
    }

    pub fn with_guard(guard: AnswerGuard, config: AdvisorConfig) -> Self {
        Self {
            guard: Arc::new(guard),
            engine: Arc::new(AdvisorEngine::new(config)),
        }
    }

    pub fn engine(&self) -> &AdvisorEngine {
        &self.engine
    }

    /// Validate the answers and produce a recommendation anchored at `today`.
    pub fn recommend(
        &self,
        answers: &QuestionnaireAnswers,
        today: NaiveDate,
    ) -> Result<Recommendation, RecommendationError> {
        self.guard.check(answers)?;
        let recommendation = self.engine.recommend(answers, today);

        info!(
            risk_level = %recommendation.risk_level,
            risk_score = recommendation.risk_score,
            equity = recommendation.allocation.equity_total(),
            warnings = recommendation.behavioral_warnings.len(),
            goals = answers.goals.len(),
            "recommendation generated"
        );

        Ok(recommendation)
    }
}

/// Error raised by the recommendation service.
#[derive(Debug, thiserror::Error)]
pub enum RecommendationError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
}
