use super::domain::QuestionnaireAnswers;

/// Validation errors raised before answers reach the engine.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum IntakeError {
    #[error("investment amount must be a finite, non-negative number (found {0})")]
    InvalidInvestmentAmount(f64),
    #[error("goal {goal_id:?} has invalid target amount {amount}")]
    InvalidGoalTarget { goal_id: String, amount: f64 },
    #[error("goal {goal_id:?} has invalid progress {progress}")]
    InvalidGoalProgress { goal_id: String, progress: f64 },
    #[error("goal at position {0} is missing an id")]
    MissingGoalId(usize),
    #[error("too many goals supplied (max {max}, found {found})")]
    TooManyGoals { max: usize, found: usize },
}

const DEFAULT_MAX_GOALS: usize = 50;

/// Guard responsible for rejecting structurally unusable answers.
#[derive(Debug, Clone)]
pub struct AnswerGuard {
    max_goals: usize,
}

impl Default for AnswerGuard {
    fn default() -> Self {
        Self::with_max_goals(DEFAULT_MAX_GOALS)
    }
}

impl AnswerGuard {
    pub fn with_max_goals(max_goals: usize) -> Self {
        Self { max_goals }
    }

    pub fn max_goals(&self) -> usize {
        self.max_goals
    }

    pub fn check(&self, answers: &QuestionnaireAnswers) -> Result<(), IntakeError> {
        if !answers.investment_amount.is_finite() || answers.investment_amount < 0.0 {
            return Err(IntakeError::InvalidInvestmentAmount(answers.investment_amount));
        }

        if answers.goals.len() > self.max_goals {
            return Err(IntakeError::TooManyGoals {
                max: self.max_goals,
                found: answers.goals.len(),
            });
        }

        for (position, goal) in answers.goals.iter().enumerate() {
            if goal.id.trim().is_empty() {
                return Err(IntakeError::MissingGoalId(position));
            }
            if !goal.target_amount.is_finite() || goal.target_amount <= 0.0 {
                return Err(IntakeError::InvalidGoalTarget {
                    goal_id: goal.id.clone(),
                    amount: goal.target_amount,
                });
            }
            if let Some(progress) = goal.current_progress {
                if !progress.is_finite() || progress < 0.0 {
                    return Err(IntakeError::InvalidGoalProgress {
                        goal_id: goal.id.clone(),
                        progress,
                    });
                }
            }
        }

        Ok(())
    }
}
