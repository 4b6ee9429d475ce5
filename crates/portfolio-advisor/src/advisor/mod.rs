//! Rule-based allocation advisor: questionnaire answers in, a rounded, stress-tested and
//! explained asset mix out.
//!
//! The engine is a pure synchronous computation. Every date-dependent rule reads an explicit
//! `today` so identical inputs always produce identical output.

pub mod allocation;
pub mod config;
pub mod consistency;
pub mod context;
pub mod domain;
pub mod engine;
pub mod goals;
pub(crate) mod intake;
pub mod plan;
pub mod rationale;
pub mod risk;
pub mod router;
pub mod service;
pub mod signals;
pub mod stress;

#[cfg(test)]
mod tests;

pub use allocation::{
    normalize_largest_remainder, AllocationCalculator, BaseSplit, ExclusionOutcome,
    GoalTiltStrategy,
};
pub use config::{
    AdvisorConfig, AdvisorTablesError, ConsistencyPenalties, MarketIndex, RiskBand,
    RiskScoringConfig, StressScenario,
};
pub use consistency::{BehavioralWarning, ConsistencyValidator, Severity, WarningCategory};
pub use context::{GoalFocus, InferredContext, LiquidityNeeds};
pub use domain::{
    AgeBand, Allocation, AssetClass, Dependents, EmergencyFundCoverage, Goal, GoalCategory,
    IncomeBand, InvestmentHorizon, InvestmentKnowledge, LegacyGoal, LossTolerance, Mix, Priority,
    QuestionnaireAnswers, Signal, VolatilityComfort,
};
pub use engine::{AdvisorEngine, AllocationStages, EngineNotice, Recommendation};
pub use goals::{GoalAnalysis, GoalAnalyzer};
pub use intake::{AnswerGuard, IntakeError};
pub use plan::{ComfortBand, PlanSummary};
pub use risk::{RiskLevel, RiskProfile};
pub use router::{recommendation_router, RecommendationRequest};
pub use service::{RecommendationError, RecommendationService};
pub use signals::SignalProcessor;
pub use stress::{ScenarioOutcome, StressTestReport, StressTester};
