use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::allocation::{
    AllocationCalculator, BaseSplit, EquitySplit, GoalTiltStrategy, SafetySplit,
};
use super::config::AdvisorConfig;
use super::consistency::{BehavioralWarning, ConsistencyValidator};
use super::context::InferredContext;
use super::domain::{Allocation, AssetClass, Mix, QuestionnaireAnswers, Signal};
use super::goals::{GoalAnalysis, GoalAnalyzer};
use super::plan::{build_plan, PlanSummary};
use super::rationale::{RationaleGenerator, RationaleInput};
use super::risk::{classify, RiskLevel, RiskProfile};
use super::signals::SignalProcessor;
use super::stress::{StressTestReport, StressTester};

/// Intermediate values from every allocation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationStages {
    pub base_split: BaseSplit,
    pub equity_split: EquitySplit,
    pub safety_split: SafetySplit,
    pub base_mix: Mix,
    pub goal_strategy: GoalTiltStrategy,
    pub after_goals: Allocation,
    pub after_exclusions: Allocation,
    pub reclaimed_from_exclusions: u32,
    pub after_insurance: Allocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineNotice {
    /// No class could absorb the excluded weight; the pre-exclusion allocation was kept.
    ExclusionFallback { excluded: Vec<AssetClass> },
}

/// Aggregate result of one recommendation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub allocation: Allocation,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub risk_profile: RiskProfile,
    pub behavioral_warnings: Vec<BehavioralWarning>,
    pub consistency_score: u32,
    pub signals: Vec<Signal>,
    pub rationale: Vec<String>,
    pub stress_test: StressTestReport,
    pub stages: AllocationStages,
    pub context: InferredContext,
    pub plan: PlanSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_analysis: Option<GoalAnalysis>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<EngineNotice>,
}

/// Stateless orchestrator over the injected advisor tables. Safe to share across threads.
pub struct AdvisorEngine {
    config: AdvisorConfig,
    signals: SignalProcessor,
    calculator: AllocationCalculator,
    goals: GoalAnalyzer,
    stress: StressTester,
    rationale: RationaleGenerator,
    consistency: ConsistencyValidator,
}

impl Default for AdvisorEngine {
    fn default() -> Self {
        Self::new(AdvisorConfig::default())
    }
}

impl AdvisorEngine {
    pub fn new(config: AdvisorConfig) -> Self {
        Self {
            signals: SignalProcessor::new(),
            calculator: AllocationCalculator::new(config.risk_scoring.clone()),
            goals: GoalAnalyzer::new(),
            stress: StressTester::new(config.stress_scenarios.clone()),
            rationale: RationaleGenerator::new(),
            consistency: ConsistencyValidator::new(config.consistency.clone()),
            config,
        }
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    pub fn recommend(&self, answers: &QuestionnaireAnswers, today: NaiveDate) -> Recommendation {
        let context = InferredContext::infer(answers);
        let signals = self.signals.calculate_signals(answers, today);

        let base_split = self.calculator.calculate_dynamic_base(&signals);
        debug!(
            equity_base = base_split.equity_base,
            safety_base = base_split.safety_base,
            risk_score = base_split.risk_score,
            signal_count = signals.len(),
            "computed base split"
        );

        let equity_split =
            self.calculator
                .split_equity_category(base_split.equity_base, answers, &context);
        let safety_split =
            self.calculator
                .split_safety_category(base_split.safety_base, answers, &context);
        let base_mix = self.calculator.base_mix(&equity_split, &safety_split);

        let goal_strategy = GoalTiltStrategy::select(answers, today);
        let after_goals = self
            .calculator
            .apply_goal_adjustments(&base_mix, &goal_strategy);
        debug!(?goal_strategy, allocation = ?after_goals, "applied goal tilts");

        let mut notices = Vec::new();
        let exclusion = self
            .calculator
            .handle_avoided_assets(&after_goals, &answers.avoid_assets);
        if exclusion.fallback {
            warn!(
                excluded = ?answers.avoid_assets,
                "no eligible class for excluded weight, keeping pre-exclusion allocation"
            );
            notices.push(EngineNotice::ExclusionFallback {
                excluded: answers.avoid_assets.clone(),
            });
        }

        let after_insurance = self
            .calculator
            .apply_insurance_logic(&exclusion.allocation, answers);
        debug!(allocation = ?after_insurance, "final allocation");

        let risk_profile = classify(base_split.risk_score, &self.config.risk_bands);
        let stress_test = self.stress.run(&after_insurance, answers);
        let consistency = self.consistency.validate(answers, &context);

        let rationale = self.rationale.generate(&RationaleInput {
            allocation: &after_insurance,
            signals: &signals,
            answers,
            context: &context,
            risk_level: risk_profile.level,
            warnings: &consistency.warnings,
            today,
        });

        let plan = build_plan(&after_insurance, risk_profile.level, answers, &context);
        let goal_analysis = answers
            .goals
            .iter()
            .any(|goal| goal.is_active)
            .then(|| self.goals.analyze(&answers.goals, today));

        Recommendation {
            allocation: after_insurance.clone(),
            risk_score: base_split.risk_score,
            risk_level: risk_profile.level,
            risk_profile,
            behavioral_warnings: consistency.warnings,
            consistency_score: consistency.score,
            signals,
            rationale,
            stress_test,
            stages: AllocationStages {
                base_split,
                equity_split,
                safety_split,
                base_mix,
                goal_strategy,
                after_goals,
                after_exclusions: exclusion.allocation,
                reclaimed_from_exclusions: exclusion.reclaimed,
                after_insurance,
            },
            context,
            plan,
            goal_analysis,
            notices,
        }
    }
}
