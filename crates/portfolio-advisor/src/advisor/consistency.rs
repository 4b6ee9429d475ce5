use serde::{Deserialize, Serialize};

use super::config::ConsistencyPenalties;
use super::context::{pursues, GoalFocus, InferredContext};
use super::domain::{AgeBand, EmergencyFundCoverage, InvestmentHorizon, QuestionnaireAnswers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningCategory {
    RiskReward,
    Timeline,
    FinancialFoundation,
    Behavioral,
}

/// Contradiction found in the raw answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralWarning {
    pub severity: Severity,
    pub message: String,
    pub category: WarningCategory,
    pub suggested_action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisor_note: Option<String>,
}

type Predicate = fn(&QuestionnaireAnswers, &InferredContext) -> bool;

/// One predicate over the answers and the warning it raises.
#[derive(Clone)]
pub struct ConsistencyRule {
    pub predicate: Predicate,
    pub severity: Severity,
    pub category: WarningCategory,
    pub message: &'static str,
    pub suggested_action: &'static str,
    pub advisor_note: Option<&'static str>,
}

impl ConsistencyRule {
    fn warning(&self) -> BehavioralWarning {
        BehavioralWarning {
            severity: self.severity,
            message: self.message.to_string(),
            category: self.category,
            suggested_action: self.suggested_action.to_string(),
            advisor_note: self.advisor_note.map(str::to_string),
        }
    }
}

pub fn default_rules() -> Vec<ConsistencyRule> {
    vec![
        ConsistencyRule {
            predicate: |answers, _| {
                answers.investment_horizon == InvestmentHorizon::UnderTwoYears
                    && pursues(answers, GoalFocus::WealthBuilding)
            },
            severity: Severity::Warning,
            category: WarningCategory::Timeline,
            message: "Short horizon with long-term wealth building goal",
            suggested_action: "Discuss timeline alignment or goal adjustment",
            advisor_note: Some("Consider if client understands wealth building timelines"),
        },
        ConsistencyRule {
            predicate: |answers, _| {
                answers.emergency_fund_months == EmergencyFundCoverage::UpToOneMonth
                    && pursues(answers, GoalFocus::Retirement)
            },
            severity: Severity::Critical,
            category: WarningCategory::FinancialFoundation,
            message: "No emergency fund but planning for retirement",
            suggested_action: "Prioritize emergency fund before retirement planning",
            advisor_note: Some("Financial foundation must come first"),
        },
        ConsistencyRule {
            predicate: |answers, _| {
                answers.age == AgeBand::Over65
                    && answers.investment_horizon == InvestmentHorizon::OverTwentyYears
            },
            severity: Severity::Warning,
            category: WarningCategory::Timeline,
            message: "Senior age with very long investment horizon",
            suggested_action: "Verify timeline expectations and health considerations",
            advisor_note: Some("May indicate unrealistic expectations or family planning"),
        },
        ConsistencyRule {
            predicate: |answers, context| {
                context.has_frequent_liquidity_needs() && pursues(answers, GoalFocus::WealthBuilding)
            },
            severity: Severity::Warning,
            category: WarningCategory::Behavioral,
            message: "Frequent liquidity needs may conflict with long-term wealth building",
            suggested_action: "Balance liquidity needs with long-term growth strategy",
            advisor_note: Some("Consider hybrid approach or goal prioritization"),
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub warnings: Vec<BehavioralWarning>,
    pub score: u32,
}

pub struct ConsistencyValidator {
    rules: Vec<ConsistencyRule>,
    penalties: ConsistencyPenalties,
}

impl ConsistencyValidator {
    pub fn new(penalties: ConsistencyPenalties) -> Self {
        Self::with_rules(default_rules(), penalties)
    }

    pub fn with_rules(rules: Vec<ConsistencyRule>, penalties: ConsistencyPenalties) -> Self {
        Self { rules, penalties }
    }

    /// Warnings in rule order, and `100` less the per-severity penalties (floored at 0).
    pub fn validate(
        &self,
        answers: &QuestionnaireAnswers,
        context: &InferredContext,
    ) -> ConsistencyReport {
        let warnings: Vec<BehavioralWarning> = self
            .rules
            .iter()
            .filter(|rule| (rule.predicate)(answers, context))
            .map(ConsistencyRule::warning)
            .collect();

        let penalty: u32 = warnings
            .iter()
            .map(|warning| match warning.severity {
                Severity::Critical => self.penalties.critical,
                Severity::Warning => self.penalties.warning,
            })
            .sum();

        ConsistencyReport {
            score: 100_u32.saturating_sub(penalty),
            warnings,
        }
    }
}
