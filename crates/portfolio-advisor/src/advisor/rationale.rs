//! Templated advisor narrative built from already-computed numbers.

use chrono::{Datelike, NaiveDate};

use super::consistency::{BehavioralWarning, Severity};
use super::context::{InferredContext, JobStability};
use super::domain::{
    AgeBand, Allocation, AssetClass, Dependents, Goal, LegacyGoal, Priority, QuestionnaireAnswers,
    Signal,
};
use super::risk::RiskLevel;
use super::signals::format_lakhs;

const NEAR_TERM_MONTHS: i64 = 24;
const LONG_TERM_MONTHS: i64 = 60;

/// Everything the narrative reads from.
pub struct RationaleInput<'a> {
    pub allocation: &'a Allocation,
    pub signals: &'a [Signal],
    pub answers: &'a QuestionnaireAnswers,
    pub context: &'a InferredContext,
    pub risk_level: RiskLevel,
    pub warnings: &'a [BehavioralWarning],
    pub today: NaiveDate,
}

#[derive(Debug, Clone, Default)]
pub struct RationaleGenerator;

impl RationaleGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Ordered statements: lead driver, risk stance, goal fit, special circumstances,
    /// construction, then warnings with critical ones first.
    pub fn generate(&self, input: &RationaleInput<'_>) -> Vec<String> {
        let mut rationale = Vec::new();

        if let Some(lead) = leading_statement(input.signals, &input.answers.age) {
            rationale.push(lead);
        }
        rationale.push(risk_statement(input.risk_level, input.allocation, input.answers));
        rationale.push(goal_statement(input.answers, input.allocation, input.today));
        if let Some(circumstances) =
            special_circumstances(input.answers, input.context, input.allocation)
        {
            rationale.push(circumstances);
        }
        rationale.push(construction_statement(input.allocation));
        rationale.extend(warning_statements(input.warnings));

        rationale
    }
}

fn leading_statement(signals: &[Signal], age: &AgeBand) -> Option<String> {
    let mut dominant: Option<&Signal> = None;
    for signal in signals {
        let replace = dominant
            .map(|best| signal.weighted_equity().abs() > best.weighted_equity().abs())
            .unwrap_or(true);
        if replace {
            dominant = Some(signal);
        }
    }
    let dominant = dominant?;

    if dominant.factor == "age" {
        if let Some(advice) = age_advice(age) {
            return Some(advice.to_string());
        }
    }
    Some(dominant.explanation.clone())
}

fn age_advice(age: &AgeBand) -> Option<&'static str> {
    let advice = match age {
        AgeBand::Under25 => {
            "At your young age, you have decades to build wealth through equity markets."
        }
        AgeBand::From25To35 => {
            "You're in prime wealth-building years with excellent capacity for growth investments."
        }
        AgeBand::From35To45 => {
            "Your peak earning phase allows for significant equity exposure while building long-term wealth."
        }
        AgeBand::From45To55 => {
            "As you approach retirement planning, we're balancing growth with gradual stability increases."
        }
        AgeBand::From55To65 => {
            "Nearing retirement, your portfolio emphasizes preservation while maintaining some growth potential."
        }
        AgeBand::Over65 => {
            "In retirement, capital preservation and income generation are your primary priorities."
        }
        AgeBand::Unrecognized(_) => return None,
    };
    Some(advice)
}

fn risk_statement(level: RiskLevel, allocation: &Allocation, answers: &QuestionnaireAnswers) -> String {
    let equity = allocation.equity_total();
    match level {
        RiskLevel::Aggressive => {
            let comfort = if answers.volatility_comfort.is_recognized() {
                answers.volatility_comfort.label().replace('_', " ")
            } else {
                "moderate".to_string()
            };
            format!(
                "Your {equity}% equity allocation reflects your comfort with volatility and long-term growth focus, supported by your {comfort} approach to market fluctuations."
            )
        }
        RiskLevel::Conservative => format!(
            "The conservative {}% allocation to safety assets provides stability aligned with your risk comfort level and circumstances.",
            100 - equity.min(100)
        ),
        RiskLevel::Moderate => format!(
            "This balanced {equity}% equity approach provides growth potential while maintaining appropriate safety buffers for your situation."
        ),
    }
}

fn goal_statement(answers: &QuestionnaireAnswers, allocation: &Allocation, today: NaiveDate) -> String {
    let open: Vec<&Goal> = answers.open_goals().collect();
    match open.as_slice() {
        [] => match &answers.primary_goal {
            Some(goal) => legacy_goal_statement(goal, allocation),
            None => "This allocation provides a balanced approach suitable for general investment objectives."
                .to_string(),
        },
        [goal] => format!(
            "This allocation is optimized for your {} goal ({} by {}).",
            goal.name,
            format_lakhs(goal.remaining_amount()),
            goal.target_date.year()
        ),
        goals => multi_goal_statement(goals, allocation, today),
    }
}

fn multi_goal_statement(goals: &[&Goal], allocation: &Allocation, today: NaiveDate) -> String {
    let near_term = goal_names(goals, |goal| goal.months_until(today) <= NEAR_TERM_MONTHS);
    let high_priority = goal_names(goals, |goal| goal.priority == Priority::High);
    let has_long_term = goals
        .iter()
        .any(|goal| goal.months_until(today) > LONG_TERM_MONTHS);

    let mut clauses = Vec::new();
    if !near_term.is_empty() {
        clauses.push(format!(
            "prioritizing near-term goals ({}) with {}% in stable assets",
            near_term.join(", "),
            allocation.defensive_total()
        ));
    }
    if !high_priority.is_empty() {
        clauses.push(format!(
            "emphasizing high-priority objectives ({})",
            high_priority.join(", ")
        ));
    }
    clauses.push(if has_long_term {
        format!(
            "while maintaining {}% equity exposure for long-term growth",
            allocation.equity_total()
        )
    } else {
        "with appropriate risk balance for your timeline".to_string()
    });

    format!(
        "This allocation balances {} goals: {}.",
        goals.len(),
        clauses.join(", ")
    )
}

fn goal_names<'a>(goals: &[&'a Goal], keep: impl Fn(&Goal) -> bool) -> Vec<&'a str> {
    goals
        .iter()
        .copied()
        .filter(|goal| keep(goal))
        .map(|goal| goal.name.as_str())
        .collect()
}

fn legacy_goal_statement(goal: &LegacyGoal, allocation: &Allocation) -> String {
    let pct = |class: AssetClass| allocation.get(class);
    match goal {
        LegacyGoal::Retirement => format!(
            "The {}% allocation to income-generating and hedge assets supports your retirement timeline.",
            pct(AssetClass::DebtInstruments) + pct(AssetClass::Gold)
        ),
        LegacyGoal::WealthBuilding => format!(
            "Heavy equity weighting of {}% maximizes long-term wealth accumulation potential.",
            allocation.equity_total()
        ),
        LegacyGoal::IncomeGeneration => format!(
            "{}% in debt instruments provides the steady income stream you're seeking.",
            pct(AssetClass::DebtInstruments)
        ),
        LegacyGoal::HomePurchase => format!(
            "{}% in liquid assets ensures capital availability for your home purchase timeline.",
            pct(AssetClass::LiquidFunds)
        ),
        LegacyGoal::ChildEducation => {
            "Balanced approach preserves capital while generating growth for education expenses."
                .to_string()
        }
        LegacyGoal::Preservation => format!(
            "{}% in preservation assets protects your capital from market volatility.",
            pct(AssetClass::DebtInstruments) + pct(AssetClass::Gold) + pct(AssetClass::LiquidFunds)
        ),
        LegacyGoal::Unrecognized(_) => {
            "This allocation aligns with your stated investment objectives.".to_string()
        }
    }
}

fn special_circumstances(
    answers: &QuestionnaireAnswers,
    context: &InferredContext,
    allocation: &Allocation,
) -> Option<String> {
    let mut sentences = Vec::new();
    if answers.emergency_fund_months.is_thin() {
        sentences.push(format!(
            "Higher liquid allocation ({}%) addresses your emergency fund gap.",
            allocation.get(AssetClass::LiquidFunds)
        ));
    }
    if matches!(answers.dependents, Dependents::ThreeToFour | Dependents::FivePlus) {
        sentences.push(format!(
            "Family responsibilities support the conservative positioning with {}% in stable assets.",
            allocation.defensive_total()
        ));
    }
    if context.withdrawal_next_two_years {
        sentences.push(
            "Anticipated withdrawals within 2 years justify the emphasis on liquid and stable investments."
                .to_string(),
        );
    }
    if context.job_stability == JobStability::NotStable {
        sentences.push(
            "Income volatility supports maintaining higher safety buffers in your allocation."
                .to_string(),
        );
    }

    if sentences.is_empty() {
        None
    } else {
        Some(sentences.join(" "))
    }
}

fn construction_phrase(class: AssetClass, pct: u32) -> String {
    match class {
        AssetClass::Stocks => format!("{pct}% direct stocks for growth potential"),
        AssetClass::DiversifiedEquityFunds => {
            format!("{pct}% equity mutual funds for diversified equity exposure")
        }
        AssetClass::ExchangeTradedFunds => format!("{pct}% ETFs for low-cost index exposure"),
        AssetClass::DebtInstruments => format!("{pct}% debt for stable income"),
        AssetClass::Gold => format!("{pct}% gold as inflation hedge"),
        AssetClass::RealEstate => format!("{pct}% real estate for portfolio diversification"),
        AssetClass::LiquidFunds => {
            format!("{pct}% liquid funds for flexibility and opportunities")
        }
    }
}

fn construction_statement(allocation: &Allocation) -> String {
    const ORDER: [AssetClass; 7] = [
        AssetClass::Stocks,
        AssetClass::DiversifiedEquityFunds,
        AssetClass::ExchangeTradedFunds,
        AssetClass::DebtInstruments,
        AssetClass::Gold,
        AssetClass::RealEstate,
        AssetClass::LiquidFunds,
    ];
    let phrases: Vec<String> = ORDER
        .iter()
        .map(|class| (*class, allocation.get(*class)))
        .filter(|(_, pct)| *pct > 0)
        .map(|(class, pct)| construction_phrase(class, pct))
        .collect();
    format!("Portfolio construction: {}.", phrases.join(", "))
}

fn joined_messages(group: &[&BehavioralWarning]) -> String {
    group
        .iter()
        .map(|warning| warning.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

fn warning_statements(warnings: &[BehavioralWarning]) -> Vec<String> {
    let critical: Vec<&BehavioralWarning> = warnings
        .iter()
        .filter(|warning| warning.severity == Severity::Critical)
        .collect();
    let ordinary: Vec<&BehavioralWarning> = warnings
        .iter()
        .filter(|warning| warning.severity == Severity::Warning)
        .collect();

    let mut statements = Vec::new();
    if let Some(first) = critical.first() {
        statements.push(format!(
            "Critical Considerations: {}. {}.",
            joined_messages(&critical),
            first.suggested_action
        ));
    }
    if !ordinary.is_empty() {
        statements.push(format!(
            "Additional Considerations: {}. Consider discussing these with your advisor.",
            joined_messages(&ordinary)
        ));
    }
    statements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::consistency::WarningCategory;
    use std::collections::BTreeMap;

    fn allocation(values: &[(AssetClass, u32)]) -> Allocation {
        Allocation::from_values(values.iter().copied().collect::<BTreeMap<_, _>>())
    }

    fn warning(severity: Severity, message: &str, action: &str) -> BehavioralWarning {
        BehavioralWarning {
            severity,
            message: message.to_string(),
            category: WarningCategory::Timeline,
            suggested_action: action.to_string(),
            advisor_note: None,
        }
    }

    #[test]
    fn construction_lists_only_non_zero_classes() {
        let statement = construction_statement(&allocation(&[
            (AssetClass::Stocks, 40),
            (AssetClass::DebtInstruments, 35),
            (AssetClass::LiquidFunds, 25),
        ]));
        assert_eq!(
            statement,
            "Portfolio construction: 40% direct stocks for growth potential, 35% debt for stable income, 25% liquid funds for flexibility and opportunities."
        );
    }

    #[test]
    fn critical_warnings_precede_ordinary_ones() {
        let statements = warning_statements(&[
            warning(Severity::Warning, "Minor mismatch", "Talk it through"),
            warning(Severity::Critical, "Major gap", "Fix the gap first"),
        ]);
        assert_eq!(statements.len(), 2);
        assert_eq!(
            statements[0],
            "Critical Considerations: Major gap. Fix the gap first."
        );
        assert!(statements[1].starts_with("Additional Considerations: Minor mismatch."));
    }
}
