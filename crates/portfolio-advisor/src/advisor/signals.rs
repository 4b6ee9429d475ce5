//! Questionnaire answers and goals reduced to weighted equity/safety signals.

use chrono::NaiveDate;

use super::domain::{
    AgeBand, Dependents, EmergencyFundCoverage, Goal, GoalCategory, InvestmentHorizon,
    InvestmentKnowledge, LossTolerance, Priority, QuestionnaireAnswers, Signal, VolatilityComfort,
};

/// Share of the total weight budget reserved for goal signals.
pub const GOAL_WEIGHT_BUDGET: f64 = 0.4;

const SIGNAL_BOUND: f64 = 15.0;
const KNOWLEDGE_BOUND: f64 = 10.0;
const SAFETY_REACTION: f64 = -0.7;
const TIMELINE_CAP_MONTHS: i64 = 240;

const AGE_WEIGHT: f64 = 0.25;
const HORIZON_WEIGHT: f64 = 0.25;
const DEPENDENTS_WEIGHT: f64 = 0.075;
const EMERGENCY_FUND_WEIGHT: f64 = 0.075;
const VOLATILITY_WEIGHT: f64 = 0.075;
const LOSS_TOLERANCE_WEIGHT: f64 = 0.075;
const INSURANCE_WEIGHT: f64 = 0.05;
const DEFAULT_GOAL_WEIGHT: f64 = 0.15;

#[derive(Debug, Clone, Copy)]
struct Tilt {
    equity: f64,
    safety: f64,
    explanation: &'static str,
}

const fn tilt(equity: f64, safety: f64, explanation: &'static str) -> Tilt {
    Tilt {
        equity,
        safety,
        explanation,
    }
}

fn signal(factor: &str, tilt: Tilt, weight: f64) -> Signal {
    Signal {
        factor: factor.to_string(),
        equity_signal: tilt.equity,
        safety_signal: tilt.safety,
        weight,
        explanation: tilt.explanation.to_string(),
    }
}

/// Stateless converter from answers to signals.
#[derive(Debug, Clone, Default)]
pub struct SignalProcessor;

impl SignalProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Emit the full signal set for one request. `today` anchors all goal date math.
    pub fn calculate_signals(&self, answers: &QuestionnaireAnswers, today: NaiveDate) -> Vec<Signal> {
        let mut signals = vec![
            signal("age", age_tilt(&answers.age), AGE_WEIGHT),
            signal(
                "investment_horizon",
                horizon_tilt(&answers.investment_horizon),
                HORIZON_WEIGHT,
            ),
            signal(
                "dependents",
                dependents_tilt(&answers.dependents),
                DEPENDENTS_WEIGHT,
            ),
            signal(
                "emergency_fund",
                emergency_fund_tilt(&answers.emergency_fund_months),
                EMERGENCY_FUND_WEIGHT,
            ),
            signal(
                "volatility_comfort",
                volatility_tilt(&answers.volatility_comfort),
                VOLATILITY_WEIGHT,
            ),
            signal(
                "loss_tolerance",
                loss_tolerance_tilt(&answers.max_acceptable_loss),
                LOSS_TOLERANCE_WEIGHT,
            ),
        ];

        signals.extend(goal_signals(answers.open_goals(), today));

        if !answers.has_insurance {
            signals.push(signal(
                "insurance",
                tilt(
                    -10.0,
                    10.0,
                    "Lack of insurance requires more conservative positioning",
                ),
                INSURANCE_WEIGHT,
            ));
        }

        apply_knowledge_multiplier(&mut signals, &answers.investment_knowledge);
        signals
    }
}

fn age_tilt(age: &AgeBand) -> Tilt {
    match age {
        AgeBand::Under25 => tilt(
            15.0,
            -8.0,
            "Young age provides maximum risk capacity for long-term growth",
        ),
        AgeBand::From25To35 => tilt(
            12.0,
            -5.0,
            "Prime wealth-building years with high equity tolerance",
        ),
        AgeBand::From35To45 => tilt(
            8.0,
            -2.0,
            "Peak earning years allow significant equity exposure",
        ),
        AgeBand::From45To55 => tilt(
            3.0,
            3.0,
            "Pre-retirement phase begins gradual shift to stability",
        ),
        AgeBand::From55To65 => tilt(
            -5.0,
            8.0,
            "Approaching retirement requires increased focus on preservation",
        ),
        AgeBand::Over65 => tilt(
            -10.0,
            15.0,
            "Retirement phase prioritizes capital preservation and income",
        ),
        AgeBand::Unrecognized(_) => tilt(
            0.0,
            0.0,
            "Unrecognized age band, applying a neutral stance",
        ),
    }
}

fn horizon_tilt(horizon: &InvestmentHorizon) -> Tilt {
    match horizon {
        InvestmentHorizon::UnderTwoYears => tilt(
            -15.0,
            15.0,
            "Short horizon requires maximum liquidity and capital preservation",
        ),
        InvestmentHorizon::TwoToFiveYears => tilt(
            -5.0,
            5.0,
            "Medium-short horizon favors defensive positioning",
        ),
        InvestmentHorizon::FiveToTenYears => tilt(
            5.0,
            -2.0,
            "Medium horizon allows moderate equity exposure",
        ),
        InvestmentHorizon::TenToTwentyYears => tilt(
            10.0,
            -5.0,
            "Long horizon enables significant equity allocation",
        ),
        InvestmentHorizon::OverTwentyYears => tilt(
            15.0,
            -8.0,
            "Very long horizon maximizes growth potential through equity",
        ),
        InvestmentHorizon::Unrecognized(_) => tilt(
            0.0,
            0.0,
            "Unrecognized investment horizon, applying a neutral stance",
        ),
    }
}

fn dependents_tilt(dependents: &Dependents) -> Tilt {
    match dependents {
        Dependents::Zero => tilt(
            0.0,
            0.0,
            "No dependents allows for neutral risk positioning",
        ),
        Dependents::OneToTwo => tilt(
            -2.0,
            5.0,
            "Few dependents suggest slight increase in safety allocation",
        ),
        Dependents::ThreeToFour => tilt(
            -5.0,
            8.0,
            "Multiple dependents require increased financial security",
        ),
        Dependents::FivePlus => tilt(
            -8.0,
            12.0,
            "Many dependents necessitate conservative, stable approach",
        ),
        Dependents::Unrecognized(_) => tilt(
            0.0,
            0.0,
            "Unrecognized dependents count, applying a neutral stance",
        ),
    }
}

fn emergency_fund_tilt(coverage: &EmergencyFundCoverage) -> Tilt {
    match coverage {
        EmergencyFundCoverage::UpToOneMonth => tilt(
            -15.0,
            15.0,
            "Insufficient emergency fund requires immediate liquidity focus",
        ),
        EmergencyFundCoverage::TwoToThreeMonths => tilt(
            -8.0,
            10.0,
            "Low emergency fund suggests increasing liquid reserves",
        ),
        EmergencyFundCoverage::FourToSixMonths => tilt(
            0.0,
            0.0,
            "Adequate emergency fund allows normal risk allocation",
        ),
        EmergencyFundCoverage::SevenToTwelveMonths => tilt(
            3.0,
            -2.0,
            "Good emergency buffer enables slightly higher risk",
        ),
        EmergencyFundCoverage::OverTwelveMonths => tilt(
            5.0,
            -5.0,
            "Excellent emergency fund supports increased equity exposure",
        ),
        EmergencyFundCoverage::Unrecognized(_) => tilt(
            0.0,
            0.0,
            "Unrecognized emergency fund coverage, applying a neutral stance",
        ),
    }
}

fn volatility_tilt(comfort: &VolatilityComfort) -> Tilt {
    match comfort {
        VolatilityComfort::PanicSell => tilt(
            -15.0,
            15.0,
            "Low volatility tolerance requires defensive allocation",
        ),
        VolatilityComfort::VeryUncomfortable => tilt(
            -8.0,
            10.0,
            "Limited comfort with volatility suggests caution",
        ),
        VolatilityComfort::SomewhatConcerned => tilt(
            0.0,
            0.0,
            "Moderate volatility comfort allows balanced approach",
        ),
        VolatilityComfort::StayCalm => tilt(
            8.0,
            -5.0,
            "Good volatility tolerance supports higher equity exposure",
        ),
        VolatilityComfort::BuyMore => tilt(
            12.0,
            -8.0,
            "Excellent volatility tolerance enables aggressive positioning",
        ),
        VolatilityComfort::Unrecognized(_) => tilt(
            0.0,
            0.0,
            "Unrecognized volatility comfort, applying a neutral stance",
        ),
    }
}

fn loss_tolerance_tilt(tolerance: &LossTolerance) -> Tilt {
    match tolerance {
        LossTolerance::FivePercent => tilt(
            -10.0,
            10.0,
            "Low loss tolerance requires conservative approach",
        ),
        LossTolerance::TenPercent => tilt(
            -5.0,
            5.0,
            "Limited loss tolerance suggests defensive positioning",
        ),
        LossTolerance::TwentyPercent => tilt(
            0.0,
            0.0,
            "Moderate loss tolerance allows balanced allocation",
        ),
        LossTolerance::ThirtyPercent => tilt(
            5.0,
            -3.0,
            "Good loss tolerance supports higher equity exposure",
        ),
        LossTolerance::FortyPlus => tilt(
            10.0,
            -5.0,
            "High loss tolerance enables aggressive growth strategy",
        ),
        LossTolerance::Unrecognized(_) => tilt(
            0.0,
            0.0,
            "Unrecognized loss tolerance, applying a neutral stance",
        ),
    }
}

/// Smooth equity adjustment over months-to-target: about -8 near term, 0 at 36 months,
/// about +8 at the 240-month cap. Past-due goals get the full -10.
pub fn timeline_adjustment(months: i64) -> f64 {
    if months <= 0 {
        return -10.0;
    }
    let capped = months.min(TIMELINE_CAP_MONTHS) as f64;
    20.0 / (1.0 + (-0.1 * (capped - 36.0)).exp()) - 10.0
}

/// Weight boost for approaching goals, from 1.5 when due down to 0.1 at 20+ years.
pub fn urgency_multiplier(months: i64) -> f64 {
    if months <= 0 {
        return 1.5;
    }
    (1.5 - months as f64 / 240.0).clamp(0.1, 1.5)
}

/// Nearly finished goals keep only a fifth of their influence.
pub fn progress_factor(goal: &Goal) -> f64 {
    let ratio = goal.completion_ratio();
    if ratio <= 0.0 {
        1.0
    } else if ratio > 0.9 {
        0.2
    } else {
        1.0 - ratio
    }
}

fn category_tilt(category: GoalCategory) -> f64 {
    match category {
        GoalCategory::Retirement => 5.0,
        GoalCategory::WealthBuilding => 8.0,
        GoalCategory::HomePurchase => -3.0,
        GoalCategory::ChildEducation => 2.0,
        GoalCategory::EmergencyFund => -10.0,
        GoalCategory::Custom => 0.0,
    }
}

fn priority_multiplier(priority: Priority) -> f64 {
    match priority {
        Priority::High => 1.2,
        Priority::Medium => 1.0,
        Priority::Low => 0.8,
    }
}

fn timeline_label(months: i64) -> &'static str {
    if months <= 12 {
        "urgent"
    } else if months <= 36 {
        "medium-term"
    } else {
        "long-term"
    }
}

/// Raw (pre-budget) signal for one open goal.
pub fn goal_signal(goal: &Goal, today: NaiveDate) -> Signal {
    let months = goal.months_until(today);
    let remaining = goal.remaining_amount();

    let base = category_tilt(goal.category) + timeline_adjustment(months);
    let equity_signal = (base * priority_multiplier(goal.priority)).clamp(-SIGNAL_BOUND, SIGNAL_BOUND);
    let safety_signal = (SAFETY_REACTION * equity_signal).clamp(-SIGNAL_BOUND, SIGNAL_BOUND);

    let size_weight = (1.0 + remaining / 1_000_000.0).ln() * 0.3;
    let weight = (size_weight * urgency_multiplier(months) * progress_factor(goal)).min(1.0);

    Signal {
        factor: format!("goal_{}_{}", goal.category.label(), goal.id),
        equity_signal,
        safety_signal,
        weight,
        explanation: format!(
            "{}: {} {} {} goal ({} priority)",
            goal.name,
            format_lakhs(remaining),
            timeline_label(months),
            goal.category.label(),
            goal.priority.label()
        ),
    }
}

/// Goal signals with their combined weight scaled to exactly the goal budget.
fn goal_signals<'a>(goals: impl Iterator<Item = &'a Goal>, today: NaiveDate) -> Vec<Signal> {
    let mut signals: Vec<Signal> = goals.map(|goal| goal_signal(goal, today)).collect();

    if signals.is_empty() {
        return vec![signal(
            "default_balanced_goal",
            tilt(0.0, 0.0, "Balanced approach with no specific goals defined"),
            DEFAULT_GOAL_WEIGHT,
        )];
    }

    let raw_total: f64 = signals.iter().map(|signal| signal.weight).sum();
    if raw_total > 0.0 {
        for signal in &mut signals {
            signal.weight = signal.weight / raw_total * GOAL_WEIGHT_BUDGET;
        }
    }
    signals
}

fn knowledge_multiplier(knowledge: &InvestmentKnowledge) -> f64 {
    match knowledge {
        InvestmentKnowledge::Beginner => 0.8,
        InvestmentKnowledge::SomeKnowledge => 0.9,
        InvestmentKnowledge::Experienced => 1.0,
        InvestmentKnowledge::Expert => 1.2,
        InvestmentKnowledge::Unrecognized(_) => 1.0,
    }
}

fn apply_knowledge_multiplier(signals: &mut [Signal], knowledge: &InvestmentKnowledge) {
    let multiplier = knowledge_multiplier(knowledge);
    let suffix = match knowledge {
        InvestmentKnowledge::Beginner | InvestmentKnowledge::SomeKnowledge => {
            Some(format!(" (adjusted for {} knowledge level)", knowledge.label()))
        }
        InvestmentKnowledge::Expert => Some(" (enhanced for expert knowledge level)".to_string()),
        _ => None,
    };

    for signal in signals.iter_mut() {
        signal.equity_signal =
            (signal.equity_signal * multiplier).clamp(-KNOWLEDGE_BOUND, KNOWLEDGE_BOUND);
        signal.safety_signal =
            (signal.safety_signal * multiplier).clamp(-KNOWLEDGE_BOUND, KNOWLEDGE_BOUND);
        if let Some(suffix) = &suffix {
            signal.explanation.push_str(suffix);
        }
    }
}

/// Indian-style lakh shorthand, e.g. `₹12.5L`.
pub fn format_lakhs(amount: f64) -> String {
    format!("₹{:.1}L", amount / 100_000.0)
}
