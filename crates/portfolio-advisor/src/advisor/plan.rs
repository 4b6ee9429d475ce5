use serde::{Deserialize, Serialize};

use super::context::{GeographicContext, InferredContext, JobStability};
use super::domain::{
    AgeBand, Allocation, AssetClass, Dependents, EmergencyFundCoverage, InvestmentHorizon,
    QuestionnaireAnswers,
};
use super::risk::RiskLevel;

const MIN_RANGE: f64 = 0.02;
const MIN_MULTIPLIER: f64 = 0.5;
const MAX_MULTIPLIER: f64 = 1.5;

/// Percentage range a class may move within before leaving the advisor's guardrails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComfortBand {
    pub min: f64,
    pub max: f64,
    /// Fractional half-width applied to the current percentage.
    pub range: f64,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanBucket {
    pub class: AssetClass,
    pub pct: u32,
    pub risk_category: String,
    pub notes: String,
    pub comfort_band: ComfortBand,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub equity: u32,
    pub defensive: u32,
    pub satellite: u32,
    pub context_multiplier: f64,
    pub buckets: Vec<PlanBucket>,
}

struct ClassProfile {
    base_range: f64,
    cap: f64,
    risk_category: &'static str,
    notes: &'static str,
}

fn class_profile(class: AssetClass) -> ClassProfile {
    let (base_range, cap, risk_category, notes) = match class {
        AssetClass::Stocks => (0.05, 2.5, "High", "Direct equity for long-term growth"),
        AssetClass::DiversifiedEquityFunds => (
            0.04,
            2.2,
            "Medium-High",
            "Diversified equity through mutual funds",
        ),
        AssetClass::ExchangeTradedFunds => {
            (0.04, 2.2, "Medium-High", "Low-cost index exposure")
        }
        AssetClass::DebtInstruments => (0.03, 1.5, "Low", "Stable income and capital protection"),
        AssetClass::LiquidFunds => (
            0.02,
            1.3,
            "Very Low",
            "Emergency access and short-term needs",
        ),
        AssetClass::Gold => (0.03, 1.8, "Medium", "Inflation hedge and crisis protection"),
        AssetClass::RealEstate => (
            0.03,
            1.6,
            "Medium",
            "Diversification through property exposure",
        ),
    };
    ClassProfile {
        base_range,
        cap,
        risk_category,
        notes,
    }
}

/// Hard per-class limits for a risk level, in whole percentages.
fn class_bounds(class: AssetClass, level: RiskLevel) -> (f64, f64) {
    use RiskLevel::*;

    match (class, level) {
        (AssetClass::Stocks, Conservative) => (5.0, 45.0),
        (AssetClass::Stocks, Aggressive) => (15.0, 75.0),
        (AssetClass::Stocks, Moderate) => (10.0, 60.0),
        (
            AssetClass::DiversifiedEquityFunds | AssetClass::ExchangeTradedFunds,
            Conservative,
        ) => (10.0, 50.0),
        (AssetClass::DiversifiedEquityFunds | AssetClass::ExchangeTradedFunds, Aggressive) => {
            (20.0, 70.0)
        }
        (AssetClass::DiversifiedEquityFunds | AssetClass::ExchangeTradedFunds, Moderate) => {
            (15.0, 60.0)
        }
        (AssetClass::DebtInstruments, Conservative) => (25.0, 60.0),
        (AssetClass::DebtInstruments, Aggressive) => (15.0, 40.0),
        (AssetClass::DebtInstruments, Moderate) => (20.0, 50.0),
        (AssetClass::LiquidFunds, Conservative) => (8.0, 25.0),
        (AssetClass::LiquidFunds, Aggressive) => (5.0, 15.0),
        (AssetClass::LiquidFunds, Moderate) => (6.0, 20.0),
        (AssetClass::Gold, Conservative) => (2.0, 15.0),
        (AssetClass::Gold, Aggressive) => (2.0, 25.0),
        (AssetClass::Gold, Moderate) => (2.0, 20.0),
        (AssetClass::RealEstate, Conservative) => (2.0, 20.0),
        (AssetClass::RealEstate, Aggressive) => (2.0, 30.0),
        (AssetClass::RealEstate, Moderate) => (2.0, 25.0),
    }
}

/// Product of situational factors widening or narrowing every band, clamped to [0.5, 1.5].
/// Returns the labels of the factors that applied.
pub fn context_multiplier(
    answers: &QuestionnaireAnswers,
    context: &InferredContext,
) -> (f64, Vec<&'static str>) {
    let mut multiplier = 1.0;
    let mut applied = Vec::new();
    let mut apply = |factor: f64, label: &'static str| {
        multiplier *= factor;
        applied.push(label);
    };

    match answers.investment_horizon {
        InvestmentHorizon::UnderTwoYears => apply(0.8, "short horizon"),
        InvestmentHorizon::OverTwentyYears => apply(1.1, "long horizon"),
        _ => {}
    }
    match answers.age {
        AgeBand::Over65 => apply(0.85, "retirement age"),
        AgeBand::Under25 => apply(1.05, "young investor"),
        _ => {}
    }
    match answers.emergency_fund_months {
        EmergencyFundCoverage::UpToOneMonth => apply(0.8, "thin emergency fund"),
        EmergencyFundCoverage::OverTwelveMonths => apply(1.05, "deep emergency fund"),
        _ => {}
    }
    match answers.dependents {
        Dependents::FivePlus => apply(0.9, "large household"),
        Dependents::Zero => apply(1.1, "no dependents"),
        _ => {}
    }
    if !answers.has_insurance {
        apply(0.85, "no insurance");
    }
    if context.withdrawal_next_two_years {
        apply(0.8, "near-term withdrawal");
    }
    match context.job_stability {
        JobStability::NotStable => apply(0.9, "unstable income"),
        JobStability::VeryStable => apply(1.05, "stable income"),
        JobStability::SomewhatStable => {}
    }
    match context.geographic_context {
        GeographicContext::UrbanAffluent => apply(1.15, "urban affluent"),
        GeographicContext::UrbanStandard => apply(1.1, "urban"),
        GeographicContext::Suburban => {}
        GeographicContext::RuralStandard => apply(0.9, "rural"),
    }

    (multiplier.clamp(MIN_MULTIPLIER, MAX_MULTIPLIER), applied)
}

fn comfort_band(
    class: AssetClass,
    pct: u32,
    level: RiskLevel,
    multiplier: f64,
    summary: &str,
    excluded: bool,
) -> ComfortBand {
    if excluded {
        return ComfortBand {
            min: 0.0,
            max: 0.0,
            range: 0.0,
            explanation: "Excluded by investor preference".to_string(),
        };
    }

    let profile = class_profile(class);
    let range = (profile.base_range * multiplier)
        .min(profile.base_range * profile.cap)
        .max(MIN_RANGE);
    let current = pct as f64;
    let delta = current * range;
    let (floor, ceiling) = class_bounds(class, level);

    let min = (current - delta).max(floor).min(current);
    let max = (current + delta).min(ceiling).max(current);

    ComfortBand {
        min,
        max,
        range,
        explanation: format!(
            "±{:.1}% | Bounds: {:.0}-{:.0}% | Context: {}",
            range * 100.0,
            floor,
            ceiling,
            summary
        ),
    }
}

/// Totals and per-class buckets shown alongside the recommendation.
pub fn build_plan(
    allocation: &Allocation,
    level: RiskLevel,
    answers: &QuestionnaireAnswers,
    context: &InferredContext,
) -> PlanSummary {
    const ORDER: [AssetClass; 6] = [
        AssetClass::Stocks,
        AssetClass::DiversifiedEquityFunds,
        AssetClass::DebtInstruments,
        AssetClass::LiquidFunds,
        AssetClass::Gold,
        AssetClass::RealEstate,
    ];

    let (multiplier, factors) = context_multiplier(answers, context);
    let summary = if factors.is_empty() {
        "standard".to_string()
    } else {
        factors.join(", ")
    };

    let buckets = ORDER
        .iter()
        .map(|class| {
            let pct = allocation.get(*class);
            let profile = class_profile(*class);
            PlanBucket {
                class: *class,
                pct,
                risk_category: profile.risk_category.to_string(),
                notes: profile.notes.to_string(),
                comfort_band: comfort_band(
                    *class,
                    pct,
                    level,
                    multiplier,
                    &summary,
                    answers.excludes(*class),
                ),
            }
        })
        .collect();

    PlanSummary {
        equity: allocation.equity_total(),
        defensive: allocation.defensive_total(),
        satellite: allocation.satellite_total(),
        context_multiplier: multiplier,
        buckets,
    }
}
