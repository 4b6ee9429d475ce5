use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::config::{MarketIndex, StressScenario};
use super::domain::{
    Allocation, AssetClass, Dependents, EmergencyFundCoverage, IncomeBand, QuestionnaireAnswers,
};

const LOW_RUNWAY_MONTHS: f64 = 3.0;
const SEVERE_IMPACT: f64 = -0.30;
const ELEVATED_IMPACT: f64 = -0.20;
const NOTABLE_CLASS_DRAWDOWN: f64 = 10.0;

/// Replay of one historical shock against the final allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub scenario: String,
    /// Fractional portfolio change, e.g. `-0.27` for a 27% fall.
    pub portfolio_impact: f64,
    pub months_covered: f64,
    pub recommendation: String,
    pub historical_drop: String,
    pub evidence: String,
    pub recovery: String,
    pub comparison: String,
    /// Scenario drawdown (in percent) of each held class whose drawdown exceeds 10%.
    pub class_impacts: BTreeMap<AssetClass, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressTestReport {
    pub scenarios: Vec<ScenarioOutcome>,
}

impl StressTestReport {
    pub fn worst(&self) -> Option<&ScenarioOutcome> {
        self.scenarios.iter().min_by(|left, right| {
            left.portfolio_impact
                .partial_cmp(&right.portfolio_impact)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }
}

pub struct StressTester {
    scenarios: Vec<StressScenario>,
}

impl StressTester {
    pub fn new(scenarios: Vec<StressScenario>) -> Self {
        Self { scenarios }
    }

    pub fn run(&self, allocation: &Allocation, answers: &QuestionnaireAnswers) -> StressTestReport {
        let monthly_expenses = estimate_monthly_expenses(answers);
        let emergency_fund = emergency_fund_value(answers, monthly_expenses);

        let scenarios = self
            .scenarios
            .iter()
            .map(|scenario| {
                evaluate(
                    scenario,
                    allocation,
                    answers.investment_amount,
                    emergency_fund,
                    monthly_expenses,
                )
            })
            .collect();

        StressTestReport { scenarios }
    }
}

fn evaluate(
    scenario: &StressScenario,
    allocation: &Allocation,
    investment_amount: f64,
    emergency_fund: f64,
    monthly_expenses: f64,
) -> ScenarioOutcome {
    let mut portfolio_impact = 0.0;
    let mut class_impacts = BTreeMap::new();
    for (class, pct) in allocation.iter() {
        let drawdown = class_drawdown(scenario, class);
        portfolio_impact += pct as f64 / 100.0 * (drawdown / 100.0);
        if pct > 0 && drawdown.abs() > NOTABLE_CLASS_DRAWDOWN {
            class_impacts.insert(class, drawdown);
        }
    }

    let months_covered = if monthly_expenses > 0.0 {
        ((emergency_fund + portfolio_impact * investment_amount) / monthly_expenses).max(0.0)
    } else if emergency_fund > 0.0 {
        12.0
    } else {
        0.0
    };

    let historical_drop = headline_drop(scenario);
    ScenarioOutcome {
        scenario: scenario.name.clone(),
        portfolio_impact,
        months_covered,
        recommendation: recommendation(portfolio_impact, months_covered).to_string(),
        comparison: format!(
            "Your portfolio: {:.1}% vs Historical: {}",
            portfolio_impact * 100.0,
            historical_drop
        ),
        historical_drop,
        evidence: scenario.evidence.clone(),
        recovery: scenario.recovery.clone(),
        class_impacts,
    }
}

/// Drawdown percentage a class suffers in `scenario`. Equity classes follow NIFTY first;
/// real estate and gold follow their own index; stocks then fall back to the S&P 500 and funds
/// to NASDAQ.
pub fn class_drawdown(scenario: &StressScenario, class: AssetClass) -> f64 {
    let drawdown_for = |index: MarketIndex| scenario.drawdowns.get(&index).copied();

    let nifty = if class.is_equity() {
        drawdown_for(MarketIndex::Nifty)
    } else {
        None
    };
    let mapped = nifty.or_else(|| match class {
        AssetClass::RealEstate => drawdown_for(MarketIndex::RealEstate),
        AssetClass::Gold => drawdown_for(MarketIndex::Gold),
        AssetClass::Stocks => drawdown_for(MarketIndex::Sp500),
        AssetClass::DiversifiedEquityFunds | AssetClass::ExchangeTradedFunds => {
            drawdown_for(MarketIndex::Nasdaq)
        }
        _ => None,
    });

    mapped.unwrap_or(match class {
        AssetClass::DebtInstruments => -5.0,
        AssetClass::LiquidFunds => 0.0,
        _ => -15.0,
    })
}

fn headline_drop(scenario: &StressScenario) -> String {
    [MarketIndex::Nifty, MarketIndex::Sp500, MarketIndex::Nasdaq]
        .iter()
        .find_map(|index| scenario.drawdowns.get(index))
        .map(|drop| format!("{drop:.0}%"))
        .unwrap_or_else(|| "-20%".to_string())
}

fn recommendation(impact: f64, months_covered: f64) -> &'static str {
    if months_covered < LOW_RUNWAY_MONTHS {
        "Consider increasing emergency fund before investing"
    } else if impact < SEVERE_IMPACT {
        "Consider reducing equity exposure for this scenario"
    } else if impact < ELEVATED_IMPACT {
        "Portfolio within acceptable risk parameters"
    } else {
        "Portfolio shows good resilience"
    }
}

/// Monthly spend implied by the income band and household size.
pub fn estimate_monthly_expenses(answers: &QuestionnaireAnswers) -> f64 {
    let annual_income = match answers.annual_income {
        IncomeBand::Under50K => 35_000.0,
        IncomeBand::From50KTo1L => 75_000.0,
        IncomeBand::From1LTo2L => 150_000.0,
        IncomeBand::From2LTo5L => 350_000.0,
        IncomeBand::Over5L => 750_000.0,
        IncomeBand::Unrecognized(_) => 150_000.0,
    };
    let expense_ratio = match answers.dependents {
        Dependents::Zero => 0.6,
        Dependents::OneToTwo => 0.7,
        _ => 0.8,
    };
    annual_income / 12.0 * expense_ratio
}

fn emergency_fund_value(answers: &QuestionnaireAnswers, monthly_expenses: f64) -> f64 {
    let months = match answers.emergency_fund_months {
        EmergencyFundCoverage::UpToOneMonth => 0.5,
        EmergencyFundCoverage::TwoToThreeMonths => 2.5,
        EmergencyFundCoverage::FourToSixMonths => 5.0,
        EmergencyFundCoverage::SevenToTwelveMonths => 9.0,
        EmergencyFundCoverage::OverTwelveMonths => 15.0,
        EmergencyFundCoverage::Unrecognized(_) => 5.0,
    };
    monthly_expenses * months
}
