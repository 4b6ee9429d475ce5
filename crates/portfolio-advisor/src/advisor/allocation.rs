//! Signals reduced to a concrete whole-percentage allocation.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::config::RiskScoringConfig;
use super::context::{GoalFocus, InferredContext};
use super::domain::{
    AgeBand, Allocation, AssetClass, InvestmentHorizon, InvestmentKnowledge, LegacyGoal, Mix,
    Priority, QuestionnaireAnswers, Signal,
};

const MIN_EQUITY: f64 = 10.0;
const MAX_EQUITY: f64 = 85.0;
const SHORT_TERM_YEARS: f64 = 5.0;
const LONG_TERM_YEARS: f64 = 10.0;

/// Equity/safety split before any per-class decomposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseSplit {
    pub avg_equity: f64,
    pub avg_safety: f64,
    pub equity_base: f64,
    pub safety_base: f64,
    pub risk_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquitySplit {
    pub stocks: f64,
    pub diversified_funds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetySplit {
    pub liquid: f64,
    pub gold: f64,
    pub real_estate: f64,
    pub debt: f64,
}

/// How goal intent tilts the base mix. Chosen from the shape of the answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum GoalTiltStrategy {
    /// Tilts keyed off the open goal list.
    Timeline {
        short_term: bool,
        long_term: bool,
        high_priority: bool,
    },
    /// Tilts keyed off the legacy single primary goal.
    PrimaryGoal { goal: LegacyGoal },
    Untilted,
}

impl GoalTiltStrategy {
    pub fn select(answers: &QuestionnaireAnswers, today: NaiveDate) -> Self {
        let mut open = answers.open_goals().peekable();
        if open.peek().is_some() {
            let (mut short_term, mut long_term, mut high_priority) = (false, false, false);
            for goal in open {
                let years = goal.years_until(today);
                short_term |= years < SHORT_TERM_YEARS;
                long_term |= years > LONG_TERM_YEARS;
                high_priority |= goal.priority == Priority::High;
            }
            return GoalTiltStrategy::Timeline {
                short_term,
                long_term,
                high_priority,
            };
        }

        match &answers.primary_goal {
            Some(goal) => GoalTiltStrategy::PrimaryGoal { goal: goal.clone() },
            None => GoalTiltStrategy::Untilted,
        }
    }

    fn apply(&self, mix: &mut Mix) {
        use AssetClass::*;

        match self {
            GoalTiltStrategy::Timeline {
                short_term,
                long_term,
                high_priority,
            } => {
                if *short_term {
                    mix.raise(LiquidFunds, 5.0, 30.0);
                    mix.raise(DebtInstruments, 5.0, 25.0);
                    mix.lower(Stocks, 5.0, 20.0);
                    mix.lower(DiversifiedEquityFunds, 5.0, 15.0);
                }
                if *long_term {
                    mix.raise(Stocks, 5.0, 50.0);
                    mix.raise(DiversifiedEquityFunds, 5.0, 40.0);
                    mix.lower(LiquidFunds, 5.0, 5.0);
                    mix.lower(DebtInstruments, 5.0, 5.0);
                }
                if *high_priority {
                    mix.raise(LiquidFunds, 3.0, 25.0);
                    let debt = mix.get(DebtInstruments);
                    mix.set(DebtInstruments, (debt + 2.0).max(5.0));
                }
            }
            GoalTiltStrategy::PrimaryGoal { goal } => match goal {
                LegacyGoal::WealthBuilding => {
                    mix.raise(Stocks, 5.0, 45.0);
                    mix.raise(DiversifiedEquityFunds, 5.0, 45.0);
                    mix.lower(LiquidFunds, 10.0, 5.0);
                }
                LegacyGoal::HomePurchase => {
                    mix.raise(LiquidFunds, 15.0, 50.0);
                    mix.lower(Stocks, 8.0, 5.0);
                    mix.lower(DiversifiedEquityFunds, 7.0, 5.0);
                }
                LegacyGoal::IncomeGeneration => {
                    mix.raise(DebtInstruments, 10.0, 35.0);
                    mix.lower(Stocks, 5.0, 5.0);
                    mix.lower(DiversifiedEquityFunds, 5.0, 5.0);
                }
                LegacyGoal::Preservation => {
                    mix.raise(LiquidFunds, 10.0, 40.0);
                    mix.raise(DebtInstruments, 5.0, 30.0);
                    mix.lower(Stocks, 10.0, 10.0);
                    mix.lower(DiversifiedEquityFunds, 5.0, 10.0);
                }
                LegacyGoal::Retirement
                | LegacyGoal::ChildEducation
                | LegacyGoal::Unrecognized(_) => {}
            },
            GoalTiltStrategy::Untilted => {}
        }
    }
}

/// Result of removing excluded classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExclusionOutcome {
    pub allocation: Allocation,
    /// Percentage points taken from excluded classes.
    pub reclaimed: u32,
    /// Set when no class could receive the reclaimed mass and the input was kept.
    pub fallback: bool,
}

pub struct AllocationCalculator {
    scoring: RiskScoringConfig,
}

impl AllocationCalculator {
    pub fn new(scoring: RiskScoringConfig) -> Self {
        Self { scoring }
    }

    /// Weighted averages of the signal set turned into a base split and a risk score.
    pub fn calculate_dynamic_base(&self, signals: &[Signal]) -> BaseSplit {
        let total_weight: f64 = signals.iter().map(|signal| signal.weight).sum();
        let (avg_equity, avg_safety) = if total_weight > 0.0 {
            (
                signals.iter().map(Signal::weighted_equity).sum::<f64>() / total_weight,
                signals.iter().map(Signal::weighted_safety).sum::<f64>() / total_weight,
            )
        } else {
            (0.0, 0.0)
        };

        let equity_base = (50.0 + avg_equity - 0.5 * avg_safety).clamp(MIN_EQUITY, MAX_EQUITY);
        let scoring = &self.scoring;
        let risk_score = (scoring.base + avg_equity - scoring.safety_coef * avg_safety
            + scoring.offset)
            .max(scoring.min_score)
            .min(scoring.max_score);

        BaseSplit {
            avg_equity,
            avg_safety,
            equity_base,
            safety_base: 100.0 - equity_base,
            risk_score,
        }
    }

    pub fn split_equity_category(
        &self,
        equity_base: f64,
        answers: &QuestionnaireAnswers,
        context: &InferredContext,
    ) -> EquitySplit {
        let mut stock_ratio = match answers.investment_knowledge {
            InvestmentKnowledge::Expert => 0.50,
            InvestmentKnowledge::Experienced => 0.40,
            InvestmentKnowledge::Beginner => 0.25,
            _ => 0.35,
        };
        if context.dominant_goal == Some(GoalFocus::WealthBuilding) && answers.age != AgeBand::Over65
        {
            stock_ratio += 0.10;
        }

        EquitySplit {
            stocks: equity_base * stock_ratio,
            diversified_funds: equity_base * (1.0 - stock_ratio),
        }
    }

    pub fn split_safety_category(
        &self,
        safety_base: f64,
        answers: &QuestionnaireAnswers,
        context: &InferredContext,
    ) -> SafetySplit {
        let (mut liquid, mut gold, mut real_estate, mut debt) = match answers.investment_horizon {
            InvestmentHorizon::UnderTwoYears => (0.60, 0.15, 0.15, 0.10),
            InvestmentHorizon::OverTwentyYears => (0.25, 0.25, 0.35, 0.15),
            _ => (0.35, 0.20, 0.25, 0.20),
        };

        if context.has_frequent_liquidity_needs() || context.withdrawal_next_two_years {
            liquid = (liquid + 0.20_f64).min(0.70);
            gold *= 0.8;
            real_estate *= 0.8;
            debt *= 0.8;
        }

        if answers.emergency_fund_months.is_thin() {
            liquid = liquid.max((liquid + 0.15_f64).min(0.60));
            gold *= 0.9;
            real_estate *= 0.9;
            debt *= 0.9;
        }

        let total = liquid + gold + real_estate + debt;
        SafetySplit {
            liquid: safety_base * liquid / total,
            gold: safety_base * gold / total,
            real_estate: safety_base * real_estate / total,
            debt: safety_base * debt / total,
        }
    }

    pub fn base_mix(&self, equity: &EquitySplit, safety: &SafetySplit) -> Mix {
        let mut mix = Mix::zeroed();
        mix.set(AssetClass::Stocks, equity.stocks);
        mix.set(AssetClass::DiversifiedEquityFunds, equity.diversified_funds);
        mix.set(AssetClass::LiquidFunds, safety.liquid);
        mix.set(AssetClass::Gold, safety.gold);
        mix.set(AssetClass::RealEstate, safety.real_estate);
        mix.set(AssetClass::DebtInstruments, safety.debt);
        mix
    }

    /// Apply the selected goal tilts and round to whole percentages.
    pub fn apply_goal_adjustments(&self, base: &Mix, strategy: &GoalTiltStrategy) -> Allocation {
        let mut mix = base.clone();
        strategy.apply(&mut mix);
        normalize_largest_remainder(&mix)
            .or_else(|| normalize_largest_remainder(base))
            .unwrap_or_else(|| Allocation::even_across(&redistribution_targets(&[])))
    }

    /// Zero every excluded class and hand its share to the remaining classes in proportion to
    /// their current weight.
    pub fn handle_avoided_assets(
        &self,
        allocation: &Allocation,
        excluded: &[AssetClass],
    ) -> ExclusionOutcome {
        if excluded.is_empty() {
            return ExclusionOutcome {
                allocation: allocation.clone(),
                reclaimed: 0,
                fallback: false,
            };
        }

        let targets = redistribution_targets(excluded);
        if targets.is_empty() {
            return ExclusionOutcome {
                allocation: allocation.clone(),
                reclaimed: 0,
                fallback: true,
            };
        }

        let reclaimed: u32 = AssetClass::ALL
            .iter()
            .filter(|class| excluded.contains(class))
            .map(|class| allocation.get(*class))
            .sum();
        let mut mix = allocation.to_mix();
        for class in excluded {
            mix.set(*class, 0.0);
        }

        let eligible_mass: f64 = targets.iter().map(|class| mix.get(*class)).sum();
        let redistributed = if eligible_mass > 0.0 {
            for class in &targets {
                let share = mix.get(*class) / eligible_mass;
                mix.add(*class, reclaimed as f64 * share);
            }
            normalize_largest_remainder(&mix)
        } else {
            Some(Allocation::even_across(&targets))
        };

        match redistributed {
            Some(allocation) => ExclusionOutcome {
                allocation,
                reclaimed,
                fallback: false,
            },
            None => ExclusionOutcome {
                allocation: allocation.clone(),
                reclaimed: 0,
                fallback: true,
            },
        }
    }

    /// Without insurance, trim up to 10% of equity (at most 10 points) and move it toward
    /// liquid and debt holdings.
    pub fn apply_insurance_logic(
        &self,
        allocation: &Allocation,
        answers: &QuestionnaireAnswers,
    ) -> Allocation {
        let equity_total = allocation.equity_total() as f64;
        if answers.has_insurance || equity_total <= 0.0 {
            return allocation.clone();
        }

        let reduction = (0.1 * equity_total).min(10.0);
        let mut mix = allocation.to_mix();
        for class in AssetClass::ALL.iter().filter(|class| class.is_equity()) {
            let current = mix.get(*class);
            mix.set(*class, current - current / equity_total * reduction);
        }
        if !answers.excludes(AssetClass::LiquidFunds) {
            mix.add(AssetClass::LiquidFunds, (0.5 * reduction).min(10.0));
        }
        if !answers.excludes(AssetClass::DebtInstruments) {
            mix.add(AssetClass::DebtInstruments, (0.3 * reduction).min(5.0));
        }

        normalize_largest_remainder(&mix).unwrap_or_else(|| allocation.clone())
    }
}

/// Classes allowed to receive reclaimed weight: everything not excluded except ETFs, which are
/// folded into diversified funds.
fn redistribution_targets(excluded: &[AssetClass]) -> Vec<AssetClass> {
    AssetClass::ALL
        .iter()
        .copied()
        .filter(|class| *class != AssetClass::ExchangeTradedFunds && !excluded.contains(class))
        .collect()
}

/// Scale to 100, floor, then hand leftover units to the largest fractional remainders.
/// Ties go to the earlier asset class. `None` when there is no positive mass to scale.
pub fn normalize_largest_remainder(mix: &Mix) -> Option<Allocation> {
    let values: Vec<(AssetClass, f64)> = mix
        .iter()
        .map(|(class, value)| {
            let value = if value.is_finite() { value.max(0.0) } else { 0.0 };
            (class, value)
        })
        .collect();
    let total: f64 = values.iter().map(|(_, value)| value).sum();
    if total <= 0.0 || !total.is_finite() {
        return None;
    }

    let scaled: Vec<(AssetClass, f64)> = values
        .into_iter()
        .map(|(class, value)| (class, value / total * 100.0))
        .collect();

    let mut units: BTreeMap<AssetClass, u32> = scaled
        .iter()
        .map(|(class, value)| (*class, value.floor() as u32))
        .collect();
    let assigned: u32 = units.values().sum();
    let leftover = 100_u32.saturating_sub(assigned) as usize;

    let mut remainders: Vec<(AssetClass, f64)> = scaled
        .iter()
        .filter(|(_, value)| *value > 0.0)
        .map(|(class, value)| (*class, value - value.floor()))
        .collect();
    remainders.sort_by(|left, right| {
        right
            .1
            .partial_cmp(&left.1)
            .unwrap_or(Ordering::Equal)
            .then(left.0.cmp(&right.0))
    });

    for (class, _) in remainders.iter().cycle().take(leftover) {
        *units.entry(*class).or_insert(0) += 1;
    }

    Some(Allocation::from_values(units))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mix(values: &[(AssetClass, f64)]) -> Mix {
        let mut mix = Mix::zeroed();
        for (class, value) in values {
            mix.set(*class, *value);
        }
        mix
    }

    #[test]
    fn largest_remainder_hits_exactly_one_hundred() {
        let allocation = normalize_largest_remainder(&mix(&[
            (AssetClass::Stocks, 33.3),
            (AssetClass::DiversifiedEquityFunds, 33.3),
            (AssetClass::LiquidFunds, 33.4),
        ]))
        .expect("positive mass");
        assert_eq!(allocation.total(), 100);
        assert_eq!(allocation.get(AssetClass::LiquidFunds), 34);
    }

    #[test]
    fn largest_remainder_breaks_ties_by_class_order() {
        let allocation = normalize_largest_remainder(&mix(&[
            (AssetClass::Stocks, 1.0),
            (AssetClass::Gold, 1.0),
            (AssetClass::LiquidFunds, 1.0),
        ]))
        .expect("positive mass");
        assert_eq!(allocation.get(AssetClass::Stocks), 34);
        assert_eq!(allocation.get(AssetClass::Gold), 33);
        assert_eq!(allocation.get(AssetClass::LiquidFunds), 33);
    }

    #[test]
    fn largest_remainder_never_feeds_zero_classes() {
        let allocation = normalize_largest_remainder(&mix(&[
            (AssetClass::Stocks, 10.5),
            (AssetClass::DebtInstruments, 10.5),
        ]))
        .expect("positive mass");
        assert_eq!(allocation.get(AssetClass::ExchangeTradedFunds), 0);
        assert_eq!(allocation.get(AssetClass::Gold), 0);
        assert_eq!(allocation.total(), 100);
    }

    #[test]
    fn largest_remainder_rejects_empty_mass() {
        assert!(normalize_largest_remainder(&Mix::zeroed()).is_none());
        assert!(normalize_largest_remainder(&mix(&[(AssetClass::Gold, -4.0)])).is_none());
    }

    #[test]
    fn tilt_clamps_never_reverse_direction() {
        let mut tilted = mix(&[(AssetClass::LiquidFunds, 40.0), (AssetClass::Stocks, 12.0)]);
        GoalTiltStrategy::Timeline {
            short_term: true,
            long_term: false,
            high_priority: false,
        }
        .apply(&mut tilted);
        assert_eq!(tilted.get(AssetClass::LiquidFunds), 40.0);
        assert_eq!(tilted.get(AssetClass::Stocks), 12.0);
    }

    #[test]
    fn risk_score_bounds_out_of_order_do_not_panic() {
        let scoring = RiskScoringConfig {
            min_score: 95.0,
            max_score: 5.0,
            ..RiskScoringConfig::default()
        };
        let split = AllocationCalculator::new(scoring).calculate_dynamic_base(&[]);
        assert_eq!(split.risk_score, 5.0);
    }

    #[test]
    fn high_priority_tilt_lifts_debt_to_floor() {
        let high_priority = GoalTiltStrategy::Timeline {
            short_term: false,
            long_term: false,
            high_priority: true,
        };

        let mut thin_debt = mix(&[(AssetClass::Stocks, 60.0), (AssetClass::DebtInstruments, 1.0)]);
        high_priority.apply(&mut thin_debt);
        assert_eq!(thin_debt.get(AssetClass::DebtInstruments), 5.0);
        assert_eq!(thin_debt.get(AssetClass::LiquidFunds), 3.0);

        let mut ample_debt = mix(&[(AssetClass::DebtInstruments, 20.0)]);
        high_priority.apply(&mut ample_debt);
        assert_eq!(ample_debt.get(AssetClass::DebtInstruments), 22.0);
    }
}
