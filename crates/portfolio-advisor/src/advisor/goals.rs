use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::allocation::normalize_largest_remainder;
use super::domain::{Allocation, AssetClass, Goal, Mix, Priority};

const BASE_SHARE: f64 = 0.7;
const GOAL_SHARE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalTimeline {
    ShortTerm,
    MediumTerm,
    LongTerm,
}

impl GoalTimeline {
    pub fn for_years(years: f64) -> Self {
        if years < 5.0 {
            GoalTimeline::ShortTerm
        } else if years <= 10.0 {
            GoalTimeline::MediumTerm
        } else {
            GoalTimeline::LongTerm
        }
    }

    fn multiplier(self) -> f64 {
        match self {
            GoalTimeline::ShortTerm => 1.2,
            GoalTimeline::MediumTerm => 1.0,
            GoalTimeline::LongTerm => 0.8,
        }
    }

    fn tilt(self) -> &'static [(AssetClass, f64)] {
        match self {
            GoalTimeline::ShortTerm => &[
                (AssetClass::LiquidFunds, 0.4),
                (AssetClass::DebtInstruments, 0.4),
                (AssetClass::Gold, 0.2),
            ],
            GoalTimeline::MediumTerm => &[
                (AssetClass::Stocks, 0.3),
                (AssetClass::DiversifiedEquityFunds, 0.3),
                (AssetClass::DebtInstruments, 0.2),
                (AssetClass::LiquidFunds, 0.1),
                (AssetClass::Gold, 0.1),
            ],
            GoalTimeline::LongTerm => &[
                (AssetClass::Stocks, 0.5),
                (AssetClass::DiversifiedEquityFunds, 0.3),
                (AssetClass::RealEstate, 0.2),
            ],
        }
    }
}

fn priority_multiplier(priority: Priority) -> f64 {
    match priority {
        Priority::High => 1.5,
        Priority::Medium => 1.0,
        Priority::Low => 0.5,
    }
}

/// Timeline-bucketed summary of the active goals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalAnalysis {
    pub active_goals: usize,
    pub short_term: Vec<String>,
    pub medium_term: Vec<String>,
    pub long_term: Vec<String>,
    pub total_target_amount: f64,
    /// Goal-implied mix, scaled to 100 when any goal carries weight.
    pub goal_tilt: Mix,
}

/// Coarser goal pass: buckets goals by timeline and blends a goal-implied mix into a base
/// allocation.
#[derive(Debug, Clone, Default)]
pub struct GoalAnalyzer;

impl GoalAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, goals: &[Goal], today: NaiveDate) -> GoalAnalysis {
        let active: Vec<&Goal> = goals.iter().filter(|goal| goal.is_active).collect();
        let total_target_amount: f64 = active.iter().map(|goal| goal.target_amount).sum();

        let mut analysis = GoalAnalysis {
            active_goals: active.len(),
            short_term: Vec::new(),
            medium_term: Vec::new(),
            long_term: Vec::new(),
            total_target_amount,
            goal_tilt: Mix::zeroed(),
        };

        let mut bucket_weights = [0.0_f64; 3];
        for goal in &active {
            let timeline = GoalTimeline::for_years(goal.years_until(today).max(0.0));
            let (bucket, index) = match timeline {
                GoalTimeline::ShortTerm => (&mut analysis.short_term, 0),
                GoalTimeline::MediumTerm => (&mut analysis.medium_term, 1),
                GoalTimeline::LongTerm => (&mut analysis.long_term, 2),
            };
            bucket.push(goal.id.clone());

            if total_target_amount > 0.0 {
                bucket_weights[index] += goal.target_amount / total_target_amount
                    * priority_multiplier(goal.priority)
                    * timeline.multiplier();
            }
        }

        let timelines = [
            GoalTimeline::ShortTerm,
            GoalTimeline::MediumTerm,
            GoalTimeline::LongTerm,
        ];
        let mut tilt = Mix::zeroed();
        for (timeline, weight) in timelines.iter().zip(bucket_weights) {
            for (class, share) in timeline.tilt() {
                tilt.add(*class, weight * share);
            }
        }

        let tilt_total = tilt.total();
        if tilt_total > 0.0 {
            for (class, value) in tilt.clone().iter() {
                tilt.set(class, value / tilt_total * 100.0);
            }
        }
        analysis.goal_tilt = tilt;
        analysis
    }

    /// 70% base allocation, 30% goal-implied mix. Returns the base unchanged when no goal
    /// carries weight.
    pub fn blend(&self, base: &Allocation, goals: &[Goal], today: NaiveDate) -> Allocation {
        let analysis = self.analyze(goals, today);
        if analysis.goal_tilt.total() <= 0.0 {
            return base.clone();
        }

        let mut blended = Mix::zeroed();
        for class in AssetClass::ALL {
            blended.set(
                class,
                BASE_SHARE * base.get(class) as f64 + GOAL_SHARE * analysis.goal_tilt.get(class),
            );
        }
        normalize_largest_remainder(&blended).unwrap_or_else(|| base.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeline_buckets_split_at_five_and_ten_years() {
        assert_eq!(GoalTimeline::for_years(4.9), GoalTimeline::ShortTerm);
        assert_eq!(GoalTimeline::for_years(5.0), GoalTimeline::MediumTerm);
        assert_eq!(GoalTimeline::for_years(10.0), GoalTimeline::MediumTerm);
        assert_eq!(GoalTimeline::for_years(10.1), GoalTimeline::LongTerm);
    }

    #[test]
    fn empty_goal_list_leaves_base_untouched() {
        let base = Allocation::even_across(&[AssetClass::Stocks, AssetClass::DebtInstruments]);
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date");
        assert_eq!(GoalAnalyzer::new().blend(&base, &[], today), base);
    }
}
