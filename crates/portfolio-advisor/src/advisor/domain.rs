use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Investable asset classes. Declaration order doubles as the tie-break order for rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AssetClass {
    Stocks,
    #[serde(alias = "Equity MF")]
    DiversifiedEquityFunds,
    #[serde(alias = "ETF")]
    ExchangeTradedFunds,
    Gold,
    #[serde(alias = "Real Estate")]
    RealEstate,
    #[serde(alias = "Debt")]
    DebtInstruments,
    #[serde(alias = "Liquid")]
    LiquidFunds,
}

impl AssetClass {
    pub const ALL: [AssetClass; 7] = [
        AssetClass::Stocks,
        AssetClass::DiversifiedEquityFunds,
        AssetClass::ExchangeTradedFunds,
        AssetClass::Gold,
        AssetClass::RealEstate,
        AssetClass::DebtInstruments,
        AssetClass::LiquidFunds,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            AssetClass::Stocks => "Stocks",
            AssetClass::DiversifiedEquityFunds => "Equity MF",
            AssetClass::ExchangeTradedFunds => "ETF",
            AssetClass::Gold => "Gold",
            AssetClass::RealEstate => "Real Estate",
            AssetClass::DebtInstruments => "Debt",
            AssetClass::LiquidFunds => "Liquid",
        }
    }

    pub const fn is_equity(self) -> bool {
        matches!(
            self,
            AssetClass::Stocks
                | AssetClass::DiversifiedEquityFunds
                | AssetClass::ExchangeTradedFunds
        )
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Working percentages before integer rounding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mix(BTreeMap<AssetClass, f64>);

impl Mix {
    pub fn zeroed() -> Self {
        Self(AssetClass::ALL.iter().map(|class| (*class, 0.0)).collect())
    }

    pub fn get(&self, class: AssetClass) -> f64 {
        self.0.get(&class).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, class: AssetClass, value: f64) {
        self.0.insert(class, value);
    }

    pub fn add(&mut self, class: AssetClass, delta: f64) {
        let current = self.get(class);
        self.set(class, current + delta);
    }

    /// Raise `class` by `delta` up to `ceiling`; a value already above the ceiling is left alone.
    pub fn raise(&mut self, class: AssetClass, delta: f64, ceiling: f64) {
        let current = self.get(class);
        self.set(class, current.max((current + delta).min(ceiling)));
    }

    /// Lower `class` by `delta` down to `floor`; a value already below the floor is left alone.
    pub fn lower(&mut self, class: AssetClass, delta: f64, floor: f64) {
        let current = self.get(class);
        self.set(class, current.min((current - delta).max(floor)));
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AssetClass, f64)> + '_ {
        self.0.iter().map(|(class, value)| (*class, *value))
    }
}

/// Final whole-percentage allocation. Every class is present; values sum to 100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Allocation(BTreeMap<AssetClass, u32>);

impl Allocation {
    pub(crate) fn from_values(values: BTreeMap<AssetClass, u32>) -> Self {
        let mut complete: BTreeMap<AssetClass, u32> =
            AssetClass::ALL.iter().map(|class| (*class, 0)).collect();
        complete.extend(values);
        Self(complete)
    }

    /// Split 100 units as evenly as possible across `classes`, earlier classes taking the remainder.
    pub(crate) fn even_across(classes: &[AssetClass]) -> Self {
        if classes.is_empty() {
            return Self::from_values(BTreeMap::new());
        }
        let count = classes.len() as u32;
        let share = 100 / count;
        let mut leftover = 100 - share * count;
        let mut values = BTreeMap::new();
        for class in classes {
            let bonus = if leftover > 0 {
                leftover -= 1;
                1
            } else {
                0
            };
            values.insert(*class, share + bonus);
        }
        Self::from_values(values)
    }

    pub fn get(&self, class: AssetClass) -> u32 {
        self.0.get(&class).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    pub fn equity_total(&self) -> u32 {
        self.iter()
            .filter(|(class, _)| class.is_equity())
            .map(|(_, pct)| pct)
            .sum()
    }

    pub fn defensive_total(&self) -> u32 {
        self.get(AssetClass::DebtInstruments) + self.get(AssetClass::LiquidFunds)
    }

    pub fn satellite_total(&self) -> u32 {
        self.get(AssetClass::Gold) + self.get(AssetClass::RealEstate)
    }

    pub fn iter(&self) -> impl Iterator<Item = (AssetClass, u32)> + '_ {
        self.0.iter().map(|(class, pct)| (*class, *pct))
    }

    pub fn to_mix(&self) -> Mix {
        let mut mix = Mix::zeroed();
        for (class, pct) in self.iter() {
            mix.set(class, pct as f64);
        }
        mix
    }
}

// Closed questionnaire bands. Unknown labels survive as `Unrecognized` so scoring can fall back
// to a neutral signal instead of rejecting the request.
macro_rules! questionnaire_band {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            Unrecognized(String),
        }

        impl $name {
            pub fn label(&self) -> &str {
                match self {
                    $($name::$variant => $label,)+
                    $name::Unrecognized(raw) => raw.as_str(),
                }
            }

            pub fn is_recognized(&self) -> bool {
                !matches!(self, $name::Unrecognized(_))
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                let known = match value.trim() {
                    $($label => Some($name::$variant),)+
                    _ => None,
                };
                known.unwrap_or_else(|| $name::Unrecognized(value))
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::from(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.label().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

questionnaire_band! {
    /// Investor age bracket.
    AgeBand {
        Under25 => "<25",
        From25To35 => "25-35",
        From35To45 => "35-45",
        From45To55 => "45-55",
        From55To65 => "55-65",
        Over65 => "65+",
    }
}

questionnaire_band! {
    /// How long the money can stay invested.
    InvestmentHorizon {
        UnderTwoYears => "<2 years",
        TwoToFiveYears => "2-5 years",
        FiveToTenYears => "5-10 years",
        TenToTwentyYears => "10-20 years",
        OverTwentyYears => "20+ years",
    }
}

questionnaire_band! {
    IncomeBand {
        Under50K => "<50K",
        From50KTo1L => "50K-1L",
        From1LTo2L => "1L-2L",
        From2LTo5L => "2L-5L",
        Over5L => "5L+",
    }
}

questionnaire_band! {
    /// Months of expenses held in an emergency fund.
    EmergencyFundCoverage {
        UpToOneMonth => "0-1",
        TwoToThreeMonths => "2-3",
        FourToSixMonths => "4-6",
        SevenToTwelveMonths => "7-12",
        OverTwelveMonths => "12+",
    }
}

impl EmergencyFundCoverage {
    /// Coverage below three months.
    pub fn is_thin(&self) -> bool {
        matches!(
            self,
            EmergencyFundCoverage::UpToOneMonth | EmergencyFundCoverage::TwoToThreeMonths
        )
    }
}

questionnaire_band! {
    Dependents {
        Zero => "0",
        OneToTwo => "1-2",
        ThreeToFour => "3-4",
        FivePlus => "5+",
    }
}

questionnaire_band! {
    /// Reaction to a sharp market fall.
    VolatilityComfort {
        PanicSell => "panic_sell",
        VeryUncomfortable => "very_uncomfortable",
        SomewhatConcerned => "somewhat_concerned",
        StayCalm => "stay_calm",
        BuyMore => "buy_more",
    }
}

questionnaire_band! {
    /// Largest one-year loss the investor says they can accept.
    LossTolerance {
        FivePercent => "5%",
        TenPercent => "10%",
        TwentyPercent => "20%",
        ThirtyPercent => "30%",
        FortyPlus => "40%+",
    }
}

questionnaire_band! {
    InvestmentKnowledge {
        Beginner => "beginner",
        SomeKnowledge => "some_knowledge",
        Experienced => "experienced",
        Expert => "expert",
    }
}

questionnaire_band! {
    /// Single primary goal submitted by older questionnaire clients in place of a goal list.
    LegacyGoal {
        Retirement => "retirement",
        WealthBuilding => "wealth_building",
        IncomeGeneration => "income_generation",
        ChildEducation => "child_education",
        HomePurchase => "home_purchase",
        Preservation => "preservation",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalCategory {
    Retirement,
    WealthBuilding,
    HomePurchase,
    ChildEducation,
    EmergencyFund,
    #[serde(other)]
    Custom,
}

impl GoalCategory {
    pub const fn label(self) -> &'static str {
        match self {
            GoalCategory::Retirement => "retirement",
            GoalCategory::WealthBuilding => "wealth_building",
            GoalCategory::HomePurchase => "home_purchase",
            GoalCategory::ChildEducation => "child_education",
            GoalCategory::EmergencyFund => "emergency_fund",
            GoalCategory::Custom => "custom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Low,
    #[serde(other)]
    Medium,
}

impl Priority {
    pub const fn label(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub(crate) const fn rank(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

const DAYS_PER_MONTH: f64 = 30.44;
const DAYS_PER_YEAR: f64 = 365.25;

/// Caller-owned financial goal. The engine reads goals but never mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub category: GoalCategory,
    pub target_amount: f64,
    pub target_date: NaiveDate,
    pub priority: Priority,
    #[serde(default)]
    pub current_progress: Option<f64>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Goal {
    pub fn progress(&self) -> f64 {
        self.current_progress.unwrap_or(0.0).max(0.0)
    }

    pub fn remaining_amount(&self) -> f64 {
        (self.target_amount - self.progress()).max(0.0)
    }

    pub fn completion_ratio(&self) -> f64 {
        if self.target_amount <= 0.0 {
            return 1.0;
        }
        (self.progress() / self.target_amount).min(1.0)
    }

    pub fn is_complete(&self) -> bool {
        self.remaining_amount() <= 0.0
    }

    /// Whole months from `today` to the target date; zero or negative means past due.
    pub fn months_until(&self, today: NaiveDate) -> i64 {
        let days = (self.target_date - today).num_days() as f64;
        (days / DAYS_PER_MONTH).round() as i64
    }

    pub fn years_until(&self, today: NaiveDate) -> f64 {
        (self.target_date - today).num_days() as f64 / DAYS_PER_YEAR
    }
}

/// Validated questionnaire record submitted for a recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionnaireAnswers {
    pub age: AgeBand,
    pub investment_horizon: InvestmentHorizon,
    pub annual_income: IncomeBand,
    pub investment_amount: f64,
    pub emergency_fund_months: EmergencyFundCoverage,
    pub dependents: Dependents,
    pub volatility_comfort: VolatilityComfort,
    pub max_acceptable_loss: LossTolerance,
    pub investment_knowledge: InvestmentKnowledge,
    pub has_insurance: bool,
    #[serde(default)]
    pub avoid_assets: Vec<AssetClass>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub primary_goal: Option<LegacyGoal>,
}

impl QuestionnaireAnswers {
    /// Active goals that still have an amount left to fund.
    pub fn open_goals(&self) -> impl Iterator<Item = &Goal> {
        self.goals
            .iter()
            .filter(|goal| goal.is_active && !goal.is_complete())
    }

    pub fn excludes(&self, class: AssetClass) -> bool {
        self.avoid_assets.contains(&class)
    }
}

/// Weighted directional nudge toward equity or safety derived from one answer or goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub factor: String,
    pub equity_signal: f64,
    pub safety_signal: f64,
    pub weight: f64,
    pub explanation: String,
}

impl Signal {
    pub fn weighted_equity(&self) -> f64 {
        self.equity_signal * self.weight
    }

    pub fn weighted_safety(&self) -> f64 {
        self.safety_signal * self.weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_priority_and_category_fall_back() {
        let priority: Priority = serde_json::from_str("\"urgent\"").expect("fallback variant");
        assert_eq!(priority, Priority::Medium);
        let priority: Priority = serde_json::from_str("\"low\"").expect("known variant");
        assert_eq!(priority, Priority::Low);
        let category: GoalCategory = serde_json::from_str("\"vacation\"").expect("fallback variant");
        assert_eq!(category, GoalCategory::Custom);
    }

    #[test]
    fn bands_parse_known_labels_and_keep_unknown_ones() {
        assert_eq!(AgeBand::from("25-35"), AgeBand::From25To35);
        assert_eq!(InvestmentHorizon::from(" <2 years "), InvestmentHorizon::UnderTwoYears);
        let unknown = VolatilityComfort::from("shrug");
        assert_eq!(unknown, VolatilityComfort::Unrecognized("shrug".to_string()));
        assert!(!unknown.is_recognized());
        assert_eq!(unknown.label(), "shrug");
    }

    #[test]
    fn bands_round_trip_through_json_labels() {
        let json = serde_json::to_string(&LossTolerance::FortyPlus).expect("serialize");
        assert_eq!(json, "\"40%+\"");
        let parsed: EmergencyFundCoverage = serde_json::from_str("\"7-12\"").expect("parse");
        assert_eq!(parsed, EmergencyFundCoverage::SevenToTwelveMonths);
    }

    #[test]
    fn asset_classes_accept_questionnaire_aliases() {
        let parsed: Vec<AssetClass> =
            serde_json::from_str(r#"["Real Estate", "Equity MF", "Gold", "LiquidFunds"]"#)
                .expect("parse classes");
        assert_eq!(
            parsed,
            vec![
                AssetClass::RealEstate,
                AssetClass::DiversifiedEquityFunds,
                AssetClass::Gold,
                AssetClass::LiquidFunds
            ]
        );
    }

    #[test]
    fn goal_timing_uses_average_month_length() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date");
        let goal = Goal {
            id: "g1".to_string(),
            name: "House".to_string(),
            category: GoalCategory::HomePurchase,
            target_amount: 1_000_000.0,
            target_date: NaiveDate::from_ymd_opt(2027, 1, 1).expect("valid date"),
            priority: Priority::High,
            current_progress: Some(250_000.0),
            is_active: true,
        };
        assert_eq!(goal.months_until(today), 24);
        assert!((goal.years_until(today) - 2.0).abs() < 0.01);
        assert_eq!(goal.remaining_amount(), 750_000.0);
        assert!((goal.completion_ratio() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn even_split_hands_remainder_to_leading_classes() {
        let allocation = Allocation::even_across(&[
            AssetClass::Stocks,
            AssetClass::Gold,
            AssetClass::LiquidFunds,
        ]);
        assert_eq!(allocation.get(AssetClass::Stocks), 34);
        assert_eq!(allocation.get(AssetClass::Gold), 33);
        assert_eq!(allocation.get(AssetClass::LiquidFunds), 33);
        assert_eq!(allocation.total(), 100);
    }
}
