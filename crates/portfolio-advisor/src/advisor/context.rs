use serde::{Deserialize, Serialize};

use super::domain::{
    AgeBand, Dependents, GoalCategory, IncomeBand, InvestmentHorizon, LegacyGoal, LossTolerance,
    QuestionnaireAnswers, VolatilityComfort,
};

/// Goal intent shared by the goal list and the legacy single primary goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalFocus {
    Retirement,
    WealthBuilding,
    HomePurchase,
    ChildEducation,
    EmergencyFund,
    IncomeGeneration,
    Preservation,
    Custom,
}

impl GoalFocus {
    pub fn from_legacy(goal: &LegacyGoal) -> Option<Self> {
        match goal {
            LegacyGoal::Retirement => Some(GoalFocus::Retirement),
            LegacyGoal::WealthBuilding => Some(GoalFocus::WealthBuilding),
            LegacyGoal::IncomeGeneration => Some(GoalFocus::IncomeGeneration),
            LegacyGoal::ChildEducation => Some(GoalFocus::ChildEducation),
            LegacyGoal::HomePurchase => Some(GoalFocus::HomePurchase),
            LegacyGoal::Preservation => Some(GoalFocus::Preservation),
            LegacyGoal::Unrecognized(_) => None,
        }
    }
}

impl From<GoalCategory> for GoalFocus {
    fn from(category: GoalCategory) -> Self {
        match category {
            GoalCategory::Retirement => GoalFocus::Retirement,
            GoalCategory::WealthBuilding => GoalFocus::WealthBuilding,
            GoalCategory::HomePurchase => GoalFocus::HomePurchase,
            GoalCategory::ChildEducation => GoalFocus::ChildEducation,
            GoalCategory::EmergencyFund => GoalFocus::EmergencyFund,
            GoalCategory::Custom => GoalFocus::Custom,
        }
    }
}

/// True when the legacy primary goal or any active goal carries `focus`.
pub fn pursues(answers: &QuestionnaireAnswers, focus: GoalFocus) -> bool {
    let legacy = answers
        .primary_goal
        .as_ref()
        .and_then(GoalFocus::from_legacy)
        == Some(focus);
    legacy
        || answers
            .goals
            .iter()
            .any(|goal| goal.is_active && GoalFocus::from(goal.category) == focus)
}

/// The legacy primary goal when supplied, otherwise the open goal with the highest priority.
/// Ties go to the larger remaining amount, then to the earlier goal.
pub fn dominant_goal(answers: &QuestionnaireAnswers) -> Option<GoalFocus> {
    if let Some(focus) = answers.primary_goal.as_ref().and_then(GoalFocus::from_legacy) {
        return Some(focus);
    }

    let mut best = None;
    for goal in answers.open_goals() {
        let key = (goal.priority.rank(), goal.remaining_amount());
        let replace = match best {
            None => true,
            Some((rank, remaining, _)) => key.0 > rank || (key.0 == rank && key.1 > remaining),
        };
        if replace {
            best = Some((key.0, key.1, goal.category));
        }
    }
    best.map(|(_, _, category)| GoalFocus::from(category))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiquidityNeeds {
    Monthly,
    FewTimesYear,
    OnceYear,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStability {
    NotStable,
    SomewhatStable,
    VeryStable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeographicContext {
    UrbanAffluent,
    UrbanStandard,
    Suburban,
    RuralStandard,
}

/// Facts the questionnaire no longer asks directly, derived once per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferredContext {
    pub dominant_goal: Option<GoalFocus>,
    pub liquidity_needs: LiquidityNeeds,
    pub job_stability: JobStability,
    pub withdrawal_next_two_years: bool,
    pub expected_return: String,
    pub monthly_obligations: String,
    pub geographic_context: GeographicContext,
}

impl InferredContext {
    pub fn infer(answers: &QuestionnaireAnswers) -> Self {
        let dominant_goal = dominant_goal(answers);
        Self {
            dominant_goal,
            liquidity_needs: liquidity_needs(answers, dominant_goal),
            job_stability: job_stability(answers),
            withdrawal_next_two_years: answers.emergency_fund_months.is_thin(),
            expected_return: expected_return(answers).to_string(),
            monthly_obligations: monthly_obligations(&answers.annual_income).to_string(),
            geographic_context: geographic_context(&answers.annual_income),
        }
    }

    pub fn has_frequent_liquidity_needs(&self) -> bool {
        self.liquidity_needs == LiquidityNeeds::Monthly
    }
}

fn liquidity_needs(answers: &QuestionnaireAnswers, dominant: Option<GoalFocus>) -> LiquidityNeeds {
    if answers.investment_horizon == InvestmentHorizon::UnderTwoYears
        || dominant == Some(GoalFocus::HomePurchase)
    {
        LiquidityNeeds::Monthly
    } else if answers.investment_horizon == InvestmentHorizon::TwoToFiveYears {
        LiquidityNeeds::FewTimesYear
    } else if dominant == Some(GoalFocus::WealthBuilding)
        && answers.investment_horizon == InvestmentHorizon::OverTwentyYears
    {
        LiquidityNeeds::OnceYear
    } else {
        LiquidityNeeds::Never
    }
}

fn job_stability(answers: &QuestionnaireAnswers) -> JobStability {
    if answers.emergency_fund_months.is_thin() {
        JobStability::NotStable
    } else if answers.age == AgeBand::Over65 || answers.dependents == Dependents::FivePlus {
        JobStability::SomewhatStable
    } else if matches!(answers.age, AgeBand::Under25 | AgeBand::From25To35) {
        JobStability::VeryStable
    } else {
        JobStability::SomewhatStable
    }
}

fn expected_return(answers: &QuestionnaireAnswers) -> &'static str {
    match (&answers.max_acceptable_loss, &answers.volatility_comfort) {
        (LossTolerance::FortyPlus, VolatilityComfort::BuyMore) => "20%+",
        (LossTolerance::ThirtyPercent, VolatilityComfort::StayCalm) => "15-20%",
        (LossTolerance::TwentyPercent, VolatilityComfort::SomewhatConcerned) => "12-15%",
        (LossTolerance::TenPercent, VolatilityComfort::VeryUncomfortable) => "8-12%",
        (LossTolerance::FivePercent, VolatilityComfort::PanicSell) => "5-8%",
        _ => "8-12%",
    }
}

fn monthly_obligations(income: &IncomeBand) -> &'static str {
    match income {
        IncomeBand::Over5L => "25K-50K",
        IncomeBand::From2LTo5L => "15K-30K",
        IncomeBand::From1LTo2L => "8K-20K",
        IncomeBand::From50KTo1L => "5K-12K",
        _ => "<5K",
    }
}

fn geographic_context(income: &IncomeBand) -> GeographicContext {
    match income {
        IncomeBand::Over5L => GeographicContext::UrbanAffluent,
        IncomeBand::From2LTo5L => GeographicContext::UrbanStandard,
        IncomeBand::From50KTo1L => GeographicContext::RuralStandard,
        _ => GeographicContext::Suburban,
    }
}
