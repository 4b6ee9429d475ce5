use std::sync::Arc;

use axum::body::to_bytes;
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::advisor::domain::{
    AgeBand, Dependents, EmergencyFundCoverage, Goal, GoalCategory, IncomeBand,
    InvestmentHorizon, InvestmentKnowledge, LossTolerance, Priority, QuestionnaireAnswers,
    VolatilityComfort,
};
use crate::advisor::{AdvisorConfig, AdvisorEngine, RecommendationService};

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date")
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn engine() -> AdvisorEngine {
    AdvisorEngine::new(AdvisorConfig::default())
}

pub(super) fn service() -> Arc<RecommendationService> {
    Arc::new(RecommendationService::new(AdvisorConfig::default()))
}

/// Mid-career saver with a long horizon and middling risk answers.
pub(super) fn base_answers() -> QuestionnaireAnswers {
    QuestionnaireAnswers {
        age: AgeBand::From25To35,
        investment_horizon: InvestmentHorizon::OverTwentyYears,
        annual_income: IncomeBand::From2LTo5L,
        investment_amount: 500_000.0,
        emergency_fund_months: EmergencyFundCoverage::FourToSixMonths,
        dependents: Dependents::Zero,
        volatility_comfort: VolatilityComfort::StayCalm,
        max_acceptable_loss: LossTolerance::ThirtyPercent,
        investment_knowledge: InvestmentKnowledge::Experienced,
        has_insurance: true,
        avoid_assets: Vec::new(),
        goals: Vec::new(),
        primary_goal: None,
    }
}

/// Young investor answering every risk question at the growth end.
pub(super) fn growth_answers() -> QuestionnaireAnswers {
    QuestionnaireAnswers {
        emergency_fund_months: EmergencyFundCoverage::OverTwelveMonths,
        volatility_comfort: VolatilityComfort::BuyMore,
        max_acceptable_loss: LossTolerance::FortyPlus,
        investment_knowledge: InvestmentKnowledge::Expert,
        ..base_answers()
    }
}

/// Retiree with no buffer, no insurance and money needed soon.
pub(super) fn retiree_answers() -> QuestionnaireAnswers {
    QuestionnaireAnswers {
        age: AgeBand::Over65,
        investment_horizon: InvestmentHorizon::UnderTwoYears,
        annual_income: IncomeBand::From1LTo2L,
        investment_amount: 300_000.0,
        emergency_fund_months: EmergencyFundCoverage::UpToOneMonth,
        dependents: Dependents::OneToTwo,
        volatility_comfort: VolatilityComfort::VeryUncomfortable,
        max_acceptable_loss: LossTolerance::TenPercent,
        investment_knowledge: InvestmentKnowledge::Beginner,
        has_insurance: false,
        avoid_assets: Vec::new(),
        goals: Vec::new(),
        primary_goal: None,
    }
}

pub(super) fn goal(
    id: &str,
    category: GoalCategory,
    target_amount: f64,
    target_date: NaiveDate,
    priority: Priority,
) -> Goal {
    Goal {
        id: id.to_string(),
        name: format!("Goal {id}"),
        category,
        target_amount,
        target_date,
        priority,
        current_progress: None,
        is_active: true,
    }
}

pub(super) fn with_progress(mut goal: Goal, progress: f64) -> Goal {
    goal.current_progress = Some(progress);
    goal
}

pub(super) async fn read_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("json body")
}
