use chrono::{Local, NaiveDate};
use clap::Args;
use portfolio_advisor::advisor::{AdvisorConfig, AssetClass, Recommendation, Severity};
use portfolio_advisor::config::{AppConfig, ConfigError};
use portfolio_advisor::error::AppError;
use portfolio_advisor::{QuestionnaireAnswers, RecommendationService};
use serde_json::json;
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the evaluation date (defaults to today).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the full recommendation as JSON instead of the summary.
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RecommendArgs {
    /// Questionnaire answers as a JSON file
    #[arg(long)]
    pub(crate) answers: PathBuf,
    /// Evaluation date (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Advisor tables override (falls back to ADVISOR_TABLES, then built-in defaults)
    #[arg(long)]
    pub(crate) tables: Option<PathBuf>,
    /// Print the full recommendation as JSON instead of the summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_recommend(args: RecommendArgs) -> Result<(), AppError> {
    let RecommendArgs {
        answers,
        today,
        tables,
        json,
    } = args;

    let tables = match tables {
        Some(path) => AdvisorConfig::from_json_file(path).map_err(ConfigError::AdvisorTables)?,
        None => AppConfig::load()?.advisor.load_tables()?,
    };
    let raw = fs::read_to_string(&answers)?;
    let answers: QuestionnaireAnswers = serde_json::from_str(&raw)?;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let recommendation = RecommendationService::new(tables).recommend(&answers, today)?;
    emit(&recommendation, today, json)
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { today, json } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let answers = demo_answers(today)?;
    let recommendation = RecommendationService::default().recommend(&answers, today)?;

    if !json {
        println!("Portfolio advisor demo");
        println!("Sample investor: 30-year-old saving for a home and a child's education");
    }
    emit(&recommendation, today, json)
}

fn emit(recommendation: &Recommendation, today: NaiveDate, json: bool) -> Result<(), AppError> {
    if json {
        println!("{}", serde_json::to_string_pretty(recommendation)?);
    } else {
        render_recommendation(recommendation, today);
    }
    Ok(())
}

fn demo_answers(today: NaiveDate) -> Result<QuestionnaireAnswers, AppError> {
    let home_by = today + chrono::Duration::days(4 * 365);
    let college_by = today + chrono::Duration::days(15 * 365);

    let answers = serde_json::from_value(json!({
        "age": "25-35",
        "investment_horizon": "10-20 years",
        "annual_income": "5L+",
        "investment_amount": 800000,
        "emergency_fund_months": "4-6",
        "dependents": "1-2",
        "volatility_comfort": "stay_calm",
        "max_acceptable_loss": "20%",
        "investment_knowledge": "some_knowledge",
        "has_insurance": true,
        "avoid_assets": ["Real Estate"],
        "goals": [
            {
                "id": "home",
                "name": "Apartment down payment",
                "category": "home_purchase",
                "target_amount": 3000000,
                "target_date": home_by,
                "priority": "high",
                "current_progress": 500000
            },
            {
                "id": "college",
                "name": "College fund",
                "category": "child_education",
                "target_amount": 2500000,
                "target_date": college_by,
                "priority": "medium"
            }
        ]
    }))?;
    Ok(answers)
}

pub(crate) fn render_recommendation(recommendation: &Recommendation, today: NaiveDate) {
    let profile = &recommendation.risk_profile;
    println!("\nRecommendation as of {today}");
    println!(
        "Risk profile: {} (score {:.1}, band {}-{})",
        profile.level, recommendation.risk_score, profile.band_min, profile.band_max
    );
    println!("  {}", profile.description);

    println!("\nAllocation");
    for bucket in &recommendation.plan.buckets {
        println!(
            "  {:<14} {:>3}%  comfort {:.0}-{:.0}%",
            bucket.class.label(),
            bucket.pct,
            bucket.comfort_band.min,
            bucket.comfort_band.max
        );
    }
    let etf = recommendation
        .allocation
        .get(AssetClass::ExchangeTradedFunds);
    if etf > 0 {
        println!("  {:<14} {:>3}%", "ETF", etf);
    }
    println!(
        "  Equity {}% | Defensive {}% | Satellite {}%",
        recommendation.plan.equity, recommendation.plan.defensive, recommendation.plan.satellite
    );

    println!("\nRationale");
    for statement in &recommendation.rationale {
        println!("  - {statement}");
    }

    println!("\nStress test");
    for outcome in &recommendation.stress_test.scenarios {
        println!(
            "  {}: {:+.1}% ({:.1} months of expenses covered)",
            outcome.scenario,
            outcome.portfolio_impact * 100.0,
            outcome.months_covered
        );
        println!("    {}", outcome.recommendation);
    }

    if recommendation.behavioral_warnings.is_empty() {
        println!("\nBehavioral warnings: none");
    } else {
        println!(
            "\nBehavioral warnings (consistency score {})",
            recommendation.consistency_score
        );
        for warning in &recommendation.behavioral_warnings {
            let severity = match warning.severity {
                Severity::Critical => "CRITICAL",
                Severity::Warning => "warning",
            };
            println!("  [{severity}] {}", warning.message);
            println!("    Suggested: {}", warning.suggested_action);
        }
    }

    for notice in &recommendation.notices {
        println!("\nNotice: {notice:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date")
    }

    #[test]
    fn demo_profile_is_a_valid_questionnaire() {
        let answers = demo_answers(today()).expect("demo answers parse");
        assert_eq!(answers.goals.len(), 2);
        assert!(answers.age.is_recognized());

        let recommendation = RecommendationService::default()
            .recommend(&answers, today())
            .expect("demo recommendation");
        assert_eq!(recommendation.allocation.total(), 100);
    }

    #[test]
    fn recommend_reports_malformed_answers_as_input_error() {
        let path = std::env::temp_dir().join(format!(
            "portfolio-advisor-malformed-{}.json",
            std::process::id()
        ));
        fs::write(&path, r#"{ "age": "25-35" }"#).expect("write fixture");

        let result = run_recommend(RecommendArgs {
            answers: path.clone(),
            today: Some(today()),
            tables: Some(PathBuf::from(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/../../crates/portfolio-advisor/tests/fixtures/strict_tables.json"
            ))),
            json: true,
        });
        let _ = fs::remove_file(&path);

        assert!(matches!(result, Err(AppError::Input(_))));
    }

    #[test]
    fn recommend_reports_missing_answers_file_as_io_error() {
        let result = run_recommend(RecommendArgs {
            answers: PathBuf::from("/nonexistent/questionnaire.json"),
            today: Some(today()),
            tables: Some(PathBuf::from(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/../../crates/portfolio-advisor/tests/fixtures/strict_tables.json"
            ))),
            json: true,
        });

        assert!(matches!(result, Err(AppError::Io(_))));
    }
}
