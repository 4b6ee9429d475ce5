use serde_json::json;

use super::common::{base_answers, date, goal, today, with_progress};
use crate::advisor::domain::{AgeBand, Goal, GoalCategory, InvestmentKnowledge, Priority};
use crate::advisor::signals::{goal_signal, timeline_adjustment, GOAL_WEIGHT_BUDGET};
use crate::advisor::{QuestionnaireAnswers, Signal, SignalProcessor};

fn goal_weight_total(signals: &[Signal]) -> f64 {
    signals
        .iter()
        .filter(|signal| signal.factor.starts_with("goal_"))
        .map(|signal| signal.weight)
        .sum()
}

fn answers_with_goals(count: usize) -> QuestionnaireAnswers {
    let goals = (0..count)
        .map(|index| {
            let priority = match index % 3 {
                0 => Priority::High,
                1 => Priority::Medium,
                _ => Priority::Low,
            };
            goal(
                &format!("g{index}"),
                GoalCategory::WealthBuilding,
                250_000.0 * (index as f64 + 1.0),
                date(2026 + index as i32, 6, 1),
                priority,
            )
        })
        .collect();
    QuestionnaireAnswers {
        goals,
        ..base_answers()
    }
}

#[test]
fn goal_weights_always_fill_the_goal_budget() {
    let processor = SignalProcessor::new();
    for count in [1, 3, 10] {
        let signals = processor.calculate_signals(&answers_with_goals(count), today());
        let total = goal_weight_total(&signals);
        assert!(
            (total - GOAL_WEIGHT_BUDGET).abs() < 1e-9,
            "{count} goals summed to {total}"
        );
    }
}

#[test]
fn nearly_finished_goal_weighs_less_than_untouched_one() {
    let target = 2_000_000.0;
    let fresh = goal(
        "fresh",
        GoalCategory::HomePurchase,
        target,
        date(2028, 1, 1),
        Priority::Medium,
    );
    let nearly_done = with_progress(
        goal(
            "done",
            GoalCategory::HomePurchase,
            target,
            date(2028, 1, 1),
            Priority::Medium,
        ),
        0.95 * target,
    );
    let answers = QuestionnaireAnswers {
        goals: vec![fresh, nearly_done],
        ..base_answers()
    };

    let signals = SignalProcessor::new().calculate_signals(&answers, today());
    let weight_of = |factor: &str| {
        signals
            .iter()
            .find(|signal| signal.factor == factor)
            .map(|signal| signal.weight)
            .expect("goal signal present")
    };

    assert!(weight_of("goal_home_purchase_done") < weight_of("goal_home_purchase_fresh"));
}

#[test]
fn missing_goals_fall_back_to_balanced_default() {
    let finished = with_progress(
        goal(
            "paid",
            GoalCategory::ChildEducation,
            400_000.0,
            date(2030, 1, 1),
            Priority::High,
        ),
        400_000.0,
    );
    let mut dormant = goal(
        "dormant",
        GoalCategory::Retirement,
        5_000_000.0,
        date(2050, 1, 1),
        Priority::High,
    );
    dormant.is_active = false;

    let answers = QuestionnaireAnswers {
        goals: vec![finished, dormant],
        ..base_answers()
    };
    let signals = SignalProcessor::new().calculate_signals(&answers, today());

    let default = signals
        .iter()
        .find(|signal| signal.factor == "default_balanced_goal")
        .expect("default goal signal");
    assert_eq!(default.weight, 0.15);
    assert_eq!(default.equity_signal, 0.0);
    assert_eq!(default.safety_signal, 0.0);
    assert!(signals.iter().all(|signal| !signal.factor.starts_with("goal_")));
}

#[test]
fn unrecognized_band_produces_neutral_signal() {
    let age: AgeBand = serde_json::from_value(json!("forty-ish")).expect("any string parses");
    assert!(!age.is_recognized());

    let answers = QuestionnaireAnswers {
        age,
        ..base_answers()
    };
    let signals = SignalProcessor::new().calculate_signals(&answers, today());
    let age_signal = &signals[0];

    assert_eq!(age_signal.factor, "age");
    assert_eq!(age_signal.weight, 0.25);
    assert_eq!(age_signal.equity_signal, 0.0);
    assert_eq!(age_signal.safety_signal, 0.0);
    assert!(age_signal.explanation.starts_with("Unrecognized age band"));
}

#[test]
fn timeline_adjustment_moves_smoothly_month_to_month() {
    for months in 0..300 {
        let step = (timeline_adjustment(months + 1) - timeline_adjustment(months)).abs();
        assert!(step <= 0.6, "jump of {step} at {months} months");
    }
}

#[test]
fn insurance_signal_only_for_uninsured() {
    let processor = SignalProcessor::new();
    let insured = processor.calculate_signals(&base_answers(), today());
    assert!(insured.iter().all(|signal| signal.factor != "insurance"));

    let uninsured = processor.calculate_signals(
        &QuestionnaireAnswers {
            has_insurance: false,
            ..base_answers()
        },
        today(),
    );
    let last = uninsured.last().expect("signals");
    assert_eq!(last.factor, "insurance");
    assert_eq!(last.equity_signal, -10.0);
    assert_eq!(last.weight, 0.05);
}

#[test]
fn expert_knowledge_amplifies_but_stays_bounded() {
    let answers = QuestionnaireAnswers {
        investment_knowledge: InvestmentKnowledge::Expert,
        ..base_answers()
    };
    let signals = SignalProcessor::new().calculate_signals(&answers, today());

    for signal in &signals {
        assert!(signal.equity_signal.abs() <= 10.0, "{}", signal.factor);
        assert!(signal.safety_signal.abs() <= 10.0, "{}", signal.factor);
        assert!(signal
            .explanation
            .ends_with("(enhanced for expert knowledge level)"));
    }
    assert_eq!(signals[0].equity_signal, 10.0);
}

#[test]
fn goal_explanation_describes_remaining_amount_and_urgency() {
    let home = with_progress(
        goal(
            "h1",
            GoalCategory::HomePurchase,
            1_000_000.0,
            date(2025, 7, 1),
            Priority::High,
        ),
        250_000.0,
    );
    let answers = QuestionnaireAnswers {
        goals: vec![home],
        ..base_answers()
    };
    let signals = SignalProcessor::new().calculate_signals(&answers, today());
    let goal_signal = signals
        .iter()
        .find(|signal| signal.factor == "goal_home_purchase_h1")
        .expect("goal signal");

    assert_eq!(
        goal_signal.explanation,
        "Goal h1: ₹7.5L urgent home_purchase goal (high priority)"
    );
    assert!(goal_signal.equity_signal < 0.0);
    assert!(goal_signal.safety_signal > 0.0);
}

#[test]
fn unrecognized_goal_labels_produce_a_neutral_tilt() {
    let parsed: Goal = serde_json::from_value(json!({
        "id": "trip",
        "name": "Sabbatical trip",
        "category": "vacation",
        "target_amount": 800_000.0,
        "target_date": "2030-01-01",
        "priority": "urgent"
    }))
    .expect("unknown labels fall back");
    assert_eq!(parsed.category, GoalCategory::Custom);
    assert_eq!(parsed.priority, Priority::Medium);

    let signal = goal_signal(&parsed, today());
    let timeline = timeline_adjustment(parsed.months_until(today()));
    assert_eq!(signal.factor, "goal_custom_trip");
    assert!((signal.equity_signal - timeline).abs() < 1e-9);
    assert!((signal.safety_signal + 0.7 * timeline).abs() < 1e-9);
    assert!(signal.explanation.ends_with("(medium priority)"));

    let explicit = goal(
        "trip",
        GoalCategory::Custom,
        800_000.0,
        date(2030, 1, 1),
        Priority::Medium,
    );
    let mut answers = base_answers();
    answers.goals = vec![parsed];
    let from_labels = SignalProcessor::new().calculate_signals(&answers, today());
    answers.goals = vec![explicit];
    let from_explicit = SignalProcessor::new().calculate_signals(&answers, today());
    assert_eq!(from_labels.len(), from_explicit.len());
    for (left, right) in from_labels.iter().zip(&from_explicit) {
        assert_eq!(left.factor, right.factor);
        assert!((left.equity_signal - right.equity_signal).abs() < 1e-9);
        assert!((left.weight - right.weight).abs() < 1e-9);
    }
}
