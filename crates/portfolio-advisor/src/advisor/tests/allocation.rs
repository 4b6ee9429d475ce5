use std::collections::BTreeMap;

use super::common::{base_answers, engine, growth_answers, retiree_answers, today};
use crate::advisor::domain::{AssetClass, QuestionnaireAnswers};
use crate::advisor::{Allocation, AllocationCalculator, GoalTiltStrategy, RiskScoringConfig};

fn calculator() -> AllocationCalculator {
    AllocationCalculator::new(RiskScoringConfig::default())
}

fn allocation(values: &[(AssetClass, u32)]) -> Allocation {
    Allocation::from_values(values.iter().copied().collect::<BTreeMap<_, _>>())
}

fn sample() -> Allocation {
    allocation(&[
        (AssetClass::Stocks, 40),
        (AssetClass::DiversifiedEquityFunds, 20),
        (AssetClass::Gold, 10),
        (AssetClass::RealEstate, 10),
        (AssetClass::DebtInstruments, 10),
        (AssetClass::LiquidFunds, 10),
    ])
}

#[test]
fn excluded_weight_flows_to_remaining_classes_proportionally() {
    let outcome = calculator()
        .handle_avoided_assets(&sample(), &[AssetClass::Gold, AssetClass::RealEstate]);

    assert!(!outcome.fallback);
    assert_eq!(outcome.reclaimed, 20);
    let result = &outcome.allocation;
    assert_eq!(result.get(AssetClass::Gold), 0);
    assert_eq!(result.get(AssetClass::RealEstate), 0);
    assert_eq!(result.get(AssetClass::ExchangeTradedFunds), 0);
    assert_eq!(result.get(AssetClass::Stocks), 50);
    assert_eq!(result.get(AssetClass::DiversifiedEquityFunds), 25);
    // 12.5 each; the tie goes to the earlier class.
    assert_eq!(result.get(AssetClass::DebtInstruments), 13);
    assert_eq!(result.get(AssetClass::LiquidFunds), 12);
    assert_eq!(result.total(), 100);
}

#[test]
fn zero_weight_targets_share_reclaimed_mass_evenly() {
    let only_stocks = allocation(&[(AssetClass::Stocks, 100)]);
    let outcome = calculator().handle_avoided_assets(&only_stocks, &[AssetClass::Stocks]);

    assert!(!outcome.fallback);
    assert_eq!(outcome.reclaimed, 100);
    for class in [
        AssetClass::DiversifiedEquityFunds,
        AssetClass::Gold,
        AssetClass::RealEstate,
        AssetClass::DebtInstruments,
        AssetClass::LiquidFunds,
    ] {
        assert_eq!(outcome.allocation.get(class), 20, "{class}");
    }
    assert_eq!(outcome.allocation.get(AssetClass::Stocks), 0);
    assert_eq!(outcome.allocation.get(AssetClass::ExchangeTradedFunds), 0);
}

#[test]
fn excluding_every_target_keeps_input_and_flags_fallback() {
    let excluded: Vec<AssetClass> = AssetClass::ALL
        .iter()
        .copied()
        .filter(|class| *class != AssetClass::ExchangeTradedFunds)
        .collect();
    let outcome = calculator().handle_avoided_assets(&sample(), &excluded);

    assert!(outcome.fallback);
    assert_eq!(outcome.reclaimed, 0);
    assert_eq!(outcome.allocation, sample());
}

#[test]
fn uninsured_investor_moves_equity_toward_liquid_and_debt() {
    let answers = QuestionnaireAnswers {
        has_insurance: false,
        ..base_answers()
    };
    let before = sample();
    let after = calculator().apply_insurance_logic(&before, &answers);

    assert_eq!(after.total(), 100);
    assert!(after.equity_total() < before.equity_total());
    assert!(after.get(AssetClass::LiquidFunds) > before.get(AssetClass::LiquidFunds));
    assert!(after.get(AssetClass::DebtInstruments) > before.get(AssetClass::DebtInstruments));

    let insured = calculator().apply_insurance_logic(&before, &base_answers());
    assert_eq!(insured, before);
}

#[test]
fn uninsured_investor_never_regains_an_excluded_class() {
    let answers = QuestionnaireAnswers {
        has_insurance: false,
        avoid_assets: vec![AssetClass::LiquidFunds],
        ..base_answers()
    };
    let without_liquid = allocation(&[
        (AssetClass::Stocks, 50),
        (AssetClass::DiversifiedEquityFunds, 30),
        (AssetClass::DebtInstruments, 20),
    ]);
    let after = calculator().apply_insurance_logic(&without_liquid, &answers);

    assert_eq!(after.get(AssetClass::LiquidFunds), 0);
    assert_eq!(after.total(), 100);
}

#[test]
fn short_term_goal_tilt_shifts_toward_cash() {
    let calculator = calculator();
    let base = sample().to_mix();
    let untilted = calculator.apply_goal_adjustments(&base, &GoalTiltStrategy::Untilted);
    let tilted = calculator.apply_goal_adjustments(
        &base,
        &GoalTiltStrategy::Timeline {
            short_term: true,
            long_term: false,
            high_priority: false,
        },
    );

    assert_eq!(untilted, sample());
    assert!(tilted.get(AssetClass::LiquidFunds) > untilted.get(AssetClass::LiquidFunds));
    assert!(tilted.get(AssetClass::DebtInstruments) > untilted.get(AssetClass::DebtInstruments));
    assert!(tilted.get(AssetClass::Stocks) < untilted.get(AssetClass::Stocks));
}

#[test]
fn every_stage_sums_to_one_hundred() {
    let profiles = [
        base_answers(),
        growth_answers(),
        retiree_answers(),
        QuestionnaireAnswers {
            avoid_assets: vec![AssetClass::Gold, AssetClass::Stocks],
            has_insurance: false,
            ..growth_answers()
        },
        QuestionnaireAnswers {
            avoid_assets: AssetClass::ALL.to_vec(),
            ..retiree_answers()
        },
    ];

    let engine = engine();
    for answers in &profiles {
        let recommendation = engine.recommend(answers, today());
        let stages = &recommendation.stages;
        assert_eq!(stages.after_goals.total(), 100);
        assert_eq!(stages.after_exclusions.total(), 100);
        assert_eq!(stages.after_insurance.total(), 100);
        assert_eq!(recommendation.allocation.total(), 100);
        assert!((stages.base_mix.total() - 100.0).abs() < 1e-6);
    }
}
