//! Integration tests for the trinomial lattice.

use approx::assert_relative_eq;
use proptest::prelude::*;
use tl_core::errors::Error;
use tl_instruments::{ExerciseType, OptionContract, OptionType};
use tl_market::MarketEnvironment;
use tl_math::normal_cdf;
use tl_methods::{ColumnTrace, NodeAttribute, TrinomialLattice};
use tl_time::Date;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn date(y: u16, m: u8, d: u8) -> Date {
    Date::from_ymd(y, m, d).unwrap()
}

fn pricing_date() -> Date {
    date(2025, 1, 15)
}

fn maturity() -> Date {
    date(2026, 1, 15)
}

fn market() -> MarketEnvironment {
    MarketEnvironment::new(0.05, 0.2, 100.0).unwrap()
}

fn contract(option_type: OptionType, exercise: ExerciseType) -> OptionContract {
    OptionContract::new(option_type, exercise, 100.0, maturity()).unwrap()
}

fn price(
    market: MarketEnvironment,
    option: OptionContract,
    steps: usize,
    threshold: f64,
) -> Result<f64, Error> {
    TrinomialLattice::new(market, option, pricing_date(), steps, threshold)?.run()
}

/// Closed-form reference, kept local so this crate does not depend on the
/// engines crate.
fn black_scholes_call(s: f64, k: f64, r: f64, vol: f64, t: f64) -> f64 {
    let sd = vol * t.sqrt();
    let d1 = ((s / k).ln() + (r + 0.5 * vol * vol) * t) / sd;
    let d2 = d1 - sd;
    s * normal_cdf(d1) - k * (-r * t).exp() * normal_cdf(d2)
}

#[test]
fn european_call_matches_black_scholes() {
    init_tracing();
    let bs = black_scholes_call(100.0, 100.0, 0.05, 0.2, 1.0);
    assert_relative_eq!(bs, 10.4506, epsilon = 1e-4);
    let lattice = price(
        market(),
        contract(OptionType::Call, ExerciseType::European),
        200,
        0.0,
    )
    .unwrap();
    assert!((lattice - bs).abs() < 0.01, "lattice={lattice}, bs={bs}");
}

#[test]
fn european_put_call_parity() {
    let call = price(market(), contract(OptionType::Call, ExerciseType::European), 100, 0.0).unwrap();
    let put = price(market(), contract(OptionType::Put, ExerciseType::European), 100, 0.0).unwrap();
    // Parity holds on the lattice because the mean is matched at every node.
    let parity = call - 100.0 + 100.0 * (-0.05_f64).exp();
    assert_relative_eq!(put, parity, epsilon = 1e-8);
}

#[test]
fn american_put_is_worth_at_least_european() {
    let european = price(market(), contract(OptionType::Put, ExerciseType::European), 200, 0.0).unwrap();
    let american = price(market(), contract(OptionType::Put, ExerciseType::American), 200, 0.0).unwrap();
    assert!(american >= european, "american={american}, european={european}");
    assert!(american - european > 0.1);
}

#[test]
fn american_call_without_dividend_is_european() {
    let european = price(market(), contract(OptionType::Call, ExerciseType::European), 80, 0.0).unwrap();
    let american = price(market(), contract(OptionType::Call, ExerciseType::American), 80, 0.0).unwrap();
    assert_relative_eq!(american, european, epsilon = 1e-10);
}

#[test]
fn zero_threshold_matches_tiny_threshold_on_small_tree() {
    let option = contract(OptionType::Call, ExerciseType::European);
    let zero = price(market(), option, 5, 0.0).unwrap();
    let tiny = price(market(), option, 5, 1e-12).unwrap();
    assert_relative_eq!(zero, tiny, epsilon = 1e-12);
}

#[test]
fn moderate_pruning_barely_moves_the_price() {
    let option = contract(OptionType::Put, ExerciseType::American);
    let full = price(market(), option, 150, 0.0).unwrap();
    let pruned = price(market(), option, 150, 1e-9).unwrap();
    assert!((full - pruned).abs() < 1e-4, "full={full}, pruned={pruned}");
}

#[test]
fn dividend_lowers_call_and_raises_put() {
    let with_div = market().with_dividend(3.0, date(2025, 6, 15)).unwrap();
    for exercise in [ExerciseType::European, ExerciseType::American] {
        let call = contract(OptionType::Call, exercise);
        let put = contract(OptionType::Put, exercise);
        let call_plain = price(market(), call, 60, 0.0).unwrap();
        let call_div = price(with_div, call, 60, 0.0).unwrap();
        let put_plain = price(market(), put, 60, 0.0).unwrap();
        let put_div = price(with_div, put, 60, 0.0).unwrap();
        assert!(call_div < call_plain, "{exercise}: {call_div} !< {call_plain}");
        assert!(put_div > put_plain, "{exercise}: {put_div} !> {put_plain}");
    }
}

#[test]
fn dividend_after_maturity_is_ignored() {
    let late = market().with_dividend(3.0, date(2026, 6, 15)).unwrap();
    let option = contract(OptionType::Call, ExerciseType::European);
    assert_eq!(
        price(late, option, 30, 0.0).unwrap(),
        price(market(), option, 30, 0.0).unwrap()
    );
}

#[test]
fn dividend_shifts_mid_chain_once() {
    let with_div = market().with_dividend(2.0, date(2025, 7, 1)).unwrap();
    let mut lattice = TrinomialLattice::new(
        with_div,
        contract(OptionType::Call, ExerciseType::European),
        pricing_date(),
        12,
        0.0,
    )
    .unwrap();
    lattice.build().unwrap();
    let g = lattice.model().growth();
    let mids: Vec<f64> = (0..=12)
        .map(|k| lattice.node(lattice.column_mid(k).unwrap()).unwrap().spot())
        .collect();
    let drops = mids
        .windows(2)
        .filter(|w| (w[1] - w[0] * g).abs() > 1e-9)
        .count();
    assert_eq!(drops, 1);
}

#[test]
fn zero_steps_is_configuration_error() {
    let err = price(market(), contract(OptionType::Call, ExerciseType::European), 0, 0.0);
    assert!(matches!(err, Err(Error::Configuration(_))));
}

#[test]
fn expired_contract_is_configuration_error() {
    let option = OptionContract::european(OptionType::Put, 100.0, pricing_date()).unwrap();
    let err = TrinomialLattice::new(market(), option, pricing_date(), 10, 0.0);
    assert!(matches!(err, Err(Error::Configuration(_))));
}

#[test]
fn extreme_volatility_is_calibration_error() {
    let wild = MarketEnvironment::new(0.05, 3.0, 100.0).unwrap();
    let mut lattice = TrinomialLattice::new(
        wild,
        contract(OptionType::Call, ExerciseType::European),
        pricing_date(),
        2,
        0.0,
    )
    .unwrap();
    match lattice.run() {
        Err(Error::Calibration { step, .. }) => assert_eq!(step, 0),
        other => panic!("expected calibration error, got {other:?}"),
    }
    assert!(!lattice.is_built());
    assert!(lattice.column_mid(1).is_none());
}

#[test]
fn dividend_larger_than_forward_is_calibration_error() {
    let huge = market().with_dividend(500.0, date(2025, 3, 1)).unwrap();
    let err = price(huge, contract(OptionType::Call, ExerciseType::European), 10, 0.0);
    assert!(matches!(err, Err(Error::Calibration { .. })), "{err:?}");
}

#[test]
fn failed_run_keeps_reporting_the_first_error() {
    let with_div = market().with_dividend(500.0, date(2025, 7, 1)).unwrap();
    let mut lattice = TrinomialLattice::new(
        with_div,
        contract(OptionType::Put, ExerciseType::American),
        pricing_date(),
        50,
        0.0,
    )
    .unwrap();
    let first = match lattice.run() {
        Err(e @ Error::Calibration { .. }) => e,
        other => panic!("expected calibration error, got {other:?}"),
    };
    let nodes = lattice.node_count();
    for _ in 0..2 {
        assert_eq!(lattice.run().unwrap_err(), first);
        assert_eq!(lattice.build().unwrap_err(), first);
        assert_eq!(lattice.node_count(), nodes);
    }
    assert!(!lattice.is_built());
}

#[test]
fn error_shrinks_as_steps_grow() {
    let bs = black_scholes_call(100.0, 100.0, 0.05, 0.2, 1.0);
    let option = contract(OptionType::Call, ExerciseType::European);
    // The error oscillates with the strike's position between levels, so
    // compare averages over step windows rather than single step counts.
    let mean_error = |steps: std::ops::RangeInclusive<usize>| {
        let n = steps.clone().count() as f64;
        steps
            .map(|k| (price(market(), option, k, 0.0).unwrap() - bs).abs())
            .sum::<f64>()
            / n
    };
    let (coarse, medium, fine) = (mean_error(1..=10), mean_error(40..=50), mean_error(160..=170));
    assert!(medium < coarse, "{medium} !< {coarse}");
    assert!(fine < medium, "{fine} !< {medium}");
    assert!(fine < 0.02);
}

#[test]
fn trace_covers_every_column() {
    let mut lattice = TrinomialLattice::new(
        market(),
        contract(OptionType::Call, ExerciseType::American),
        pricing_date(),
        10,
        0.0,
    )
    .unwrap();
    let root_value = lattice.run().unwrap();

    let mut spots = ColumnTrace::new();
    lattice.trace(NodeAttribute::Spot, &mut spots);
    assert_eq!(spots.column(10).count(), 21);
    let mid = spots.column(10).find(|p| p.row == 0).unwrap();
    assert_relative_eq!(mid.value, 100.0 * (0.05_f64).exp(), max_relative = 1e-12);

    let mut values = ColumnTrace::new();
    lattice.trace(NodeAttribute::OptionValue, &mut values);
    assert_eq!(values.points()[0].value, root_value);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn columns_conserve_probability(
        vol in 0.05f64..0.6,
        rate in -0.02f64..0.1,
        steps in 1usize..40,
        dividend in 0.0f64..4.0,
        ex_day in 0i32..365,
    ) {
        let m = MarketEnvironment::new(rate, vol, 100.0)
            .unwrap()
            .with_dividend(dividend, pricing_date().add_days(ex_day).unwrap())
            .unwrap();
        let option = contract(OptionType::Put, ExerciseType::American);
        let mut lattice = TrinomialLattice::new(m, option, pricing_date(), steps, 0.0).unwrap();
        // Some dividend/vol combinations cannot be calibrated; those are
        // reported, never half-built.
        match lattice.build() {
            Ok(()) => {
                for step in 0..=steps {
                    prop_assert!((lattice.column_probability(step) - 1.0).abs() < 1e-10);
                    for (_, id) in lattice.column(step) {
                        let node = lattice.node(id).unwrap();
                        if step < steps && !node.is_pruned() {
                            let (d, mid, u) = node.probabilities();
                            prop_assert!((0.0..=1.0).contains(&d));
                            prop_assert!((0.0..=1.0).contains(&mid));
                            prop_assert!((0.0..=1.0).contains(&u));
                            prop_assert!((d + mid + u - 1.0).abs() < 1e-12);
                        }
                    }
                }
            }
            Err(e) => prop_assert!(matches!(e, Error::Calibration { .. }), "{e}"),
        }
    }

    #[test]
    fn american_dominates_european_and_payoff(
        strike in 80.0f64..120.0,
        vol in 0.1f64..0.5,
        steps in 5usize..60,
    ) {
        let eu = OptionContract::european(OptionType::Put, strike, maturity()).unwrap();
        let am = eu.with_exercise(ExerciseType::American);
        let m = MarketEnvironment::new(0.05, vol, 100.0).unwrap();
        let p_eu = price(m, eu, steps, 0.0).unwrap();
        let p_am = price(m, am, steps, 0.0).unwrap();
        prop_assert!(p_am >= p_eu - 1e-12);
        prop_assert!(p_am >= (strike - 100.0).max(0.0) - 1e-12);
    }
}
