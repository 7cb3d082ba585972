//! Property tests for evaluation invariants.
//!
//! Uses proptest to verify:
//! 1. Row count equals series length minus `slow_window - 1` warm-up rows
//! 2. Positions are signals lagged by one bar, starting flat
//! 3. Equity curves stay non-negative and drawdown stays within [-1, 0]
//! 4. Evaluation is deterministic and parallel matches sequential
//! 5. Strictly rising prices never draw down

mod common;

use common::*;
use proptest::prelude::*;
use smacross::domain::evaluator::{EvaluationConfig, evaluate, evaluate_all};
use smacross::domain::signal::TieBreak;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_closes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((1.0..1000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0), 1..160)
}

fn arb_windows() -> impl Strategy<Value = (usize, usize)> {
    (1usize..12).prop_flat_map(|fast| (Just(fast), (fast + 1)..40))
}

fn arb_tie_break() -> impl Strategy<Value = TieBreak> {
    prop_oneof![Just(TieBreak::Flat), Just(TieBreak::Long)]
}

fn config(fast: usize, slow: usize, tie_break: TieBreak) -> EvaluationConfig {
    EvaluationConfig {
        fast_window: fast,
        slow_window: slow,
        tie_break,
        ..EvaluationConfig::default()
    }
}

proptest! {
    #[test]
    fn row_count_is_length_minus_slow_warmup(
        closes in arb_closes(),
        (fast, slow) in arb_windows(),
    ) {
        prop_assume!(slow >= 2);
        let series = series_from_closes("P", &closes);
        let result = evaluate(&series, &config(fast, slow, TieBreak::Flat)).unwrap();
        prop_assert_eq!(result.row_count, closes.len().saturating_sub(slow - 1));
        prop_assert_eq!(result.series.len(), result.row_count);
    }

    #[test]
    fn positions_lag_signals(
        closes in arb_closes(),
        (fast, slow) in arb_windows(),
        tie_break in arb_tie_break(),
    ) {
        let series = series_from_closes("P", &closes);
        let result = evaluate(&series, &config(fast, slow, tie_break)).unwrap();
        let signals = result.series.signals();
        let positions = result.series.positions();

        if let Some(&first) = positions.first() {
            prop_assert_eq!(first, 0);
        }
        for i in 1..positions.len() {
            prop_assert_eq!(positions[i], signals[i - 1]);
        }
        for row in &result.series.rows {
            prop_assert_eq!(row.strategy_return, f64::from(row.position) * row.ret);
        }
    }

    #[test]
    fn equity_positive_and_drawdown_bounded(
        closes in arb_closes(),
        (fast, slow) in arb_windows(),
    ) {
        let series = series_from_closes("P", &closes);
        let result = evaluate(&series, &config(fast, slow, TieBreak::Flat)).unwrap();

        prop_assert!(result.series.strategy_equity().iter().all(|&e| e >= 0.0));
        prop_assert!(result.series.buyhold_equity().iter().all(|&e| e > 0.0));
        prop_assert!(result.metrics.max_drawdown <= 0.0);
        prop_assert!(result.metrics.max_drawdown >= -1.0);
        prop_assert!(result.metrics.volatility >= 0.0);
        prop_assert!((0.0..=1.0).contains(&result.metrics.exposure));
    }

    #[test]
    fn evaluation_is_deterministic(
        closes in arb_closes(),
        (fast, slow) in arb_windows(),
    ) {
        let series = series_from_closes("P", &closes);
        let cfg = config(fast, slow, TieBreak::Flat);
        let first = evaluate(&series, &cfg).unwrap();
        let second = evaluate(&series, &cfg).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn parallel_matches_sequential(
        a in arb_closes(),
        b in arb_closes(),
        (fast, slow) in arb_windows(),
    ) {
        let series = vec![series_from_closes("A", &a), series_from_closes("B", &b)];
        let cfg = config(fast, slow, TieBreak::Flat);
        let parallel: Vec<_> = evaluate_all(&series, &cfg, true)
            .into_iter()
            .map(Result::unwrap)
            .collect();
        let sequential: Vec<_> = evaluate_all(&series, &cfg, false)
            .into_iter()
            .map(Result::unwrap)
            .collect();
        prop_assert_eq!(parallel, sequential);
    }

    #[test]
    fn rising_prices_never_draw_down(
        start in 1.0..100.0_f64,
        steps in prop::collection::vec(0.01..5.0_f64, 2..120),
        (fast, slow) in arb_windows(),
    ) {
        let closes: Vec<f64> = steps
            .iter()
            .scan(start, |price, step| {
                *price += step;
                Some(*price)
            })
            .collect();
        let series = series_from_closes("UP", &closes);
        let result = evaluate(&series, &config(fast, slow, TieBreak::Flat)).unwrap();

        prop_assert_eq!(result.metrics.max_drawdown, 0.0);
        prop_assert_eq!(result.metrics.buyhold_max_drawdown, 0.0);
    }
}
