//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = sum(C[i-j] for j in 0..n) / n
//! Warmup: first (n-1) values are `None`.

/// Trailing mean of `period` values ending at each index, `None` during warm-up.
///
/// Each window is summed from scratch so equal windows always produce
/// bit-identical means.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                None
            } else {
                let window = &values[i + 1 - period..=i];
                Some(window.iter().sum::<f64>() / period as f64)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_warmup() {
        let means = rolling_mean(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);

        assert_eq!(means.len(), 5);
        assert_eq!(means[0], None);
        assert_eq!(means[1], None);
        assert!(means[2].is_some());
        assert!(means[4].is_some());
    }

    #[test]
    fn sma_known_values() {
        let means = rolling_mean(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);

        assert_eq!(means[2], Some(20.0));
        assert_eq!(means[3], Some(30.0));
        assert_eq!(means[4], Some(40.0));
    }

    #[test]
    fn sma_period_one_is_identity() {
        let closes = [3.0, 1.5, 2.25];
        let means = rolling_mean(&closes, 1);
        assert_eq!(means, vec![Some(3.0), Some(1.5), Some(2.25)]);
    }

    #[test]
    fn sma_period_longer_than_input() {
        let means = rolling_mean(&[1.0, 2.0, 3.0], 50);
        assert!(means.iter().all(Option::is_none));
    }

    #[test]
    fn sma_zero_period_is_never_valid() {
        let means = rolling_mean(&[1.0, 2.0], 0);
        assert_eq!(means, vec![None, None]);
    }

    #[test]
    fn sma_same_window_is_bit_identical() {
        let means = rolling_mean(&[0.1, 0.2, 0.3, 0.1, 0.2, 0.3], 3);
        assert_eq!(means[2], means[5]);
    }
}
