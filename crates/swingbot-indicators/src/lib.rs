//! Technical indicator series.
//!
//! Both indicators return a vector exactly as long as the input, with a
//! NaN warm-up prefix, so indicator values stay aligned with their bars:
//! `sma[i]` and `rsi[i]` belong to `closes[i]`.

use swingbot_core::error::IndicatorError;

/// Simple moving average over a trailing window of closes.
///
/// The first `period - 1` entries are NaN.
pub fn sma(closes: &[f64], period: usize) -> Result<Vec<f64>, IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidPeriod(period));
    }

    let mut result = vec![f64::NAN; closes.len()];
    if closes.len() < period {
        return Ok(result);
    }

    let period_f64 = period as f64;
    let mut sum: f64 = closes[..period].iter().sum();
    result[period - 1] = sum / period_f64;

    for i in period..closes.len() {
        sum = sum - closes[i - period] + closes[i];
        result[i] = sum / period_f64;
    }

    Ok(result)
}

/// RSI-style oscillator over trailing-window means of gains and losses.
///
/// Uses simple rolling means of the close-to-close gain/loss magnitudes
/// (not Wilder smoothing). The first `period` entries are NaN: one bar is
/// consumed by the delta, `period - 1` more by the window.
///
/// When the average loss is zero the value is pinned to exactly 100
/// (fully overbought) instead of propagating the infinite ratio; when the
/// average gain is zero the value is 0.
pub fn rsi(closes: &[f64], period: usize) -> Result<Vec<f64>, IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidPeriod(period));
    }

    let mut result = vec![f64::NAN; closes.len()];
    if closes.len() <= period {
        return Ok(result);
    }

    // Per-bar gain/loss magnitudes; deltas[i] belongs to closes[i + 1].
    let mut gains = Vec::with_capacity(closes.len() - 1);
    let mut losses = Vec::with_capacity(closes.len() - 1);
    for w in closes.windows(2) {
        let change = w[1] - w[0];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(-change);
        }
    }

    let period_f64 = period as f64;
    let mut gain_sum: f64 = gains[..period].iter().sum();
    let mut loss_sum: f64 = losses[..period].iter().sum();

    for i in period..=gains.len() {
        let avg_gain = gain_sum / period_f64;
        let avg_loss = loss_sum / period_f64;

        result[i] = if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        };

        if i < gains.len() {
            gain_sum = gain_sum - gains[i - period] + gains[i];
            loss_sum = loss_sum - losses[i - period] + losses[i];
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_values() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = sma(&data, 3).unwrap();

        assert_eq!(result.len(), data.len());
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert!((result[2] - 2.0).abs() < 1e-10); // (1+2+3)/3
        assert!((result[3] - 3.0).abs() < 1e-10);
        assert!((result[4] - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_sma_insufficient_data() {
        let result = sma(&[1.0, 2.0], 5).unwrap();
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_sma_zero_period() {
        assert!(matches!(
            sma(&[1.0, 2.0], 0),
            Err(IndicatorError::InvalidPeriod(0))
        ));
        assert!(matches!(
            rsi(&[1.0, 2.0], 0),
            Err(IndicatorError::InvalidPeriod(0))
        ));
    }

    #[test]
    fn test_sma_lags_rising_close() {
        let data: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let result = sma(&data, 10).unwrap();

        for i in 9..data.len() {
            assert!(result[i] < data[i], "SMA must lag a rising close");
        }
    }

    #[test]
    fn test_rsi_warmup_prefix() {
        let data: Vec<f64> = (0..20).map(|i| 100.0 + (i as f64).sin()).collect();
        let result = rsi(&data, 14).unwrap();

        assert_eq!(result.len(), data.len());
        assert!(result[..14].iter().all(|v| v.is_nan()));
        assert!(result[14..].iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_rsi_all_gains_is_100() {
        let data: Vec<f64> = (0..10).map(|i| 1.0 + i as f64).collect();
        let result = rsi(&data, 5).unwrap();

        for v in &result[5..] {
            assert_eq!(*v, 100.0);
        }
    }

    #[test]
    fn test_rsi_all_losses_is_0() {
        let data: Vec<f64> = (0..10).map(|i| 10.0 - i as f64).collect();
        let result = rsi(&data, 5).unwrap();

        for v in &result[5..] {
            assert!(v.abs() < 1e-10);
        }
    }

    #[test]
    fn test_rsi_bounded() {
        let data: Vec<f64> = (0..60)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0)
            .collect();
        let result = rsi(&data, 14).unwrap();

        for v in result.iter().filter(|v| v.is_finite()) {
            assert!(*v >= 0.0 && *v <= 100.0);
        }
    }

    #[test]
    fn test_rsi_flat_series_is_100() {
        // No losses at all, so the ratio is undefined; pinned to 100.
        let data = vec![5.0; 10];
        let result = rsi(&data, 4).unwrap();
        for v in &result[4..] {
            assert_eq!(*v, 100.0);
        }
    }
}
