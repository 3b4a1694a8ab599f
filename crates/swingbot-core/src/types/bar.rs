//! OHLCV bar types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV price observation for a fixed time interval.
///
/// Immutable once produced; timestamps are unique and strictly
/// increasing within a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Trading volume
    pub volume: f64,
}

impl Bar {
    /// Create a new bar.
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Get the timestamp as a DateTime.
    pub fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp)
            .unwrap_or_else(|| DateTime::from_timestamp(0, 0).unwrap())
    }

    /// Calculate the bar's range (high - low).
    #[inline]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// Chronological series of bars for one symbol.
///
/// `push` enforces strictly increasing timestamps: a bar that does not
/// advance the clock is dropped.
#[derive(Debug, Clone)]
pub struct BarSeries {
    /// Symbol identifier
    pub symbol: String,
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Create a new empty bar series.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: Vec::new(),
        }
    }

    /// Build a series from bars, dropping out-of-order entries.
    pub fn from_bars(symbol: impl Into<String>, bars: impl IntoIterator<Item = Bar>) -> Self {
        let mut series = Self::new(symbol);
        series.extend(bars);
        series
    }

    /// Push a new bar. Returns false if the bar was dropped because its
    /// timestamp does not advance past the last bar.
    pub fn push(&mut self, bar: Bar) -> bool {
        if let Some(last) = self.bars.last() {
            if bar.timestamp <= last.timestamp {
                return false;
            }
        }
        self.bars.push(bar);
        true
    }

    /// Push multiple bars.
    pub fn extend(&mut self, bars: impl IntoIterator<Item = Bar>) {
        for bar in bars {
            self.push(bar);
        }
    }

    /// Get the number of bars.
    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Check if the series is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Get all bars as a slice.
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Get the last bar.
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Extract close prices as a vector.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_range() {
        let bar = Bar::new(1000, 100.0, 110.0, 95.0, 105.0, 1_000_000.0);
        assert!((bar.range() - 15.0).abs() < 1e-10);
    }

    #[test]
    fn test_series_drops_stale_timestamps() {
        let mut series = BarSeries::new("AAPL");
        assert!(series.push(Bar::new(2, 100.0, 101.0, 99.0, 100.5, 1000.0)));
        assert!(!series.push(Bar::new(2, 100.5, 102.0, 100.0, 101.5, 1000.0)));
        assert!(!series.push(Bar::new(1, 100.5, 102.0, 100.0, 101.5, 1000.0)));
        assert!(series.push(Bar::new(3, 101.5, 103.0, 101.0, 102.5, 1000.0)));

        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![100.5, 102.5]);
    }

    #[test]
    fn test_series_from_bars() {
        let series = BarSeries::from_bars(
            "MSFT",
            (0..5).map(|i| Bar::new(i, 1.0, 1.0, 1.0, 1.0 + i as f64, 0.0)),
        );
        assert_eq!(series.len(), 5);
        assert_eq!(series.last().unwrap().close, 5.0);
    }
}
