//! Trade execution reporting.

use swingbot_core::types::TradeExecuted;
use tokio::sync::mpsc;
use tracing::info;

/// Drains execution notifications into the trade log.
///
/// Runs as its own task so reporting never backpressures the trading
/// loop; the stream ends when the engine shuts down.
pub struct TradeReporter {
    rx: mpsc::UnboundedReceiver<TradeExecuted>,
}

impl TradeReporter {
    pub fn new(rx: mpsc::UnboundedReceiver<TradeExecuted>) -> Self {
        Self { rx }
    }

    /// Consume the stream until the sender side closes.
    pub async fn run(mut self) {
        while let Some(trade) = self.rx.recv().await {
            info!(
                target: "swingbot::trades",
                symbol = %trade.symbol,
                action = %trade.action,
                quantity = trade.quantity,
                price = %trade.price,
                reason = %trade.reason,
                "trade executed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use swingbot_core::types::TradeAction;

    #[tokio::test]
    async fn test_reporter_finishes_when_stream_closes() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(TradeExecuted {
            symbol: "AAPL".to_string(),
            action: TradeAction::Buy,
            quantity: 10,
            price: dec!(102.00),
            reason: "Price crossed above SMA".to_string(),
        })
        .unwrap();
        drop(tx);

        TradeReporter::new(rx).run().await;
    }
}
