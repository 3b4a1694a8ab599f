//! Broker session supervision.
//!
//! The driver never talks to a dead session: each cycle starts by asking
//! the supervisor for a healthy connection, and a failed reconnect just
//! skips the cycle rather than killing the loop.

use std::time::Duration;
use swingbot_core::gateway::BrokerGateway;
use tokio::time::timeout;
use tracing::{info, warn};

/// Session lifecycle as seen by the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Keeps the gateway session alive with bounded reconnect attempts.
pub struct ConnectionSupervisor {
    reconnect_timeout: Duration,
    state: SessionState,
}

impl ConnectionSupervisor {
    pub fn new(reconnect_timeout: Duration) -> Self {
        Self {
            reconnect_timeout,
            state: SessionState::Disconnected,
        }
    }

    /// Last observed session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Ensure the session is up, attempting one bounded reconnect if it
    /// is not. Returns whether the session is usable.
    pub async fn ensure_connected(&mut self, gateway: &dyn BrokerGateway) -> bool {
        if gateway.is_connected() {
            self.state = SessionState::Connected;
            return true;
        }

        if self.state == SessionState::Connected {
            warn!(gateway = gateway.name(), "session lost");
        }
        self.state = SessionState::Connecting;
        info!(gateway = gateway.name(), "connecting");

        match timeout(self.reconnect_timeout, gateway.connect()).await {
            Ok(Ok(())) => {
                self.state = SessionState::Connected;
                true
            }
            Ok(Err(e)) => {
                warn!(gateway = gateway.name(), error = %e, "connect failed");
                self.state = SessionState::Disconnected;
                false
            }
            Err(_) => {
                warn!(
                    gateway = gateway.name(),
                    timeout_secs = self.reconnect_timeout.as_secs(),
                    "connect timed out"
                );
                self.state = SessionState::Disconnected;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swingbot_broker::SimGateway;

    #[tokio::test]
    async fn test_connects_when_down() {
        let gateway = SimGateway::new();
        let mut supervisor = ConnectionSupervisor::new(Duration::from_secs(1));

        assert_eq!(supervisor.state(), SessionState::Disconnected);
        assert!(supervisor.ensure_connected(&gateway).await);
        assert_eq!(supervisor.state(), SessionState::Connected);
        assert!(gateway.is_connected());
    }

    #[tokio::test]
    async fn test_failed_connect_reports_down() {
        let gateway = SimGateway::new();
        gateway.set_fail_connect(true);
        let mut supervisor = ConnectionSupervisor::new(Duration::from_secs(1));

        assert!(!supervisor.ensure_connected(&gateway).await);
        assert_eq!(supervisor.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_recovers_after_drop() {
        let gateway = SimGateway::new();
        let mut supervisor = ConnectionSupervisor::new(Duration::from_secs(1));

        assert!(supervisor.ensure_connected(&gateway).await);
        gateway.simulate_disconnect();
        assert!(supervisor.ensure_connected(&gateway).await);
        assert_eq!(supervisor.state(), SessionState::Connected);
    }
}
