//! The trading loop.
//!
//! Three pieces compose the loop: the [`OrderLifecycleCoordinator`] owns
//! order intents from decision to terminal fill, the
//! [`ConnectionSupervisor`] keeps the broker session alive, and the
//! [`Engine`] drives evaluation cycles over both.

mod coordinator;
mod driver;
mod supervisor;

pub use coordinator::{CoordinatorConfig, OrderLifecycleCoordinator};
pub use driver::{Engine, EngineConfig, EngineState};
pub use supervisor::{ConnectionSupervisor, SessionState};
