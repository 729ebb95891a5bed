//! Behaviors built from other behaviors.

mod gate;
mod run_if;
mod run_sometimes;

pub use gate::{GateBehavior, OrderPolicy, RunningPolicy};
pub use run_if::RunIf;
pub use run_sometimes::RunSometimes;
