mod engine;
mod runner;

pub use engine::{SessionEngine, SessionState, Snapshot};
pub use runner::{drive, Command, TICK_INTERVAL};
