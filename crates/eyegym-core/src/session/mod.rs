//! Training session: the runner state machine and its async driver.

mod clock;
mod runner;
mod service;
mod state;

pub use clock::{Clock, TokioClock};
pub use runner::{Effect, RunnerOptions, SessionRunner, Utterance};
pub use service::{ServiceOptions, SessionHandle, SessionService};
pub use state::{NarrationState, SessionState, SessionStatus};
