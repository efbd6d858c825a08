//! # Eye Gym Core Library
//!
//! This library provides the core logic of the Eye Gym eye-exercise trainer.
//! The `eyegym` CLI is a thin layer over it; every behavior lives here.
//!
//! ## Architecture
//!
//! - **Session Runner**: a wall-clock-based state machine that walks an
//!   exercise script step by step, waiting for both the step timer and its
//!   narration before advancing. It returns effects instead of performing them.
//! - **Session Service**: a tokio task that drives the runner, speaks through a
//!   [`Narrator`], and records attempts in a [`HistoryStore`]
//! - **History & Streak Engine**: pure functions over the training log
//! - **Storage**: SQLite key-value store and TOML configuration
//!
//! ## Key Components
//!
//! - [`SessionRunner`]: session state machine
//! - [`SessionService`] / [`SessionHandle`]: async driver and its control surface
//! - [`Catalog`]: the built-in exercise script
//! - [`compute_training_streak`] / [`training_week_status`]: streak engine
//! - [`Config`]: application configuration management

pub mod catalog;
pub mod error;
pub mod events;
pub mod history;
pub mod narration;
pub mod reminders;
pub mod session;
pub mod storage;

pub use catalog::{Catalog, ExerciseKind, ExerciseStep};
pub use error::{ConfigError, CoreError, NarrationError, SessionError, StoreError};
pub use events::Event;
pub use history::{
    compute_training_streak, compute_training_streak_local, training_week_status,
    training_week_status_local, HistoryStore, HistorySummary, KvHistoryStore,
    TrainingHistoryEntry, TrainingStatus, WeekDayStatus,
};
pub use narration::{ConsoleNarrator, FallbackNarrator, Narrator, SilentNarrator};
pub use reminders::{ReminderPlan, ReminderSettings, ReminderStore, ReminderTime};
pub use session::{
    Effect, RunnerOptions, ServiceOptions, SessionHandle, SessionRunner, SessionService,
    SessionStatus,
};
pub use storage::{Config, Database, KvStore, LazyDatabase, MemoryStore};
