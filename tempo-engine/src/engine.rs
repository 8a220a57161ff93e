//! Daily-pass orchestration: the trigger-facing entry points.
//!
//! An external scheduler (cron, a systemd timer, the CLI) invokes
//! [`Engine::run_daily_pass`] roughly once per 24 hours with
//! at-least-once delivery; duplicate invocations are harmless because
//! every phase is idempotent. [`Engine::run_on_demand`] runs the same
//! body for user-initiated syncs.

use chrono::{NaiveDate, NaiveTime};

use crate::store::TaskStore;
use crate::{recurrence, scheduler, EngineError};

/// Tunable knobs for a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Start of the working window.
    pub day_start: NaiveTime,
    /// End of the working window.
    pub day_end: NaiveTime,
    /// Smallest free gap worth filling, in minutes.
    pub min_gap_minutes: i64,
    /// How many days ahead recurrence templates are expanded.
    pub forecast_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            day_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
            day_end: NaiveTime::from_hms_opt(22, 0, 0).unwrap_or_default(),
            min_gap_minutes: crate::slots::DEFAULT_MIN_GAP_MINUTES,
            forecast_days: 30,
        }
    }
}

/// What a pass did, for logging and CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassReport {
    /// Recurrence instances spawned.
    pub instances_spawned: u32,
    /// Backlog tasks placed on the calendar.
    pub tasks_placed: u32,
}

/// The scheduling engine, generic over the task store it runs against.
pub struct Engine<S> {
    store: S,
    config: EngineConfig,
}

impl<S: TaskStore> Engine<S> {
    /// Creates an engine over `store` with default configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    /// Creates an engine over `store` with explicit configuration.
    pub const fn with_config(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Borrow the underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Runs the daily batch pass for `today`: expand recurrence
    /// templates over the forecast window, then fill today's free time
    /// from the backlog.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StoreUnavailable`] if a store call fails;
    /// the whole run may be retried, all writes are idempotent.
    pub fn run_daily_pass(&self, today: NaiveDate) -> Result<PassReport, EngineError> {
        let span = tracing::info_span!("daily_pass", date = %today);
        let _guard = span.enter();

        let instances_spawned =
            recurrence::expand(&self.store, today, self.config.forecast_days)?;
        let tasks_placed = scheduler::schedule_day(
            &self.store,
            today,
            self.config.day_start,
            self.config.day_end,
            self.config.min_gap_minutes,
        )?;

        Ok(PassReport {
            instances_spawned,
            tasks_placed,
        })
    }

    /// Runs the same pass on user demand. Safe to call at any time; a
    /// run that duplicates the daily trigger changes nothing.
    ///
    /// # Errors
    ///
    /// Same as [`Self::run_daily_pass`].
    pub fn run_on_demand(&self, today: NaiveDate) -> Result<PassReport, EngineError> {
        tracing::debug!(date = %today, "on-demand pass requested");
        self.run_daily_pass(today)
    }
}
