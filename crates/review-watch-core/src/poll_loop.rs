//! The poll-detect-notify loop.
//!
//! One tick fetches status changes since the cursor, validates the response,
//! extracts a notification from the most recent homework and sends it. Every
//! failure is handled in [`PollLoop::step`], so a bad tick never ends the loop.

use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::collaborators::{HomeworkApi, NotificationChannel};
use crate::config::LoopSettings;
use crate::error::{ErrorCategory, Result, WatchError};
use crate::extractor::extract_notification;
use crate::state::WatchState;
use crate::validator::validate_response;

/// Prefix of the failure notice pushed to the channel when reporting is on.
pub const FAILURE_PREFIX: &str = "Сбой в работе программы";

/// What a single tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The status changed and this message was delivered.
    Notified(String),
    /// The latest homework still has the last notified status.
    Unchanged,
    /// The API reported no homework in the window.
    NoHomeworks,
    /// The tick failed with an error of this category.
    Failed(ErrorCategory),
}

/// Drives the watcher: owns both collaborators and all cross-tick state.
pub struct PollLoop<A, N> {
    api: A,
    channel: N,
    settings: LoopSettings,
    state: WatchState,
}

impl<A, N> PollLoop<A, N>
where
    A: HomeworkApi,
    N: NotificationChannel,
{
    /// Creates a loop whose cursor starts at `settings.cursor_start`.
    pub fn new(api: A, channel: N, settings: LoopSettings) -> Self {
        let state = WatchState::new(settings.cursor_start.resolve());
        Self {
            api,
            channel,
            settings,
            state,
        }
    }

    /// Replaces the loop state, e.g. to seed a previously notified status.
    #[must_use]
    pub fn with_state(mut self, state: WatchState) -> Self {
        self.state = state;
        self
    }

    /// Returns the current state.
    pub const fn state(&self) -> &WatchState {
        &self.state
    }

    /// Returns the homework API collaborator.
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Returns the notification channel collaborator.
    pub const fn channel(&self) -> &N {
        &self.channel
    }

    /// Runs ticks forever, sleeping `retry_period` after each one.
    ///
    /// This future never completes; stop it by dropping it.
    pub async fn run(&mut self) {
        info!(
            cursor = %self.state.cursor,
            retry_period_secs = self.settings.retry_period.as_secs(),
            report_failures = self.settings.report_failures,
            "Watching homework statuses"
        );

        loop {
            let outcome = self.step().await;
            debug!(?outcome, cursor = %self.state.cursor, "Tick finished");
            sleep(self.settings.retry_period).await;
        }
    }

    /// Runs one tick and handles its failure, if any. Never fails.
    pub async fn step(&mut self) -> TickOutcome {
        match self.tick().await {
            Ok(outcome) => {
                self.state.last_failure = None;
                outcome
            }
            Err(err) => {
                let category = err.category();
                self.handle_failure(&err).await;
                TickOutcome::Failed(category)
            }
        }
    }

    /// Runs one tick: fetch, validate, extract, notify, advance the cursor.
    ///
    /// The cursor moves after every successful fetch whose body carries a
    /// `current_date`, whatever happens to the homeworks in it.
    pub async fn tick(&mut self) -> Result<TickOutcome> {
        let cursor = self.state.cursor;
        debug!(%cursor, "Fetching homework statuses");
        let body = self.api.fetch(cursor).await?;

        let outcome = self.process(&body).await;
        self.state.advance_cursor(&body);
        outcome
    }

    async fn process(&mut self, body: &Value) -> Result<TickOutcome> {
        let homeworks = validate_response(body)?;

        let Some(latest) = homeworks.first() else {
            debug!("No homework updates in this window");
            return Ok(TickOutcome::NoHomeworks);
        };

        match extract_notification(latest, &mut self.state.previous_status)? {
            Some(message) => {
                self.channel.send(&message).await?;
                info!(message = %message, "Status change notification sent");
                Ok(TickOutcome::Notified(message))
            }
            None => Ok(TickOutcome::Unchanged),
        }
    }

    async fn handle_failure(&mut self, err: &WatchError) {
        let category = err.category();
        match category {
            ErrorCategory::TickRecoverable => {
                error!(%category, error = %err, "Poll tick failed");
            }
            ErrorCategory::DeliveryFailure => {
                error!(
                    %category,
                    error = %err,
                    "Status change detected but the notification was not delivered"
                );
            }
            ErrorCategory::Unexpected => {
                error!(%category, error = %err, "Unexpected failure during poll tick");
            }
            ErrorCategory::StartupFatal => {
                error!(%category, error = %err, "Startup error surfaced inside the poll loop");
            }
        }

        // The channel itself just failed; reporting through it again is pointless.
        if !self.settings.report_failures || category == ErrorCategory::DeliveryFailure {
            return;
        }

        let report = format!("{FAILURE_PREFIX}: {err}");
        if self.state.last_failure.as_deref() == Some(report.as_str()) {
            debug!("Failure already reported, not sending it again");
            return;
        }

        match self.channel.send(&report).await {
            Ok(()) => self.state.last_failure = Some(report),
            Err(send_err) => {
                warn!(error = %send_err, "Could not report failure through the notification channel");
            }
        }
    }
}
