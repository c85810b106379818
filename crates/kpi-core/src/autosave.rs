//! Debounced autosave as an explicit state machine.
//!
//! ```text
//! Idle ──edit──▶ Pending(due_at) ──poll──▶ Saving ──complete──▶ Saved | Failed
//!                  ▲    │ edit restarts      │ edit: queued        │
//!                  └────┴────────────────────┴──────edit / flush───┘
//! ```
//!
//! Time never advances on its own: callers pass `now` into every call, so a
//! UI loop, a CLI, and a test all drive it the same way.

use crate::error::Result;
use crate::plan::KpiPlan;
use crate::store::PlanStore;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutosaveConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    1500
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveState {
    Idle,
    Pending { due_at: DateTime<Utc> },
    Saving { revision: u64 },
    Saved { at: DateTime<Utc>, revision: u64 },
    Failed { error: String, revision: u64 },
}

/// Proof that a save was started. Hand it back to [`Autosave::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveTicket {
    pub revision: u64,
}

#[derive(Debug, Clone)]
pub struct Autosave {
    debounce: TimeDelta,
    state: SaveState,
    /// Count of edits seen so far; a save covers every edit up to its ticket.
    edits: u64,
}

impl Autosave {
    pub fn new(debounce: TimeDelta) -> Self {
        Self {
            debounce,
            state: SaveState::Idle,
            edits: 0,
        }
    }

    pub fn from_config(config: &AutosaveConfig) -> Self {
        let ms = i64::try_from(config.debounce_ms).unwrap_or(i64::MAX);
        Self::new(TimeDelta::try_milliseconds(ms).unwrap_or(TimeDelta::MAX))
    }

    pub fn state(&self) -> &SaveState {
        &self.state
    }

    /// True while there are edits not yet confirmed as saved.
    pub fn is_dirty(&self) -> bool {
        match &self.state {
            SaveState::Idle | SaveState::Saved { .. } => false,
            SaveState::Pending { .. } => true,
            SaveState::Saving { revision } => self.edits > *revision,
            SaveState::Failed { .. } => true,
        }
    }

    /// Record an edit. Restarts the debounce timer unless a save is in
    /// flight, in which case the edit is picked up when that save completes.
    pub fn edit(&mut self, now: DateTime<Utc>) {
        self.edits += 1;
        if matches!(self.state, SaveState::Saving { .. }) {
            tracing::debug!(edits = self.edits, "edit during save, queued");
            return;
        }
        let due_at = self.due(now);
        tracing::debug!(%due_at, "autosave scheduled");
        self.state = SaveState::Pending { due_at };
    }

    /// Start a save if the debounce period has elapsed.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<SaveTicket> {
        match self.state {
            SaveState::Pending { due_at } if now >= due_at => Some(self.begin()),
            _ => None,
        }
    }

    /// Start a save immediately if one is pending or the last one failed.
    pub fn flush(&mut self) -> Option<SaveTicket> {
        match self.state {
            SaveState::Pending { .. } | SaveState::Failed { .. } => Some(self.begin()),
            _ => None,
        }
    }

    fn due(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_signed(self.debounce)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    fn begin(&mut self) -> SaveTicket {
        let revision = self.edits;
        self.state = SaveState::Saving { revision };
        tracing::debug!(revision, "autosave started");
        SaveTicket { revision }
    }

    /// Finish the save identified by `ticket`. Returns `false` for a ticket
    /// that does not match the save in flight.
    ///
    /// A failure always lands in `Failed`, even with edits queued behind the
    /// save; the next edit or flush retries with everything so far.
    pub fn complete(
        &mut self,
        ticket: SaveTicket,
        outcome: std::result::Result<(), String>,
        now: DateTime<Utc>,
    ) -> bool {
        if self.state != (SaveState::Saving { revision: ticket.revision }) {
            tracing::debug!(revision = ticket.revision, "stale save ticket ignored");
            return false;
        }
        let revision = ticket.revision;
        self.state = match outcome {
            Err(error) => {
                let queued = self.edits - revision;
                tracing::warn!(revision, queued, %error, "autosave failed");
                SaveState::Failed { error, revision }
            }
            Ok(()) if self.edits > revision => SaveState::Pending {
                due_at: self.due(now),
            },
            Ok(()) => SaveState::Saved { at: now, revision },
        };
        true
    }

    /// Teardown. Drops a pending save (and any edits queued behind an
    /// in-flight one). Returns whether something was discarded.
    pub fn cancel(&mut self) -> bool {
        match self.state {
            SaveState::Pending { .. } => {
                tracing::debug!("pending autosave cancelled");
                self.state = SaveState::Idle;
                true
            }
            SaveState::Saving { revision } if self.edits > revision => {
                self.edits = revision;
                true
            }
            _ => false,
        }
    }

    /// Poll and, if a save is due, write `plan` through `store`.
    ///
    /// Returns `None` when nothing was due, otherwise the store's result.
    pub fn run_due<S: PlanStore + ?Sized>(
        &mut self,
        now: DateTime<Utc>,
        plan: &KpiPlan,
        store: &mut S,
    ) -> Option<Result<()>> {
        let ticket = self.poll(now)?;
        let result = store.save_plan(plan);
        let outcome = result.as_ref().map(|_| ()).map_err(|e| e.to_string());
        self.complete(ticket, outcome, now);
        Some(result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
