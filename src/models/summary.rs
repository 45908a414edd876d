// file: src/models/summary.rs
// description: per-unit summary results and the unit lifecycle state machine
// reference: internal data structures

use crate::error::{PipelineError, Result};
use crate::models::unit::UnitId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// Provider refused the request for a non-retryable reason.
    Rejected,
    /// Every attempt failed transiently.
    RetriesExhausted,
    /// Run was cancelled before the unit finished.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SummaryResult {
    Succeeded {
        text: String,
        truncated: bool,
        cached: bool,
    },
    Failed {
        kind: FailureKind,
        reason: String,
        attempts: u32,
    },
}

impl SummaryResult {
    pub fn text(&self) -> Option<&str> {
        match self {
            SummaryResult::Succeeded { text, .. } => Some(text),
            SummaryResult::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SummaryResult::Failed { .. })
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self, SummaryResult::Succeeded { truncated: true, .. })
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, SummaryResult::Succeeded { cached: true, .. })
    }
}

/// Identity-keyed results. An entry, once written, is never replaced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryMap {
    entries: BTreeMap<UnitId, SummaryResult>,
}

impl SummaryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false (and keeps the existing entry) when `id` was already completed.
    pub fn insert(&mut self, id: UnitId, result: SummaryResult) -> bool {
        if self.entries.contains_key(&id) {
            return false;
        }
        self.entries.insert(id, result);
        true
    }

    pub fn get(&self, id: &UnitId) -> Option<&SummaryResult> {
        self.entries.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UnitId, &SummaryResult)> {
        self.entries.iter()
    }

    /// Results belonging to one file, in offset order.
    pub fn for_file<'a>(
        &'a self,
        path: &'a Path,
    ) -> impl Iterator<Item = (&'a UnitId, &'a SummaryResult)> {
        self.entries.iter().filter(move |(id, _)| id.path == path)
    }

    pub fn failed(&self) -> Vec<&UnitId> {
        self.entries
            .iter()
            .filter(|(_, r)| r.is_failed())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn succeeded_count(&self) -> usize {
        self.entries.values().filter(|r| !r.is_failed()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lifecycle of a single unit: `Pending -> InFlight -> {Succeeded, Retrying, Failed}`,
/// `Retrying -> InFlight` while attempts remain, otherwise `Retrying -> Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Pending,
    InFlight { attempt: u32 },
    Retrying { attempt: u32 },
    Succeeded,
    Failed,
}

impl UnitState {
    pub fn state_name(&self) -> &'static str {
        match self {
            UnitState::Pending => "pending",
            UnitState::InFlight { .. } => "in_flight",
            UnitState::Retrying { .. } => "retrying",
            UnitState::Succeeded => "succeeded",
            UnitState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, UnitState::Succeeded | UnitState::Failed)
    }
}

#[derive(Debug, Clone)]
pub struct UnitTracker {
    state: UnitState,
    attempts: u32,
    max_attempts: u32,
}

impl UnitTracker {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            state: UnitState::Pending,
            attempts: 0,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn state(&self) -> UnitState {
        self.state
    }

    /// Number of attempts dispatched so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn can_retry(&self) -> bool {
        matches!(self.state, UnitState::Retrying { attempt } if attempt < self.max_attempts)
    }

    pub fn dispatch(&mut self) -> Result<u32> {
        let next = match self.state {
            UnitState::Pending => UnitState::InFlight { attempt: 1 },
            UnitState::Retrying { attempt } if attempt < self.max_attempts => {
                UnitState::InFlight {
                    attempt: attempt + 1,
                }
            }
            _ => return Err(self.invalid("in_flight")),
        };
        self.state = next;
        self.attempts += 1;
        Ok(self.attempts)
    }

    pub fn succeed(&mut self) -> Result<()> {
        match self.state {
            UnitState::InFlight { .. } => {
                self.state = UnitState::Succeeded;
                Ok(())
            }
            _ => Err(self.invalid("succeeded")),
        }
    }

    /// Records a transient failure. Returns true when another attempt is allowed.
    pub fn fail_transient(&mut self) -> Result<bool> {
        match self.state {
            UnitState::InFlight { attempt } => {
                self.state = UnitState::Retrying { attempt };
                if !self.can_retry() {
                    self.state = UnitState::Failed;
                    return Ok(false);
                }
                Ok(true)
            }
            _ => Err(self.invalid("retrying")),
        }
    }

    /// Non-retryable failure, or cancellation before or between attempts.
    pub fn fail(&mut self) -> Result<()> {
        if self.state.is_terminal() {
            return Err(self.invalid("failed"));
        }
        self.state = UnitState::Failed;
        Ok(())
    }

    fn invalid(&self, to: &str) -> PipelineError {
        PipelineError::InvalidStateTransition {
            from: self.state.state_name().to_string(),
            to: to.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_map_is_write_once() {
        let mut map = SummaryMap::new();
        let id = UnitId::new("a.py", 0);
        assert!(map.insert(
            id.clone(),
            SummaryResult::Succeeded {
                text: "first".into(),
                truncated: false,
                cached: false,
            }
        ));
        assert!(!map.insert(
            id.clone(),
            SummaryResult::Succeeded {
                text: "second".into(),
                truncated: false,
                cached: false,
            }
        ));
        assert_eq!(map.get(&id).and_then(|r| r.text()), Some("first"));
    }

    #[test]
    fn test_for_file_filters_and_orders() {
        let mut map = SummaryMap::new();
        let ok = |t: &str| SummaryResult::Succeeded {
            text: t.into(),
            truncated: false,
            cached: false,
        };
        map.insert(UnitId::new("a.py", 10), ok("two"));
        map.insert(UnitId::new("b.py", 0), ok("other"));
        map.insert(UnitId::new("a.py", 0), ok("one"));

        let texts: Vec<_> = map
            .for_file(Path::new("a.py"))
            .filter_map(|(_, r)| r.text())
            .collect();
        assert_eq!(texts, vec!["one", "two"]);
    }

    #[test]
    fn test_tracker_success_path() {
        let mut tracker = UnitTracker::new(3);
        assert_eq!(tracker.dispatch().unwrap(), 1);
        tracker.succeed().unwrap();
        assert_eq!(tracker.state(), UnitState::Succeeded);
        assert!(tracker.dispatch().is_err());
    }

    #[test]
    fn test_tracker_exhausts_attempts() {
        let mut tracker = UnitTracker::new(3);
        let mut dispatched = 0;
        loop {
            tracker.dispatch().unwrap();
            dispatched += 1;
            if !tracker.fail_transient().unwrap() {
                break;
            }
            assert!(matches!(tracker.state(), UnitState::Retrying { .. }));
        }
        assert_eq!(dispatched, 3);
        assert_eq!(tracker.state(), UnitState::Failed);
    }

    #[test]
    fn test_tracker_rejects_success_without_dispatch() {
        let mut tracker = UnitTracker::new(2);
        let err = tracker.succeed().unwrap_err();
        assert!(matches!(err, PipelineError::InvalidStateTransition { .. }));
    }

    #[test]
    fn test_tracker_cancel_pending() {
        let mut tracker = UnitTracker::new(2);
        tracker.fail().unwrap();
        assert!(tracker.state().is_terminal());
        assert!(tracker.fail().is_err());
    }
}
