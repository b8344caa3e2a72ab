// src/state.rs
use crate::errors::CritiqueError;
use crate::models::AnalysisReport;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Initial,
    Loading,
    Result,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotSnapshot {
    pub phase: Phase,
    pub report: Option<AnalysisReport>,
}

#[derive(Debug)]
struct SlotInner {
    generation: u64,
    phase: Phase,
    report: Option<AnalysisReport>,
}

/// The one analysis the service is allowed to run or show at a time.
#[derive(Debug, Clone)]
pub struct AnalysisSlot {
    inner: Arc<Mutex<SlotInner>>,
}

impl Default for AnalysisSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisSlot {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SlotInner {
                generation: 0,
                phase: Phase::Initial,
                report: None,
            })),
        }
    }

    /// Moves to `Loading`, or fails with `Busy` if an analysis is running.
    pub fn begin(&self) -> Result<LoadingGuard, CritiqueError> {
        let mut inner = self.inner.lock();
        if inner.phase == Phase::Loading {
            return Err(CritiqueError::Busy);
        }
        inner.generation += 1;
        inner.phase = Phase::Loading;
        inner.report = None;
        Ok(LoadingGuard {
            slot: self.clone(),
            generation: inner.generation,
            settled: false,
        })
    }

    /// Back to `Initial`. A request still in flight is not cancelled, its
    /// outcome is simply not stored.
    pub fn reset(&self) -> SlotSnapshot {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.phase = Phase::Initial;
        inner.report = None;
        SlotSnapshot {
            phase: inner.phase,
            report: None,
        }
    }

    pub fn snapshot(&self) -> SlotSnapshot {
        let inner = self.inner.lock();
        SlotSnapshot {
            phase: inner.phase,
            report: inner.report.clone(),
        }
    }

    fn settle(&self, generation: u64, report: Option<AnalysisReport>) -> bool {
        let mut inner = self.inner.lock();
        if inner.generation != generation {
            return false;
        }
        inner.phase = if report.is_some() {
            Phase::Result
        } else {
            Phase::Initial
        };
        inner.report = report;
        true
    }
}

/// Held for the duration of one analysis. Dropping it unsettled (e.g. the
/// client went away) returns the slot to `Initial`.
#[derive(Debug)]
pub struct LoadingGuard {
    slot: AnalysisSlot,
    generation: u64,
    settled: bool,
}

impl LoadingGuard {
    /// Stores the report; returns false if the slot was reset meanwhile.
    pub fn complete(mut self, report: AnalysisReport) -> bool {
        self.settled = true;
        self.slot.settle(self.generation, Some(report))
    }

    pub fn fail(mut self) {
        self.settled = true;
        self.slot.settle(self.generation, None);
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        if !self.settled {
            self.slot.settle(self.generation, None);
        }
    }
}
