//! Result sinks
//!
//! Sinks are notified synchronously on the tick thread, spectrum first and
//! then health, once per completed cycle. Arguments are borrowed snapshots;
//! a sink that wants to keep them copies.

use crate::error::{MonitorError, Result};
use crate::health::HealthReport;
use crate::spectrum::SpectrumBin;
use std::sync::{Arc, Mutex};

/// Consumer of published cycles
pub trait ResultSink: Send {
    fn on_spectrum(&mut self, bins: &[SpectrumBin]) -> Result<()>;

    fn on_health(&mut self, report: &HealthReport) -> Result<()>;
}

/// Spectrum and health of one published cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleResult {
    /// 1-based count of cycles seen by the sink
    pub cycle: u64,
    pub spectrum: Vec<SpectrumBin>,
    pub report: HealthReport,
}

/// Pairs the two notifications of a cycle into one `CycleResult`
#[derive(Default)]
struct CycleAssembler {
    pending: Option<Vec<SpectrumBin>>,
    cycles: u64,
}

impl CycleAssembler {
    fn spectrum(&mut self, bins: &[SpectrumBin]) {
        self.pending = Some(bins.to_vec());
    }

    fn health(&mut self, report: &HealthReport) -> Result<CycleResult> {
        let spectrum = self
            .pending
            .take()
            .ok_or_else(|| MonitorError::Sink("health report without spectrum".to_string()))?;
        self.cycles += 1;

        Ok(CycleResult {
            cycle: self.cycles,
            spectrum,
            report: report.clone(),
        })
    }
}

fn poisoned() -> MonitorError {
    MonitorError::Sink("result slot lock poisoned".to_string())
}

// ============================================================================
// Latest-result slot
// ============================================================================

/// Reader handle of a `LatestResultSink`, polled by a UI at its own rate
#[derive(Clone, Default)]
pub struct LatestResults {
    slot: Arc<Mutex<Option<CycleResult>>>,
}

impl LatestResults {
    /// Take the newest unread cycle
    pub fn take(&self) -> Option<CycleResult> {
        self.slot.lock().ok().and_then(|mut slot| slot.take())
    }

    /// Copy the newest unread cycle without consuming it
    pub fn peek(&self) -> Option<CycleResult> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

/// Keeps only the most recent cycle; older unread cycles are overwritten
#[derive(Default)]
pub struct LatestResultSink {
    assembler: CycleAssembler,
    results: LatestResults,
}

impl LatestResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results(&self) -> LatestResults {
        self.results.clone()
    }
}

impl ResultSink for LatestResultSink {
    fn on_spectrum(&mut self, bins: &[SpectrumBin]) -> Result<()> {
        self.assembler.spectrum(bins);
        Ok(())
    }

    fn on_health(&mut self, report: &HealthReport) -> Result<()> {
        let cycle = self.assembler.health(report)?;
        let mut slot = self.results.slot.lock().map_err(|_| poisoned())?;
        *slot = Some(cycle);
        Ok(())
    }
}

// ============================================================================
// Recording sink
// ============================================================================

/// Reader handle of a `RecordingSink`
#[derive(Clone, Default)]
pub struct RecordedCycles {
    history: Arc<Mutex<Vec<CycleResult>>>,
}

impl RecordedCycles {
    pub fn len(&self) -> usize {
        self.history.lock().map(|h| h.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Vec<CycleResult> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<CycleResult> {
        self.history.lock().ok().and_then(|h| h.last().cloned())
    }
}

/// Keeps every published cycle, for replay and inspection
#[derive(Default)]
pub struct RecordingSink {
    assembler: CycleAssembler,
    recorded: RecordedCycles,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> RecordedCycles {
        self.recorded.clone()
    }
}

impl ResultSink for RecordingSink {
    fn on_spectrum(&mut self, bins: &[SpectrumBin]) -> Result<()> {
        self.assembler.spectrum(bins);
        Ok(())
    }

    fn on_health(&mut self, report: &HealthReport) -> Result<()> {
        let cycle = self.assembler.health(report)?;
        self.recorded
            .history
            .lock()
            .map_err(|_| poisoned())?
            .push(cycle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bins() -> Vec<SpectrumBin> {
        vec![
            SpectrumBin {
                frequency: 0.0,
                magnitude: 0.1,
            },
            SpectrumBin {
                frequency: 7.8125,
                magnitude: 0.4,
            },
        ]
    }

    #[test]
    fn test_latest_sink_overwrites() {
        let mut sink = LatestResultSink::new();
        let results = sink.results();
        assert!(results.take().is_none());

        for _ in 0..3 {
            sink.on_spectrum(&bins()).unwrap();
            sink.on_health(&HealthReport::new()).unwrap();
        }

        let latest = results.peek().unwrap();
        assert_eq!(latest.cycle, 3);
        assert_eq!(latest.spectrum, bins());

        assert!(results.take().is_some());
        assert!(results.take().is_none());
    }

    #[test]
    fn test_recording_sink_keeps_history() {
        let mut sink = RecordingSink::new();
        let recorded = sink.recorded();

        for _ in 0..4 {
            sink.on_spectrum(&bins()).unwrap();
            sink.on_health(&HealthReport::new()).unwrap();
        }

        assert_eq!(recorded.len(), 4);
        let cycles: Vec<u64> = recorded.snapshot().iter().map(|c| c.cycle).collect();
        assert_eq!(cycles, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_health_without_spectrum_is_rejected() {
        let mut sink = RecordingSink::new();
        assert!(matches!(
            sink.on_health(&HealthReport::new()),
            Err(MonitorError::Sink(_))
        ));
        assert!(sink.recorded().is_empty());
    }
}
