//! Periodic stream driver
//!
//! `StreamSession` owns every per-session component and advances one tick
//! at a time; `StreamScheduler` runs those ticks on a dedicated thread at
//! the configured interval. Ticks never overlap: each one holds the session
//! lock from sample pull through publish.

use super::buffer::SampleBuffer;
use super::sink::ResultSink;
use super::source::{SampleSource, SyntheticSource};
use crate::config::MonitorConfig;
use crate::error::{MonitorError, Result};
use crate::health::{FaultClassifier, HealthReport};
use crate::spectrum::{SpectralTransform, SpectrumBin};
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Paused: no sample pulled, nothing computed
    Paused,

    /// Sample pushed; buffer not yet full
    Buffering { filled: usize, required: usize },

    /// Sample pushed; waiting for `hop_size` samples since the last cycle
    Waiting,

    /// Cycle completed and published; carries the session cycle count
    Published(u64),

    /// No usable sample or the transform failed; nothing published
    Skipped,
}

/// State of one stream session
pub struct StreamSession {
    config: MonitorConfig,
    buffer: SampleBuffer,
    transform: SpectralTransform,
    classifier: FaultClassifier,
    source: Box<dyn SampleSource>,
    fallback_active: bool,
    sinks: Vec<Box<dyn ResultSink>>,
    paused: bool,
    since_last_cycle: usize,
    latest_spectrum: Option<Vec<SpectrumBin>>,
    latest_report: Option<HealthReport>,
    cycles: u64,
    ticks: u64,
}

impl StreamSession {
    /// Create a session reading from `source`
    pub fn new(config: MonitorConfig, source: Box<dyn SampleSource>) -> Result<Self> {
        config.validate()?;

        let transform = SpectralTransform::new(config.transform_config())?;
        let classifier = config.classifier();
        let buffer = SampleBuffer::new(config.frame_size);

        Ok(Self {
            config,
            buffer,
            transform,
            classifier,
            source,
            fallback_active: false,
            sinks: Vec::new(),
            paused: false,
            since_last_cycle: 0,
            latest_spectrum: None,
            latest_report: None,
            cycles: 0,
            ticks: 0,
        })
    }

    /// Create a session driven by the configured synthetic generator
    pub fn synthetic(config: MonitorConfig) -> Result<Self> {
        let source = SyntheticSource::new(config.synthetic.clone(), config.sample_rate_hz);
        Self::new(config, Box::new(source))
    }

    pub fn add_sink(&mut self, sink: Box<dyn ResultSink>) {
        self.sinks.push(sink);
    }

    /// Swap the active source, e.g. back to live after a reconnect
    pub fn replace_source(&mut self, source: Box<dyn SampleSource>) {
        info!("Sample source switched from {} to {}", self.source.name(), source.name());
        self.source = source;
        self.fallback_active = false;
    }

    /// Advance the session by one tick
    pub fn tick(&mut self) -> TickOutcome {
        self.ticks += 1;

        if self.paused {
            return TickOutcome::Paused;
        }

        let Some(sample) = self.pull_sample() else {
            return TickOutcome::Skipped;
        };
        self.buffer.push(sample);
        self.since_last_cycle += 1;

        if !self.buffer.is_full() {
            return TickOutcome::Buffering {
                filled: self.buffer.len(),
                required: self.buffer.capacity(),
            };
        }
        if self.since_last_cycle < self.config.hop_size {
            return TickOutcome::Waiting;
        }
        self.since_last_cycle = 0;

        match self.run_cycle() {
            Ok(()) => TickOutcome::Published(self.cycles),
            Err(e) => {
                warn!("Cycle skipped: {}", e);
                TickOutcome::Skipped
            }
        }
    }

    fn pull_sample(&mut self) -> Option<f64> {
        match self.source.next_sample() {
            Ok(sample) => return Some(sample),
            Err(e) => warn!("{} source failed: {}", self.source.name(), e),
        }

        if !self.fallback_active {
            warn!("Falling back to synthetic source");
            self.source = Box::new(SyntheticSource::new(
                self.config.synthetic.clone(),
                self.config.sample_rate_hz,
            ));
            self.fallback_active = true;
        }

        match self.source.next_sample() {
            Ok(sample) => Some(sample),
            Err(e) => {
                error!("Fallback source failed: {}", e);
                None
            }
        }
    }

    fn run_cycle(&mut self) -> Result<()> {
        let frame = self.buffer.snapshot();
        let bins = self.transform.transform(&frame, self.config.sample_rate_hz)?;

        let report = self
            .classifier
            .classify(&bins, &self.config.component_bands)
            .ok_or(MonitorError::InsufficientData {
                available: 0,
                required: self.transform.num_bins(),
            })?;

        for sink in self.sinks.iter_mut() {
            if let Err(e) = sink.on_spectrum(&bins) {
                warn!("Sink rejected spectrum: {}", e);
            }
            if let Err(e) = sink.on_health(&report) {
                warn!("Sink rejected health report: {}", e);
            }
        }

        self.cycles += 1;
        debug!(
            "Cycle {} published, faulty: {:?}",
            self.cycles,
            report.faulty_components()
        );
        self.latest_spectrum = Some(bins);
        self.latest_report = Some(report);

        Ok(())
    }

    /// Suppress processing; ticks still elapse
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Empty the buffer and discard the standing spectrum and report
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.since_last_cycle = 0;
        self.latest_spectrum = None;
        self.latest_report = None;
    }

    pub fn latest_spectrum(&self) -> Option<&[SpectrumBin]> {
        self.latest_spectrum.as_deref()
    }

    pub fn latest_report(&self) -> Option<&HealthReport> {
        self.latest_report.as_ref()
    }

    /// Cycles published so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Ticks elapsed so far, paused ones included
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// True while the synthetic fallback stands in for a failed source
    pub fn is_fallback(&self) -> bool {
        self.fallback_active
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }
}

/// Scheduler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Streaming,
}

/// Drives a `StreamSession` on a fixed tick interval
pub struct StreamScheduler {
    /// Session shared with the tick thread
    session: Arc<Mutex<StreamSession>>,

    /// Running flag checked before every tick
    running: Arc<AtomicBool>,

    /// Tick thread handle
    driver: Option<JoinHandle<()>>,

    tick_interval: Duration,
}

impl StreamScheduler {
    pub fn new(session: StreamSession) -> Self {
        let tick_interval = session.config().tick_interval();
        Self {
            session: Arc::new(Mutex::new(session)),
            running: Arc::new(AtomicBool::new(false)),
            driver: None,
            tick_interval,
        }
    }

    /// Idle -> Streaming; no-op when already streaming
    pub fn start(&mut self) -> Result<()> {
        if self.driver.is_some() {
            return Ok(());
        }

        self.running.store(true, Ordering::SeqCst);

        let session = Arc::clone(&self.session);
        let running = Arc::clone(&self.running);
        let interval = self.tick_interval;

        let handle = std::thread::Builder::new()
            .name("stream-scheduler".to_string())
            .spawn(move || {
                let mut clock = TickClock::new(Instant::now(), interval);

                while running.load(Ordering::SeqCst) {
                    lock_session(&session).tick();

                    let deadline = clock.next_deadline(Instant::now());
                    loop {
                        if !running.load(Ordering::SeqCst) {
                            break;
                        }
                        let now = Instant::now();
                        if now >= deadline {
                            break;
                        }
                        std::thread::park_timeout(deadline - now);
                    }
                }
            });

        match handle {
            Ok(handle) => {
                self.driver = Some(handle);
                info!("Streaming started ({:?} per tick)", self.tick_interval);
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                Err(e.into())
            }
        }
    }

    /// Streaming -> Idle; idempotent
    ///
    /// Returns after the tick thread has exited, so no tick starts afterwards.
    /// Buffer and latest results are kept.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.driver.take() {
            handle.thread().unpark();
            if handle.join().is_err() {
                error!("Tick thread panicked");
            }
            info!("Streaming stopped");
        }
    }

    pub fn pause(&self) {
        lock_session(&self.session).pause();
        info!("Streaming paused");
    }

    pub fn resume(&self) {
        lock_session(&self.session).resume();
        info!("Streaming resumed");
    }

    /// Reset the buffer and drop standing results, in either state
    pub fn clear(&self) {
        lock_session(&self.session).clear();
        info!("Stream buffer cleared");
    }

    pub fn state(&self) -> SchedulerState {
        if self.driver.is_some() {
            SchedulerState::Streaming
        } else {
            SchedulerState::Idle
        }
    }

    /// Run `f` against the session between ticks
    pub fn with_session<R>(&self, f: impl FnOnce(&mut StreamSession) -> R) -> R {
        f(&mut lock_session(&self.session))
    }
}

impl Drop for StreamScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Fixed-cadence deadlines for the tick thread
///
/// Deadlines advance by exactly one interval from the previous deadline, so
/// processing time doesn't drift the clock. A tick that finishes a whole
/// interval or more past its slot re-anchors the grid on `now`: missed ticks
/// are skipped rather than replayed back-to-back.
#[derive(Debug, Clone, Copy)]
struct TickClock {
    next: Instant,
    interval: Duration,
}

impl TickClock {
    fn new(start: Instant, interval: Duration) -> Self {
        Self {
            next: start + interval,
            interval,
        }
    }

    /// Deadline to wait for before the next tick, given the time the
    /// current tick finished
    fn next_deadline(&mut self, now: Instant) -> Instant {
        if now >= self.next + self.interval {
            debug!("Tick thread fell behind by {:?}, skipping missed ticks", now - self.next);
            self.next = now + self.interval;
        }

        let deadline = self.next;
        self.next += self.interval;
        deadline
    }
}

// A panicking sink poisons the lock; the session itself stays consistent
fn lock_session(session: &Mutex<StreamSession>) -> MutexGuard<'_, StreamSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}
