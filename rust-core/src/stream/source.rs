//! Sample sources
//!
//! A source yields exactly one sample per scheduler tick and never blocks.
//! Two variants exist: a live feed filled by whatever receives sensor
//! values off the network, and a deterministic synthetic generator used on
//! its own or as fallback when the live feed drops.

use super::adc::{raw_to_voltage, DEFAULT_VREF};
use crate::error::{MonitorError, Result};
use crate::health::Component;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ringbuf::{HeapConsumer, HeapProducer, HeapRb};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Capability of producing one sample per tick
pub trait SampleSource: Send {
    /// Next sample; `SourceUnavailable` when the source can no longer deliver
    fn next_sample(&mut self) -> Result<f64>;

    /// Human-readable name for logging
    fn name(&self) -> &str;
}

// ============================================================================
// Synthetic generator
// ============================================================================

/// Steady vibration of one component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentTone {
    pub component: Component,
    pub frequency_hz: f64,
    pub amplitude: f64,
}

/// Extra tone injected to mimic a developing fault
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaultTone {
    pub frequency_hz: f64,
    pub amplitude: f64,
}

/// Synthetic signal description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub components: Vec<ComponentTone>,

    pub fault_tones: Vec<FaultTone>,

    /// Peak-to-peak amplitude of uniform noise
    pub noise_amplitude: f64,

    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        let tone = |component, frequency_hz, amplitude| ComponentTone {
            component,
            frequency_hz,
            amplitude,
        };

        Self {
            components: vec![
                tone(Component::Motor, 60.0, 0.5),
                tone(Component::Pulley, 30.0, 0.3),
                tone(Component::Belt, 15.0, 0.2),
                tone(Component::Bearing, 120.0, 0.4),
                tone(Component::Gear, 45.0, 0.35),
            ],
            // Belt and gear fault signatures share one defect frequency
            fault_tones: vec![
                FaultTone {
                    frequency_hz: 7.5,
                    amplitude: 0.15,
                },
                FaultTone {
                    frequency_hz: 7.5,
                    amplitude: 0.25,
                },
            ],
            noise_amplitude: 0.05,
            seed: 0x5eed,
        }
    }
}

impl SyntheticConfig {
    /// Noise-free sum of the given component tones
    pub fn clean(components: Vec<ComponentTone>) -> Self {
        Self {
            components,
            fault_tones: Vec::new(),
            noise_amplitude: 0.0,
            seed: 0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let tones = self
            .components
            .iter()
            .map(|t| (t.frequency_hz, t.amplitude))
            .chain(self.fault_tones.iter().map(|t| (t.frequency_hz, t.amplitude)));

        for (frequency_hz, amplitude) in tones {
            if !(frequency_hz.is_finite() && frequency_hz >= 0.0 && amplitude.is_finite()) {
                return Err(MonitorError::InvalidConfig(format!(
                    "synthetic tone {frequency_hz} Hz / {amplitude} is not a valid tone"
                )));
            }
        }
        if !(self.noise_amplitude.is_finite() && self.noise_amplitude >= 0.0) {
            return Err(MonitorError::InvalidConfig(format!(
                "noise_amplitude must be non-negative, got {}",
                self.noise_amplitude
            )));
        }
        Ok(())
    }
}

/// Deterministic sum of sinusoids plus seeded noise
pub struct SyntheticSource {
    config: SyntheticConfig,
    sample_rate_hz: f64,
    sample_index: u64,
    rng: StdRng,
}

impl SyntheticSource {
    pub fn new(config: SyntheticConfig, sample_rate_hz: f64) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            sample_rate_hz,
            sample_index: 0,
            rng,
        }
    }

    /// Noise-free value at time `t` seconds
    pub fn signal_at(&self, t: f64) -> f64 {
        let components: f64 = self
            .config
            .components
            .iter()
            .map(|tone| tone.amplitude * (2.0 * PI * tone.frequency_hz * t).sin())
            .sum();
        let faults: f64 = self
            .config
            .fault_tones
            .iter()
            .map(|tone| tone.amplitude * (2.0 * PI * tone.frequency_hz * t).sin())
            .sum();
        components + faults
    }
}

impl SampleSource for SyntheticSource {
    fn next_sample(&mut self) -> Result<f64> {
        let t = self.sample_index as f64 / self.sample_rate_hz;
        self.sample_index += 1;

        let mut sample = self.signal_at(t);
        if self.config.noise_amplitude > 0.0 {
            sample += self.config.noise_amplitude * (self.rng.gen::<f64>() - 0.5);
        }
        Ok(sample)
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

// ============================================================================
// Live feed
// ============================================================================

struct LiveShared {
    connected: AtomicBool,
    dropped: AtomicU64,
}

/// Writer end of a live feed, owned by the network receiver
pub struct LiveFeed {
    producer: HeapProducer<f64>,
    shared: Arc<LiveShared>,
    vref: f64,
}

impl LiveFeed {
    /// Queue one reading in volts
    ///
    /// # Returns
    /// false if the queue was full and the reading was dropped
    pub fn push(&mut self, sample: f64) -> bool {
        if self.producer.push(sample).is_ok() {
            true
        } else {
            self.shared.dropped.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    /// Queue one raw ADC code, converting it against the feed's reference voltage
    pub fn push_raw(&mut self, raw: u32) -> bool {
        self.push(raw_to_voltage(raw, self.vref))
    }

    pub fn set_vref(&mut self, vref: f64) {
        self.vref = vref;
    }

    /// Mark the connection lost; the source reports unavailable once drained
    pub fn disconnect(&self) {
        self.shared.connected.store(false, Ordering::SeqCst);
    }

    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    /// Readings dropped because the queue was full
    pub fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }
}

impl Drop for LiveFeed {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Reader end of a live feed, polled by the scheduler
pub struct LiveSource {
    consumer: HeapConsumer<f64>,
    shared: Arc<LiveShared>,
    last: f64,
    underruns: u64,
}

impl LiveSource {
    /// Create a connected feed/source pair
    ///
    /// # Arguments
    /// * `capacity` - Readings that may queue between ticks
    pub fn channel(capacity: usize) -> (LiveFeed, LiveSource) {
        let (producer, consumer) = HeapRb::<f64>::new(capacity.max(1)).split();
        let shared = Arc::new(LiveShared {
            connected: AtomicBool::new(true),
            dropped: AtomicU64::new(0),
        });

        (
            LiveFeed {
                producer,
                shared: Arc::clone(&shared),
                vref: DEFAULT_VREF,
            },
            LiveSource {
                consumer,
                shared,
                last: 0.0,
                underruns: 0,
            },
        )
    }

    /// Ticks served by repeating the previous reading
    pub fn underruns(&self) -> u64 {
        self.underruns
    }

    /// Readings waiting in the queue
    pub fn queued(&self) -> usize {
        self.consumer.len()
    }
}

impl SampleSource for LiveSource {
    fn next_sample(&mut self) -> Result<f64> {
        if let Some(sample) = self.consumer.pop() {
            self.last = sample;
            return Ok(sample);
        }

        if !self.shared.connected.load(Ordering::SeqCst) {
            // A reading may have landed between the pop and the flag check
            if let Some(sample) = self.consumer.pop() {
                self.last = sample;
                return Ok(sample);
            }
            return Err(MonitorError::SourceUnavailable(
                "live feed disconnected".to_string(),
            ));
        }

        // Connected but nothing new this tick: hold the previous reading
        self.underruns += 1;
        Ok(self.last)
    }

    fn name(&self) -> &str {
        "live"
    }
}
