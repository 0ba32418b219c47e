//! Python bindings for a streaming monitor session

use pyo3::prelude::*;
use pyo3::types::PyDict;
use numpy::PyArray1;
use crate::config::MonitorConfig;
use crate::health::ClassifierMode;
use crate::stream::sink::LatestResults;
use crate::stream::{LatestResultSink, LiveFeed, LiveSource, StreamScheduler, StreamSession};

/// Readings the live queue holds between ticks
const LIVE_QUEUE_CAPACITY: usize = 4096;

/// Streaming monitor session exposed to Python
///
/// Ticks run on a Rust thread; Python pushes live readings and polls results
#[pyclass(name = "MonitorSession", unsendable)]
pub struct PyMonitorSession {
    scheduler: StreamScheduler,
    feed: Option<LiveFeed>,
    results: LatestResults,
}

#[pymethods]
impl PyMonitorSession {
    /// Create a new session
    ///
    /// Args:
    ///     frame_size: Frame length (power of two)
    ///     sample_rate_hz: Sample rate in Hz
    ///     tick_interval_ms: Tick period in milliseconds
    ///     classifier_mode: "band" or "aggregate"
    ///     hop_size: Samples between cycles once the buffer is full
    ///     live: Read from pushed readings instead of the synthetic generator
    #[new]
    #[pyo3(signature = (frame_size=64, sample_rate_hz=500.0, tick_interval_ms=10, classifier_mode="band", hop_size=1, live=false))]
    fn new(
        frame_size: usize,
        sample_rate_hz: f64,
        tick_interval_ms: u64,
        classifier_mode: &str,
        hop_size: usize,
        live: bool,
    ) -> PyResult<Self> {
        let classifier_mode = match classifier_mode {
            "band" => ClassifierMode::Band,
            "aggregate" => ClassifierMode::Aggregate,
            other => {
                return Err(PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
                    "unknown classifier mode '{other}'"
                )))
            }
        };

        let config = MonitorConfig {
            frame_size,
            sample_rate_hz,
            tick_interval_ms,
            classifier_mode,
            hop_size,
            ..Default::default()
        };

        let (session, feed) = if live {
            let (feed, source) = LiveSource::channel(LIVE_QUEUE_CAPACITY);
            (StreamSession::new(config, Box::new(source)), Some(feed))
        } else {
            (StreamSession::synthetic(config), None)
        };
        let mut session =
            session.map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string()))?;

        let sink = LatestResultSink::new();
        let results = sink.results();
        session.add_sink(Box::new(sink));

        Ok(Self {
            scheduler: StreamScheduler::new(session),
            feed,
            results,
        })
    }

    /// Start ticking
    fn start(&mut self) -> PyResult<()> {
        self.scheduler
            .start()
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(e.to_string()))
    }

    /// Stop ticking (buffer and results are kept)
    fn stop(&mut self) {
        self.scheduler.stop();
    }

    fn pause(&self) {
        self.scheduler.pause();
    }

    fn resume(&self) {
        self.scheduler.resume();
    }

    /// Empty the buffer and drop standing results
    fn clear(&self) {
        self.scheduler.clear();
        self.results.take();
    }

    fn is_streaming(&self) -> bool {
        self.scheduler.state() == crate::stream::SchedulerState::Streaming
    }

    /// Queue one live reading in volts
    ///
    /// Returns:
    ///     False if the session is synthetic or the queue is full
    fn push_live_sample(&mut self, sample: f64) -> bool {
        self.feed.as_mut().is_some_and(|feed| feed.push(sample))
    }

    /// Mark the live connection lost; the session falls back to synthetic
    fn disconnect_live(&mut self) {
        self.feed = None;
    }

    /// Get latest results
    ///
    /// Returns:
    ///     Dictionary with keys: 'frequencies', 'magnitudes', 'health', 'cycle'
    ///     or None if no new data
    fn get_results<'py>(&self, py: Python<'py>) -> Option<PyObject> {
        self.results.take().map(|result| {
            let dict = PyDict::new(py);
            let health = PyDict::new(py);

            for (component, status) in result.report.iter() {
                health.set_item(component.name(), status.status.as_str()).ok();
            }

            let frequencies: Vec<f64> = result.spectrum.iter().map(|b| b.frequency).collect();
            let magnitudes: Vec<f64> = result.spectrum.iter().map(|b| b.magnitude).collect();

            dict.set_item("frequencies", PyArray1::from_vec(py, frequencies)).ok();
            dict.set_item("magnitudes", PyArray1::from_vec(py, magnitudes)).ok();
            dict.set_item("health", health).ok();
            dict.set_item("cycle", result.cycle).ok();

            dict.into()
        })
    }
}
