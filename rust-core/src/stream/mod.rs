//! Sample streaming: buffering, sources, sinks and the tick driver

pub mod adc;
pub mod buffer;
pub mod scheduler;
pub mod sink;
pub mod source;

pub use buffer::{Frame, SampleBuffer};
pub use scheduler::{SchedulerState, StreamScheduler, StreamSession, TickOutcome};
pub use sink::{CycleResult, LatestResultSink, RecordingSink, ResultSink};
pub use source::{LiveFeed, LiveSource, SampleSource, SyntheticConfig, SyntheticSource};
