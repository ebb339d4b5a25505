pub mod sink;

pub use sink::{AnalyticsSink, MemorySink, NullSink, StoreSink};
