pub mod feasibility;
pub mod pipeline;
pub mod policy;
pub mod synth;
pub mod types;

pub use pipeline::{PipelineError, QuoteOutcome, QuotePipeline};
pub use types::{AgentConfig, GateTrace, Rejection, RequestBundle};
