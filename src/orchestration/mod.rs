//! Run orchestration: agent scheduling policies and report synthesis.

pub mod pipeline;
pub mod report;

pub use pipeline::{ExecutionPolicy, LiteraryPipeline, RunResult};
pub use report::render_report;
