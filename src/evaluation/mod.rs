//! Run performance evaluation: timing capture, quality scoring, and tuning
//! recommendations.

pub mod evaluator;
pub mod metrics;

pub use evaluator::PerformanceEvaluator;
pub use metrics::{AgentMetrics, PerformanceReport, QualityMetrics, SystemMetrics};
