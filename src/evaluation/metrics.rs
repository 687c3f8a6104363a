//! Metric records produced by the performance evaluator.

use crate::models::AgentRole;
use serde::{Deserialize, Serialize};

/// Per-agent execution metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMetrics {
    pub role: AgentRole,
    pub role_description: String,
    pub execution_time_seconds: f64,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub output_chars: usize,
    pub has_structured_data: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
}

/// Run-level execution metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemMetrics {
    pub total_execution_time_seconds: f64,
    pub parallel_execution: bool,
    pub total_agents: usize,
    pub successful_agents: usize,
    pub failed_agents: usize,
    /// Fraction of agents that completed, in `[0, 1]`.
    pub success_rate: f64,
    /// Agents completed per second of wall time.
    pub throughput: f64,
    pub has_final_report: bool,
    pub final_report_length: usize,
    pub error_count: usize,
}

/// Output quality sub-scores, each in `[0, 1]`.
///
/// The overall score is a weighted blend; the weights are a tuning choice,
/// chosen so that a run where every role failed scores exactly zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub biographical_richness: f64,
    pub bibliography_coverage: f64,
    pub analysis_depth: f64,
    pub report_completeness: f64,
    pub overall_quality: f64,
}

pub(crate) const WEIGHT_BIOGRAPHICAL: f64 = 0.30;
pub(crate) const WEIGHT_BIBLIOGRAPHY: f64 = 0.25;
pub(crate) const WEIGHT_ANALYSIS: f64 = 0.15;
pub(crate) const WEIGHT_COMPLETENESS: f64 = 0.30;

impl QualityMetrics {
    pub fn new(
        biographical_richness: f64,
        bibliography_coverage: f64,
        analysis_depth: f64,
        report_completeness: f64,
    ) -> Self {
        let overall_quality = WEIGHT_BIOGRAPHICAL * biographical_richness
            + WEIGHT_BIBLIOGRAPHY * bibliography_coverage
            + WEIGHT_ANALYSIS * analysis_depth
            + WEIGHT_COMPLETENESS * report_completeness;
        Self {
            biographical_richness,
            bibliography_coverage,
            analysis_depth,
            report_completeness,
            overall_quality,
        }
    }
}

/// Full evaluation of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub author_name: String,
    pub generated_at: String,
    pub system: SystemMetrics,
    pub agents: Vec<AgentMetrics>,
    pub quality: QualityMetrics,
    pub recommendations: Vec<String>,
}

impl PerformanceReport {
    /// Human-readable summary block, suitable for logs.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Performance Evaluation: {}\n", self.author_name));
        out.push_str(&format!(
            "  total time: {:.2}s ({} execution)\n",
            self.system.total_execution_time_seconds,
            if self.system.parallel_execution { "parallel" } else { "sequential" }
        ));
        out.push_str(&format!(
            "  agents: {}/{} succeeded (success rate {:.0}%)\n",
            self.system.successful_agents,
            self.system.total_agents,
            self.system.success_rate * 100.0
        ));
        for agent in &self.agents {
            out.push_str(&format!(
                "  - {}: {} in {:.2}s, {} chars\n",
                agent.role,
                if agent.success { "ok" } else { "failed" },
                agent.execution_time_seconds,
                agent.output_chars
            ));
        }
        out.push_str(&format!("  overall quality: {:.2}\n", self.quality.overall_quality));
        for rec in &self.recommendations {
            out.push_str(&format!("  * {rec}\n"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_weights_sum_to_one() {
        let total = WEIGHT_BIOGRAPHICAL + WEIGHT_BIBLIOGRAPHY + WEIGHT_ANALYSIS + WEIGHT_COMPLETENESS;
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn perfect_subscores_give_perfect_overall() {
        let quality = QualityMetrics::new(1.0, 1.0, 1.0, 1.0);
        assert!((quality.overall_quality - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_subscores_give_zero_overall() {
        let quality = QualityMetrics::new(0.0, 0.0, 0.0, 0.0);
        assert_eq!(quality.overall_quality, 0.0);
    }

    #[test]
    fn summary_names_each_agent() {
        let report = PerformanceReport {
            author_name: "Italo Calvino".to_string(),
            generated_at: "2024-01-01T00:00:00Z".to_string(),
            system: SystemMetrics {
                total_execution_time_seconds: 12.5,
                parallel_execution: true,
                total_agents: 3,
                successful_agents: 2,
                failed_agents: 1,
                success_rate: 2.0 / 3.0,
                throughput: 3.0 / 12.5,
                has_final_report: true,
                final_report_length: 4200,
                error_count: 1,
            },
            agents: vec![AgentMetrics {
                role: AgentRole::Historian,
                role_description: AgentRole::Historian.description().to_string(),
                execution_time_seconds: 4.0,
                success: true,
                error_message: None,
                output_chars: 900,
                has_structured_data: true,
                quality_score: Some(0.8),
            }],
            quality: QualityMetrics::new(0.8, 0.5, 0.4, 2.0 / 3.0),
            recommendations: vec!["Investigate cartographer failures".to_string()],
        };

        let summary = report.summary();
        assert!(summary.contains("Italo Calvino"));
        assert!(summary.contains("contextual_historian"));
        assert!(summary.contains("parallel"));
        assert!(summary.contains("Investigate cartographer failures"));
    }
}
