//! Performance evaluator.
//!
//! Collects per-agent timings while a run executes, then scores the finished
//! [`RunState`]. Scoring is deterministic: the same state and timings always
//! produce the same report. Wall time comes from the run's own timestamps
//! when both are present.

use crate::evaluation::metrics::{
    AgentMetrics, PerformanceReport, QualityMetrics, SystemMetrics,
};
use crate::models::{
    AgentRole, AgentStatus, AuthorContext, LegacyAnalysis, ReadingMap, RunState,
};
use chrono::Utc;
use std::collections::HashMap;
use std::time::Instant;
use tracing::debug;

const MAX_RECOMMENDATIONS: usize = 5;

/// Records timings during a run and produces a [`PerformanceReport`] after.
#[derive(Debug, Default)]
pub struct PerformanceEvaluator {
    run_started: Option<Instant>,
    task_started: HashMap<AgentRole, Instant>,
    task_durations: HashMap<AgentRole, f64>,
    parallel_execution: bool,
}

impl PerformanceEvaluator {
    pub fn new(parallel_execution: bool) -> Self {
        Self {
            parallel_execution,
            ..Default::default()
        }
    }

    pub fn begin(&mut self) {
        self.run_started = Some(Instant::now());
    }

    /// Mark a role's task as started. Sequential execution only; parallel
    /// tasks measure their own duration and report it through
    /// [`Self::record_task_duration`].
    pub fn begin_task(&mut self, role: AgentRole) {
        self.task_started.insert(role, Instant::now());
    }

    /// Mark a role's task as finished. A no-op when the task was never
    /// started, so out-of-order calls cannot panic.
    pub fn end_task(&mut self, role: AgentRole) {
        if let Some(start) = self.task_started.remove(&role) {
            self.task_durations.insert(role, start.elapsed().as_secs_f64());
        }
    }

    /// Record a duration measured by the task itself.
    pub fn record_task_duration(&mut self, role: AgentRole, seconds: f64) {
        self.task_durations.insert(role, seconds);
    }

    /// Score a finished run.
    pub fn evaluate(&self, state: &RunState) -> PerformanceReport {
        let total_time = self.total_time(state);
        let agents = self.agent_metrics(state);

        let successful = agents.iter().filter(|a| a.success).count();
        let failed = agents.len() - successful;
        let report_length = state.final_report.as_deref().map_or(0, str::len);
        let system = SystemMetrics {
            total_execution_time_seconds: total_time,
            parallel_execution: self.parallel_execution,
            total_agents: agents.len(),
            successful_agents: successful,
            failed_agents: failed,
            success_rate: if agents.is_empty() {
                0.0
            } else {
                successful as f64 / agents.len() as f64
            },
            throughput: if total_time > 0.0 {
                successful as f64 / total_time
            } else {
                0.0
            },
            has_final_report: state.final_report.is_some(),
            final_report_length: report_length,
            error_count: state.errors.len(),
        };

        let quality = score_quality(state);
        let recommendations = build_recommendations(state, &system, &quality);

        debug!(
            overall_quality = quality.overall_quality,
            success_rate = system.success_rate,
            "run evaluated"
        );

        PerformanceReport {
            author_name: state.author_name.clone(),
            generated_at: Utc::now().to_rfc3339(),
            system,
            agents,
            quality,
            recommendations,
        }
    }

    fn total_time(&self, state: &RunState) -> f64 {
        match (state.started_at, state.completed_at) {
            (Some(start), Some(end)) => {
                (end - start).num_milliseconds().max(0) as f64 / 1000.0
            }
            _ => self
                .run_started
                .map(|s| s.elapsed().as_secs_f64())
                .unwrap_or(0.0),
        }
    }

    fn agent_metrics(&self, state: &RunState) -> Vec<AgentMetrics> {
        AgentRole::ALL
            .iter()
            .map(|role| {
                let status = state.statuses.get(*role);
                let success = status == AgentStatus::Completed;
                let error_message = state
                    .errors
                    .iter()
                    .find(|e| e.contains(role.as_str()))
                    .cloned();
                let output_chars = output_chars(state, *role);
                AgentMetrics {
                    role: *role,
                    role_description: role.description().to_string(),
                    execution_time_seconds: self.task_durations.get(role).copied().unwrap_or(0.0),
                    success,
                    error_message,
                    output_chars,
                    has_structured_data: state.results.is_present(*role),
                    quality_score: if success { Some(role_quality(state, *role)) } else { None },
                }
            })
            .collect()
    }
}

fn output_chars(state: &RunState, role: AgentRole) -> usize {
    match role {
        AgentRole::Historian => state
            .results
            .historian
            .as_ref()
            .map_or(0, |c| c.biographical_summary.as_deref().map_or(0, str::len)),
        AgentRole::Cartographer => state.results.cartographer.as_ref().map_or(0, |m| {
            m.complete_works
                .iter()
                .map(|e| e.title.len() + e.description.as_deref().map_or(0, str::len))
                .sum()
        }),
        AgentRole::LegacyConnector => state
            .results
            .legacy_connector
            .as_ref()
            .map_or(0, |l| l.literary_significance.as_deref().map_or(0, str::len)),
    }
}

fn role_quality(state: &RunState, role: AgentRole) -> f64 {
    match role {
        AgentRole::Historian => state
            .results
            .historian
            .as_ref()
            .map_or(0.0, biographical_richness),
        AgentRole::Cartographer => state
            .results
            .cartographer
            .as_ref()
            .map_or(0.0, bibliography_coverage),
        AgentRole::LegacyConnector => state
            .results
            .legacy_connector
            .as_ref()
            .map_or(0.0, analysis_depth),
    }
}

fn score_quality(state: &RunState) -> QualityMetrics {
    let biographical = state.results.historian.as_ref().map_or(0.0, biographical_richness);
    let bibliography = state.results.cartographer.as_ref().map_or(0.0, bibliography_coverage);
    let analysis = state.results.legacy_connector.as_ref().map_or(0.0, analysis_depth);
    let completeness = report_completeness(state);
    QualityMetrics::new(biographical, bibliography, analysis, completeness)
}

/// Birth year, death year, and nationality each contribute 0.2; the summary
/// contributes up to 0.4 scaled by length.
fn biographical_richness(context: &AuthorContext) -> f64 {
    let mut score = 0.0;
    if context.birth_year.is_some() {
        score += 0.2;
    }
    if context.death_year.is_some() {
        score += 0.2;
    }
    if context.nationality.is_some() {
        score += 0.2;
    }
    let summary_len = context.biographical_summary.as_deref().map_or(0, str::len);
    score += 0.4 * (summary_len as f64 / 500.0).min(1.0);
    score.min(1.0)
}

/// Dated works contribute up to 0.4, starting-point picks up to 0.3, and any
/// thematic grouping the final 0.3.
fn bibliography_coverage(map: &ReadingMap) -> f64 {
    let mut score = 0.0;
    let dated = map.chronological.len();
    score += if dated >= 3 { 0.4 } else { 0.4 * dated as f64 / 3.0 };
    if map.start_here.len() >= 2 {
        score += 0.3;
    } else {
        score += 0.15 * map.start_here.len() as f64;
    }
    if !map.thematic_groups.is_empty() {
        score += 0.3;
    }
    score.min(1.0)
}

/// Innovations and themes contribute 0.4 each when two or more are present;
/// a substantial significance text adds 0.2.
fn analysis_depth(analysis: &LegacyAnalysis) -> f64 {
    let mut score = 0.0;
    if analysis.stylistic_innovations.len() >= 2 {
        score += 0.4;
    } else {
        score += 0.2 * analysis.stylistic_innovations.len() as f64;
    }
    if analysis.recurring_themes.len() >= 2 {
        score += 0.4;
    } else {
        score += 0.2 * analysis.recurring_themes.len() as f64;
    }
    if analysis.literary_significance.as_deref().map_or(0, str::len) > 100 {
        score += 0.2;
    }
    score.min(1.0)
}

/// Fraction of the three role sections present in the final report.
fn report_completeness(state: &RunState) -> f64 {
    let Some(report) = state.final_report.as_deref() else {
        return 0.0;
    };
    let sections = [
        "## Author Biography & Historical Context",
        "## Reading Map & Bibliography",
        "## Literary Legacy & Analysis",
    ];
    let present = sections.iter().filter(|s| report.contains(*s)).count();
    present as f64 / sections.len() as f64
}

fn build_recommendations(
    state: &RunState,
    system: &SystemMetrics,
    quality: &QualityMetrics,
) -> Vec<String> {
    let mut recs = Vec::new();

    for (role, status) in state.statuses.iter() {
        if status == AgentStatus::Failed {
            recs.push(format!(
                "Investigate {role} failures; the report is missing its {} section",
                section_noun(role)
            ));
        }
    }
    if system.success_rate < 0.8 && system.failed_agents > 0 {
        recs.push("Success rate is below 80%; review the recorded agent errors".to_string());
    }
    if quality.biographical_richness < 0.7 && state.results.historian.is_some() {
        recs.push("Biographical data is thin; consider additional biography sources".to_string());
    }
    if quality.bibliography_coverage < 0.7 && state.results.cartographer.is_some() {
        recs.push("Bibliography coverage is sparse; raise the Google Books result limit".to_string());
    }
    if quality.analysis_depth < 0.7 && state.results.legacy_connector.is_some() {
        recs.push("Legacy analysis is shallow; broaden the criticism queries".to_string());
    }
    if !system.has_final_report || system.final_report_length < 100 {
        recs.push("Final report is missing or minimal; check the synthesizer inputs".to_string());
    }
    if system.total_execution_time_seconds > 60.0 {
        recs.push("Run exceeded one minute; consider the independent execution policy".to_string());
    }

    if recs.is_empty() {
        recs.push("All agents completed with solid quality; no changes recommended".to_string());
    }
    recs.truncate(MAX_RECOMMENDATIONS);
    recs
}

fn section_noun(role: AgentRole) -> &'static str {
    match role {
        AgentRole::Historian => "biography",
        AgentRole::Cartographer => "bibliography",
        AgentRole::LegacyConnector => "legacy analysis",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AgentData, ReadingMapEntry};
    use chrono::{Duration, Utc};

    fn completed_state() -> RunState {
        let mut state = RunState::new("Italo Calvino", 3, 300);
        let start = Utc::now();
        state.started_at = Some(start);
        state.completed_at = Some(start + Duration::seconds(10));

        for role in AgentRole::ALL {
            state.statuses.set(role, AgentStatus::Completed);
        }
        state.results.record(AgentData::Biography(AuthorContext {
            birth_year: Some(1923),
            death_year: Some(1985),
            nationality: Some("Italian".to_string()),
            biographical_summary: Some("x".repeat(600)),
            ..Default::default()
        }));
        state.results.record(AgentData::ReadingMap(sample_map(5)));
        state.results.record(AgentData::Legacy(LegacyAnalysis {
            stylistic_innovations: vec!["a".to_string(), "b".to_string()],
            recurring_themes: vec!["c".to_string(), "d".to_string()],
            literary_significance: Some("y".repeat(200)),
            ..Default::default()
        }));
        state.final_report = Some(
            "# The Literary Finder: Italo Calvino\n\
             ## Author Biography & Historical Context\n\
             ## Reading Map & Bibliography\n\
             ## Literary Legacy & Analysis\n"
                .to_string(),
        );
        state
    }

    fn sample_map(dated: usize) -> ReadingMap {
        let works: Vec<ReadingMapEntry> = (0..dated)
            .map(|i| ReadingMapEntry {
                title: format!("Work {i}"),
                year: Some(1950 + i as i32),
                description: Some("A substantial description well over fifty characters long for scoring.".to_string()),
                category: Some("Fiction".to_string()),
                ..Default::default()
            })
            .collect();
        ReadingMap::from_complete_works(works)
    }

    #[test]
    fn full_run_scores_high_quality() {
        let evaluator = PerformanceEvaluator::new(true);
        let report = evaluator.evaluate(&completed_state());

        assert_eq!(report.system.successful_agents, 3);
        assert_eq!(report.system.failed_agents, 0);
        assert!((report.system.total_execution_time_seconds - 10.0).abs() < 0.5);
        assert!((report.quality.biographical_richness - 1.0).abs() < 1e-9);
        assert!((report.quality.report_completeness - 1.0).abs() < 1e-9);
        assert!(report.quality.overall_quality > 0.9);
    }

    #[test]
    fn all_failed_run_scores_zero_quality() {
        let mut state = RunState::new("Nobody", 3, 300);
        for role in AgentRole::ALL {
            state.statuses.set(role, AgentStatus::Failed);
            state.errors.push(format!("{role}: upstream failure"));
        }
        state.final_report = Some("# The Literary Finder: Nobody\n".to_string());

        let evaluator = PerformanceEvaluator::new(false);
        let report = evaluator.evaluate(&state);

        assert_eq!(report.system.successful_agents, 0);
        assert_eq!(report.system.success_rate, 0.0);
        assert_eq!(report.quality.overall_quality, 0.0);
        assert!(report.recommendations.iter().any(|r| r.contains("contextual_historian")));
    }

    #[test]
    fn evaluation_is_deterministic_for_timestamped_states() {
        let state = completed_state();
        let evaluator = PerformanceEvaluator::new(true);
        let first = evaluator.evaluate(&state);
        let second = evaluator.evaluate(&state);
        assert_eq!(
            first.system.total_execution_time_seconds,
            second.system.total_execution_time_seconds
        );
        assert_eq!(first.quality.overall_quality, second.quality.overall_quality);
    }

    #[test]
    fn bibliography_score_is_monotonic_in_dated_works() {
        let mut previous = -1.0;
        for dated in [0usize, 1, 2, 3, 6, 10] {
            let score = bibliography_coverage(&sample_map(dated));
            assert!(score >= previous, "score dropped at {dated} dated works");
            assert!((0.0..=1.0).contains(&score));
            previous = score;
        }
    }

    #[test]
    fn subscores_stay_in_unit_interval() {
        let rich = AuthorContext {
            birth_year: Some(1900),
            death_year: Some(1990),
            nationality: Some("French".to_string()),
            biographical_summary: Some("x".repeat(10_000)),
            ..Default::default()
        };
        assert!(biographical_richness(&rich) <= 1.0);

        let deep = LegacyAnalysis {
            stylistic_innovations: vec!["a".into(), "b".into(), "c".into()],
            recurring_themes: vec!["d".into(), "e".into(), "f".into()],
            literary_significance: Some("y".repeat(5_000)),
            ..Default::default()
        };
        assert!(analysis_depth(&deep) <= 1.0);
    }

    #[test]
    fn end_task_without_begin_is_a_no_op() {
        let mut evaluator = PerformanceEvaluator::new(false);
        evaluator.end_task(AgentRole::Historian);
        assert!(evaluator.task_durations.is_empty());

        evaluator.begin_task(AgentRole::Historian);
        evaluator.end_task(AgentRole::Historian);
        assert!(evaluator.task_durations.contains_key(&AgentRole::Historian));
    }

    #[test]
    fn recorded_durations_appear_in_agent_metrics() {
        let mut evaluator = PerformanceEvaluator::new(true);
        evaluator.record_task_duration(AgentRole::Cartographer, 2.5);

        let report = evaluator.evaluate(&completed_state());
        let cartographer = report
            .agents
            .iter()
            .find(|a| a.role == AgentRole::Cartographer)
            .unwrap();
        assert_eq!(cartographer.execution_time_seconds, 2.5);
    }

    #[test]
    fn successful_run_gets_a_positive_recommendation() {
        let evaluator = PerformanceEvaluator::new(true);
        let report = evaluator.evaluate(&completed_state());
        assert_eq!(report.recommendations.len(), 1);
        assert!(report.recommendations[0].contains("no changes"));
    }
}
