//! Shared data model: research roles, run state, and HTTP request/response
//! shapes.
//!
//! The three research roles are a closed enum rather than string keys, so an
//! unrecognized role cannot exist at runtime, and each role's result is a
//! tagged variant of [`AgentData`] with explicitly optional fields.

use crate::config::Config;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Config,
    pub http: reqwest::Client,
}

/// The three fixed research specializations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Historian,
    Cartographer,
    LegacyConnector,
}

impl AgentRole {
    pub const ALL: [AgentRole; 3] = [
        AgentRole::Historian,
        AgentRole::Cartographer,
        AgentRole::LegacyConnector,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Historian => "contextual_historian",
            AgentRole::Cartographer => "literary_cartographer",
            AgentRole::LegacyConnector => "legacy_connector",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AgentRole::Historian => "Biographical and Historical Research Specialist",
            AgentRole::Cartographer => "Bibliography Compilation and Reading Map Expert",
            AgentRole::LegacyConnector => "Literary Analysis and Critical Assessment Specialist",
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of an individual agent within a run. Mutated only by the
/// orchestrator, never by an agent itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl AgentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentStatus::Completed | AgentStatus::Failed)
    }
}

/// One status slot per role. A struct instead of a map, so exactly the three
/// roles exist by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStatuses {
    pub historian: AgentStatus,
    pub cartographer: AgentStatus,
    pub legacy_connector: AgentStatus,
}

impl Default for AgentStatuses {
    fn default() -> Self {
        Self {
            historian: AgentStatus::Pending,
            cartographer: AgentStatus::Pending,
            legacy_connector: AgentStatus::Pending,
        }
    }
}

impl AgentStatuses {
    pub fn get(&self, role: AgentRole) -> AgentStatus {
        match role {
            AgentRole::Historian => self.historian,
            AgentRole::Cartographer => self.cartographer,
            AgentRole::LegacyConnector => self.legacy_connector,
        }
    }

    pub fn set(&mut self, role: AgentRole, status: AgentStatus) {
        match role {
            AgentRole::Historian => self.historian = status,
            AgentRole::Cartographer => self.cartographer = status,
            AgentRole::LegacyConnector => self.legacy_connector = status,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (AgentRole, AgentStatus)> + '_ {
        AgentRole::ALL.iter().map(move |r| (*r, self.get(*r)))
    }

    pub fn all_terminal(&self) -> bool {
        self.iter().all(|(_, s)| s.is_terminal())
    }
}

/// Individual entry in a reading map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadingMapEntry {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_books_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_link: Option<String>,
}

/// Structured reading map for an author.
///
/// `start_here`, `chronological`, and `thematic_groups` are derived views of
/// `complete_works`; use [`ReadingMap::from_complete_works`] to keep that
/// invariant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadingMap {
    pub start_here: Vec<ReadingMapEntry>,
    pub chronological: Vec<ReadingMapEntry>,
    pub thematic_groups: BTreeMap<String, Vec<ReadingMapEntry>>,
    pub complete_works: Vec<ReadingMapEntry>,
}

impl ReadingMap {
    /// Build a reading map from the complete works set.
    ///
    /// Chronological holds every dated entry sorted by year; "start here"
    /// picks up to three entries with substantial descriptions (falling back
    /// to the earliest works); thematic groups are keyed by entry category.
    pub fn from_complete_works(complete_works: Vec<ReadingMapEntry>) -> Self {
        let mut chronological: Vec<ReadingMapEntry> = complete_works
            .iter()
            .filter(|e| e.year.is_some())
            .cloned()
            .collect();
        chronological.sort_by_key(|e| e.year);

        let described: Vec<ReadingMapEntry> = chronological
            .iter()
            .filter(|e| e.description.as_deref().map(|d| d.len() > 50).unwrap_or(false))
            .cloned()
            .collect();
        let start_here = if described.is_empty() {
            chronological.iter().take(3).cloned().collect()
        } else {
            described.into_iter().take(3).collect()
        };

        let mut thematic_groups: BTreeMap<String, Vec<ReadingMapEntry>> = BTreeMap::new();
        for entry in &complete_works {
            if let Some(category) = &entry.category {
                thematic_groups.entry(category.clone()).or_default().push(entry.clone());
            }
        }

        Self {
            start_here,
            chronological,
            thematic_groups,
            complete_works,
        }
    }
}

/// Biographical and historical context for an author.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub death_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    pub literary_movements: Vec<String>,
    pub key_influences: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biographical_summary: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarAuthor {
    pub name: String,
    pub reason: String,
}

/// Analysis of an author's legacy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegacyAnalysis {
    pub stylistic_innovations: Vec<String>,
    pub recurring_themes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literary_significance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modern_relevance: Option<String>,
    pub similar_authors: Vec<SimilarAuthor>,
}

/// Tagged result record produced by a research agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgentData {
    Biography(AuthorContext),
    ReadingMap(ReadingMap),
    Legacy(LegacyAnalysis),
}

impl AgentData {
    pub fn role(&self) -> AgentRole {
        match self {
            AgentData::Biography(_) => AgentRole::Historian,
            AgentData::ReadingMap(_) => AgentRole::Cartographer,
            AgentData::Legacy(_) => AgentRole::LegacyConnector,
        }
    }
}

/// One optional typed record per role.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentResults {
    pub historian: Option<AuthorContext>,
    pub cartographer: Option<ReadingMap>,
    pub legacy_connector: Option<LegacyAnalysis>,
}

impl AgentResults {
    /// Store a record in the slot matching its tag.
    pub fn record(&mut self, data: AgentData) {
        match data {
            AgentData::Biography(c) => self.historian = Some(c),
            AgentData::ReadingMap(m) => self.cartographer = Some(m),
            AgentData::Legacy(l) => self.legacy_connector = Some(l),
        }
    }

    pub fn is_present(&self, role: AgentRole) -> bool {
        match role {
            AgentRole::Historian => self.historian.is_some(),
            AgentRole::Cartographer => self.cartographer.is_some(),
            AgentRole::LegacyConnector => self.legacy_connector.is_some(),
        }
    }

    pub fn count_present(&self) -> usize {
        AgentRole::ALL.iter().filter(|r| self.is_present(**r)).count()
    }
}

/// Phase of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    NotStarted,
    Running,
    Synthesizing,
    Done,
}

/// Aggregate state for one author-analysis run. Owned and mutated exclusively
/// by the orchestrator while running; read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    pub author_name: String,
    pub pipeline_state: PipelineState,
    pub statuses: AgentStatuses,
    pub results: AgentResults,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_report: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub max_retries: u32,
    pub timeout_seconds: u64,
}

impl RunState {
    pub fn new(author_name: impl Into<String>, max_retries: u32, timeout_seconds: u64) -> Self {
        Self {
            author_name: author_name.into(),
            pipeline_state: PipelineState::NotStarted,
            statuses: AgentStatuses::default(),
            results: AgentResults::default(),
            errors: Vec::new(),
            final_report: None,
            started_at: None,
            completed_at: None,
            max_retries,
            timeout_seconds,
        }
    }
}

// HTTP request/response models

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub author_name: String,
    /// "independent" (default) or "chained".
    #[serde(default)]
    pub execution_policy: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub author_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
    pub elapsed_seconds: f64,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub pipeline_ready: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_cover_exactly_the_three_roles() {
        let statuses = AgentStatuses::default();
        let roles: Vec<AgentRole> = statuses.iter().map(|(r, _)| r).collect();
        assert_eq!(roles, AgentRole::ALL.to_vec());
        assert!(statuses.iter().all(|(_, s)| s == AgentStatus::Pending));
        assert!(!statuses.all_terminal());
    }

    #[test]
    fn statuses_roundtrip_through_get_and_set() {
        let mut statuses = AgentStatuses::default();
        statuses.set(AgentRole::Cartographer, AgentStatus::Completed);
        statuses.set(AgentRole::LegacyConnector, AgentStatus::Failed);
        assert_eq!(statuses.get(AgentRole::Historian), AgentStatus::Pending);
        assert_eq!(statuses.get(AgentRole::Cartographer), AgentStatus::Completed);
        assert_eq!(statuses.get(AgentRole::LegacyConnector), AgentStatus::Failed);

        statuses.set(AgentRole::Historian, AgentStatus::Completed);
        assert!(statuses.all_terminal());
    }

    #[test]
    fn reading_map_views_derive_from_complete_works() {
        let works = vec![
            ReadingMapEntry {
                title: "Late Novel".to_string(),
                year: Some(1975),
                category: Some("Fiction".to_string()),
                ..Default::default()
            },
            ReadingMapEntry {
                title: "Early Novel".to_string(),
                year: Some(1952),
                description: Some(
                    "A landmark debut that established the themes the author returned to for decades.".to_string(),
                ),
                category: Some("Fiction".to_string()),
                ..Default::default()
            },
            ReadingMapEntry {
                title: "Undated Essays".to_string(),
                ..Default::default()
            },
        ];

        let map = ReadingMap::from_complete_works(works);

        assert_eq!(map.complete_works.len(), 3);
        assert_eq!(map.chronological.len(), 2);
        assert_eq!(map.chronological[0].title, "Early Novel");
        // Every derived entry also appears in the complete set.
        for entry in map.start_here.iter().chain(map.chronological.iter()) {
            assert!(map.complete_works.iter().any(|w| w.title == entry.title));
        }
        assert_eq!(map.thematic_groups.get("Fiction").map(Vec::len), Some(2));
    }

    #[test]
    fn start_here_falls_back_to_earliest_works() {
        let works = vec![
            ReadingMapEntry { title: "B".to_string(), year: Some(1960), ..Default::default() },
            ReadingMapEntry { title: "A".to_string(), year: Some(1950), ..Default::default() },
        ];
        let map = ReadingMap::from_complete_works(works);
        assert_eq!(map.start_here.len(), 2);
        assert_eq!(map.start_here[0].title, "A");
    }

    #[test]
    fn agent_results_record_by_tag() {
        let mut results = AgentResults::default();
        assert_eq!(results.count_present(), 0);

        results.record(AgentData::Legacy(LegacyAnalysis::default()));
        assert!(results.is_present(AgentRole::LegacyConnector));
        assert!(!results.is_present(AgentRole::Historian));
        assert_eq!(results.count_present(), 1);

        results.record(AgentData::Biography(AuthorContext::default()));
        results.record(AgentData::ReadingMap(ReadingMap::default()));
        assert_eq!(results.count_present(), 3);
    }

    #[test]
    fn run_state_starts_pending_and_empty() {
        let state = RunState::new("Italo Calvino", 3, 300);
        assert_eq!(state.author_name, "Italo Calvino");
        assert_eq!(state.pipeline_state, PipelineState::NotStarted);
        assert!(state.errors.is_empty());
        assert!(state.final_report.is_none());
        assert_eq!(state.max_retries, 3);
        assert_eq!(state.timeout_seconds, 300);
        assert!(state.statuses.iter().all(|(_, s)| s == AgentStatus::Pending));
    }
}
