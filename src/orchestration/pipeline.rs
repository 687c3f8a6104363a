//! Analysis pipeline orchestrator.
//!
//! Drives the three research agents to completion under one of two execution
//! policies, then synthesizes the final report and (optionally) evaluates the
//! run. A single agent failing is recorded against its role and never stops
//! the run; only a setup problem (no LLM credentials) is fatal.

use crate::agents::{
    AgentContext, ContextualHistorian, LegacyConnector, LiteraryCartographer, ResearchAgent,
};
use crate::config::{Config, PipelineConfig};
use crate::evaluation::{PerformanceEvaluator, PerformanceReport};
use crate::models::{AgentData, AgentRole, AgentStatus, PipelineState, RunState};
use crate::orchestration::report::render_report;
use crate::search::{GoogleBooksClient, WebSearchClient};
use crate::types::{AppError, AppResult};
use crate::utils::{FailureKind, RetryPolicy};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// How the three agents are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionPolicy {
    /// All agents run concurrently with no shared context.
    #[default]
    Independent,
    /// Agents run in order; each later agent sees earlier successes.
    Chained,
}

impl ExecutionPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "independent" | "parallel" => Some(ExecutionPolicy::Independent),
            "chained" | "sequential" => Some(ExecutionPolicy::Chained),
            _ => None,
        }
    }
}

/// Outcome of one pipeline run.
#[derive(Debug)]
pub struct RunResult {
    pub success: bool,
    pub report: Option<String>,
    pub errors: Vec<String>,
    pub state: RunState,
    pub performance: Option<PerformanceReport>,
}

pub struct LiteraryPipeline {
    historian: Arc<dyn ResearchAgent>,
    cartographer: Arc<dyn ResearchAgent>,
    legacy: Arc<dyn ResearchAgent>,
    pipeline: PipelineConfig,
}

impl LiteraryPipeline {
    /// Build the production pipeline. Fails with a setup error when no OpenAI
    /// API key is configured; the Google Books key is optional.
    pub fn new(config: &Config, http: reqwest::Client) -> AppResult<Self> {
        let retry = RetryPolicy::new(config.pipeline.max_retries).retry_on(vec![
            FailureKind::Timeout,
            FailureKind::Connection,
            FailureKind::RateLimited,
        ]);

        let web_search = Arc::new(WebSearchClient::new(&config.llm, retry.clone()).ok_or_else(
            || AppError::Setup("OPENAI_API_KEY is not set".to_string()),
        )?);
        let books = Arc::new(GoogleBooksClient::new(http, &config.search, retry));

        Ok(Self {
            historian: Arc::new(ContextualHistorian::new(web_search.clone())),
            cartographer: Arc::new(LiteraryCartographer::new(books)),
            legacy: Arc::new(LegacyConnector::new(web_search)),
            pipeline: config.pipeline.clone(),
        })
    }

    /// Build a pipeline around arbitrary agent implementations.
    pub fn from_agents(
        historian: Arc<dyn ResearchAgent>,
        cartographer: Arc<dyn ResearchAgent>,
        legacy: Arc<dyn ResearchAgent>,
        pipeline: PipelineConfig,
    ) -> Self {
        Self {
            historian,
            cartographer,
            legacy,
            pipeline,
        }
    }

    /// Run the full analysis for one author.
    pub async fn run(&self, author_name: &str, policy: ExecutionPolicy) -> RunResult {
        info!(author = author_name, ?policy, "starting analysis run");

        let mut state = RunState::new(
            author_name,
            self.pipeline.max_retries,
            self.pipeline.timeout_seconds,
        );
        let mut evaluator =
            PerformanceEvaluator::new(policy == ExecutionPolicy::Independent);
        evaluator.begin();
        state.started_at = Some(Utc::now());
        state.pipeline_state = PipelineState::Running;

        match policy {
            ExecutionPolicy::Independent => {
                self.run_independent(&mut state, &mut evaluator).await
            }
            ExecutionPolicy::Chained => self.run_chained(&mut state, &mut evaluator).await,
        }

        state.pipeline_state = PipelineState::Synthesizing;
        state.final_report = Some(render_report(&state));
        state.completed_at = Some(Utc::now());
        state.pipeline_state = PipelineState::Done;

        if let (Some(start), Some(end)) = (state.started_at, state.completed_at) {
            let elapsed = (end - start).num_seconds().max(0) as u64;
            if elapsed > state.timeout_seconds {
                warn!(
                    elapsed_seconds = elapsed,
                    budget_seconds = state.timeout_seconds,
                    "run exceeded its time budget"
                );
            }
        }

        let performance = if self.pipeline.enable_evaluation {
            let report = evaluator.evaluate(&state);
            info!("\n{}", report.summary());
            Some(report)
        } else {
            None
        };

        info!(
            author = author_name,
            completed = state.results.count_present(),
            errors = state.errors.len(),
            "analysis run finished"
        );

        RunResult {
            success: state.final_report.is_some(),
            report: state.final_report.clone(),
            errors: state.errors.clone(),
            state,
            performance,
        }
    }

    async fn run_independent(
        &self,
        state: &mut RunState,
        evaluator: &mut PerformanceEvaluator,
    ) {
        for role in AgentRole::ALL {
            state.statuses.set(role, AgentStatus::InProgress);
        }

        let author = state.author_name.clone();
        let (historian, cartographer, legacy) = tokio::join!(
            timed_process(self.historian.as_ref(), &author),
            timed_process(self.cartographer.as_ref(), &author),
            timed_process(self.legacy.as_ref(), &author),
        );

        for (role, seconds, result) in [historian, cartographer, legacy] {
            evaluator.record_task_duration(role, seconds);
            record_outcome(state, role, result);
        }
    }

    async fn run_chained(&self, state: &mut RunState, evaluator: &mut PerformanceEvaluator) {
        let author = state.author_name.clone();
        let mut context = AgentContext::default();

        for agent in [&self.historian, &self.cartographer, &self.legacy] {
            let role = agent.role();
            state.statuses.set(role, AgentStatus::InProgress);
            evaluator.begin_task(role);

            let has_context =
                context.author_context.is_some() || context.reading_map.is_some();
            let result = agent
                .process(&author, has_context.then_some(&context))
                .await;
            evaluator.end_task(role);

            if let Ok(data) = &result {
                match data {
                    AgentData::Biography(c) => context.author_context = Some(c.clone()),
                    AgentData::ReadingMap(m) => context.reading_map = Some(m.clone()),
                    AgentData::Legacy(_) => {}
                }
            }
            record_outcome(state, role, result);
        }
    }
}

async fn timed_process(
    agent: &dyn ResearchAgent,
    author: &str,
) -> (AgentRole, f64, AppResult<AgentData>) {
    let start = Instant::now();
    let result = agent.process(author, None).await;
    (agent.role(), start.elapsed().as_secs_f64(), result)
}

fn record_outcome(state: &mut RunState, role: AgentRole, result: AppResult<AgentData>) {
    match result {
        Ok(data) => {
            debug_assert_eq!(data.role(), role);
            state.statuses.set(role, AgentStatus::Completed);
            state.results.record(data);
        }
        Err(e) => {
            warn!(%role, error = %e, "agent failed");
            state.statuses.set(role, AgentStatus::Failed);
            state.errors.push(format!("{role}: {e}"));
        }
    }
}
