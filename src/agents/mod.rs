//! Research agents
//!
//! Three specialized agents gather the raw material for an author report:
//!
//! - **Contextual Historian**: biographical and historical research
//! - **Literary Cartographer**: bibliography compilation and reading maps
//! - **Legacy Connector**: literary analysis and critical assessment
//!
//! Each agent implements [`ResearchAgent`] and converts ordinary network or
//! parse failures into an `Err` outcome instead of panicking; the
//! orchestrator records those as role-level failures without stopping the
//! run.

pub mod cartographer;
pub mod historian;
pub mod legacy;

pub use cartographer::LiteraryCartographer;
pub use historian::ContextualHistorian;
pub use legacy::LegacyConnector;

use crate::models::{AgentData, AgentRole, AuthorContext, ReadingMap};
use crate::types::AppResult;
use async_trait::async_trait;

/// Results from upstream agents, offered to downstream agents under the
/// chained execution policy. All fields are optional; an agent must produce a
/// best-effort result even with no context at all.
#[derive(Debug, Clone, Default)]
pub struct AgentContext {
    pub author_context: Option<AuthorContext>,
    pub reading_map: Option<ReadingMap>,
}

/// A single research specialization.
#[async_trait]
pub trait ResearchAgent: Send + Sync {
    fn role(&self) -> AgentRole;

    /// Gather this role's data for `author_name`. `context` carries prior
    /// agents' results under the chained policy and is `None` under the
    /// independent policy.
    async fn process(&self, author_name: &str, context: Option<&AgentContext>)
        -> AppResult<AgentData>;
}
