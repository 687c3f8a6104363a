//! Legacy Connector agent.
//!
//! Synthesizes an author's literary legacy: stylistic innovations, recurring
//! themes, critical significance, modern relevance, and similar authors. Under
//! the chained policy it folds prior agents' findings into its queries.

use crate::agents::{AgentContext, ResearchAgent};
use crate::models::{AgentData, AgentRole, LegacyAnalysis, SimilarAuthor};
use crate::search::{SearchResult, WebSearchClient};
use crate::types::AppResult;
use async_trait::async_trait;
use regex::Regex;
use std::sync::Arc;
use std::sync::OnceLock;
use tracing::{info, warn};

const MAX_LIST_ITEMS: usize = 5;

pub struct LegacyConnector {
    search: Arc<WebSearchClient>,
}

impl LegacyConnector {
    pub fn new(search: Arc<WebSearchClient>) -> Self {
        Self { search }
    }
}

/// Criticism query, enriched with any literary movements upstream research
/// surfaced.
fn criticism_query(author_name: &str, context: Option<&AgentContext>) -> String {
    let mut query = format!(
        "Find literary criticism and scholarly analysis of author \"{author_name}\": \
         stylistic innovations, recurring themes, and overall literary significance"
    );
    if let Some(movements) = context
        .and_then(|c| c.author_context.as_ref())
        .map(|a| a.literary_movements.as_slice())
        .filter(|m| !m.is_empty())
    {
        query.push_str(&format!(
            ", particularly in relation to {}",
            movements.join(" and ")
        ));
    }
    query
}

#[async_trait]
impl ResearchAgent for LegacyConnector {
    fn role(&self) -> AgentRole {
        AgentRole::LegacyConnector
    }

    async fn process(
        &self,
        author_name: &str,
        context: Option<&AgentContext>,
    ) -> AppResult<AgentData> {
        info!(author = author_name, "analyzing literary legacy");

        let criticism = self.search.search(&criticism_query(author_name, context)).await?;
        // Similar-author research is supplementary.
        let similar = match self.search.search_similar_authors(author_name).await {
            Ok(results) => results,
            Err(e) => {
                warn!(error = %e, "similar-author search failed, continuing without it");
                Vec::new()
            }
        };

        let criticism_text = combine_snippets(&criticism);
        let similar_text = combine_snippets(&similar);

        let mut analysis = parse_legacy_analysis(&criticism_text);
        analysis.similar_authors = parse_similar_authors(&similar_text);

        info!(
            author = author_name,
            innovations = analysis.stylistic_innovations.len(),
            themes = analysis.recurring_themes.len(),
            similar = analysis.similar_authors.len(),
            "legacy analysis complete"
        );
        Ok(AgentData::Legacy(analysis))
    }
}

fn combine_snippets(results: &[SearchResult]) -> String {
    results.iter().map(|r| r.snippet.as_str()).collect::<Vec<_>>().join("\n\n")
}

fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*[-*•]\s*(.+)$").expect("static pattern"))
}

/// Extract structured legacy findings from free criticism text.
fn parse_legacy_analysis(text: &str) -> LegacyAnalysis {
    static RELEVANCE_RE: OnceLock<Regex> = OnceLock::new();
    let relevance_re = RELEVANCE_RE.get_or_init(|| {
        Regex::new(r"(?i)(?:modern|contemporary|relevant|today)[^\n]{0,200}").expect("static pattern")
    });

    let mut analysis = LegacyAnalysis::default();
    let lower = text.to_lowercase();

    analysis.stylistic_innovations = bullets_after(text, &lower, &["innovation", "style", "technique"]);
    analysis.recurring_themes = bullets_after(text, &lower, &["theme", "motif"]);

    if !text.trim().is_empty() {
        analysis.literary_significance = Some(text.trim().to_string());
    }
    if let Some(m) = relevance_re.find(text) {
        analysis.modern_relevance = Some(m.as_str().trim().to_string());
    }

    analysis
}

/// Bullet items following the first occurrence of any keyword, capped at
/// [`MAX_LIST_ITEMS`].
fn bullets_after(text: &str, lower: &str, keywords: &[&str]) -> Vec<String> {
    let Some(start) = keywords.iter().filter_map(|k| lower.find(k)).min() else {
        return Vec::new();
    };
    bullet_re()
        .captures_iter(&text[start..])
        .map(|c| c[1].trim().to_string())
        .take(MAX_LIST_ITEMS)
        .collect()
}

/// Parse "Name - reason" bullet lines into similar-author records.
fn parse_similar_authors(text: &str) -> Vec<SimilarAuthor> {
    static LINE_RE: OnceLock<Regex> = OnceLock::new();
    let line_re = LINE_RE.get_or_init(|| {
        Regex::new(r"(?m)^\s*[-*•]\s*([^:\-–]+?)\s*[:\-–]\s*(.+)$").expect("static pattern")
    });

    line_re
        .captures_iter(text)
        .map(|c| SimilarAuthor {
            name: c[1].trim().to_string(),
            reason: c[2].trim().to_string(),
        })
        .filter(|s| !s.name.is_empty() && !s.reason.is_empty())
        .take(MAX_LIST_ITEMS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_innovations_and_themes() {
        let text = "Stylistic innovations in the novels:\n\
                    - Nested frame narratives\n\
                    - Second-person address\n\
                    Recurring themes include:\n\
                    - Memory and forgetting\n\
                    - The unreliability of maps\n";
        let analysis = parse_legacy_analysis(text);
        assert!(analysis
            .stylistic_innovations
            .contains(&"Nested frame narratives".to_string()));
        assert!(analysis
            .recurring_themes
            .contains(&"Memory and forgetting".to_string()));
        assert!(analysis.literary_significance.is_some());
    }

    #[test]
    fn captures_modern_relevance_sentence() {
        let text = "Critics agree the work remains strikingly relevant today, anticipating \
                    hypertext fiction and the fragmented attention of digital reading.";
        let analysis = parse_legacy_analysis(text);
        let relevance = analysis.modern_relevance.expect("relevance sentence");
        assert!(relevance.contains("relevant today"));
    }

    #[test]
    fn similar_authors_parse_name_and_reason() {
        let text = "Authors similar to this one:\n\
                    - Jorge Luis Borges: shared fascination with labyrinths and infinite texts\n\
                    - Umberto Eco - semiotic playfulness and encyclopedic plots\n\
                    Not a bullet line.\n";
        let similar = parse_similar_authors(text);
        assert_eq!(similar.len(), 2);
        assert_eq!(similar[0].name, "Jorge Luis Borges");
        assert!(similar[0].reason.contains("labyrinths"));
        assert_eq!(similar[1].name, "Umberto Eco");
    }

    #[test]
    fn list_extraction_is_capped() {
        let mut text = String::from("Recurring themes:\n");
        for i in 0..10 {
            text.push_str(&format!("- Theme number {i}\n"));
        }
        let analysis = parse_legacy_analysis(&text);
        assert_eq!(analysis.recurring_themes.len(), MAX_LIST_ITEMS);
    }

    #[test]
    fn empty_text_yields_empty_analysis() {
        let analysis = parse_legacy_analysis("  ");
        assert!(analysis.stylistic_innovations.is_empty());
        assert!(analysis.recurring_themes.is_empty());
        assert!(analysis.literary_significance.is_none());
        assert!(analysis.modern_relevance.is_none());
    }

    #[test]
    fn chained_context_enriches_the_criticism_query() {
        use crate::models::AuthorContext;

        let context = AgentContext {
            author_context: Some(AuthorContext {
                literary_movements: vec!["Postmodernism".to_string(), "Oulipo".to_string()],
                ..Default::default()
            }),
            reading_map: None,
        };
        let query = criticism_query("Italo Calvino", Some(&context));
        assert!(query.contains("Postmodernism and Oulipo"));

        let bare = criticism_query("Italo Calvino", None);
        assert!(!bare.contains("in relation to"));
    }
}
