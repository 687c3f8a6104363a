//! Contextual Historian agent.
//!
//! Researches an author's biographical and historical context through web
//! search, then extracts structured facts (birth/death years, nationality,
//! influences) from the result text.

use crate::agents::{AgentContext, ResearchAgent};
use crate::models::{AgentData, AgentRole, AuthorContext};
use crate::search::{SearchResult, WebSearchClient};
use crate::types::AppResult;
use async_trait::async_trait;
use regex::Regex;
use std::sync::Arc;
use std::sync::OnceLock;
use tracing::info;

pub struct ContextualHistorian {
    search: Arc<WebSearchClient>,
}

impl ContextualHistorian {
    pub fn new(search: Arc<WebSearchClient>) -> Self {
        Self { search }
    }
}

#[async_trait]
impl ResearchAgent for ContextualHistorian {
    fn role(&self) -> AgentRole {
        AgentRole::Historian
    }

    async fn process(
        &self,
        author_name: &str,
        _context: Option<&AgentContext>,
    ) -> AppResult<AgentData> {
        info!(author = author_name, "starting biographical research");

        let biography = self.search.search_author_biography(author_name).await?;
        // Influence search is supplementary; a failure here should not sink
        // the whole role.
        let influences = match self.search.search_author_influences(author_name).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(error = %e, "influence search failed, continuing with biography only");
                Vec::new()
            }
        };

        let combined = combine_snippets(biography.iter().chain(influences.iter()));
        let context = parse_author_context(&combined);

        info!(
            author = author_name,
            birth_year = ?context.birth_year,
            nationality = ?context.nationality,
            "biographical research complete"
        );
        Ok(AgentData::Biography(context))
    }
}

fn combine_snippets<'a>(results: impl Iterator<Item = &'a SearchResult>) -> String {
    results
        .map(|r| r.snippet.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Extract structured biographical facts from free research text.
fn parse_author_context(text: &str) -> AuthorContext {
    static BIRTH_RE: OnceLock<Regex> = OnceLock::new();
    static DEATH_RE: OnceLock<Regex> = OnceLock::new();
    static NATIONALITY_RES: OnceLock<Vec<Regex>> = OnceLock::new();
    static MOVEMENT_RE: OnceLock<Regex> = OnceLock::new();
    static BULLET_RE: OnceLock<Regex> = OnceLock::new();

    let birth_re =
        BIRTH_RE.get_or_init(|| Regex::new(r"(?i)(?:born|birth).{0,20}?(\d{4})").expect("static pattern"));
    let death_re =
        DEATH_RE.get_or_init(|| Regex::new(r"(?i)(?:died|death).{0,20}?(\d{4})").expect("static pattern"));
    let nationality_res = NATIONALITY_RES.get_or_init(|| {
        const NATIONALITIES: &str =
            "American|British|French|German|Russian|Italian|Spanish|Irish|Scottish|English|Japanese|Argentine|Chilean|Colombian|Canadian|Indian|Nigerian|Czech|Polish";
        vec![
            Regex::new(&format!(r"(?i)(?:nationality|was|born).{{0,30}}?({NATIONALITIES})"))
                .expect("static pattern"),
            Regex::new(&format!(r"(?i)({NATIONALITIES})\s+(?:author|writer|novelist|poet)"))
                .expect("static pattern"),
        ]
    });
    let movement_re = MOVEMENT_RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(Modernism|Postmodernism|Romanticism|Realism|Magical Realism|Surrealism|Naturalism|Symbolism|Existentialism|Beat Generation|Harlem Renaissance|Gothic|Transcendentalism)\b",
        )
        .expect("static pattern")
    });
    let bullet_re = BULLET_RE.get_or_init(|| Regex::new(r"(?m)^\s*[-*•]\s*(.+)$").expect("static pattern"));

    let mut context = AuthorContext::default();

    if let Some(caps) = birth_re.captures(text) {
        context.birth_year = caps[1].parse().ok();
    }
    if let Some(caps) = death_re.captures(text) {
        context.death_year = caps[1].parse().ok();
    }
    for re in nationality_res {
        if let Some(caps) = re.captures(text) {
            context.nationality = Some(capitalize(&caps[1]));
            break;
        }
    }

    let mut seen_movements = Vec::new();
    for caps in movement_re.captures_iter(text) {
        let movement = capitalize_words(&caps[1]);
        if !seen_movements.contains(&movement) {
            seen_movements.push(movement);
        }
    }
    context.literary_movements = seen_movements;

    // Influence bullets, if the search results carried any.
    if let Some(section_start) = text.to_lowercase().find("influence") {
        context.key_influences = bullet_re
            .captures_iter(&text[section_start..])
            .map(|c| c[1].trim().to_string())
            .take(5)
            .collect();
    }

    if !text.trim().is_empty() {
        context.biographical_summary = Some(text.trim().to_string());
    }

    context
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

fn capitalize_words(phrase: &str) -> String {
    phrase.split_whitespace().map(capitalize).collect::<Vec<_>>().join(" ")
}
