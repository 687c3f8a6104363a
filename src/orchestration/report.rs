//! Markdown report synthesis.
//!
//! Pure rendering over a finished [`RunState`]; sections for roles that
//! failed are omitted rather than stubbed.

use crate::models::{AuthorContext, LegacyAnalysis, ReadingMap, ReadingMapEntry, RunState};

const CHRONOLOGICAL_CAP: usize = 15;
const THEMATIC_CAP: usize = 5;

pub const SECTION_BIOGRAPHY: &str = "## Author Biography & Historical Context";
pub const SECTION_BIBLIOGRAPHY: &str = "## Reading Map & Bibliography";
pub const SECTION_LEGACY: &str = "## Literary Legacy & Analysis";

/// Render the final markdown report from whatever results the run produced.
pub fn render_report(state: &RunState) -> String {
    let mut out = String::new();
    out.push_str(&format!("# The Literary Finder: {}\n\n", state.author_name));

    if let Some(context) = &state.results.historian {
        render_biography(&mut out, context);
    }
    if let Some(map) = &state.results.cartographer {
        render_bibliography(&mut out, map);
    }
    if let Some(legacy) = &state.results.legacy_connector {
        render_legacy(&mut out, legacy);
    }

    if state.results.count_present() == 0 {
        out.push_str("No research results are available for this author.\n");
    }

    out
}

fn render_biography(out: &mut String, context: &AuthorContext) {
    out.push_str(SECTION_BIOGRAPHY);
    out.push_str("\n\n");

    let mut facts = Vec::new();
    match (context.birth_year, context.death_year) {
        (Some(birth), Some(death)) => facts.push(format!("**Lived:** {birth}\u{2013}{death}")),
        (Some(birth), None) => facts.push(format!("**Born:** {birth}")),
        (None, Some(death)) => facts.push(format!("**Died:** {death}")),
        (None, None) => {}
    }
    if let Some(nationality) = &context.nationality {
        facts.push(format!("**Nationality:** {nationality}"));
    }
    if !facts.is_empty() {
        out.push_str(&facts.join(" | "));
        out.push_str("\n\n");
    }

    if !context.literary_movements.is_empty() {
        out.push_str(&format!(
            "**Literary movements:** {}\n\n",
            context.literary_movements.join(", ")
        ));
    }
    if !context.key_influences.is_empty() {
        out.push_str("**Key influences:**\n");
        for influence in &context.key_influences {
            out.push_str(&format!("- {influence}\n"));
        }
        out.push('\n');
    }
    if let Some(summary) = &context.biographical_summary {
        out.push_str(summary);
        out.push_str("\n\n");
    }
}

fn render_bibliography(out: &mut String, map: &ReadingMap) {
    out.push_str(SECTION_BIBLIOGRAPHY);
    out.push_str("\n\n");

    if !map.start_here.is_empty() {
        out.push_str("### Start Here\n\n");
        for entry in &map.start_here {
            render_entry(out, entry);
        }
        out.push('\n');
    }

    if !map.chronological.is_empty() {
        out.push_str("### Chronological Works\n\n");
        for entry in map.chronological.iter().take(CHRONOLOGICAL_CAP) {
            render_entry(out, entry);
        }
        let remaining = map.chronological.len().saturating_sub(CHRONOLOGICAL_CAP);
        if remaining > 0 {
            out.push_str(&format!("- ... and {remaining} more\n"));
        }
        out.push('\n');
    }

    if !map.thematic_groups.is_empty() {
        out.push_str("### By Theme\n\n");
        for (theme, entries) in &map.thematic_groups {
            out.push_str(&format!("**{theme}**\n"));
            for entry in entries.iter().take(THEMATIC_CAP) {
                render_entry(out, entry);
            }
            out.push('\n');
        }
    }
}

fn render_entry(out: &mut String, entry: &ReadingMapEntry) {
    out.push_str("- ");
    if let Some(link) = &entry.google_books_link {
        out.push_str(&format!("[{}]({link})", entry.title));
    } else {
        out.push_str(&format!("**{}**", entry.title));
    }
    if let Some(year) = entry.year {
        out.push_str(&format!(" ({year})"));
    }
    if let Some(description) = &entry.description {
        out.push_str(&format!(" — {description}"));
    }
    out.push('\n');
}

fn render_legacy(out: &mut String, legacy: &LegacyAnalysis) {
    out.push_str(SECTION_LEGACY);
    out.push_str("\n\n");

    if !legacy.stylistic_innovations.is_empty() {
        out.push_str("**Stylistic innovations:**\n");
        for item in &legacy.stylistic_innovations {
            out.push_str(&format!("- {item}\n"));
        }
        out.push('\n');
    }
    if !legacy.recurring_themes.is_empty() {
        out.push_str("**Recurring themes:**\n");
        for item in &legacy.recurring_themes {
            out.push_str(&format!("- {item}\n"));
        }
        out.push('\n');
    }
    if let Some(significance) = &legacy.literary_significance {
        out.push_str(significance);
        out.push_str("\n\n");
    }
    if let Some(relevance) = &legacy.modern_relevance {
        out.push_str(&format!("**Modern relevance:** {relevance}\n\n"));
    }
    if !legacy.similar_authors.is_empty() {
        out.push_str("**If you enjoy this author, try:**\n");
        for similar in &legacy.similar_authors {
            out.push_str(&format!("- **{}**: {}\n", similar.name, similar.reason));
        }
        out.push('\n');
    }
}
