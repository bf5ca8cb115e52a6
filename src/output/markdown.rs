//! Markdown report generation
//!
//! This module generates human-readable markdown reports of crawl results:
//! the ranked matches first, then the statistics of the crawl that found them.

use crate::output::{CrawlResult, OutputResult};
use crate::scoring::SearchQuery;
use crate::state::PageState;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Maximum number of ranked pages listed in the report
const MAX_REPORTED_PAGES: usize = 100;

/// Writes a markdown report of a crawl to `output_path`
pub fn write_markdown_report(
    result: &CrawlResult,
    query: Option<&SearchQuery>,
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_markdown_report(result, query);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl result as markdown
pub fn format_markdown_report(result: &CrawlResult, query: Option<&SearchQuery>) -> String {
    let stats = &result.statistics;
    let mut md = String::new();

    md.push_str("# Recipe-Ripple Crawl Report\n\n");

    if let Some(query) = query {
        md.push_str("## Query\n\n");
        md.push_str(&format!("- **Title**: {}\n", query.title));
        md.push_str(&format!(
            "- **Ingredients**: {}\n\n",
            query.ingredients.join(", ")
        ));
    }

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Pages Fetched**: {}\n", stats.pages_fetched));
    md.push_str(&format!("- **Pages Accepted**: {}\n", result.pages.len()));
    md.push_str(&format!("- **Unique Domains**: {}\n", stats.unique_domains));
    md.push_str(&format!("- **Total Errors**: {}\n", stats.error_count()));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n",
        stats.success_rate()
    ));
    if let Some(duration) = stats.duration_seconds {
        md.push_str(&format!("- **Duration**: {:.1} seconds\n", duration));
    }
    md.push('\n');

    md.push_str("## Ranked Pages\n\n");
    if result.pages.is_empty() {
        md.push_str("No pages were accepted.\n\n");
    } else {
        md.push_str("| Rank | Score | Title | Ingredients | Content | Recipe | URL |\n");
        md.push_str("|------|-------|-------|-------------|---------|--------|-----|\n");

        for (rank, page) in result.pages.iter().take(MAX_REPORTED_PAGES).enumerate() {
            let (title, ingredients, content) = match &page.detail {
                Some(d) => (
                    format!("{:.3}", d.title_match),
                    format!("{:.3}", d.ingredients_match),
                    format!("{:.3}", d.content_match),
                ),
                None => ("-".to_string(), "-".to_string(), "-".to_string()),
            };
            let recipe = match page.is_recipe {
                Some(true) => "yes",
                Some(false) => "no",
                None => "-",
            };
            md.push_str(&format!(
                "| {} | {:.3} | {} | {} | {} | {} | {} |\n",
                rank + 1,
                page.score,
                title,
                ingredients,
                content,
                recipe,
                page.url
            ));
        }

        if result.pages.len() > MAX_REPORTED_PAGES {
            md.push_str(&format!(
                "\n... and {} more\n",
                result.pages.len() - MAX_REPORTED_PAGES
            ));
        }
        md.push('\n');
    }

    md.push_str("## Page State Breakdown\n\n");
    md.push_str("| State | Count |\n");
    md.push_str("|-------|-------|\n");
    for state in PageState::all_states() {
        let count = stats.count(state);
        if count > 0 {
            md.push_str(&format!("| {} | {} |\n", state, count));
        }
    }
    md.push('\n');

    if !stats.depth_breakdown.is_empty() {
        md.push_str("## Depth Breakdown\n\n");
        md.push_str("| Depth | Pages |\n");
        md.push_str("|-------|-------|\n");

        let mut depths: Vec<_> = stats.depth_breakdown.iter().collect();
        depths.sort_by_key(|(d, _)| **d);

        for (depth, count) in depths {
            md.push_str(&format!("| {} | {} |\n", depth, count));
        }
        md.push('\n');
    }

    md
}
