//! Listing search handler.

use crate::state::SearchState;
use crate::suggest::SuggestionRow;
use rmcp::schemars;
use serde::Deserialize;
use std::{fmt::Write as _, sync::Arc};

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchListingsRequest {
    /// Free-text query, e.g. "apartamento bocagrande 3h piscina"
    pub query: String,
    /// Path to a listings JSON file (default: the configured source)
    #[serde(default)]
    pub source: Option<String>,
    /// Maximum number of results to return (default: 12, never more than 12)
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Run a listing search and render the ranked rows.
pub async fn handle_search_listings(
    state: &Arc<SearchState>,
    request: SearchListingsRequest,
) -> Result<String, String> {
    let engine = state.engine();
    let min_chars = state.config().min_query_chars;

    if request.query.trim().chars().count() < min_chars {
        return Ok(format!(
            "Query too short: type at least {} characters to search.",
            min_chars
        ));
    }

    let source = state
        .catalog()
        .resolve_source(request.source.as_deref())
        .map_err(|e| format!("Search unavailable: {}", e))?;
    let listings = state
        .catalog()
        .get(&source)
        .await
        .map_err(|e| format!("Search unavailable: {}", e))?;

    let limit = request.limit.unwrap_or_else(|| engine.limit());
    let results = engine.search_with_limit(&request.query, &listings, limit);

    if results.is_empty() {
        let mut msg = format!(
            "No listings found for '{}' in {}.\n\n",
            request.query,
            source.display()
        );

        msg.push_str("Search tips:\n");
        msg.push_str("• Try a neighborhood or city, e.g. 'bocagrande' or 'cartagena'\n");
        msg.push_str("• Amenities work in Spanish or English: 'piscina' or 'pool'\n");
        msg.push_str("• Use shorthand for minimums: '3h' bedrooms, '2b' bathrooms, '1g' parking\n");

        return Ok(msg);
    }

    let rows: Vec<SuggestionRow> = results.into_iter().map(SuggestionRow::from).collect();
    Ok(format_search_results(&rows, &request.query))
}

/// Format ranked rows into a readable string output.
fn format_search_results(rows: &[SuggestionRow], query: &str) -> String {
    let mut output = format!("Listings matching '{}':\n\n", query);

    for (idx, row) in rows.iter().enumerate() {
        let _ = writeln!(output, "{}. {} [{}]", idx + 1, row.title, row.id);

        let mut details = vec![row.location()];
        if !row.kind.is_empty() {
            details.push(row.kind.clone());
        }
        if let Some(price) = row.price {
            details.push(format_price(price));
        }
        let rooms = rooms_summary(row);
        if !rooms.is_empty() {
            details.push(rooms);
        }
        let _ = writeln!(output, "   {}", details.join(" · "));

        if let Some(image) = &row.image {
            let _ = writeln!(output, "   image: {}", image);
        }
        output.push('\n');
    }

    output
}

fn rooms_summary(row: &SuggestionRow) -> String {
    [
        (row.bedrooms, "hab"),
        (row.bathrooms, "baños"),
        (row.parking, "parq"),
    ]
    .iter()
    .filter_map(|(count, unit)| count.map(|n| format!("{} {}", n, unit)))
    .collect::<Vec<_>>()
    .join(" / ")
}

/// Formats a price with `.` thousands separators, e.g. `$850.000.000`.
fn format_price(price: f64) -> String {
    let whole = format!("{:.0}", price.max(0.0));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("${}", grouped)
}
