//! Query inspection handler: shows how a query is understood and, given a
//! source, why each listing is kept or rejected.

use crate::search::{Gate, Rejection, Verdict};
use crate::state::SearchState;
use rmcp::schemars;
use serde::Deserialize;
use std::{fmt::Write as _, sync::Arc};

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ParseQueryRequest {
    /// Free-text query to parse
    pub query: String,
    /// Optional listings file; when given, every listing's verdict is reported
    #[serde(default)]
    pub source: Option<String>,
}

pub async fn handle_parse_query(
    state: &Arc<SearchState>,
    request: ParseQueryRequest,
) -> Result<String, String> {
    let parsed = state.engine().parse(&request.query);
    let mut output = serde_json::to_string_pretty(&parsed)
        .map_err(|e| format!("Failed to serialize parsed query: {}", e))?;

    if parsed.is_empty() {
        output.push_str("\n\nEmpty query: nothing to search.");
        return Ok(output);
    }

    let Some(source) = request.source.as_deref() else {
        return Ok(output);
    };

    let source = state
        .catalog()
        .resolve_source(Some(source))
        .map_err(|e| e.to_string())?;
    let listings = state
        .catalog()
        .get(&source)
        .await
        .map_err(|e| e.to_string())?;

    let explanation = state.engine().explain(&parsed, &listings);
    let gate = match explanation.gate {
        Gate::Open => "no gate, query too short",
        Gate::Strict => "strict gate, every free token must match",
        Gate::Relaxed => "relaxed gate, strict pass found nothing so one free token is enough",
    };
    let _ = writeln!(output, "\n\nVerdicts ({}):", gate);
    for candidate in explanation.candidates {
        let verdict = match candidate.verdict {
            Verdict::Scored(score) => format!("score {:.1}", score),
            Verdict::Rejected(Rejection::GateMiss) => "rejected: free tokens not found".to_string(),
            Verdict::Rejected(Rejection::BelowMinimum {
                attribute,
                minimum,
                actual,
            }) => format!("rejected: {} {} < {}", attribute, actual, minimum),
        };
        let _ = writeln!(output, "• {}: {}", candidate.listing.id, verdict);
    }

    Ok(output)
}
