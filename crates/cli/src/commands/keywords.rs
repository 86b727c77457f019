use serde::Serialize;
use tracing::info;
use vitrine_core::recommendations::extract_keywords;

use crate::commands::CommandResult;

#[derive(Debug, Serialize)]
struct KeywordsReport {
    command: &'static str,
    status: &'static str,
    keywords: Vec<String>,
}

pub fn run(title: &str, description: &str) -> CommandResult {
    let keywords: Vec<String> = extract_keywords(title, description).into_iter().collect();
    info!(event_name = "cli.keywords.extracted", count = keywords.len(), "keywords extracted");

    CommandResult::report("keywords", &KeywordsReport { command: "keywords", status: "ok", keywords })
}
