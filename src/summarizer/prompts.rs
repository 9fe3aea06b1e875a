//! Prompt templates for the trend summary.
//!
//! Every backend receives the same two messages: a system instruction that
//! sets the analyst persona, and a user message with the top records.

use crate::record::MediaRecord;

/// Tags per record included in the digest.
const TAGS_PER_RECORD: usize = 3;

pub const SYSTEM_INSTRUCTION: &str = "You are an expert YouTube data analyst. \
You read the numbers closely, spot how trends are moving, and turn them into \
sharp marketing insight.";

/// The system + user message pair sent to a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Build the prompt from the first `top_n` records, in the order given.
pub fn build_prompt(records: &[MediaRecord], top_n: usize, language: &str) -> Prompt {
    let shown = records.len().min(top_n);
    let digest = digest(&records[..shown]);

    let user = format!(
        "Based on the following YouTube video data (top {shown}), summarize the current \
trend and how viewers are reacting in 2-3 sentences. Answer in {language}.\n\n{digest}"
    );

    Prompt {
        system: SYSTEM_INSTRUCTION.to_string(),
        user,
    }
}

/// One line per record: title, views, VPH and the first three tags.
pub fn digest(records: &[MediaRecord]) -> String {
    records
        .iter()
        .map(|r| {
            let tags: Vec<&str> = r
                .tags()
                .iter()
                .take(TAGS_PER_RECORD)
                .map(String::as_str)
                .collect();
            format!(
                "- Title: {}, Views: {}, VPH: {}, Tags: {}",
                r.title(),
                r.view_count(),
                r.vph(),
                tags.join(",")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
