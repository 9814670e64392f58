//! Completion requests and the insight list parsed from completion text.

use serde::{Deserialize, Serialize};

/// Upper bound on insights returned from one completion.
pub const MAX_INSIGHTS: usize = 5;

/// A prompt for the text-completion collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    prompt: String,
    context: Option<String>,
}

impl CompletionRequest {
    /// Creates a request without additional context.
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            context: None,
        }
    }

    /// Attaches background context sent ahead of the prompt.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Returns the prompt.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Returns the context, if any.
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }
}

/// One short finding produced by the collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    /// Headline.
    pub title: String,
    /// Supporting sentence; may be empty.
    #[serde(default)]
    pub detail: String,
}

impl Insight {
    /// Creates an insight.
    #[must_use]
    pub fn new(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            detail: detail.into(),
        }
    }
}

/// Parses completion text into at most [`MAX_INSIGHTS`] insights.
///
/// A JSON array of `{title, detail}` objects is taken as is. Otherwise each
/// bulleted or numbered line becomes one insight, split on its first colon.
/// Text without any list items becomes a single `Summary` insight. Blank
/// text yields nothing.
#[must_use]
pub fn parse_insights(text: &str) -> Vec<Insight> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if trimmed.starts_with('[')
        && let Ok(parsed) = serde_json::from_str::<Vec<Insight>>(trimmed)
    {
        return parsed
            .into_iter()
            .filter(|insight| !insight.title.trim().is_empty())
            .take(MAX_INSIGHTS)
            .collect();
    }

    let listed: Vec<Insight> = trimmed
        .lines()
        .filter_map(list_item)
        .map(split_item)
        .take(MAX_INSIGHTS)
        .collect();
    if listed.is_empty() {
        return vec![Insight::new("Summary", trimmed)];
    }
    listed
}

fn list_item(line: &str) -> Option<&str> {
    let stripped = line.trim_start();
    let item = ["- ", "* ", "• "]
        .iter()
        .find_map(|bullet| stripped.strip_prefix(bullet))
        .or_else(|| numbered(stripped))?
        .trim();
    (!item.is_empty()).then_some(item)
}

fn numbered(line: &str) -> Option<&str> {
    let rest = line.trim_start_matches(|ch: char| ch.is_ascii_digit());
    if rest.len() == line.len() {
        return None;
    }
    rest.strip_prefix('.').or_else(|| rest.strip_prefix(')'))
}

fn split_item(item: &str) -> Insight {
    match item.split_once(':') {
        Some((title, detail)) if !unmark(title).is_empty() => {
            Insight::new(unmark(title), detail.trim())
        }
        _ => Insight::new(unmark(item), ""),
    }
}

fn unmark(text: &str) -> &str {
    text.trim().trim_matches('*').trim()
}
