//! Insight generation over discovery sessions.

use super::{
    domain::{CompletionRequest, Insight, MAX_INSIGHTS, parse_insights},
    ports::{AssistError, AssistResult, TextCompletion},
};
use crate::{
    discovery::domain::{DiscoveryResponse, QuestionType, SessionDetails, flatten_value},
    reporting::domain::infer_category,
};
use minijinja::Environment;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

/// Prompt template rendered for [`InsightService::discovery_insights`].
pub const DEFAULT_INSIGHT_TEMPLATE: &str = "\
Account: {{ account }} ({{ vertical }}), discovery {{ status }}.
{%- if responses %}
Answers:
{%- for response in responses %}
- [{{ response.category }}] {{ response.question }}: {{ response.answer }}
{%- endfor %}
{%- endif %}
{%- if notes %}
Notes:
{%- for note in notes %}
- ({{ note.note_type }}) {{ note.text }}
{%- endfor %}
{%- endif %}

List up to {{ limit }} insights for the account team, one per line, as \"- Title: detail\".";

/// Asks the completion collaborator for insights about a session.
#[derive(Clone)]
pub struct InsightService<T>
where
    T: TextCompletion,
{
    completion: Arc<T>,
    template: String,
    limit: usize,
}

impl<T> InsightService<T>
where
    T: TextCompletion,
{
    /// Creates a service with the default template.
    #[must_use]
    pub fn new(completion: Arc<T>) -> Self {
        Self {
            completion,
            template: DEFAULT_INSIGHT_TEMPLATE.to_owned(),
            limit: MAX_INSIGHTS,
        }
    }

    /// Replaces the prompt template.
    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// Lowers the number of insights returned, clamped to
    /// `1..=MAX_INSIGHTS`.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.clamp(1, MAX_INSIGHTS);
        self
    }

    /// Renders the prompt for a session.
    ///
    /// # Errors
    ///
    /// Returns [`AssistError::Template`] when the template fails.
    pub fn render_prompt(&self, details: &SessionDetails) -> AssistResult<String> {
        let environment = Environment::new();
        environment
            .render_str(&self.template, self.prompt_context(details))
            .map_err(|err| AssistError::Template(err.to_string()))
    }

    /// Renders the session prompt, requests a completion, and parses the
    /// answer into insights.
    ///
    /// # Errors
    ///
    /// Returns collaborator errors unchanged and
    /// [`AssistError::InvalidResponse`] when no insight can be read from
    /// the answer.
    #[tracing::instrument(skip(self, details), fields(session = %details.session.id()))]
    pub async fn discovery_insights(&self, details: &SessionDetails) -> AssistResult<Vec<Insight>> {
        let prompt = self.render_prompt(details)?;
        let text = self.completion.complete(&CompletionRequest::new(prompt)).await?;
        let mut insights = parse_insights(&text);
        if insights.is_empty() {
            return Err(AssistError::InvalidResponse(
                "completion contained no insights".to_owned(),
            ));
        }
        insights.truncate(self.limit);
        debug!(count = insights.len(), "insights generated");
        Ok(insights)
    }

    /// Sends a free-form prompt and returns the completion text.
    ///
    /// # Errors
    ///
    /// Returns collaborator errors unchanged.
    pub async fn ask(&self, request: &CompletionRequest) -> AssistResult<String> {
        self.completion.complete(request).await
    }

    fn prompt_context(&self, details: &SessionDetails) -> Value {
        let session = &details.session;
        let responses: Vec<Value> = details.responses.iter().map(response_context).collect();
        let notes: Vec<Value> = details
            .notes
            .iter()
            .map(|note| json!({ "note_type": note.note_type(), "text": note.text().as_str() }))
            .collect();
        json!({
            "account": session.account().name(),
            "account_id": session.account().id(),
            "vertical": session.vertical().as_str(),
            "status": session.status().as_str(),
            "responses": responses,
            "notes": notes,
            "limit": self.limit,
        })
    }
}

fn response_context(response: &DiscoveryResponse) -> Value {
    let selections = response.vendor_selections();
    let answer = if response.question_type() == QuestionType::VendorMulti && !selections.is_empty()
    {
        selections.flatten()
    } else {
        flatten_value(response.value())
    };
    json!({
        "question": response.question_title(),
        "category": infer_category(response.question_id().as_str()).label(),
        "answer": answer,
    })
}
