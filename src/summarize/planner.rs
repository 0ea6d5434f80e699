use crate::config::PlannerSettings;
use crate::error::{RadarError, Result};
use crate::observability::metrics;
use crate::summarize::llm::{ChatClient, ChatMessage, ChatRequest};
use crate::summarize::normalize::CompactEvent;
use crate::summarize::prompt::{
    build_plan_user_message, build_section_user_message, SectionAction, PLAN_ITEM_LIMIT,
    PLAN_MAX_TOKENS, PLAN_SYSTEM_PROMPT, PLAN_TEMPERATURE, SECTION_MAX_TOKENS,
    SECTION_SYSTEM_PROMPT,
};
use crate::types::UserContext;
use regex::{RegexSet, RegexSetBuilder};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Decides whether a failure means "this model is gone, try another one".
#[derive(Debug, Clone)]
pub struct ModelRetryPolicy {
    patterns: RegexSet,
}

impl ModelRetryPolicy {
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = RegexSetBuilder::new(patterns)
            .case_insensitive(true)
            .build()
            .map_err(|e| RadarError::Config(format!("invalid retryable model pattern: {e}")))?;
        Ok(Self { patterns })
    }

    pub fn is_model_unavailable(&self, error: &RadarError) -> bool {
        match error {
            RadarError::Upstream { body, .. } => self.patterns.is_match(body),
            RadarError::Http(_) | RadarError::Json(_) => false,
            other => self.patterns.is_match(&other.to_string()),
        }
    }
}

/// Day-by-day itinerary planning. There is no rule-based equivalent, so
/// failures here are returned to the caller.
pub struct ItineraryPlanner {
    chat: Arc<dyn ChatClient>,
    fallback_models: Vec<String>,
    policy: ModelRetryPolicy,
}

impl ItineraryPlanner {
    pub fn new(chat: Arc<dyn ChatClient>, settings: &PlannerSettings) -> Result<Self> {
        Ok(Self {
            chat,
            fallback_models: settings.fallback_models.clone(),
            policy: ModelRetryPolicy::new(&settings.retryable_model_errors)?,
        })
    }

    /// Configured model first, then every fallback that differs from it.
    pub fn candidate_models(&self) -> Vec<String> {
        let mut models = vec![self.chat.default_model().to_string()];
        for model in &self.fallback_models {
            if !models.contains(model) {
                models.push(model.clone());
            }
        }
        models
    }

    #[instrument(skip_all, fields(items = items.len()))]
    pub async fn plan(&self, items: &[Value], ctx: &UserContext) -> Result<String> {
        if items.is_empty() {
            return Err(RadarError::InvalidRequest(
                "Itinerary is required and cannot be empty.".to_string(),
            ));
        }
        self.ensure_configured()?;

        let compact: Vec<CompactEvent> = items
            .iter()
            .take(PLAN_ITEM_LIMIT)
            .map(CompactEvent::from_value)
            .collect();
        let request = ChatRequest {
            model: self.chat.default_model().to_string(),
            messages: vec![
                ChatMessage::system(PLAN_SYSTEM_PROMPT),
                ChatMessage::user(build_plan_user_message(&compact, ctx)?),
            ],
            temperature: PLAN_TEMPERATURE,
            max_tokens: Some(PLAN_MAX_TOKENS),
        };
        self.complete_with_fallback(&request).await
    }

    /// Shorten, expand or regenerate one day of an existing plan.
    #[instrument(skip(self, text))]
    pub async fn refine_section(&self, action: SectionAction, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(RadarError::InvalidRequest("No section text provided.".to_string()));
        }
        self.ensure_configured()?;

        let request = ChatRequest {
            model: self.chat.default_model().to_string(),
            messages: vec![
                ChatMessage::system(SECTION_SYSTEM_PROMPT),
                ChatMessage::user(build_section_user_message(action, text)),
            ],
            temperature: PLAN_TEMPERATURE,
            max_tokens: Some(SECTION_MAX_TOKENS),
        };
        self.complete_with_fallback(&request).await
    }

    fn ensure_configured(&self) -> Result<()> {
        if self.chat.is_configured() {
            Ok(())
        } else {
            Err(RadarError::NotConfigured("Missing GROQ_API_KEY environment variable".to_string()))
        }
    }

    /// Try the configured model; only a "model unavailable" rejection moves on
    /// to the fallback list, where each model gets exactly one attempt.
    async fn complete_with_fallback(&self, request: &ChatRequest) -> Result<String> {
        let mut candidates = self.candidate_models().into_iter();
        let Some(primary) = candidates.next() else {
            return Err(RadarError::Config("no model configured".to_string()));
        };

        let first_error = match self.chat.complete(&request.with_model(&primary)).await {
            Ok(text) => {
                metrics::planner::model_attempt("success");
                return Ok(text);
            }
            Err(e) if !self.policy.is_model_unavailable(&e) => {
                metrics::planner::model_attempt("error");
                return Err(e);
            }
            Err(e) => e,
        };
        metrics::planner::model_attempt("model_unavailable");
        warn!(model = %primary, "model unavailable, trying fallbacks: {}", first_error);

        let mut attempted = vec![primary];
        let mut last_error = first_error.to_string();
        for model in candidates {
            attempted.push(model.clone());
            match self.chat.complete(&request.with_model(&model)).await {
                Ok(text) => {
                    info!(model = %model, "fallback model succeeded");
                    metrics::planner::model_attempt("success");
                    return Ok(text);
                }
                Err(e) => {
                    warn!(model = %model, "fallback model failed: {}", e);
                    metrics::planner::model_attempt("error");
                    last_error = e.to_string();
                }
            }
        }

        Err(RadarError::ModelsExhausted { attempted, last_error })
    }
}
