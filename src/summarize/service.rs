use crate::observability::metrics;
use crate::summarize::fallback::rule_based_summary;
use crate::summarize::llm::{ChatClient, ChatMessage, ChatRequest};
use crate::summarize::normalize::DigestEvent;
use crate::summarize::prompt::{
    build_digest, build_summary_user_message, SUMMARY_SYSTEM_PROMPT, SUMMARY_TEMPERATURE,
};
use crate::types::{SummaryResult, UnifiedEvent, UserContext};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Two-tier summarizer: generative when it can, rule-based otherwise.
pub struct Summarizer {
    chat: Arc<dyn ChatClient>,
}

impl Summarizer {
    pub fn new(chat: Arc<dyn ChatClient>) -> Self {
        Self { chat }
    }

    /// Summarize the merged, already sorted event list. Events are read, never
    /// filtered or reordered.
    pub async fn summarize(&self, events: &[UnifiedEvent], ctx: &UserContext) -> SummaryResult {
        let digest_events: Vec<DigestEvent> = events.iter().map(DigestEvent::from).collect();
        self.summarize_digest(&digest_events, ctx).await
    }

    /// Same policy over events that came in loosely shaped from a client.
    #[instrument(skip_all, fields(events = events.len()))]
    pub async fn summarize_digest(&self, events: &[DigestEvent], ctx: &UserContext) -> SummaryResult {
        if !self.chat.is_configured() {
            debug!("No generative credential, using rule-based summary");
            metrics::summary::fallback("not_configured");
            return SummaryResult::rule_based(rule_based_summary(events, ctx));
        }

        let digest = build_digest(events);
        if digest.is_empty() {
            metrics::summary::fallback("empty_digest");
            return SummaryResult::rule_based(rule_based_summary(events, ctx));
        }

        let request = ChatRequest {
            model: self.chat.default_model().to_string(),
            messages: vec![
                ChatMessage::system(SUMMARY_SYSTEM_PROMPT),
                ChatMessage::user(build_summary_user_message(&digest, ctx)),
            ],
            temperature: SUMMARY_TEMPERATURE,
            max_tokens: None,
        };

        match self.chat.complete(&request).await {
            Ok(text) if !text.trim().is_empty() => {
                info!("Generative summary produced ({} chars)", text.len());
                metrics::summary::generated();
                SummaryResult::generative(text)
            }
            Ok(_) => {
                warn!("Generative backend returned an empty completion");
                metrics::summary::fallback("empty_completion");
                SummaryResult::degraded(rule_based_summary(events, ctx), None)
            }
            Err(e) => {
                warn!("Generative summary failed, falling back: {}", e);
                metrics::summary::fallback("upstream_error");
                SummaryResult::degraded(rule_based_summary(events, ctx), Some(e.to_string()))
            }
        }
    }
}
