pub mod fallback;
pub mod llm;
pub mod normalize;
pub mod planner;
pub mod prompt;
pub mod service;

pub use fallback::rule_based_summary;
pub use llm::{ChatClient, ChatMessage, ChatRequest, GroqClient};
pub use normalize::{CompactEvent, DigestEvent};
pub use planner::{ItineraryPlanner, ModelRetryPolicy};
pub use prompt::SectionAction;
pub use service::Summarizer;
