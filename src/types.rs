use crate::constants::{
    EVENTBRITE_API, KONZERTKASSE_API, RESERVIX_API, SEATGEEK_API, TICKETMASTER_API,
};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which catalog produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Ticketmaster,
    Eventbrite,
    Seatgeek,
    Konzertkasse,
    Reservix,
}

impl Source {
    /// Default enumeration order. Dedup keeps the first record in this order.
    pub const ALL: [Source; 5] = [
        Source::Ticketmaster,
        Source::Eventbrite,
        Source::Seatgeek,
        Source::Konzertkasse,
        Source::Reservix,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Ticketmaster => TICKETMASTER_API,
            Source::Eventbrite => EVENTBRITE_API,
            Source::Seatgeek => SEATGEEK_API,
            Source::Konzertkasse => KONZERTKASSE_API,
            Source::Reservix => RESERVIX_API,
        }
    }

    /// Prefix used when building `UnifiedEvent::id`.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Source::Ticketmaster => "tm",
            Source::Eventbrite => "eb",
            Source::Seatgeek => "sg",
            Source::Konzertkasse => "kk",
            Source::Reservix => "rx",
        }
    }

    /// Parse a comma-separated provider list, silently dropping unknown tags.
    pub fn parse_list<'a, I>(tags: I) -> Vec<Source>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut out = Vec::new();
        for tag in tags {
            if let Ok(source) = tag.parse::<Source>() {
                if !out.contains(&source) {
                    out.push(source);
                }
            }
        }
        out
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        Source::ALL
            .iter()
            .copied()
            .find(|source| source.as_str() == tag)
            .ok_or_else(|| format!("unknown provider '{}'", s.trim()))
    }
}

/// Price information is either a number (lowest ticket price) or a label such as "free".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceHint {
    Amount(f64),
    Label(String),
}

impl PriceHint {
    /// Short label used in the generative digest.
    pub fn label(&self) -> String {
        match self {
            PriceHint::Amount(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("from {}", *n as i64),
            PriceHint::Amount(n) => format!("from {n}"),
            PriceHint::Label(s) => s.clone(),
        }
    }
}

/// Canonical, provider-agnostic event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedEvent {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub source: Source,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceHint>,
    /// Classification or category label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

/// Normalized search filters for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    pub keyword: Option<String>,
    pub city: Option<String>,
    pub country_code: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// `None` means every known provider.
    pub providers: Option<Vec<Source>>,
    pub tone: Option<String>,
}

impl SearchQuery {
    /// Trim every text filter and turn blank ones into `None`.
    pub fn normalized(self) -> Self {
        Self {
            keyword: non_blank(self.keyword),
            city: non_blank(self.city),
            country_code: non_blank(self.country_code),
            start_date: non_blank(self.start_date),
            end_date: non_blank(self.end_date),
            providers: self.providers,
            tone: non_blank(self.tone),
        }
    }

    pub fn wants(&self, source: Source) -> bool {
        match &self.providers {
            Some(list) => list.contains(&source),
            None => true,
        }
    }

    pub fn user_context(&self) -> UserContext {
        UserContext {
            city: self.city.clone(),
            keyword: self.keyword.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            tone: self.tone.clone(),
        }
    }
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// What the user told us about the trip; only the summarizer reads this.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub tone: Option<String>,
}

impl UserContext {
    pub fn normalized(self) -> Self {
        Self {
            city: non_blank(self.city),
            keyword: non_blank(self.keyword),
            start_date: non_blank(self.start_date),
            end_date: non_blank(self.end_date),
            tone: non_blank(self.tone),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryTier {
    Generative,
    RuleBased,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    pub text: String,
    /// The generative tier was attempted but the rule-based text was returned.
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    pub tier: SummaryTier,
}

impl SummaryResult {
    pub fn generative(text: String) -> Self {
        Self { text, degraded: false, error_detail: None, tier: SummaryTier::Generative }
    }

    pub fn rule_based(text: String) -> Self {
        Self { text, degraded: false, error_detail: None, tier: SummaryTier::RuleBased }
    }

    pub fn degraded(text: String, error_detail: Option<String>) -> Self {
        Self { text, degraded: true, error_detail, tier: SummaryTier::RuleBased }
    }
}

/// Core trait that every catalog adapter implements
#[async_trait::async_trait]
pub trait EventProvider: Send + Sync {
    /// Tag of the catalog this adapter talks to
    fn source(&self) -> Source;

    /// Whether credentials / base URL are present. Unconfigured adapters are
    /// skipped without a network call.
    fn is_configured(&self) -> bool;

    /// Fetch one page of events for `query`. Network and HTTP failures are
    /// returned as errors; a missing credential yields `Ok(vec![])`.
    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<UnifiedEvent>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_list_ignores_unknown_and_duplicates() {
        let parsed = Source::parse_list(" SeatGeek ,bogus,ticketmaster,seatgeek".split(','));
        assert_eq!(parsed, vec![Source::Seatgeek, Source::Ticketmaster]);
    }

    #[test]
    fn normalized_query_drops_blank_filters() {
        let q = SearchQuery {
            keyword: Some("  jazz ".into()),
            city: Some("   ".into()),
            ..Default::default()
        }
        .normalized();
        assert_eq!(q.keyword.as_deref(), Some("jazz"));
        assert!(q.city.is_none());
        assert!(q.wants(Source::Reservix));
    }

    #[test]
    fn price_labels() {
        assert_eq!(PriceHint::Amount(25.0).label(), "from 25");
        assert_eq!(PriceHint::Amount(12.5).label(), "from 12.5");
        assert_eq!(PriceHint::Label("free".into()).label(), "free");
    }

    #[test]
    fn unified_event_serializes_camel_case_and_skips_missing() {
        let ev = UnifiedEvent {
            id: "tm_1".into(),
            name: "Show".into(),
            date: Some("2025-03-01".into()),
            venue_name: Some("Hall".into()),
            city: None,
            country: None,
            url: None,
            image: None,
            source: Source::Ticketmaster,
            price: None,
            provider: None,
        };
        let v = serde_json::to_value(&ev).unwrap();
        assert_eq!(v["venueName"], "Hall");
        assert_eq!(v["source"], "ticketmaster");
        assert!(v.get("city").is_none());
    }
}
