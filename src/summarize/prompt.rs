use crate::summarize::normalize::{CompactEvent, DigestEvent};
use crate::types::UserContext;
use serde::Serialize;

/// Events beyond this are left out of the generative digest.
pub const DIGEST_LIMIT: usize = 20;
/// Items beyond this are left out of a planning request.
pub const PLAN_ITEM_LIMIT: usize = 30;

pub const SUMMARY_TEMPERATURE: f32 = 0.5;
pub const PLAN_TEMPERATURE: f32 = 0.6;
pub const PLAN_MAX_TOKENS: u32 = 1200;
pub const SECTION_MAX_TOKENS: u32 = 600;

pub const SUMMARY_SYSTEM_PROMPT: &str = concat!(
    "You are an energetic but concise festival & events planner. ",
    "Given a city, date range, keyword, and a list of events, produce a short, helpful plan. ",
    "Always output with these sections in this order: ",
    "1) Top Picks — 2–3 bullets with event name, date, and a why-it’s-cool note. ",
    "2) Suggested Itinerary — a compact day or weekend flow (Morning / Afternoon / Evening). ",
    "3) Pro Tips — 1–2 short tips (tickets, transit, budget). ",
    "Keep under 180 words. Prefer concrete details over fluff. Use simple emojis sparingly. ",
    "Adapt to tone if provided: Fun (party vibe), Family (kid-friendly), Cultural (museums, heritage), Budget (low-cost, free)."
);

pub const PLAN_SYSTEM_PROMPT: &str = concat!(
    "You are a meticulous, concise travel-planning assistant.\n",
    "Return output as **GitHub-flavored Markdown** (no code fences).\n",
    "Follow this structure EXACTLY:\n",
    "# Day-by-Day Plan\n",
    "For each day, print a level-3 heading: \n",
    "### 📅 {YYYY-MM-DD} — {City}\n",
    "Then three subsections:\n",
    "#### Morning\n- one-line bullets (use emojis like 🚶‍♂️ 🚌 🎟️ 🍽️ 🕒 💡) with a price bracket (€, €€, €€€ or free)\n",
    "#### Afternoon\n- one-line bullets (same rules)\n",
    "#### Evening\n- one-line bullets (same rules)\n",
    "After the last day include:\n",
    "## 🎯 Top Picks\n- 3–5 best items with 1-line reasons\n",
    "## 🧭 Pro Tips\n- 3–6 bullets on transport/booking/timing/weather\n",
    "Rules: Respect given dates; if dates are missing, cluster sensibly by location; avoid overlaps; ",
    "mark uncertain info as (approx). Keep **max 5 bullets per day** total. Keep lines short."
);

pub const SECTION_SYSTEM_PROMPT: &str = concat!(
    "You are a concise travel planner.\n",
    "Return **GitHub-flavored Markdown** only (no code fences).\n",
    "Preserve the first heading line exactly if present (e.g., \"### 📅 2025-09-26 — Berlin\").\n",
    "Use short, single-line bullets with emojis (🚶‍♂️ 🚌 🎟️ 🍽️ 🕒 💡) and price brackets (€, €€, €€€, free).\n",
    "Avoid overlaps; mark uncertain info as (approx).\n"
);

const PLAN_NOTES: &str =
    "Prefer walking/transit; keep hops ≤30 minutes when possible; include links if provided.";

/// One line per event, at most [`DIGEST_LIMIT`] lines.
pub fn build_digest(events: &[DigestEvent]) -> String {
    events
        .iter()
        .take(DIGEST_LIMIT)
        .map(digest_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn digest_line(e: &DigestEvent) -> String {
    let provider = e
        .provider
        .as_deref()
        .map(|p| format!(" · {p}"))
        .unwrap_or_default();
    let price = e
        .price
        .as_ref()
        .map(|p| p.label())
        .filter(|l| !l.is_empty())
        .map(|l| format!(" — {l}"))
        .unwrap_or_default();
    format!(
        "{} — {} — {}{}{}",
        e.name,
        e.date.as_deref().unwrap_or("Unknown date"),
        e.location(),
        provider,
        price
    )
}

/// User turn for the short summary: context lines, then the digest.
pub fn build_summary_user_message(digest: &str, ctx: &UserContext) -> String {
    let mut lines = Vec::new();
    if let Some(city) = &ctx.city {
        lines.push(format!("City: {city}"));
    }
    if let Some(keyword) = &ctx.keyword {
        lines.push(format!("Keyword: {keyword}"));
    }
    if ctx.start_date.is_some() || ctx.end_date.is_some() {
        lines.push(format!(
            "Dates: {} to {}",
            ctx.start_date.as_deref().unwrap_or("?"),
            ctx.end_date.as_deref().unwrap_or("?")
        ));
    }
    if let Some(tone) = &ctx.tone {
        lines.push(format!("Tone: {tone}"));
    }
    lines.push(format!("\nEvents:\n{digest}"));
    lines.join("\n")
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DateWindow<'a> {
    start_date: &'a str,
    end_date: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanPayload<'a> {
    city: &'a str,
    date_window: DateWindow<'a>,
    tone: &'a str,
    items: &'a [CompactEvent],
    notes: &'a str,
}

/// Pretty-printed JSON user turn for the day-by-day planner.
pub fn build_plan_user_message(items: &[CompactEvent], ctx: &UserContext) -> serde_json::Result<String> {
    let payload = PlanPayload {
        city: ctx.city.as_deref().unwrap_or(""),
        date_window: DateWindow {
            start_date: ctx.start_date.as_deref().unwrap_or(""),
            end_date: ctx.end_date.as_deref().unwrap_or(""),
        },
        tone: ctx.tone.as_deref().unwrap_or("Default"),
        items: &items[..items.len().min(PLAN_ITEM_LIMIT)],
        notes: PLAN_NOTES,
    };
    serde_json::to_string_pretty(&payload)
}

/// What to do with one day of an existing plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionAction {
    Shorten,
    Expand,
    Regenerate,
}

impl SectionAction {
    /// Unknown or missing actions regenerate.
    pub fn parse(action: Option<&str>) -> Self {
        match action.map(|a| a.trim().to_ascii_lowercase()).as_deref() {
            Some("shorten") => SectionAction::Shorten,
            Some("expand") => SectionAction::Expand,
            _ => SectionAction::Regenerate,
        }
    }

    fn instruction(self) -> &'static str {
        match self {
            SectionAction::Shorten => {
                "Shorten this itinerary day to 2–3 concise one-line bullets. Keep original date/city heading."
            }
            SectionAction::Expand => {
                "Expand this itinerary day with 2–3 extra relevant bullets (venues, food, logistics). Keep concise one-liners."
            }
            SectionAction::Regenerate => {
                "Regenerate this itinerary day with fresh, realistic suggestions. Keep format and heading."
            }
        }
    }
}

pub fn build_section_user_message(action: SectionAction, text: &str) -> String {
    format!("{}\n\n---\n{}\n---", action.instruction(), text)
}
