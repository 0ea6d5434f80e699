//! Deterministic summary built purely from the event data. No I/O; identical
//! input always renders identical text.

use crate::apis::fields::iso_date;
use crate::summarize::normalize::DigestEvent;
use crate::types::UserContext;

/// Only the head of the (already sorted) list feeds the statistics.
const SAMPLE_SIZE: usize = 10;
const MAX_HOTSPOTS: usize = 3;
const MAX_PICKS: usize = 3;
const UNKNOWN_CITY: &str = "TBA";
const TIP: &str = "Tip: narrow down by neighborhood or add a price filter (e.g., free, under €20).";

pub fn rule_based_summary(events: &[DigestEvent], ctx: &UserContext) -> String {
    if events.is_empty() {
        return no_results_message(ctx);
    }

    let sample = &events[..events.len().min(SAMPLE_SIZE)];

    // Only real calendar dates compete; free-text dates are ignored.
    let earliest = sample
        .iter()
        .filter_map(|e| e.date.as_deref())
        .filter_map(iso_date)
        .min();

    let found = match earliest {
        Some(date) => format!("Found {} events. Earliest: {}.", events.len(), date),
        None => format!("Found {} events.", events.len()),
    };

    let hotspots = hotspots(sample)
        .into_iter()
        .map(|(city, n)| format!("{city} ({n})"))
        .collect::<Vec<_>>()
        .join(", ");

    let picks = sample
        .iter()
        .take(MAX_PICKS)
        .map(|e| e.name.as_str())
        .filter(|n| !n.is_empty())
        .collect::<Vec<_>>()
        .join(" • ");

    let lines = [
        filter_echo(ctx),
        found,
        if hotspots.is_empty() { String::new() } else { format!("Hotspots: {hotspots}.") },
        if picks.is_empty() { String::new() } else { format!("Top picks: {picks}.") },
        TIP.to_string(),
    ];

    lines
        .into_iter()
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Cities by count, descending; ties keep first-appearance order.
fn hotspots(sample: &[DigestEvent]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for ev in sample {
        let city = ev
            .city
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(UNKNOWN_CITY);
        match counts.iter_mut().find(|(c, _)| c == city) {
            Some((_, n)) => *n += 1,
            None => counts.push((city.to_string(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(MAX_HOTSPOTS);
    counts
}

fn filter_echo(ctx: &UserContext) -> String {
    let mut meta = Vec::new();
    if let Some(city) = &ctx.city {
        meta.push(format!("📍 {city}"));
    }
    if let Some(keyword) = &ctx.keyword {
        meta.push(format!("🎯 {keyword}"));
    }
    if ctx.start_date.is_some() || ctx.end_date.is_some() {
        meta.push(format!(
            "🗓️ {} → {}",
            ctx.start_date.as_deref().unwrap_or("?"),
            ctx.end_date.as_deref().unwrap_or("?")
        ));
    }
    meta.join("  |  ")
}

fn no_results_message(ctx: &UserContext) -> String {
    let scope = match (&ctx.city, &ctx.keyword) {
        (Some(city), Some(keyword)) => format!("{city} · {keyword}"),
        (Some(city), None) => city.clone(),
        (None, Some(keyword)) => keyword.clone(),
        (None, None) => "your filters".to_string(),
    };
    format!("No events to summarize yet for {scope}. Try adjusting dates or keywords.")
}
