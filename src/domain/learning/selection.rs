//! Narrowing learnings for a chat turn or an analysis prompt.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use super::extractor::{extract_all, learning_tag};
use crate::domain::analysis::SavedAnalysis;

pub const DEFAULT_MAX_CHAT_LEARNINGS: usize = 10;
pub const DEFAULT_MAX_PROMPT_LEARNINGS: usize = 7;

static SECTION_FRAGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"regarding '(.*?)'").expect("Valid section fragment regex"));

/// Marks the end of the learning header; the payload follows it.
const PAYLOAD_MARKER: &str = "...): ";

/// The quoted document section a learning refers to.
pub fn section_fragment(learning: &str) -> Option<&str> {
    SECTION_FRAGMENT
        .captures(learning)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Learnings for a chat turn.
///
/// Without an active analysis the general set is returned unchanged.
/// Otherwise learnings from the active analysis come first, topped up from
/// `general` and capped at `max_total`.
pub fn select_for_chat(
    general: &[String],
    active: Option<&SavedAnalysis>,
    all_analyses: &[SavedAnalysis],
    max_total: usize,
) -> Vec<String> {
    let Some(active) = active else {
        return general.to_vec();
    };

    let tag = learning_tag(active);
    let mut selected: Vec<String> = extract_all(all_analyses, None)
        .into_iter()
        .filter(|l| l.contains(&tag))
        .collect();

    for learning in general {
        if selected.len() >= max_total {
            break;
        }
        if !selected.contains(learning) {
            selected.push(learning.clone());
        }
    }

    selected.truncate(max_total);
    selected
}

/// Learnings whose section relates to one of the target documents.
///
/// A learning matches when its section fragment and a target name contain
/// one another, ignoring case. Learnings with the same fragment and payload
/// collapse to the first one seen.
pub fn select_for_prompt<S: AsRef<str>>(
    all: &[String],
    target_names: &[S],
    max_count: usize,
) -> Vec<String> {
    let targets: Vec<String> = target_names
        .iter()
        .map(|n| n.as_ref().trim().to_lowercase())
        .filter(|n| !n.is_empty())
        .collect();

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut selected = Vec::new();

    for learning in all {
        if selected.len() >= max_count {
            break;
        }
        let Some(fragment) = section_fragment(learning).filter(|f| !f.trim().is_empty()) else {
            continue;
        };
        let fragment_lower = fragment.to_lowercase();
        let relevant = targets
            .iter()
            .any(|name| name.contains(&fragment_lower) || fragment_lower.contains(name.as_str()));
        if !relevant {
            continue;
        }

        let payload = learning
            .split_once(PAYLOAD_MARKER)
            .map(|(_, rest)| rest)
            .unwrap_or(learning);
        if seen.insert((fragment.to_string(), payload.to_string())) {
            selected.push(learning.clone());
        }
    }
    selected
}
