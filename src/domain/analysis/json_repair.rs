//! Textual repair of generator JSON output.
//!
//! Generated JSON nominally follows the requested schema but shows a few
//! recurring defects. Each repair step runs only when its defect pattern is
//! present, so well-formed output passes through byte-for-byte.
//!
//! # Steps
//! 1. Strip a code fence (with optional language tag). When prose precedes
//!    the JSON, the first fenced block is taken, else the first balanced
//!    object
//! 2. `} word {` between array elements becomes `}, {`
//! 3. `} word,` becomes `},`
//! 4. A bare `"High"|"Medium"|"Low"` after a `"timeline"` field gets the
//!    missing `"priorityLevel"` key

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use thiserror::Error;

use crate::domain::foundation::truncate_with_ellipsis;

/// Raw text kept on a parse error is cut to this many characters in messages.
const RAW_PREVIEW_CHARS: usize = 500;

static FENCED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\A\s*```[A-Za-z0-9_+-]*[ \t]*\r?\n?(.*?)\s*```\s*\z")
        .expect("Valid code fence regex")
});

static EMBEDDED_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_+-]*[ \t]*\r?\n(.*?)\s*```").expect("Valid embedded fence regex")
});

static STRAY_WORD_BETWEEN_OBJECTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\}\s*[A-Za-z_][A-Za-z0-9_]*(?P<ws>\s*)\{")
        .expect("Valid stray word between objects regex")
});

static STRAY_WORD_BEFORE_COMMA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\}\s*[A-Za-z_][A-Za-z0-9_]*\s*,").expect("Valid stray word before comma regex")
});

static MISSING_PRIORITY_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?P<timeline>"timeline"\s*:\s*"(?:[^"\\]|\\.)*")\s*,?\s*"(?P<level>High|Medium|Low)"(?P<tail>\s*[,}\]])"#,
    )
    .expect("Valid missing priority key regex")
});

/// A repair step that changed the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairStep {
    StripCodeFence,
    ExtractEmbeddedObject,
    StrayWordBetweenObjects,
    StrayWordBeforeComma,
    MissingPriorityKey,
}

/// Repaired text plus the steps that fired, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairReport {
    pub text: String,
    pub applied: Vec<RepairStep>,
}

/// Output still invalid after every repair step.
///
/// Fatal for the run. `raw` is the text as the generator returned it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Generator output is not valid JSON after repair: {message}")]
pub struct RepairError {
    pub message: String,
    pub raw: String,
}

impl RepairError {
    /// The raw text cut down for logging.
    pub fn raw_preview(&self) -> String {
        truncate_with_ellipsis(&self.raw, RAW_PREVIEW_CHARS)
    }
}

/// Applies every repair step whose defect is present.
pub fn repair(raw: &str) -> String {
    repair_with_report(raw).text
}

/// Like [`repair`] but also reports which steps changed the text.
pub fn repair_with_report(raw: &str) -> RepairReport {
    let mut applied = Vec::new();
    let mut text = Cow::Borrowed(raw);

    if let Some(inner) = FENCED.captures(&text).and_then(|c| c.get(1)) {
        text = Cow::Owned(inner.as_str().to_string());
        applied.push(RepairStep::StripCodeFence);
    } else if !starts_like_json(&text) {
        if let Some(inner) = EMBEDDED_FENCE.captures(&text).and_then(|c| c.get(1)) {
            text = Cow::Owned(inner.as_str().to_string());
            applied.push(RepairStep::StripCodeFence);
        } else if let Some(object) = embedded_object(&text) {
            text = Cow::Owned(object.to_string());
            applied.push(RepairStep::ExtractEmbeddedObject);
        }
    }

    if let Some(fixed) = replace_outside_strings(&text, &STRAY_WORD_BETWEEN_OBJECTS, "},${ws}{") {
        text = Cow::Owned(fixed);
        applied.push(RepairStep::StrayWordBetweenObjects);
    }

    if let Some(fixed) = replace_outside_strings(&text, &STRAY_WORD_BEFORE_COMMA, "},") {
        text = Cow::Owned(fixed);
        applied.push(RepairStep::StrayWordBeforeComma);
    }

    if MISSING_PRIORITY_KEY.is_match(&text) {
        let fixed = MISSING_PRIORITY_KEY
            .replace_all(&text, r#"${timeline}, "priorityLevel": "${level}"${tail}"#)
            .into_owned();
        text = Cow::Owned(fixed);
        applied.push(RepairStep::MissingPriorityKey);
    }

    RepairReport {
        text: text.into_owned(),
        applied,
    }
}

/// Repairs `raw` then parses it strictly into `T`.
pub fn parse_repaired<T: DeserializeOwned>(raw: &str) -> Result<T, RepairError> {
    let repaired = repair(raw);
    serde_json::from_str(&repaired).map_err(|e| RepairError {
        message: e.to_string(),
        raw: raw.to_string(),
    })
}

fn starts_like_json(text: &str) -> bool {
    matches!(text.trim_start().chars().next(), Some('{') | Some('['))
}

/// The first balanced `{...}` in `text`, ignoring braces inside strings.
fn embedded_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + idx + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Runs `pattern` over the parts of `text` that lie outside JSON string
/// literals. Returns `None` when nothing matched.
fn replace_outside_strings(text: &str, pattern: &Regex, replacement: &str) -> Option<String> {
    if !pattern.is_match(text) {
        return None;
    }

    let mut out = String::with_capacity(text.len());
    let mut changed = false;

    for (segment, in_string) in split_string_literals(text) {
        if in_string {
            out.push_str(segment);
            continue;
        }
        match pattern.replace_all(segment, replacement) {
            Cow::Borrowed(s) => out.push_str(s),
            Cow::Owned(s) => {
                changed = true;
                out.push_str(&s);
            }
        }
    }

    changed.then_some(out)
}

/// Splits text into alternating runs outside and inside `"..."` literals.
/// Quotes belong to the string run. Escapes inside strings are honoured.
fn split_string_literals(text: &str) -> Vec<(&str, bool)> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                let end = idx + ch.len_utf8();
                segments.push((&text[start..end], true));
                start = end;
                in_string = false;
            }
        } else if ch == '"' {
            if start < idx {
                segments.push((&text[start..idx], false));
            }
            start = idx;
            in_string = true;
        }
    }

    if start < text.len() {
        segments.push((&text[start..], in_string));
    }
    segments
}
