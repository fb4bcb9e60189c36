//! Coaching tips from today's macro state.
//!
//! Advisory only: every failure collapses to `None` and the caller decides
//! whether to hide the coach or show a static line.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::aggregation::types::CoachInputs;
use crate::ai::{strip_code_fence, ChatMessage, CompletionRequest, TextGenerator};

pub const MAX_TIPS: usize = 5;

const SYSTEM_PROMPT: &str = "\
You are a short, friendly fitness coach. \
Reply with ONLY a JSON array of 3 to 5 strings, no other text. \
Each string is an encouragement or suggestion of at most 15 words. \
Refer only to the numbers you are given (today's intake, targets, remaining). \
Suggest food only in generic terms and never invent facts about what the user ate. \
Example: [\"Add a lean protein source to close your protein gap\", \
\"Great job staying under your calorie target\"]";

#[derive(Clone, Default)]
pub struct CoachAdapter {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl CoachAdapter {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    #[cfg(test)]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// The first tip, if any could be produced.
    pub async fn request_coaching_tip(&self, inputs: &CoachInputs) -> Option<String> {
        self.request_tips(inputs).await?.into_iter().next()
    }

    pub async fn request_tips(&self, inputs: &CoachInputs) -> Option<Vec<String>> {
        let Some(generator) = self.generator.as_ref() else {
            debug!("coach disabled: no text generator configured");
            return None;
        };
        let raw = match generator.complete(build_request(inputs)).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "coach request failed");
                return None;
            }
        };
        let tips = normalize_tips(&raw);
        if tips.is_none() {
            warn!(reply = %raw.chars().take(200).collect::<String>(), "coach reply not usable");
        }
        tips
    }
}

pub fn build_request(inputs: &CoachInputs) -> CompletionRequest {
    let payload = json!({
        "profile": {
            "weight": inputs.profile.weight,
            "targetWeight": inputs.profile.target_weight,
        },
        "today": inputs.totals,
        "targets": inputs.targets,
        "remaining": inputs.remaining,
    });
    CompletionRequest::new(vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(payload.to_string()),
    ])
    .temperature(0.7)
    .max_tokens(300)
}

/// Accepts `[..]`, `{"tips": [..]}` and `{"suggestion": ".."}`; anything else
/// (including an empty list or a blank entry) is rejected.
pub fn normalize_tips(raw: &str) -> Option<Vec<String>> {
    let value: Value = serde_json::from_str(strip_code_fence(raw)).ok()?;
    let tips = match value {
        Value::Array(items) => strings(items)?,
        Value::Object(mut obj) => match (obj.remove("tips"), obj.remove("suggestion")) {
            (Some(Value::Array(items)), _) => strings(items)?,
            (None, Some(Value::String(s))) => vec![non_blank(s)?],
            _ => return None,
        },
        _ => return None,
    };
    if tips.is_empty() {
        return None;
    }
    Some(tips.into_iter().take(MAX_TIPS).collect())
}

fn strings(items: Vec<Value>) -> Option<Vec<String>> {
    items
        .into_iter()
        .map(|v| match v {
            Value::String(s) => non_blank(s),
            _ => None,
        })
        .collect()
}

fn non_blank(s: String) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}
