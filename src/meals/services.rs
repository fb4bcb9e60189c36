//! Free-text meal descriptions to per-item nutrition, via the text generator.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::ai::cache::{cache_key, ResponseCache};
use crate::ai::{strip_code_fence, AiError, ChatMessage, CompletionRequest, TextGenerator};

const MAX_NAME_CHARS: usize = 120;

const SYSTEM_PROMPT: &str = "\
You convert messy meal text into structured nutrition JSON. \
Extract ONLY actual food items with quantities and units. \
Never repeat the original sentence. \
Drop verbs and filler words such as 'I', 'ate', 'had', 'with', 'my', 'today'. \
Keep exact amounts when given. \
Without an amount, whole fruits default to 1 piece and cooked foods to 100 g or 1 cup. \
A fruit count such as '3 bananas' means quantity 3 with unit 'piece'. \
Split foods on commas or 'and' \
but keep attached descriptors such as 'mashed potatoes with gravy' together. \
Calories are whole numbers; protein, carbs and fats have at most 2 decimals. \
Use realistic values. \
Reply with ONLY a JSON object \
{\"items\": [{\"mealName\", \"quantity\", \"unit\", \"calories\", \"protein\", \"carbs\", \"fats\"}], \
\"notes\": \"\"}.";

#[derive(Debug, thiserror::Error)]
pub enum NutritionError {
    #[error("nutrition lookup is not configured")]
    Disabled,
    #[error(transparent)]
    Ai(#[from] AiError),
    #[error("unusable nutrition reply: {0}")]
    Malformed(String),
}

/// One parsed food item, as returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionItem {
    pub meal_name: String,
    pub quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

#[derive(Deserialize)]
struct RawReply {
    #[serde(default)]
    items: Vec<RawItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    #[serde(default)]
    meal_name: Option<String>,
    #[serde(default)]
    quantity: Value,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    calories: Value,
    #[serde(default)]
    protein: Value,
    #[serde(default)]
    carbs: Value,
    #[serde(default)]
    fats: Value,
}

fn number(v: &Value) -> f64 {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite()).unwrap_or(0.0)
}

fn two_decimals(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

impl From<RawItem> for NutritionItem {
    fn from(raw: RawItem) -> Self {
        let quantity = match raw.quantity {
            Value::Null => 1,
            ref q => (number(q).round() as i64).max(1),
        };
        Self {
            meal_name: raw
                .meal_name
                .unwrap_or_default()
                .chars()
                .take(MAX_NAME_CHARS)
                .collect(),
            quantity,
            unit: raw.unit.filter(|u| !u.trim().is_empty()),
            calories: number(&raw.calories).round(),
            protein: two_decimals(number(&raw.protein)),
            carbs: two_decimals(number(&raw.carbs)),
            fats: two_decimals(number(&raw.fats)),
        }
    }
}

/// Parses the model reply into normalized items.
pub fn parse_items(raw: &str) -> Result<Vec<NutritionItem>, NutritionError> {
    let reply: RawReply = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| NutritionError::Malformed(e.to_string()))?;
    Ok(reply.items.into_iter().map(NutritionItem::from).collect())
}

#[derive(Clone)]
pub struct NutritionParser {
    generator: Option<Arc<dyn TextGenerator>>,
    cache: Arc<dyn ResponseCache>,
}

impl NutritionParser {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, cache: Arc<dyn ResponseCache>) -> Self {
        Self { generator, cache }
    }

    pub async fn parse(&self, query: &str) -> Result<Vec<NutritionItem>, NutritionError> {
        let clean = query.trim().to_lowercase();
        let key = cache_key("nutri", &clean);
        if let Some(hit) = self.cache.get(&key).await {
            if let Ok(items) = serde_json::from_str::<Vec<NutritionItem>>(&hit) {
                debug!(%key, "nutrition cache hit");
                return Ok(items);
            }
        }

        let generator = self.generator.as_ref().ok_or(NutritionError::Disabled)?;
        let raw = generator.complete(build_request(query.trim())).await?;
        let items = parse_items(&raw).inspect_err(|e| {
            let reply: String = raw.chars().take(200).collect();
            warn!(error = %e, %reply, "nutrition reply not usable");
        })?;

        if let Ok(encoded) = serde_json::to_string(&items) {
            self.cache.put(key, encoded).await;
        }
        Ok(items)
    }
}

fn build_request(query: &str) -> CompletionRequest {
    let shot_one = json!({
        "items": [
            { "mealName": "mashed potato with gravy", "quantity": 1, "unit": "cup",
              "calories": 210, "protein": 4, "carbs": 36, "fats": 7 },
            { "mealName": "boiled egg", "quantity": 2, "unit": "egg",
              "calories": 140, "protein": 12, "carbs": 2, "fats": 10 }
        ],
        "notes": "Default 1 cup mashed potatoes; per-egg values x2."
    });
    let shot_two = json!({
        "items": [
            { "mealName": "rice", "quantity": 250, "unit": "g",
              "calories": 325, "protein": 6, "carbs": 72, "fats": 1 },
            { "mealName": "banana", "quantity": 1, "unit": "piece",
              "calories": 105, "protein": 1.3, "carbs": 27, "fats": 0.3 }
        ],
        "notes": ""
    });
    CompletionRequest::new(vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user("i ate mashed potato with gravy and two boiled eggs"),
        ChatMessage::assistant(shot_one.to_string()),
        ChatMessage::user("250 g rice and a banana"),
        ChatMessage::assistant(shot_two.to_string()),
        ChatMessage::user(format!("Parse this into separate food items: \"{query}\"")),
    ])
    .temperature(0.1)
    .max_tokens(900)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::cache::MemoryCache;
    use crate::ai::testing::ScriptedGenerator;

    const REPLY: &str = r#"```json
{"items":[{"mealName":"oatmeal","quantity":1.4,"unit":"cup","calories":"150.6","protein":5.456,"carbs":27,"fats":2.5}],"notes":""}
```"#;

    fn parser(gen: Arc<ScriptedGenerator>) -> NutritionParser {
        NutritionParser::new(
            Some(gen as Arc<dyn TextGenerator>),
            Arc::new(MemoryCache::default()),
        )
    }

    #[test]
    fn items_are_rounded_and_clamped() {
        let items = parse_items(REPLY).unwrap();
        assert_eq!(
            items,
            vec![NutritionItem {
                meal_name: "oatmeal".into(),
                quantity: 1,
                unit: Some("cup".into()),
                calories: 151.0,
                protein: 5.46,
                carbs: 27.0,
                fats: 2.5,
            }]
        );
    }

    #[test]
    fn missing_values_default() {
        let long = "x".repeat(300);
        let raw = format!(r#"{{"items":[{{"mealName":"{long}","quantity":0}}]}}"#);
        let item = &parse_items(&raw).unwrap()[0];
        assert_eq!(item.meal_name.chars().count(), MAX_NAME_CHARS);
        assert_eq!(item.quantity, 1);
        assert_eq!(item.calories, 0.0);
        assert_eq!(item.unit, None);
    }

    #[test]
    fn prose_is_malformed() {
        assert!(matches!(
            parse_items("Here you go!"),
            Err(NutritionError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn equivalent_queries_hit_the_cache() {
        let gen = Arc::new(ScriptedGenerator::replying(REPLY));
        let parser = parser(gen.clone());
        let first = parser.parse("Oatmeal ").await.unwrap();
        let second = parser.parse("  oatmeal").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(gen.calls(), 1);
    }

    #[tokio::test]
    async fn request_ends_with_the_query() {
        let gen = Arc::new(ScriptedGenerator::replying(REPLY));
        parser(gen.clone()).parse("2 eggs").await.unwrap();
        let seen = gen.seen.lock().unwrap();
        let last = seen[0].messages.last().unwrap();
        assert!(last.content.contains("\"2 eggs\""));
        assert_eq!(seen[0].temperature, Some(0.1));
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let gen = Arc::new(ScriptedGenerator::sequence(vec![
            Err(500),
            Ok(REPLY.to_string()),
        ]));
        let parser = parser(gen.clone());
        assert!(matches!(parser.parse("oats").await, Err(NutritionError::Ai(_))));
        assert!(parser.parse("oats").await.is_ok());
        assert_eq!(gen.calls(), 2);
    }

    #[tokio::test]
    async fn without_generator_is_disabled() {
        let parser = NutritionParser::new(None, Arc::new(MemoryCache::default()));
        assert!(matches!(parser.parse("oats").await, Err(NutritionError::Disabled)));
    }
}
