use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::error::{QueryError, Result};
use crate::language_backend::{ChatMessage, LanguageBackend};
use crate::models::intent::Intent;
use crate::services::gazetteer::{self, GazetteerEntry};
use crate::services::validator::validate_intent;

const SYSTEM_INSTRUCTION: &str = "당신은 맛집 검색을 돕는 어시스턴트입니다. \
사용자가 입력한 자연어 문장에서 위치 정보(좌표 포함)와 선호하는 음식 종류를 추출하고, \
검색에 쓸 주요 키워드 배열을 만들어 JSON으로만 답변하세요. \
위치는 대한민국 내 주요 행정구역/상권/역 이름 등을 기반으로 가장 적합한 중심 좌표를 추정해 \
위도와 경도를 소수점 6자리까지 제공하세요. \
음식 종류는 없으면 null 로 반환합니다. 키워드는 최소 1개 이상 포함하세요.";

const RESPONSE_SCHEMA: &str = r#"{
  "location": {
    "name": "<사용자가 언급한 장소 이름>",
    "latitude": <위도 (number)>,
    "longitude": <경도 (number)>
  },
  "cuisine": "<선호 음식 종류>" // 없으면 null,
  "keywords": ["<검색 키워드>", "..."] // 최소 1개 이상
}"#;

pub fn build_prompt(query: &str, known_place: Option<&GazetteerEntry>) -> Vec<ChatMessage> {
    let mut user = format!(
        "입력: \"\"\"{}\"\"\"\n\n다음 형식을 지켜 JSON 문자열만 반환하세요:\n{}",
        query, RESPONSE_SCHEMA
    );
    if let Some(entry) = known_place {
        user.push_str("\n\n");
        user.push_str(&gazetteer::coordinate_hint(entry));
    }

    vec![ChatMessage::system(SYSTEM_INSTRUCTION), ChatMessage::user(user)]
}

/// Removes markdown fence markers (and the language tag after an opening
/// fence) while keeping whatever shares a line with them.
fn strip_code_fences(text: &str) -> String {
    text.split("```")
        .enumerate()
        .map(|(index, segment)| {
            if index % 2 == 1 {
                segment.trim_start_matches(|c: char| c.is_ascii_alphanumeric())
            } else {
                segment
            }
        })
        .collect()
}

/// Slices the first balanced `{...}` region, ignoring braces inside JSON strings.
fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parses the backend reply's text field as JSON after stripping fences and prose.
pub fn parse_reply(reply: &Value) -> Result<Value> {
    let field = reply
        .get("response")
        .filter(|value| !value.is_null())
        .or_else(|| reply.get("output_text"));

    let text = match field {
        Some(object @ Value::Object(_)) => return Ok(object.clone()),
        Some(Value::String(text)) => text.trim(),
        _ => "",
    };
    if text.is_empty() {
        warn!(stage = "extract", raw = %reply, "Language backend returned no text");
        return Err(QueryError::ExtractionEmpty);
    }

    let unfenced = strip_code_fences(text);
    let candidate = first_json_object(&unfenced).unwrap_or(unfenced.trim());

    serde_json::from_str(candidate).map_err(|e| {
        warn!(stage = "extract", raw = %text, error = %e, "Failed to parse backend reply");
        QueryError::ExtractionParseFailure { message: e.to_string() }
    })
}

/// Turns raw query text into a validated [`Intent`] using a language backend.
pub struct IntentExtractor {
    backend: Arc<dyn LanguageBackend>,
    model: String,
}

impl IntentExtractor {
    pub fn new(backend: Arc<dyn LanguageBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    pub async fn extract(&self, query: &str) -> Result<Intent> {
        let known_place = gazetteer::lookup(query);
        let messages = build_prompt(query, known_place);

        let reply = self.backend.run(&self.model, &messages).await?;
        let parsed = parse_reply(&reply)?;
        let mut intent = validate_intent(&parsed)?;
        intent.location = gazetteer::correct_location(intent.location.take(), known_place);

        info!(stage = "extract", %query, intent = ?intent, "Extracted search intent");
        Ok(intent)
    }
}
