use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("JSON 본문을 파싱할 수 없습니다.")]
    InvalidBody,

    #[error("query 필드는 필수이거나 현재 위치 정보가 필요합니다.")]
    MissingInput,

    #[error("검색 위치를 결정할 수 없습니다. 위치를 포함해 다시 검색하거나 현재 위치 정보를 제공하세요.")]
    LocationUnresolvable,

    #[error("AI 응답이 비어 있습니다.")]
    ExtractionEmpty,

    #[error("AI 응답 JSON 파싱 실패: {message}")]
    ExtractionParseFailure { message: String },

    #[error("AI가 검색 키워드를 제공하지 않았습니다.")]
    NoKeywords,

    #[error("AI 호출 실패: {message}")]
    Backend { message: String },

    #[error("검색에 사용할 쿼리가 비어 있습니다.")]
    EmptyQuery,

    #[error("{provider} API 호출 실패 (status: {status}){}", detail_suffix(.message))]
    ProviderError {
        provider: &'static str,
        status: u16,
        message: Option<String>,
    },

    #[error("{provider} API 응답 형식이 올바르지 않습니다.")]
    ProviderMalformed { provider: &'static str },

    #[error("{provider} API 요청 실패: {source}")]
    ProviderTransport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{name}가 설정되지 않았습니다.")]
    ConfigMissing { name: &'static str },
}

fn detail_suffix(message: &Option<String>) -> String {
    match message {
        Some(message) if !message.is_empty() => format!(": {}", message),
        _ => String::new(),
    }
}

const LOCATION_TERMS: [&str; 4] = ["위치", "좌표", "location", "coordinate"];

impl QueryError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            QueryError::InvalidBody | QueryError::MissingInput => StatusCode::BAD_REQUEST,
            QueryError::LocationUnresolvable => StatusCode::UNPROCESSABLE_ENTITY,
            QueryError::ConfigMissing { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            other => {
                if mentions_location(&other.to_string()) {
                    StatusCode::UNPROCESSABLE_ENTITY
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        }
    }

    /// Search-side failures that are answered with an empty result set instead of an error.
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            QueryError::EmptyQuery
                | QueryError::ProviderError { .. }
                | QueryError::ProviderMalformed { .. }
                | QueryError::ProviderTransport { .. }
        )
    }
}

fn mentions_location(message: &str) -> bool {
    let lowered = message.to_lowercase();
    LOCATION_TERMS.iter().any(|term| lowered.contains(term))
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_shape_errors_are_bad_requests() {
        assert_eq!(QueryError::InvalidBody.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(QueryError::MissingInput.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn location_wording_maps_to_unprocessable() {
        assert_eq!(
            QueryError::LocationUnresolvable.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        let err = QueryError::Backend { message: "invalid coordinate in reply".to_string() };
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn other_extraction_failures_are_internal() {
        assert_eq!(QueryError::ExtractionEmpty.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(QueryError::NoKeywords.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            QueryError::ConfigMissing { name: "KAKAO_REST_API_KEY" }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn provider_error_message_carries_status_and_detail() {
        let err = QueryError::ProviderError {
            provider: "kakao",
            status: 401,
            message: Some("wrong appKey".to_string()),
        };
        assert_eq!(err.to_string(), "kakao API 호출 실패 (status: 401): wrong appKey");
        assert!(err.is_degradable());
        assert!(!QueryError::NoKeywords.is_degradable());
    }
}
