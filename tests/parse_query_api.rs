use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{Body, HttpBody};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use matjip_query_backend::config::DEFAULT_AI_MODEL;
use matjip_query_backend::controller::{router_endpoints, AppState};
use matjip_query_backend::error::{QueryError, Result};
use matjip_query_backend::language_backend::{ChatMessage, LanguageBackend};
use matjip_query_backend::providers::{
    CoordinateSystem, PlaceSearchProvider, ProviderPage, ProviderQuery, RawPlace,
};
use matjip_query_backend::services::keyword_refiner::KeywordPolicy;
use serde_json::{json, Value};
use tower::ServiceExt;

struct StubBackend {
    reply: Option<Value>,
    calls: AtomicUsize,
}

#[async_trait]
impl LanguageBackend for StubBackend {
    async fn run(&self, _model: &str, _messages: &[ChatMessage]) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().ok_or(QueryError::Backend {
            message: "backend unavailable".to_string(),
        })
    }
}

struct StubProvider {
    page: Option<ProviderPage>,
    seen: Mutex<Vec<ProviderQuery>>,
}

#[async_trait]
impl PlaceSearchProvider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn max_page_size(&self) -> u32 {
        15
    }

    fn coordinate_system(&self) -> CoordinateSystem {
        CoordinateSystem::Wgs84
    }

    async fn search(&self, query: &ProviderQuery) -> Result<ProviderPage> {
        self.seen.lock().unwrap().push(query.clone());
        self.page.clone().ok_or(QueryError::ProviderError {
            provider: "stub",
            status: 503,
            message: Some("maintenance".to_string()),
        })
    }
}

struct Harness {
    router: Router,
    backend: Arc<StubBackend>,
    provider: Arc<StubProvider>,
}

fn harness(reply: Option<Value>, page: Option<ProviderPage>) -> Harness {
    let backend = Arc::new(StubBackend {
        reply,
        calls: AtomicUsize::new(0),
    });
    let provider = Arc::new(StubProvider {
        page,
        seen: Mutex::new(Vec::new()),
    });

    let app_state = AppState {
        language_backend: backend.clone(),
        place_provider: provider.clone(),
        keyword_policy: KeywordPolicy::default(),
        ai_model: DEFAULT_AI_MODEL.to_string(),
        page_size: 15,
    };

    Harness {
        router: router_endpoints(app_state),
        backend,
        provider,
    }
}

fn backend_reply(text: &str) -> Option<Value> {
    Some(json!({ "response": text }))
}

fn place(name: &str, x: &str, y: &str) -> RawPlace {
    RawPlace {
        name: name.to_string(),
        x: Some(x.to_string()),
        y: Some(y.to_string()),
        road_address: Some("서울 강남구 강남대로 396".to_string()),
        address: Some("서울 강남구 역삼동 858".to_string()),
        phone: Some("02-123-4567".to_string()),
        category: Some("음식점 > 양식 > 이탈리안".to_string()),
    }
}

fn results_page(records: Vec<RawPlace>, total: Option<u64>, is_end: bool) -> Option<ProviderPage> {
    Some(ProviderPage {
        records: Some(records),
        total_count: total,
        is_end,
    })
}

async fn post(router: &Router, body: &str) -> Response {
    router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/parse-query")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn read_json(response: Response) -> Value {
    let mut body = response.into_body();
    let mut bytes = Vec::new();
    while let Some(chunk) = body.data().await {
        bytes.extend_from_slice(&chunk.unwrap());
    }
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_gangnam_pasta_query_end_to_end() {
    let h = harness(
        backend_reply(
            "```json\n{\"location\": {\"name\": \"강남역\", \"latitude\": 37.498, \"longitude\": 127.028}, \
             \"cuisine\": \"파스타\", \"keywords\": [\"데이트\", \"파스타집\", \"좋은\"]}\n```",
        ),
        results_page(
            vec![
                place("파스타 하우스", "127.02762149", "37.4979421234"),
                place("좌표 깨짐", "", "37.49"),
            ],
            Some(45),
            false,
        ),
    );

    let response = post(&h.router, r#"{"query": "강남역 데이트하기 좋은 파스타집"}"#).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["lat"], 37.497942);
    assert_eq!(body["items"][0]["lng"], 127.027621);
    assert_eq!(body["items"][0]["phone"], "02-123-4567");
    assert_eq!(body["total"], 45);
    assert_eq!(body["hasMore"], true);
    assert_eq!(body["page"], 1);

    let seen = h.provider.seen.lock().unwrap();
    assert_eq!(seen[0].query, "강남역 데이트 파스타집 맛집");
    let center = seen[0].center.unwrap();
    assert_eq!(center.latitude, 37.498);
    assert_eq!(center.longitude, 127.028);
}

#[tokio::test]
async fn test_empty_query_with_coordinates_skips_extraction() {
    let h = harness(None, results_page(vec![place("근처 식당", "126.978", "37.5665")], Some(1), true));

    let response = post(&h.router, r#"{"query": "  ", "currentLatitude": "37.5665", "currentLongitude": 126.978, "page": "3"}"#).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["page"], 3);
    assert_eq!(body["hasMore"], false);
    assert_eq!(h.backend.calls.load(Ordering::SeqCst), 0);

    let seen = h.provider.seen.lock().unwrap();
    assert_eq!(seen[0].query, "맛집");
    assert_eq!(seen[0].page, 3);
    let center = seen[0].center.unwrap();
    assert_eq!(center.latitude, 37.5665);
    assert_eq!(center.longitude, 126.978);
}

#[tokio::test]
async fn test_missing_query_and_coordinates_is_bad_request() {
    let h = harness(None, None);

    let response = post(&h.router, r#"{"currentLat": "somewhere"}"#).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(read_json(response).await["error"].as_str().unwrap().contains("query"));
}

#[tokio::test]
async fn test_unparseable_body_is_bad_request() {
    let h = harness(None, None);

    let response = post(&h.router, "{\"query\": ").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(h.provider.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_no_location_and_no_coordinates_is_unprocessable() {
    let h = harness(
        backend_reply("{\"location\": null, \"cuisine\": null, \"keywords\": [\"이자카야\"]}"),
        results_page(vec![], None, true),
    );

    let response = post(&h.router, r#"{"query": "조용한 이자카야"}"#).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(h.provider.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_uncertain_location_falls_back_to_caller_position() {
    let h = harness(
        backend_reply("{\"location\": {\"name\": \"회사 근처\", \"latitude\": null}, \"keywords\": [\"칼국수\"]}"),
        results_page(vec![], Some(0), true),
    );

    let response = post(&h.router, r#"{"query": "회사 근처 칼국수", "currentLat": 37.51, "currentLng": 127.1}"#).await;
    assert_eq!(response.status(), StatusCode::OK);

    let seen = h.provider.seen.lock().unwrap();
    assert_eq!(seen[0].query, "회사 근처 칼국수 맛집");
    assert_eq!(seen[0].center.unwrap().latitude, 37.51);
}

#[tokio::test]
async fn test_provider_failure_degrades_to_empty_page() {
    let h = harness(
        backend_reply("{\"location\": {\"name\": \"성수\", \"latitude\": 37.544581, \"longitude\": 127.055961}, \"keywords\": [\"브런치\"]}"),
        None,
    );

    let response = post(&h.router, r#"{"query": "성수 브런치", "page": 2}"#).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json(response).await,
        json!({ "items": [], "hasMore": false, "total": 0, "page": 2 })
    );
}

#[tokio::test]
async fn test_malformed_provider_payload_yields_empty_page() {
    let h = harness(
        None,
        Some(ProviderPage {
            records: None,
            total_count: Some(10),
            is_end: false,
        }),
    );

    let response = post(&h.router, r#"{"currentLat": 37.5, "currentLng": 127.0, "page": 4}"#).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json(response).await,
        json!({ "items": [], "hasMore": false, "total": 0, "page": 4 })
    );
}

#[tokio::test]
async fn test_later_page_is_issued_even_when_empty() {
    let h = harness(None, results_page(vec![], Some(15), true));

    let response = post(&h.router, r#"{"currentLat": 37.5, "currentLng": 127.0, "page": 2}"#).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["total"], 15);
    assert_eq!(body["page"], 2);
    assert_eq!(h.provider.seen.lock().unwrap()[0].page, 2);
}

#[tokio::test]
async fn test_empty_backend_reply_is_internal_error() {
    let h = harness(backend_reply(""), results_page(vec![], None, true));

    let response = post(&h.router, r#"{"query": "국밥 맛있는 곳"}"#).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(read_json(response).await["error"], "AI 응답이 비어 있습니다.");
}

#[tokio::test]
async fn test_reply_without_keywords_is_internal_error() {
    let h = harness(
        backend_reply("{\"location\": {\"name\": \"홍대\", \"latitude\": 37.55, \"longitude\": 126.92}, \"keywords\": []}"),
        results_page(vec![], None, true),
    );

    let response = post(&h.router, r#"{"query": "홍대"}"#).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_health_and_unknown_routes() {
    let h = harness(None, None);

    let health = h
        .router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);

    let missing = h
        .router
        .clone()
        .oneshot(Request::builder().uri("/api/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_made_up_location_is_replaced_by_known_place() {
    let h = harness(
        backend_reply(
            "{\"location\": {\"name\": \"부산\", \"latitude\": 35.179554, \"longitude\": 129.075642}, \
             \"cuisine\": null, \"keywords\": [\"이자카야\"]}",
        ),
        results_page(vec![], Some(0), true),
    );

    let response = post(&h.router, r#"{"query": "홍대 술집"}"#).await;
    assert_eq!(response.status(), StatusCode::OK);

    let seen = h.provider.seen.lock().unwrap();
    assert_eq!(seen[0].query, "이자카야 맛집");
    let center = seen[0].center.unwrap();
    assert_eq!(center.latitude, 37.556318);
    assert_eq!(center.longitude, 126.922651);
}
