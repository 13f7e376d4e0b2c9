use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::HeaderValue;
use axum::Router;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use crate::config::{Config, SearchProviderKind};
use crate::helpers::handler_404::page_not_found_handler;
use crate::language_backend::workers_ai::WorkersAiClient;
use crate::language_backend::LanguageBackend;
use crate::providers::kakao_local::KakaoLocalProvider;
use crate::providers::naver_local::NaverLocalProvider;
use crate::providers::PlaceSearchProvider;
use crate::services::keyword_refiner::KeywordPolicy;

pub mod health_check;
pub mod parse_query_controller;

#[derive(Clone)]
pub struct AppState {
    pub language_backend: Arc<dyn LanguageBackend>,
    pub place_provider: Arc<dyn PlaceSearchProvider>,
    pub keyword_policy: KeywordPolicy,
    pub ai_model: String,
    pub page_size: u32,
}

impl AppState {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        let language_backend = Arc::new(WorkersAiClient::new(
            http.clone(),
            config.ai_base_url.clone(),
            config.cloudflare_account_id.clone(),
            config.cloudflare_api_token.clone(),
        ));

        let place_provider: Arc<dyn PlaceSearchProvider> = match config.search_provider {
            SearchProviderKind::Kakao => Arc::new(KakaoLocalProvider::new(
                http,
                config.kakao_base_url.clone(),
                config.kakao_rest_api_key.clone(),
            )),
            SearchProviderKind::Naver => Arc::new(NaverLocalProvider::new(
                http,
                config.naver_base_url.clone(),
                config.naver_client_id.clone(),
                config.naver_client_secret.clone(),
            )),
        };

        let keyword_policy = match &config.keyword_policy {
            Some(path) => KeywordPolicy::from_toml_file(path)?,
            None => KeywordPolicy::default(),
        };

        Ok(Self {
            language_backend,
            place_provider,
            keyword_policy,
            ai_model: config.ai_model.clone(),
            page_size: config.page_size,
        })
    }
}

fn cors_layer(origin_urls: &str) -> CorsLayer {
    let allow_origin = if origin_urls.trim() == "*" {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = origin_urls
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Ignoring invalid origin {}: {}", origin, e);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_origin(allow_origin)
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(600))
}

pub async fn serve(app_state: AppState, config: &Config) -> anyhow::Result<()> {
    let application = router_endpoints(app_state).layer(
        ServiceBuilder::new()
            .layer(cors_layer(&config.origin_urls))
            .layer(CompressionLayer::new()),
    );

    let address: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid host/port combination")?;
    info!("API server listening on: {} ({})", address, config.environment);
    axum::Server::bind(&address)
        .serve(application.into_make_service())
        .await
        .context("Error spinning up the API server")
}

pub fn router_endpoints(app_state: AppState) -> Router {
    Router::new()
        .nest("/api", parse_query_controller::router(app_state))
        .merge(health_check::router())
        .fallback(page_not_found_handler)
}
