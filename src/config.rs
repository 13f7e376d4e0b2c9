use std::path::PathBuf;

use clap::{Parser, ValueEnum};

pub const DEFAULT_AI_MODEL: &str = "@cf/meta/llama-3.1-8b-instruct";

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchProviderKind {
    Kakao,
    Naver,
}

#[derive(Parser, Clone, Debug)]
pub struct Config {
    #[clap(env, long, default_value = "development")]
    pub environment: String,

    #[clap(env, long, default_value = "127.0.0.1")]
    pub host: String,

    #[clap(env, long, default_value_t = 3000)]
    pub port: u16,

    /// Comma separated list of allowed origins, `*` allows any origin
    #[clap(env, long, default_value = "*")]
    pub origin_urls: String,

    #[clap(env, long, value_enum, default_value = "kakao")]
    pub search_provider: SearchProviderKind,

    #[clap(env, long)]
    pub kakao_rest_api_key: Option<String>,

    #[clap(env, long, default_value = "https://dapi.kakao.com")]
    pub kakao_base_url: String,

    #[clap(env, long)]
    pub naver_client_id: Option<String>,

    #[clap(env, long)]
    pub naver_client_secret: Option<String>,

    #[clap(env, long, default_value = "https://openapi.naver.com")]
    pub naver_base_url: String,

    #[clap(env, long)]
    pub cloudflare_account_id: Option<String>,

    #[clap(env, long)]
    pub cloudflare_api_token: Option<String>,

    #[clap(env, long, default_value = "https://api.cloudflare.com/client/v4")]
    pub ai_base_url: String,

    #[clap(env, long, default_value = DEFAULT_AI_MODEL)]
    pub ai_model: String,

    #[clap(env, long, default_value_t = 15)]
    pub page_size: u32,

    /// TOML file overriding the built-in keyword filtering tables
    #[clap(env, long)]
    pub keyword_policy: Option<PathBuf>,
}
