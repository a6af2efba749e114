use crate::clock::{Clock, SystemClock};
use crate::services::fcm_service::{FcmClient, ServiceAccountKey};
use crate::services::video_service::YouTubeClient;
use crate::utils::split_csv;
use crate::AppState;
use anyhow::Result;
use env_logger::Builder;
use lazy_static::lazy_static;
use log::{info, LevelFilter};
use rocket::figment::Figment;
use rocket::http::Method;
use rocket_cors::{AllowedHeaders, AllowedOrigins, CorsOptions};
use std::env;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<T>().ok())
        .unwrap_or(default)
}

lazy_static! {
    pub static ref YOUTUBE_API_KEY: Option<String> = env::var("YOUTUBE_API_KEY").ok();
    pub static ref FIREBASE_CREDENTIALS: Option<String> = env::var("FIREBASE_CREDENTIALS").ok();
    pub static ref PORT: u16 = env_or("PORT", 5000);
    pub static ref BIND_ADDRESS: String =
        env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0".to_string());
    pub static ref REGION_CODE: String =
        env::var("REGION_CODE").unwrap_or_else(|_| "US".to_string());
    pub static ref TRENDING_CACHE_TTL_SECS: i64 = env_or("TRENDING_CACHE_TTL_SECS", 300);
    pub static ref UPSTREAM_TIMEOUT_SECS: u64 = env_or("UPSTREAM_TIMEOUT_SECS", 10);
    pub static ref CORS_ALLOWED_ORIGINS: Vec<String> = env::var("CORS_ALLOWED_ORIGINS")
        .map(|origins| split_csv(&origins))
        .unwrap_or_default();
}

pub fn init_logger() {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();
    info!("Starting trending relay backend...");
}

pub fn load_environment() {
    dotenv::dotenv().ok();
}

pub fn rocket_figment() -> Figment {
    rocket::Config::figment()
        .merge(("port", *PORT))
        .merge(("address", BIND_ADDRESS.as_str()))
}

pub fn create_http_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(*UPSTREAM_TIMEOUT_SECS))
        .build()?;
    Ok(client)
}

pub fn create_app_state() -> Result<AppState> {
    let api_key = YOUTUBE_API_KEY
        .clone()
        .ok_or_else(|| anyhow::anyhow!("YOUTUBE_API_KEY environment variable must be set"))?;
    let credentials_path = FIREBASE_CREDENTIALS
        .clone()
        .ok_or_else(|| anyhow::anyhow!("FIREBASE_CREDENTIALS environment variable must be set"))?;

    let http_client = create_http_client()?;
    let youtube = YouTubeClient::new(http_client.clone(), api_key, REGION_CODE.clone());

    let service_account = ServiceAccountKey::from_file(Path::new(&credentials_path))?;
    info!(
        "Loaded Firebase credentials for project {}",
        service_account.project_id
    );
    let fcm = FcmClient::new(http_client, service_account)?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    info!(
        "Trending cache window is {}s for region {}",
        *TRENDING_CACHE_TTL_SECS, *REGION_CODE
    );

    Ok(AppState::new(
        Arc::new(youtube),
        Arc::new(fcm),
        clock,
        chrono::Duration::seconds(*TRENDING_CACHE_TTL_SECS),
    ))
}

pub fn create_cors() -> Result<rocket_cors::Cors> {
    let allowed_origins = if CORS_ALLOWED_ORIGINS.is_empty() {
        AllowedOrigins::all()
    } else {
        AllowedOrigins::some_exact(CORS_ALLOWED_ORIGINS.as_slice())
    };

    let cors = CorsOptions::default()
        .allowed_origins(allowed_origins)
        .allowed_methods(
            vec![Method::Get, Method::Post, Method::Delete, Method::Options]
                .into_iter()
                .map(From::from)
                .collect(),
        )
        .allowed_headers(AllowedHeaders::some(&["Accept", "Content-Type"]))
        .to_cors()
        .map_err(|e| anyhow::anyhow!("Failed to create CORS options: {}", e))?;

    Ok(cors)
}
