use crate::services::metrics::ScoringConfig;
use crate::services::pipeline::PipelineSettings;
use crate::services::youtube_api::YouTubeClient;
use crate::AppState;
use anyhow::Result;
use env_logger::Builder;
use lazy_static::lazy_static;
use log::{info, LevelFilter};
use rocket::http::Method;
use rocket_cors::{AllowedHeaders, AllowedOrigins, CorsOptions};
use std::env;
use std::str::FromStr;
use std::sync::Arc;

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<T>().ok())
        .unwrap_or(default)
}

lazy_static! {
    pub static ref YOUTUBE_API_KEY: String = env::var("YOUTUBE_API_KEY").unwrap_or_default();
    pub static ref YOUTUBE_API_BASE_URL: String = env::var("YOUTUBE_API_BASE_URL")
        .unwrap_or_else(|_| "https://www.googleapis.com/youtube/v3".to_string());
    pub static ref MAX_SEARCH_RESULTS: usize = env_or("MAX_SEARCH_RESULTS", 250);
    pub static ref RECENT_VIDEOS_PER_CHANNEL: usize = env_or("RECENT_VIDEOS_PER_CHANNEL", 10);
    pub static ref SCORE_WEIGHT_ACTIVITY: f64 =
        env_or("SCORE_WEIGHT_ACTIVITY", ScoringConfig::default().activity_weight);
    pub static ref SCORE_WEIGHT_PERFORMANCE: f64 =
        env_or("SCORE_WEIGHT_PERFORMANCE", ScoringConfig::default().performance_weight);
    pub static ref SCORE_WEIGHT_ENGAGEMENT: f64 =
        env_or("SCORE_WEIGHT_ENGAGEMENT", ScoringConfig::default().engagement_weight);
    pub static ref CORS_ALLOWED_ORIGIN: String =
        env::var("CORS_ALLOWED_ORIGIN").unwrap_or_else(|_| "http://localhost:8080".to_string());
}

pub fn init_logger() {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();
    info!("Starting creator discovery backend...");
}

pub fn load_environment() {
    dotenv::dotenv().ok();
}

impl PipelineSettings {
    pub fn from_env() -> Self {
        PipelineSettings {
            max_search_results: *MAX_SEARCH_RESULTS,
            sample_size: *RECENT_VIDEOS_PER_CHANNEL,
            scoring: ScoringConfig {
                activity_weight: *SCORE_WEIGHT_ACTIVITY,
                performance_weight: *SCORE_WEIGHT_PERFORMANCE,
                engagement_weight: *SCORE_WEIGHT_ENGAGEMENT,
                ..ScoringConfig::default()
            },
        }
    }
}

pub fn create_youtube_client() -> Result<YouTubeClient> {
    let base_url = &*YOUTUBE_API_BASE_URL;
    info!("Using YouTube Data API at: {base_url}");

    let client = YouTubeClient::new(YOUTUBE_API_KEY.as_str(), base_url)?;
    Ok(client)
}

pub fn create_app_state() -> Result<AppState> {
    let client = create_youtube_client()?;
    let settings = PipelineSettings::from_env();
    info!(
        "Pipeline settings: max_search_results={}, sample_size={}, weights=({}, {}, {})",
        settings.max_search_results,
        settings.sample_size,
        settings.scoring.activity_weight,
        settings.scoring.performance_weight,
        settings.scoring.engagement_weight,
    );

    Ok(AppState {
        platform: Arc::new(client),
        settings,
    })
}

pub fn create_cors() -> Result<rocket_cors::Cors> {
    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::some_exact(&[CORS_ALLOWED_ORIGIN.as_str()]))
        .allowed_methods(
            vec![Method::Get, Method::Options]
                .into_iter()
                .map(From::from)
                .collect(),
        )
        .allowed_headers(AllowedHeaders::some(&["Accept", "Content-Type"]))
        .allow_credentials(true)
        .to_cors()
        .map_err(|e| anyhow::anyhow!("Failed to create CORS options: {}", e))?;

    Ok(cors)
}
