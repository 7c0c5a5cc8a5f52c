pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use crate::services::pipeline::PipelineSettings;
use crate::services::youtube_api::VideoPlatform;
use rocket::{routes, Build, Rocket};
use std::sync::Arc;

pub struct AppState {
    pub platform: Arc<dyn VideoPlatform>,
    pub settings: PipelineSettings,
}

pub fn build_rocket(state: AppState) -> Rocket<Build> {
    rocket::build()
        .manage(state)
        .mount("/search", routes![api::search_creators, api::search_presets])
        .mount("/channel", routes![api::get_channel_profile])
}
