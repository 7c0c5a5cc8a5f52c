use crate::models::{ChannelProfile, ErrorResponse};
use crate::services::pipeline::channel_profile;
use crate::AppState;
use log::{error, info};
use rocket::serde::json::Json;
use rocket::{get, State};

#[get("/<id>")]
pub async fn get_channel_profile(
    id: &str,
    state: &State<AppState>,
) -> Result<Json<ChannelProfile>, ErrorResponse> {
    info!("Loading channel profile for {id}");

    match channel_profile(state.platform.as_ref(), id, &state.settings).await {
        Ok(profile) => Ok(Json(profile)),
        Err(e) => {
            error!("Failed to load channel {id}: {e}");
            Err(ErrorResponse::from(e))
        }
    }
}
