use crate::error::DiscoveryError;
use crate::models::{
    ErrorResponse, FilterCriteria, PresetsResponse, SearchRequest, SearchResponse, SortBy,
    SortOption, SortOrder, SortSpec,
};
use crate::services::filters::{preset_options, ACTIVITY_PRESETS, SUBSCRIBER_PRESETS, VIEW_PRESETS};
use crate::services::pipeline::run_search;
use crate::AppState;
use log::error;
use rocket::serde::json::Json;
use rocket::{get, State};

static PAGE_SIZE: usize = 10;
static MAX_PAGE_SIZE: usize = 50;

fn parse_sort(sort: Option<&str>, order: Option<&str>) -> Result<SortSpec, DiscoveryError> {
    let by = match sort {
        Some(key) => SortBy::from_key(key)
            .ok_or_else(|| DiscoveryError::config(format!("unknown sort key '{key}'")))?,
        None => SortBy::default(),
    };
    let order = match order {
        Some(key) => SortOrder::from_key(key)
            .ok_or_else(|| DiscoveryError::config(format!("unknown sort order '{key}'")))?,
        None => SortOrder::default(),
    };
    Ok(SortSpec::new(by, order))
}

#[allow(clippy::too_many_arguments)]
#[get("/?<keyword>&<min_subscribers>&<max_subscribers>&<min_views>&<max_views>&<min_videos>&<max_videos>&<active_within_days>&<sort>&<order>&<page>&<page_size>")]
pub async fn search_creators(
    keyword: Option<String>,
    min_subscribers: Option<u64>,
    max_subscribers: Option<u64>,
    min_views: Option<u64>,
    max_views: Option<u64>,
    min_videos: Option<u64>,
    max_videos: Option<u64>,
    active_within_days: Option<u32>,
    sort: Option<String>,
    order: Option<String>,
    page: Option<usize>,
    page_size: Option<usize>,
    state: &State<AppState>,
) -> Result<Json<SearchResponse>, ErrorResponse> {
    let page = page.unwrap_or(0);
    let page_size = page_size.unwrap_or(PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    let sort = parse_sort(sort.as_deref(), order.as_deref())?;
    let request = SearchRequest {
        criteria: FilterCriteria {
            keyword: keyword.unwrap_or_default(),
            min_subscribers,
            max_subscribers,
            min_views,
            max_views,
            min_videos,
            max_videos,
            active_within_days,
        },
        sort,
    };

    let outcome = run_search(
        state.platform.as_ref(),
        &request,
        &state.settings,
        chrono::Utc::now(),
    )
    .await
    .map_err(|e| {
        error!("Search error: {e}");
        ErrorResponse::from(e)
    })?;

    let total_channels = outcome.results.len();
    let results = outcome
        .results
        .into_iter()
        .skip(page.saturating_mul(page_size))
        .take(page_size)
        .collect();

    Ok(Json(SearchResponse {
        results,
        criteria: request.criteria,
        sort: request.sort,
        warnings: outcome.warnings,
        videos_found: outcome.videos_found,
        total_channels,
        page,
        page_size,
        total_pages: total_channels.div_ceil(page_size),
    }))
}

#[get("/presets")]
pub fn search_presets() -> Json<PresetsResponse> {
    Json(PresetsResponse {
        views: preset_options(VIEW_PRESETS),
        subscribers: preset_options(SUBSCRIBER_PRESETS),
        activity: preset_options(ACTIVITY_PRESETS),
        sort_options: SortBy::all_variants()
            .into_iter()
            .map(|sort_by| SortOption {
                key: sort_by.key(),
                label: sort_by.display_name(),
            })
            .collect(),
    })
}
