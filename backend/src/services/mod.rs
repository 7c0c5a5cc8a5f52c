pub mod aggregation;
pub mod filters;
pub mod metrics;
pub mod pipeline;
pub mod sorting;
pub mod youtube_api;
