use axum::{Json, extract::State};

use crate::api::v1::dto::site_config::SiteConfigResponse;
use crate::state::AppState;

pub async fn site_config(State(state): State<AppState>) -> Json<SiteConfigResponse> {
    Json(SiteConfigResponse::from(state.site.as_ref()))
}
