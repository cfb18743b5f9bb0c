//! Landing endpoint.

use axum::{routing::get, Router};
use serde::Serialize;

use crate::{extractors::MaybeAuthUser, middleware::AppState, response::ApiResponse};

#[derive(Serialize)]
struct IndexResponse {
    title: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

async fn index(MaybeAuthUser(user): MaybeAuthUser) -> ApiResponse<IndexResponse> {
    ApiResponse::ok(IndexResponse {
        title: "Main Page",
        name: user.map(|u| format!("Hello, {}", u.username)),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}
