use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::dispatch::{self, DispatchRequest, DispatchResult};
use crate::global::Global;
use crate::http::error::{ApiError, ApiErrorCode};

pub mod clan;
pub mod game;
pub mod player;

pub const NOTHING_SELECTED: &str = "You didn't select any data to fetch.";
pub const NO_DATA: &str = "No data was returned for your selection.";

pub fn routes() -> Router<Arc<Global>> {
    Router::new()
        .route("/", get(root))
        .route("/home", get(root))
        .route("/player", post(player::lookup_player))
        .route("/clan", post(clan::lookup_clan))
        .route("/game", post(game::lookup_game))
}

#[derive(serde::Serialize)]
struct RootResponse {
    message: &'static str,
    version: &'static str,
    uptime: u64,
    endpoints: Vec<&'static str>,
}

#[tracing::instrument(skip(global))]
async fn root(State(global): State<Arc<Global>>) -> Json<RootResponse> {
    Json(RootResponse {
        message: "Clash Royale Lookup",
        version: env!("CARGO_PKG_VERSION"),
        uptime: global.started_at.elapsed().as_secs(),
        endpoints: vec!["/player", "/clan", "/game"],
    })
}

/// Submitted form fields. A ticked checkbox is any field that is present.
#[derive(Debug, Default)]
pub struct Selection(HashMap<String, String>);

impl Selection {
    pub fn new(fields: HashMap<String, String>) -> Self {
        Self(fields)
    }

    pub fn wants(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn wants_any(&self, fields: &[&str]) -> bool {
        fields.iter().any(|f| self.wants(f))
    }

    pub fn text(&self, field: &str) -> String {
        self.0.get(field).map(|v| v.trim().to_string()).unwrap_or_default()
    }

    pub fn limit(&self, field: &str) -> Option<u32> {
        parse_limit(&self.text(field))
    }
}

/// Digits-only limit field. Anything else, including an empty field, means no limit.
pub fn parse_limit(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

fn api_key(global: &Global) -> Result<&str, ApiError> {
    global.config.clash.token().ok_or_else(|| {
        tracing::error!("CR_API_KEY is not set");
        ApiError::internal_server_error(
            ApiErrorCode::MISSING_API_KEY,
            "Server configuration error: CR_API_KEY is not set.",
        )
    })
}

async fn lookup(global: &Global, api_key: &str, request: DispatchRequest) -> Result<DispatchResult, ApiError> {
    let result = dispatch::dispatch(
        &global.connector,
        api_key,
        &request,
        global.config.clash.default_limit,
    )
    .await?;

    Ok(result)
}
