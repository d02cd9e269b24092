use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::{Form, Json};
use serde_json::Value;

use super::{api_key, lookup, Selection, NOTHING_SELECTED};
use crate::dispatch::{Choice, DispatchRequest, DispatchResult, Failure, Payload};
use crate::global::Global;
use crate::http::error::ApiError;

#[derive(Debug, Default, serde::Serialize)]
pub struct ClanView {
    pub clan_tag: Option<String>,
    pub clan_name: Option<String>,
    pub clan_score: Option<u32>,
    pub clan_member_data: Option<Vec<Value>>,
    pub placeholder: String,
}

/// POST /clan
#[tracing::instrument(skip(global, fields))]
pub async fn lookup_clan(
    State(global): State<Arc<Global>>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Json<ClanView>, ApiError> {
    let api_key = api_key(&global)?;
    let selection = Selection::new(fields);
    let clan_tag = selection.text("clan_tag");

    let result = lookup(&global, api_key, DispatchRequest::new(Choice::Clan, clan_tag.clone())).await?;

    Ok(Json(clan_view(&selection, clan_tag, result)))
}

fn clan_view(selection: &Selection, clan_tag: String, result: DispatchResult) -> ClanView {
    let clan = match result {
        DispatchResult::Success(Payload::Clan(clan)) => clan.data,
        DispatchResult::Failure(failure) => {
            return ClanView {
                // An unknown tag is not echoed back.
                clan_tag: (!matches!(failure, Failure::NotFound(_))).then_some(clan_tag),
                placeholder: failure.to_string(),
                ..Default::default()
            };
        }
        DispatchResult::Success(other) => {
            tracing::warn!(?other, "clan lookup returned an unexpected payload");
            return ClanView {
                clan_tag: Some(clan_tag),
                placeholder: super::NO_DATA.into(),
                ..Default::default()
            };
        }
    };

    let clan_name = selection.wants("fetch_clan_name").then_some(clan.name);
    let clan_score = selection.wants("fetch_clan_score").then_some(clan.clan_score);
    let clan_member_data = selection
        .wants("fetch_clan_member_data")
        .then_some(clan.member_list)
        .flatten();

    // Blank names, zero scores and empty rosters are returned but do not count as data.
    let has_data = clan_name.as_ref().is_some_and(|n| !n.is_empty())
        || clan_score.is_some_and(|s| s > 0)
        || clan_member_data.as_ref().is_some_and(|m| !m.is_empty());

    let placeholder = if has_data {
        String::new()
    } else {
        NOTHING_SELECTED.to_string()
    };

    ClanView {
        clan_tag: Some(clan_tag),
        clan_name,
        clan_score,
        clan_member_data,
        placeholder,
    }
}
