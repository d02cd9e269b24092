use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::{Form, Json};
use serde_json::Value;

use super::{api_key, lookup, Selection, NOTHING_SELECTED, NO_DATA};
use crate::dispatch::{Choice, DispatchRequest, DispatchResult, Payload};
use crate::global::Global;
use crate::http::error::ApiError;

#[derive(Debug, Default, serde::Serialize)]
pub struct GameView {
    pub all_cards: Option<Vec<Value>>,
    pub top_players: Option<Vec<Value>>,
    pub top_clans: Option<Vec<Value>>,
    pub placeholder: String,
}

/// POST /game
///
/// Card catalog and global rankings. Each ticked box is one lookup; failures
/// are reported alongside whatever did load.
#[tracing::instrument(skip(global, fields))]
pub async fn lookup_game(
    State(global): State<Arc<Global>>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Json<GameView>, ApiError> {
    let api_key = api_key(&global)?;
    let selection = Selection::new(fields);

    let wanted: Vec<DispatchRequest> = [
        ("fetch_all_cards", Choice::Cards, None),
        ("fetch_top_players", Choice::TopPlayers, None),
        ("fetch_top_clans", Choice::TopClans, selection.limit("fetch_clan_limit")),
    ]
    .into_iter()
    .filter(|(field, _, _)| selection.wants(field))
    .map(|(_, choice, limit)| DispatchRequest::new(choice, "").with_limit(limit))
    .collect();

    if wanted.is_empty() {
        return Ok(Json(GameView {
            placeholder: NOTHING_SELECTED.into(),
            ..Default::default()
        }));
    }

    let mut results = Vec::with_capacity(wanted.len());
    for request in wanted {
        results.push(lookup(&global, api_key, request).await?);
    }

    Ok(Json(game_view(results)))
}

fn game_view(results: Vec<DispatchResult>) -> GameView {
    let mut view = GameView::default();
    let mut messages = Vec::new();

    for result in results {
        match result {
            DispatchResult::Success(Payload::Cards(cards)) => view.all_cards = Some(cards),
            DispatchResult::Success(Payload::TopPlayers(players)) => view.top_players = Some(players),
            DispatchResult::Success(Payload::TopClans(clans)) => view.top_clans = Some(clans),
            DispatchResult::Success(other) => {
                tracing::warn!(?other, "game lookup returned an unexpected payload");
            }
            DispatchResult::Failure(failure) => messages.push(failure.to_string()),
        }
    }

    let has_data = [&view.all_cards, &view.top_players, &view.top_clans]
        .into_iter()
        .flatten()
        .any(|list| !list.is_empty());

    view.placeholder = if !messages.is_empty() {
        messages.join(" | ")
    } else if !has_data {
        NO_DATA.into()
    } else {
        String::new()
    };

    view
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::dispatch::{Failure, Ranking};

    #[test]
    fn failures_are_joined_and_data_kept() {
        let view = game_view(vec![
            DispatchResult::Success(Payload::Cards(vec![json!({ "name": "Knight" })])),
            DispatchResult::Failure(Failure::EmptyResult(Ranking::TopPlayers)),
            DispatchResult::Failure(Failure::RateLimited),
        ]);

        assert_eq!(view.all_cards.map(|c| c.len()), Some(1));
        assert!(view.top_players.is_none());
        assert_eq!(
            view.placeholder,
            "API: no top players data returned (items was empty). | You hit the rate limit. Slow down."
        );
    }

    #[test]
    fn empty_cards_report_no_data() {
        let view = game_view(vec![DispatchResult::Success(Payload::Cards(Vec::new()))]);

        assert_eq!(view.all_cards, Some(Vec::new()));
        assert_eq!(view.placeholder, NO_DATA);
    }

    #[test]
    fn rankings_fill_their_slots() {
        let view = game_view(vec![
            DispatchResult::Success(Payload::TopPlayers(vec![json!({ "rank": 1 })])),
            DispatchResult::Success(Payload::TopClans(vec![json!({ "rank": 1 }), json!({ "rank": 2 })])),
        ]);

        assert_eq!(view.top_players.map(|p| p.len()), Some(1));
        assert_eq!(view.top_clans.map(|c| c.len()), Some(2));
        assert_eq!(view.placeholder, "");
    }
}
