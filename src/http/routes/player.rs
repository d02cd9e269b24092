use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::{Form, Json};
use serde_json::Value;

use super::{api_key, lookup, Selection, NOTHING_SELECTED, NO_DATA};
use crate::clash::Player;
use crate::dispatch::{normalize, Choice, DispatchRequest, DispatchResult, Payload};
use crate::global::Global;
use crate::http::error::ApiError;

const PLAYER_FIELDS: [&str; 8] = [
    "fetch_trophies",
    "fetch_exp_level",
    "fetch_cards",
    "fetch_arena_name",
    "fetch_arena_id",
    "fetch_current_deck",
    "fetch_badges",
    "fetch_league_statistics",
];

const NO_LEAGUE_STATISTICS: &str = "This player has no league statistics available.";

#[derive(Debug, Default, serde::Serialize)]
pub struct PlayerView {
    pub tag: String,
    pub trophies: Option<u32>,
    pub exp_level: Option<u32>,
    pub cards: Option<Vec<Value>>,
    pub arena_name: Option<String>,
    pub arena_id: Option<u64>,
    pub current_deck: Option<Vec<Value>>,
    pub badges: Option<Vec<Value>>,
    pub league_statistics: Option<Value>,
    pub battle_data: Option<Vec<Value>>,
    pub battle_limit: Option<u32>,
    pub placeholder: String,
}

impl PlayerView {
    fn has_data(&self) -> bool {
        let non_empty = |list: &Option<Vec<Value>>| list.as_ref().is_some_and(|l| !l.is_empty());

        self.trophies.is_some_and(|t| t > 0)
            || self.exp_level.is_some_and(|l| l > 0)
            || non_empty(&self.cards)
            || self.arena_name.as_ref().is_some_and(|n| !n.is_empty())
            || self.arena_id.is_some_and(|id| id > 0)
            || non_empty(&self.current_deck)
            || non_empty(&self.badges)
            || self.league_statistics.is_some()
            || non_empty(&self.battle_data)
    }
}

/// POST /player
///
/// Looks up only what was ticked. The profile and the battle log are fetched
/// independently, so one may fail while the other succeeds.
#[tracing::instrument(skip(global, fields))]
pub async fn lookup_player(
    State(global): State<Arc<Global>>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Json<PlayerView>, ApiError> {
    let api_key = api_key(&global)?;
    let selection = Selection::new(fields);
    let tag = selection.text("tag");

    let want_player = selection.wants_any(&PLAYER_FIELDS);
    let want_battles = selection.wants("fetch_battle_data");

    if !(want_player || want_battles) {
        return Ok(Json(PlayerView {
            tag,
            placeholder: NOTHING_SELECTED.into(),
            ..Default::default()
        }));
    }

    let mut player = None;
    if want_player {
        player = Some(lookup(&global, api_key, DispatchRequest::new(Choice::Player, tag.clone())).await?);
    }

    let mut battles = None;
    if want_battles {
        battles = Some(lookup(&global, api_key, DispatchRequest::new(Choice::Battles, tag.clone())).await?);
    }

    Ok(Json(player_view(&selection, tag, player, battles)))
}

fn player_view(
    selection: &Selection,
    tag: String,
    player: Option<DispatchResult>,
    battles: Option<DispatchResult>,
) -> PlayerView {
    let mut messages = Vec::new();

    let player: Option<Player> = match player {
        Some(DispatchResult::Success(Payload::Player(player))) => Some(player.data),
        Some(DispatchResult::Failure(failure)) => {
            messages.push(failure.to_string());
            None
        }
        _ => None,
    };

    let battle_limit = selection.limit("fetch_battle_limit");
    let battle_data = match battles {
        Some(DispatchResult::Success(Payload::Battles(battles))) => {
            let mut list = normalize(&battles);
            if let Some(limit) = battle_limit {
                list.truncate(limit as usize);
            }
            Some(list)
        }
        Some(DispatchResult::Failure(failure)) => {
            messages.push(failure.to_string());
            None
        }
        _ => None,
    };

    let mut view = PlayerView {
        tag,
        battle_data,
        battle_limit,
        ..Default::default()
    };

    if let Some(player) = &player {
        let pick = |field: &str| selection.wants(field);

        view.trophies = pick("fetch_trophies").then_some(player.trophies);
        view.exp_level = pick("fetch_exp_level").then_some(player.exp_level);
        view.cards = pick("fetch_cards").then(|| player.cards.clone());
        view.arena_name = pick("fetch_arena_name").then(|| player.arena.name.clone());
        view.arena_id = pick("fetch_arena_id").then_some(player.arena.id);
        view.current_deck = pick("fetch_current_deck").then(|| player.current_deck.clone());
        view.badges = pick("fetch_badges").then(|| player.badges.clone());
        view.league_statistics = pick("fetch_league_statistics")
            .then(|| player.league_statistics.clone())
            .flatten();

        if pick("fetch_league_statistics") && view.league_statistics.is_none() {
            messages.push(NO_LEAGUE_STATISTICS.into());
        }
    }

    if messages.is_empty() && !view.has_data() {
        messages.push(NO_DATA.into());
    }

    view.placeholder = messages.join(" | ");
    view
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::clash::ApiResponse;
    use crate::dispatch::{Failure, Subject};

    fn selection(fields: &[&str]) -> Selection {
        Selection::new(fields.iter().map(|f| (f.to_string(), "on".to_string())).collect())
    }

    fn player(raw: Value) -> Option<DispatchResult> {
        Some(DispatchResult::Success(Payload::Player(ApiResponse::decode(raw).unwrap())))
    }

    #[test]
    fn only_ticked_fields_are_returned() {
        let raw = json!({
            "trophies": 6000,
            "expLevel": 13,
            "arena": { "id": 54000015, "name": "Master I" },
            "leagueStatistics": { "currentSeason": { "trophies": 6000 } }
        });

        let view = player_view(
            &selection(&["fetch_trophies", "fetch_arena_name"]),
            "#P0LY0".into(),
            player(raw),
            None,
        );

        assert_eq!(view.trophies, Some(6000));
        assert_eq!(view.arena_name.as_deref(), Some("Master I"));
        assert!(view.exp_level.is_none());
        assert!(view.league_statistics.is_none());
        assert_eq!(view.placeholder, "");
    }

    #[test]
    fn partial_failure_keeps_battles() {
        let battles = DispatchResult::Success(Payload::Battles(ApiResponse {
            data: json!([{ "type": "PvP" }, { "type": "PvP" }, { "type": "riverRacePvP" }]),
            raw_data: json!([{ "type": "PvP" }, { "type": "PvP" }, { "type": "riverRacePvP" }]),
        }));

        let selection = Selection::new(
            [("fetch_trophies", "on"), ("fetch_battle_data", "on"), ("fetch_battle_limit", "2")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );

        let view = player_view(
            &selection,
            "#P0LY0".into(),
            Some(DispatchResult::Failure(Failure::RateLimited)),
            Some(battles),
        );

        assert!(view.trophies.is_none());
        assert_eq!(view.battle_data.as_ref().map(Vec::len), Some(2));
        assert_eq!(view.battle_limit, Some(2));
        assert_eq!(view.placeholder, "You hit the rate limit. Slow down.");
    }

    #[test]
    fn battle_envelope_is_unwrapped() {
        let raw = json!({ "items": [{ "type": "PvP" }, { "type": "challenge" }] });
        let battles = DispatchResult::Success(Payload::Battles(ApiResponse {
            data: raw.clone(),
            raw_data: raw,
        }));

        let view = player_view(&selection(&["fetch_battle_data"]), "#P0LY0".into(), None, Some(battles));

        assert_eq!(
            view.battle_data,
            Some(vec![json!({ "type": "PvP" }), json!({ "type": "challenge" })])
        );
        assert_eq!(view.placeholder, "");
    }

    #[test]
    fn failures_are_joined() {
        let view = player_view(
            &selection(&["fetch_badges", "fetch_battle_data"]),
            "#NOPE".into(),
            Some(DispatchResult::Failure(Failure::NotFound(Subject::Player))),
            Some(DispatchResult::Failure(Failure::NotFound(Subject::Player))),
        );

        assert_eq!(view.placeholder, "No such player tag. | No such player tag.");
    }

    #[test]
    fn missing_league_statistics_is_reported() {
        let view = player_view(
            &selection(&["fetch_league_statistics"]),
            "#P0LY0".into(),
            player(json!({ "trophies": 100 })),
            None,
        );

        assert_eq!(view.placeholder, NO_LEAGUE_STATISTICS);
    }

    #[test]
    fn empty_selection_result_says_so() {
        let view = player_view(
            &selection(&["fetch_badges"]),
            "#P0LY0".into(),
            player(json!({ "badges": [] })),
            None,
        );

        assert_eq!(view.badges, Some(Vec::new()));
        assert_eq!(view.placeholder, NO_DATA);
    }
}
