use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A decoded record together with the JSON body it was decoded from.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub data: T,
    pub raw_data: Value,
}

impl<T: DeserializeOwned> ApiResponse<T> {
    pub fn decode(raw_data: Value) -> Result<Self, serde_json::Error> {
        let data = T::deserialize(&raw_data)?;
        Ok(Self { data, raw_data })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Arena {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Player {
    pub tag: String,
    pub name: String,
    pub trophies: u32,
    pub exp_level: u32,
    pub arena: Arena,
    pub cards: Vec<Value>,
    pub current_deck: Vec<Value>,
    pub badges: Vec<Value>,
    pub league_statistics: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Clan {
    pub tag: String,
    pub name: String,
    pub clan_score: u32,
    pub member_list: Option<Vec<Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_player_and_keeps_raw_body() {
        let raw = serde_json::json!({
            "tag": "#P0LY0",
            "name": "someone",
            "trophies": 6400,
            "expLevel": 14,
            "arena": { "id": 54000020, "name": "Legendary Arena" },
            "currentDeck": [{ "name": "Knight" }],
            "unknownField": true
        });

        let response = ApiResponse::<Player>::decode(raw.clone()).unwrap();
        assert_eq!(response.data.exp_level, 14);
        assert_eq!(response.data.arena.name, "Legendary Arena");
        assert_eq!(response.data.current_deck.len(), 1);
        assert!(response.data.league_statistics.is_none());
        assert_eq!(response.raw_data, raw);
    }

    #[test]
    fn clan_without_members_decodes() {
        let raw = serde_json::json!({ "tag": "#2PP", "name": "clan", "clanScore": 50000 });
        let response = ApiResponse::<Clan>::decode(raw).unwrap();
        assert_eq!(response.data.clan_score, 50000);
        assert!(response.data.member_list.is_none());
    }
}
