use std::fmt;

use serde_json::Value;

use crate::clash::{ApiResponse, Clan, ClashApi, ClientError, Connector, Player};

mod normalize;

pub use normalize::normalize;

/// Which kind of lookup a dispatch performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Player = 1,
    Battles = 2,
    Clan = 3,
    Cards = 4,
    TopPlayers = 5,
    TopClans = 6,
}

impl TryFrom<i64> for Choice {
    type Error = DispatchError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Player),
            2 => Ok(Self::Battles),
            3 => Ok(Self::Clan),
            4 => Ok(Self::Cards),
            5 => Ok(Self::TopPlayers),
            6 => Ok(Self::TopClans),
            other => Err(DispatchError::InvalidChoice(other)),
        }
    }
}

impl Choice {
    /// Tag passed to the API, if the lookup takes one.
    fn identifier<'a>(&self, request: &'a DispatchRequest) -> Option<&'a str> {
        match self {
            Self::Player | Self::Battles => Some(&request.subject_tag),
            Self::Clan if !request.alternate_clan_tag.is_empty() => Some(&request.alternate_clan_tag),
            Self::Clan => Some(&request.subject_tag),
            Self::Cards | Self::TopPlayers | Self::TopClans => None,
        }
    }

    /// Subject reported when the API answers "not found". Lookups without a
    /// tag have no such category and let the error through.
    fn not_found(&self) -> Option<Subject> {
        match self {
            Self::Player | Self::Battles => Some(Subject::Player),
            Self::Clan => Some(Subject::Clan),
            Self::Cards | Self::TopPlayers | Self::TopClans => None,
        }
    }

    /// Rankings treat an empty list as a failure rather than data.
    fn ranking(&self) -> Option<Ranking> {
        match self {
            Self::TopPlayers => Some(Ranking::TopPlayers),
            Self::TopClans => Some(Ranking::TopClans),
            Self::Player | Self::Battles | Self::Clan | Self::Cards => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ranking {
    TopPlayers,
    TopClans,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Player,
    Clan,
}

#[derive(Debug, Clone, Default)]
pub struct DispatchRequest {
    pub choice: i64,
    pub subject_tag: String,
    /// Takes priority over `subject_tag` for clan lookups when non-empty.
    pub alternate_clan_tag: String,
    pub result_limit: Option<u32>,
}

impl DispatchRequest {
    pub fn new(choice: Choice, subject_tag: impl Into<String>) -> Self {
        Self {
            choice: choice as i64,
            subject_tag: subject_tag.into(),
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: Option<u32>) -> Self {
        self.result_limit = limit;
        self
    }
}

#[derive(Debug, Clone)]
pub enum Payload {
    Player(ApiResponse<Player>),
    Battles(ApiResponse<Value>),
    Clan(ApiResponse<Clan>),
    Cards(Vec<Value>),
    TopPlayers(Vec<Value>),
    TopClans(Vec<Value>),
}

/// Expected failures, surfaced to the user as a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    NotFound(Subject),
    Unauthorized,
    RateLimited,
    EmptyResult(Ranking),
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::NotFound(Subject::Player) => "No such player tag.",
            Self::NotFound(Subject::Clan) => "No such clan tag.",
            Self::Unauthorized => "Check your API token.",
            Self::RateLimited => "You hit the rate limit. Slow down.",
            Self::EmptyResult(Ranking::TopPlayers) => "API: no top players data returned (items was empty).",
            Self::EmptyResult(Ranking::TopClans) => "API: no top clans data returned (items was empty).",
        };
        f.write_str(message)
    }
}

#[derive(Debug, Clone)]
pub enum DispatchResult {
    Success(Payload),
    Failure(Failure),
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("choice must be an integer between 1 and 6, got {0}")]
    InvalidChoice(i64),
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Run one lookup against a freshly connected client.
///
/// Not-found (for tag lookups), unauthorized and rate-limited responses come
/// back as [`DispatchResult::Failure`]. Every other client error is returned
/// as [`DispatchError::Client`].
#[tracing::instrument(skip(connector, api_key))]
pub async fn dispatch<C: Connector>(
    connector: &C,
    api_key: &str,
    request: &DispatchRequest,
    default_limit: u32,
) -> Result<DispatchResult, DispatchError> {
    let choice = Choice::try_from(request.choice)?;
    let client = connector.connect(api_key)?;

    let result = call(&client, choice, request, request.result_limit.unwrap_or(default_limit)).await;
    drop(client);

    match result {
        Ok(payload) => Ok(finish(choice, payload)),
        Err(ClientError::NotFound) => match choice.not_found() {
            Some(subject) => Ok(DispatchResult::Failure(Failure::NotFound(subject))),
            None => Err(ClientError::NotFound.into()),
        },
        Err(ClientError::Unauthorized(reason)) => {
            tracing::warn!(%reason, "clash api rejected token");
            Ok(DispatchResult::Failure(Failure::Unauthorized))
        }
        Err(ClientError::RateLimited) => Ok(DispatchResult::Failure(Failure::RateLimited)),
        Err(e) => Err(e.into()),
    }
}

async fn call<A: ClashApi>(
    client: &A,
    choice: Choice,
    request: &DispatchRequest,
    limit: u32,
) -> Result<Payload, ClientError> {
    let tag = choice.identifier(request).unwrap_or_default();

    Ok(match choice {
        Choice::Player => Payload::Player(client.get_player(tag).await?),
        Choice::Battles => Payload::Battles(client.get_player_battles(tag).await?),
        Choice::Clan => Payload::Clan(client.get_clan(tag).await?),
        Choice::Cards => Payload::Cards(normalize(&client.get_all_cards().await?)),
        Choice::TopPlayers => Payload::TopPlayers(normalize(&client.get_top_players("global", limit).await?)),
        Choice::TopClans => Payload::TopClans(normalize(&client.get_top_clans(limit).await?)),
    })
}

fn finish(choice: Choice, payload: Payload) -> DispatchResult {
    let empty = match &payload {
        Payload::TopPlayers(items) | Payload::TopClans(items) => items.is_empty(),
        _ => false,
    };

    if let Some(ranking) = choice.ranking().filter(|_| empty) {
        tracing::debug!(?ranking, "ranking came back empty");
        return DispatchResult::Failure(Failure::EmptyResult(ranking));
    }

    DispatchResult::Success(payload)
}
