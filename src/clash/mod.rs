use serde_json::Value;

pub mod client;
pub mod error;
pub mod tag;
pub mod types;

pub use client::HttpConnector;
pub use error::ClientError;
pub use types::{ApiResponse, Clan, Player};

/// Operations of the Clash Royale public API used by the lookup pages.
#[async_trait::async_trait]
pub trait ClashApi: Send + Sync {
    async fn get_player(&self, tag: &str) -> Result<ApiResponse<Player>, ClientError>;

    async fn get_player_battles(&self, tag: &str) -> Result<ApiResponse<Value>, ClientError>;

    async fn get_clan(&self, tag: &str) -> Result<ApiResponse<Clan>, ClientError>;

    async fn get_all_cards(&self) -> Result<ApiResponse<Value>, ClientError>;

    async fn get_top_players(&self, region: &str, limit: u32) -> Result<ApiResponse<Value>, ClientError>;

    async fn get_top_clans(&self, limit: u32) -> Result<ApiResponse<Value>, ClientError>;
}

/// Opens a client session bound to one API token.
///
/// Every dispatch connects anew and drops the client when done, so nothing
/// outlives a single lookup.
pub trait Connector: Send + Sync {
    type Client: ClashApi;

    fn connect(&self, api_key: &str) -> Result<Self::Client, ClientError>;
}
