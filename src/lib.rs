pub mod auth_api;
pub mod auth_store;
pub mod config;
pub mod download_api;
pub mod fetch_state;
pub mod format;
pub mod http_client;
pub mod logging;
pub mod modals;
pub mod models;
pub mod player_api;
pub mod player_store;
pub mod provider;
pub mod roster_api;
pub mod roster_store;
pub mod session;
pub mod skills;
pub mod state;
