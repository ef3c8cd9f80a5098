pub mod game_session;
pub mod server_config;
pub mod session_registry;
pub mod web_server;
pub mod ws_handler;
