pub mod admin;
pub mod config;
pub mod connection;
pub mod connection_registry;
pub mod handlers;
pub mod room_directory;
pub mod router;
pub mod server;
pub mod session;
