pub mod http_api;
pub mod server;

pub use server::GameServer;
