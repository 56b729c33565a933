pub mod api;
pub mod artifacts;
pub mod config;
pub mod db;
pub mod engine;
pub mod entities;
pub mod error;
pub mod external;
pub mod history;
pub mod polyline;
pub mod render;
pub mod server;
