pub mod config;
pub mod db;
pub mod error;
pub mod languages;
pub mod params;
pub mod preferences;
pub mod providers;
pub mod security;
pub mod server;
pub mod tagging;
pub mod translation;
pub mod validation;
