pub mod access;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod serializers;
pub mod server;
pub mod services;
pub mod state;
