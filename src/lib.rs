pub mod app;
pub mod auth;
pub mod config;
pub mod context;
pub mod db;
pub mod graphql;
pub mod routes;
pub mod state;
pub mod store;
