pub mod auth;
pub mod checkin;
pub mod config;
pub mod handlers;
pub mod issuance;
pub mod models;
pub mod repository;
pub mod routes;
pub mod state;
pub mod utils;
