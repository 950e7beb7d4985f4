pub mod cache;
pub mod config;
pub mod db;
pub mod drag;
pub mod dto;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod models;
pub mod ordering;
pub mod response;
pub mod routes;
pub mod scope;
pub mod services;
pub mod state;
