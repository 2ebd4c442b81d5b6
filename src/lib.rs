pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod import;
pub mod models;
pub mod permissions;
pub mod services;
pub mod validators;
