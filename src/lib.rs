//! Email/password registration and login that hands out signed custom tokens.

pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod state;
