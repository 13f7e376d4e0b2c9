pub mod config;
pub mod controller;
pub mod error;
pub mod helpers;
pub mod language_backend;
pub mod models;
pub mod providers;
pub mod services;
