pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod repository;
pub mod telemetry;
pub mod uploads;
