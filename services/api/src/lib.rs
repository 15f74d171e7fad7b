pub mod adapters;
pub mod config;
pub mod engine;
pub mod error;
pub mod questions;
pub mod web;
