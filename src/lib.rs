//! Keyboard-driven terminal explorer for BigQuery projects, datasets and
//! tables.

pub mod action;
pub mod app;
pub mod cache;
pub mod catalog;
pub mod cli;
pub mod clipboard;
pub mod components;
pub mod config;
pub mod nav;
pub mod tui;
pub mod utils;
