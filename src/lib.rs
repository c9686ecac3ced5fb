//! Course notes: a read-only course/topic/note API, a client for it, and a
//! server-rendered topic browser.

pub mod api;
pub mod catalog;
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod logging;
pub mod models;
pub mod render;
pub mod schema;
pub mod seed;
pub mod server;
pub mod viewer;
pub mod web;
