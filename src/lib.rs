//! A Telegram bot for space enthusiasts: the astronomy picture of the day,
//! a searchable space-news feed, a planet and mission catalog with a trivia
//! quiz, a link to NASA's 3D orrery, and per-chat color themes.

pub mod apod;
pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod news;
pub mod orrery;
pub mod quiz;
pub mod render;
pub mod send;
pub mod theme;
