//! Bingo Caller Library
//!
//! Core modules for the bingo number caller: pool generation, drawing,
//! the countdown between calls, spoken announcements and the session
//! that ties them together.

pub mod commands;
pub mod config;
pub mod countdown;
pub mod draw;
pub mod error;
pub mod narration;
pub mod pool;
pub mod render;
pub mod session;
pub mod terminal;
pub mod wake_lock;
