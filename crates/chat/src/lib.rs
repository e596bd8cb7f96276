//! Chat Gateway - bot interface for guided sale entry
//!
//! This crate connects the wizard engine to a Bot-API-compatible chat
//! gateway:
//! - **Bot API client** (`api`) - long-poll updates, send/edit messages
//! - **Events** (`events`) - typed inbound events adapted from raw updates
//! - **Commands** (`commands`) - `/newsale`, `/sale`, `/stats`, `/ranking`
//! - **Callback tokens** (`token`) - opaque button payload codec
//! - **Keyboards** (`keyboard`) - inline button grids
//! - **Handlers** (`handlers`) - event dispatch into the engine and stats
//! - **Poller** (`poller`) - update loop with reconnection backoff
//!
//! # Architecture
//!
//! ```text
//! Gateway Updates → UpdatePoller → ChatEvent → BotHandler → Wizard Engine
//!                                                  ↓
//!                                      OutboundAction → Bot API
//! ```

pub mod api;
pub mod commands;
pub mod events;
pub mod handlers;
pub mod keyboard;
pub mod poller;
pub mod token;
