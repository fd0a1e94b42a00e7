//! # cps-scaffold
//!
//! Terminal client for the CPS scaffolding backend.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │              apps/cps-scaffold (THE CLIENT)          │
//! │                                                      │
//! │  ┌──────────┐   ┌──────────────┐   ┌─────────────┐   │
//! │  │   CLI    │──▶│  Controller  │──▶│  ApiClient  │──▶ backend
//! │  │  (clap)  │   │   (tokio)    │   │  (reqwest)  │   │
//! │  └──────────┘   └──────┬───────┘   └─────────────┘   │
//! │                        ▼                             │
//! │                ┌───────────────┐                     │
//! │                │   cps-core    │                     │
//! │                │  (THE LOGIC)  │                     │
//! │                └───────────────┘                     │
//! └──────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod controller;
pub mod render;
pub mod transport;

pub use client::{ApiClient, TransportError};
pub use config::Config;
pub use controller::{ChatController, SubmitOutcome};
pub use transport::ChatTransport;
