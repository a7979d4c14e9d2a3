//! # Keepsake Core Library
//!
//! Core logic for Keepsake, a Valentine's keepsake app: a staged
//! celebration with particle effects, and a small CMS (posts, moods,
//! photos, ideas, writing prompts) over a hosted table/storage service.
//! The `keepsake` CLI is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Celebration**: caller-clocked state machines. Nothing here reads the
//!   wall clock or spawns tasks; the caller passes `now_ms` and invokes
//!   `tick()` to observe due transitions and particle expiry.
//! - **Gateway**: async trait over the remote tables and blob storage, with
//!   an HTTP implementation and an in-memory one.
//! - **Store**: typed record operations over an injected gateway.
//! - **Storage**: TOML-based configuration.
//!
//! ## Key Components
//!
//! - [`Celebration`]: stage sequencer plus effect emitter
//! - [`Gateway`]: remote data access, injected into every screen
//! - [`Store`]: posts, moods, photos, ideas and prompts
//! - [`Config`]: application configuration management

pub mod celebration;
pub mod error;
pub mod events;
pub mod gateway;
pub mod landing;
pub mod random;
pub mod records;
pub mod storage;
pub mod store;

pub use celebration::{
    Answer, Celebration, CelebrationStage, EffectEmitter, ParticleKind, StageSequencer,
};
pub use error::{ConfigError, CoreError, GatewayError, ValidationError};
pub use events::Event;
pub use gateway::{Entity, Gateway, MemoryGateway, Query, RestGateway, StoredBlob};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
pub use storage::Config;
pub use store::{DashboardStats, Store};
