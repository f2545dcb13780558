//! # halloscheduler - Rotation autonome de programmes, bumpers et logos
//!
//! Cette crate pilote un écran de diffusion qui enchaîne sans fin :
//! - un programme (vidéo longue, jouée jusqu'au bout)
//! - un bumper (vidéo courte bouclée avec une piste audio tirée au hasard)
//! - un logo (image fixe)
//!
//! Chaque catégorie est tirée sans remise dans un « deck » mélangé. Les decks
//! de bumpers, d'audios et de logos se remélangent quand ils sont vides ; celui
//! des programmes ne repart que si l'auto-restart est actif.
//!
//! # Architecture
//!
//! - **PlaybackScheduler** : pools, decks, machine à états, préemption
//! - **MediaSink** : trait implémenté par la surface de rendu
//! - **Deck** / **Pool** : tirage sans remise et stockage des assets
//! - **ViewState** : zoom mémorisé par programme
//!
//! # Exemple d'utilisation
//!
//! ```no_run
//! use halloscheduler::{MediaFile, PlaybackScheduler, SchedulerConfig};
//! # use std::sync::Arc;
//!
//! # async fn run(sink: Arc<dyn halloscheduler::MediaSink>) -> halloscheduler::Result<()> {
//! let scheduler = PlaybackScheduler::new(sink, SchedulerConfig::default());
//! let id = scheduler.add_program(MediaFile::new("movies/nosferatu.mp4"));
//! scheduler.add_bumper(MediaFile::new("bumpers/bats.mp4"));
//! scheduler.add_bumper_audio(MediaFile::new("bumpers/howl.mp3"));
//! scheduler.add_logo(MediaFile::new("logos/pumpkin.png"));
//!
//! scheduler.start_playback()?;
//!
//! // Plus tard : l'opérateur veut revoir ce programme tout de suite
//! scheduler.force_play_program(&id).await?;
//! # Ok(())
//! # }
//! ```

mod asset;
mod config;
mod deck;
mod error;
mod events;
mod pool;
mod scheduler;
mod sink;
mod view_state;

#[cfg(feature = "halloconfig")]
mod config_ext;

// Réexports publics
pub use asset::{Asset, AssetId, Bumper, BumperAudio, Logo, MediaFile, PoolKind, Program, Stage};
pub use config::{SchedulerConfig, DEFAULT_BUMPER_DURATION, DEFAULT_LOGO_DURATION};
pub use deck::{draw_from_deck, reshuffle, Deck};
pub use error::{Error, RenderError, Result};
pub use events::{
    ActiveStage, DeckSizes, PlaybackStats, PlaybackStatus, SchedulerEvent, StageOutcome,
    EVENT_CHANNEL_CAPACITY,
};
pub use pool::Pool;
pub use scheduler::PlaybackScheduler;
pub use sink::MediaSink;
pub use view_state::{validate_scale, ViewState, ViewStates, MIN_SCALE};

#[cfg(feature = "halloconfig")]
pub use config_ext::SchedulerConfigExt;
