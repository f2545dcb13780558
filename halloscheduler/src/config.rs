//! Réglages du scheduler.

use std::time::Duration;

/// Durée par défaut d'un bumper.
pub const DEFAULT_BUMPER_DURATION: Duration = Duration::from_secs(10);

/// Durée par défaut d'affichage d'un logo.
pub const DEFAULT_LOGO_DURATION: Duration = Duration::from_secs(4);

/// Settings a [`PlaybackScheduler`](crate::PlaybackScheduler) is built with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// How long a bumper (video + audio) plays.
    pub bumper_duration: Duration,
    /// How long a logo stays on screen.
    pub logo_duration: Duration,
    /// Reseed the program deck instead of stopping once every program played.
    pub auto_restart: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            bumper_duration: DEFAULT_BUMPER_DURATION,
            logo_duration: DEFAULT_LOGO_DURATION,
            auto_restart: false,
        }
    }
}
