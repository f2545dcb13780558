//! Mutable state shared by the scheduler handle and its playback loop.

use crate::asset::{Asset, Bumper, BumperAudio, Logo, PoolKind, Program};
use crate::deck::{draw_from_deck, reshuffle, Deck};
use crate::events::{ActiveStage, DeckSizes, PlaybackStats, PlaybackStatus, SchedulerEvent};
use crate::pool::Pool;
use crate::view_state::ViewStates;
use crate::SchedulerConfig;
use rand::rngs::StdRng;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Everything the scheduler mutates, behind one mutex.
///
/// The lock is never held across an await point.
pub(crate) struct SchedulerState {
    pub programs: Pool<Program>,
    pub bumpers: Pool<Bumper>,
    pub bumper_audios: Pool<BumperAudio>,
    pub logos: Pool<Logo>,

    pub program_deck: Deck<Program>,
    pub bumper_deck: Deck<Bumper>,
    pub bumper_audio_deck: Deck<BumperAudio>,
    pub logo_deck: Deck<Logo>,

    pub view_states: ViewStates,
    pub auto_restart: bool,
    pub bumper_duration: Duration,
    pub logo_duration: Duration,

    pub status: PlaybackStatus,
    /// Bumped by every start, stop and preemption. A stage only renders if
    /// the generation it was scheduled under is still current.
    pub generation: u64,
    pub active: Option<ActiveStage>,
    pub stage_token: CancellationToken,
    pub paused: bool,
    pub stats: PlaybackStats,
    pub rng: StdRng,
}

/// Outcome of the draw phase of a cycle.
pub(crate) enum CycleDraw {
    /// The program deck is exhausted and cannot be reseeded.
    Exhausted,
    Ready {
        program: Program,
        bumper: Option<Bumper>,
        bumper_audio: Option<BumperAudio>,
        logo: Option<Logo>,
    },
}

impl SchedulerState {
    pub fn new(config: &SchedulerConfig, rng: StdRng) -> Self {
        Self {
            programs: Pool::new(),
            bumpers: Pool::new(),
            bumper_audios: Pool::new(),
            logos: Pool::new(),
            program_deck: Deck::default(),
            bumper_deck: Deck::default(),
            bumper_audio_deck: Deck::default(),
            logo_deck: Deck::default(),
            view_states: ViewStates::new(),
            auto_restart: config.auto_restart,
            bumper_duration: config.bumper_duration,
            logo_duration: config.logo_duration,
            status: PlaybackStatus::Idle,
            generation: 0,
            active: None,
            stage_token: CancellationToken::new(),
            paused: false,
            stats: PlaybackStats::default(),
            rng,
        }
    }

    /// Pools that must be non-empty before the loop can start.
    pub fn missing_pools(&self) -> Vec<PoolKind> {
        let mut missing = Vec::new();
        if self.bumpers.is_empty() {
            missing.push(PoolKind::Bumpers);
        }
        if self.bumper_audios.is_empty() {
            missing.push(PoolKind::BumperAudios);
        }
        if self.logos.is_empty() {
            missing.push(PoolKind::Logos);
        }
        missing
    }

    /// Cuts fresh decks from all four pools.
    pub fn snapshot_decks(&mut self) {
        self.program_deck.reseed(self.programs.as_slice());
        self.bumper_deck.reseed(self.bumpers.as_slice());
        self.bumper_audio_deck.reseed(self.bumper_audios.as_slice());
        self.logo_deck.reseed(self.logos.as_slice());
    }

    pub fn clear_decks(&mut self) {
        self.program_deck.clear();
        self.bumper_deck.clear();
        self.bumper_audio_deck.clear();
        self.logo_deck.clear();
    }

    /// Bumps the generation. The stage already rendering runs to its end,
    /// but nothing scheduled under an older generation starts afterwards.
    pub fn advance_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Bumps the generation and cancels whatever stage is rendering.
    pub fn interrupt(&mut self) -> u64 {
        let generation = self.advance_generation();
        self.stage_token.cancel();
        self.paused = false;
        generation
    }

    pub fn deck_sizes(&self) -> DeckSizes {
        DeckSizes {
            programs: self.program_deck.len(),
            bumpers: self.bumper_deck.len(),
            bumper_audios: self.bumper_audio_deck.len(),
            logos: self.logo_deck.len(),
        }
    }

    /// Draws the program, bumper, bumper audio and logo of the next cycle.
    ///
    /// Nothing but the program is drawn when the program deck is exhausted.
    pub fn draw_cycle(&mut self, events: &mut Vec<SchedulerEvent>) -> CycleDraw {
        let Some(program) = self.draw_program(events) else {
            return CycleDraw::Exhausted;
        };
        let bumper = Bumper::draw_reporting(self, events);
        let bumper_audio = BumperAudio::draw_reporting(self, events);
        let logo = Logo::draw_reporting(self, events);

        debug!(
            program = %program.id,
            bumper = ?bumper.as_ref().map(|b| b.id.to_string()),
            bumper_audio = ?bumper_audio.as_ref().map(|a| a.id.to_string()),
            logo = ?logo.as_ref().map(|l| l.id.to_string()),
            "Cycle drawn"
        );

        CycleDraw::Ready {
            program,
            bumper,
            bumper_audio,
            logo,
        }
    }

    fn draw_program(&mut self, events: &mut Vec<SchedulerEvent>) -> Option<Program> {
        let Self {
            programs,
            program_deck,
            rng,
            auto_restart,
            stats,
            ..
        } = self;

        draw_from_deck(program_deck, rng, |deck, rng| {
            if !*auto_restart || programs.is_empty() {
                return None;
            }
            deck.reseed(programs.as_slice());
            stats.program_deck_reseeds += 1;
            debug!(size = deck.len(), "Program deck reseeded");
            events.push(SchedulerEvent::DeckReseeded {
                pool: PoolKind::Programs,
                size: deck.len(),
            });
            deck.draw(rng)
        })
    }
}

/// Gives generic code access to the pool and deck of an asset type.
pub(crate) trait PooledAsset: Asset {
    fn pool(state: &SchedulerState) -> &Pool<Self>;
    fn pool_mut(state: &mut SchedulerState) -> &mut Pool<Self>;
    fn deck_mut(state: &mut SchedulerState) -> &mut Deck<Self>;
}

/// Assets whose deck is reshuffled when it runs dry (everything but programs).
pub(crate) trait ReshuffledAsset: PooledAsset {
    fn draw(state: &mut SchedulerState) -> Option<Self>;

    /// Same as [`ReshuffledAsset::draw`], recording a reseed event if the
    /// deck had to be refilled.
    fn draw_reporting(state: &mut SchedulerState, events: &mut Vec<SchedulerEvent>) -> Option<Self> {
        let before = Self::deck_mut(state).generation();
        let drawn = Self::draw(state);
        if Self::deck_mut(state).generation() != before {
            let size = Self::pool(state).len();
            debug!(pool = %Self::KIND, size, "Deck reshuffled");
            events.push(SchedulerEvent::DeckReseeded {
                pool: Self::KIND,
                size,
            });
        }
        drawn
    }
}

macro_rules! impl_pooled_asset {
    ($asset:ty, $pool:ident, $deck:ident) => {
        impl PooledAsset for $asset {
            fn pool(state: &SchedulerState) -> &Pool<Self> {
                &state.$pool
            }

            fn pool_mut(state: &mut SchedulerState) -> &mut Pool<Self> {
                &mut state.$pool
            }

            fn deck_mut(state: &mut SchedulerState) -> &mut Deck<Self> {
                &mut state.$deck
            }
        }
    };
    ($asset:ty, $pool:ident, $deck:ident, reshuffled) => {
        impl_pooled_asset!($asset, $pool, $deck);

        impl ReshuffledAsset for $asset {
            fn draw(state: &mut SchedulerState) -> Option<Self> {
                draw_from_deck(
                    &mut state.$deck,
                    &mut state.rng,
                    reshuffle(state.$pool.as_slice()),
                )
            }
        }
    };
}

impl_pooled_asset!(Program, programs, program_deck);
impl_pooled_asset!(Bumper, bumpers, bumper_deck, reshuffled);
impl_pooled_asset!(BumperAudio, bumper_audios, bumper_audio_deck, reshuffled);
impl_pooled_asset!(Logo, logos, logo_deck, reshuffled);
