//! Evènements diffusés par le scheduler.

use crate::asset::{AssetId, PoolKind, Stage};
use serde::Serialize;

/// Capacité du canal broadcast des évènements.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Lifecycle state of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackStatus {
    /// Nothing is scheduled.
    Idle,
    /// The autonomous cycle loop is running.
    Running,
    /// A force-play is in progress.
    Preempted,
    /// Every program has played and auto-restart is off.
    Done,
}

/// How a render stage ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageOutcome {
    /// The sink reported natural completion.
    Completed,
    /// The stage was cut short by a skip, a stop or a preemption.
    Cancelled,
}

/// Stage currently rendering and the asset it renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveStage {
    pub stage: Stage,
    pub asset_id: AssetId,
}

/// Evènement émis par le scheduler.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchedulerEvent {
    StatusChanged {
        status: PlaybackStatus,
    },
    StageStarted {
        stage: Stage,
        asset_id: AssetId,
    },
    StageFinished {
        stage: Stage,
        asset_id: AssetId,
        outcome: StageOutcome,
    },
    StageFailed {
        stage: Stage,
        asset_id: AssetId,
        reason: String,
    },
    DeckReseeded {
        pool: PoolKind,
        size: usize,
    },
    ProgramsExhausted,
}

/// Counters accumulated since the scheduler was built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlaybackStats {
    pub cycles_started: u64,
    pub render_failures: u64,
    pub program_deck_reseeds: u64,
}

/// Remaining cards in each working deck.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeckSizes {
    pub programs: usize,
    pub bumpers: usize,
    pub bumper_audios: usize,
    pub logos: usize,
}
