//! PlaybackScheduler : rotation autonome programmes → bumpers → logos.

mod control;
mod cycle;
mod state;

use crate::asset::{AssetId, Bumper, BumperAudio, Logo, MediaFile, Program};
use crate::error::Result;
use crate::events::{
    ActiveStage, DeckSizes, PlaybackStats, PlaybackStatus, SchedulerEvent, EVENT_CHANNEL_CAPACITY,
};
use crate::sink::MediaSink;
use crate::view_state::{ViewState, ViewStates};
use crate::SchedulerConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;
use state::{PooledAsset, SchedulerState};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Structure interne du scheduler
struct SchedulerInner {
    sink: Arc<dyn MediaSink>,
    state: Mutex<SchedulerState>,
    /// Held for the whole duration of a render: the sink never sees two.
    render_gate: tokio::sync::Mutex<()>,
    /// Task running the autonomous loop, if any.
    driver: Mutex<Option<JoinHandle<()>>>,
    event_tx: broadcast::Sender<SchedulerEvent>,
}

/// Rotates programs, bumpers and logos on a [`MediaSink`].
///
/// Cloning is cheap and every clone drives the same scheduler.
///
/// # Exemple
///
/// ```no_run
/// use halloscheduler::{MediaFile, PlaybackScheduler, SchedulerConfig};
/// # use std::sync::Arc;
/// # async fn demo(sink: Arc<dyn halloscheduler::MediaSink>) -> halloscheduler::Result<()> {
/// let scheduler = PlaybackScheduler::new(sink, SchedulerConfig::default());
/// scheduler.add_program(MediaFile::new("night.mp4"));
/// scheduler.add_bumper(MediaFile::new("bat.mp4"));
/// scheduler.add_bumper_audio(MediaFile::new("howl.mp3"));
/// scheduler.add_logo(MediaFile::new("pumpkin.png"));
///
/// scheduler.start_playback()?;
/// scheduler.join().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PlaybackScheduler {
    inner: Arc<SchedulerInner>,
}

impl PlaybackScheduler {
    /// Creates an idle scheduler with empty pools.
    pub fn new(sink: Arc<dyn MediaSink>, config: SchedulerConfig) -> Self {
        Self::with_rng(sink, config, StdRng::from_os_rng())
    }

    /// Same as [`PlaybackScheduler::new`] with a reproducible draw order.
    pub fn with_seed(sink: Arc<dyn MediaSink>, config: SchedulerConfig, seed: u64) -> Self {
        Self::with_rng(sink, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(sink: Arc<dyn MediaSink>, config: SchedulerConfig, rng: StdRng) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                sink,
                state: Mutex::new(SchedulerState::new(&config, rng)),
                render_gate: tokio::sync::Mutex::new(()),
                driver: Mutex::new(None),
                event_tx: broadcast::channel(EVENT_CHANNEL_CAPACITY).0,
            }),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, SchedulerState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_driver(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.inner
            .driver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: SchedulerEvent) {
        // Pas d'abonné : l'évènement est simplement perdu
        let _ = self.inner.event_tx.send(event);
    }

    fn sink(&self) -> &dyn MediaSink {
        self.inner.sink.as_ref()
    }

    /// Subscribes to scheduler events.
    pub fn subscribe(&self) -> broadcast::Receiver<SchedulerEvent> {
        self.inner.event_tx.subscribe()
    }

    // --- Pools ---

    fn add<T: PooledAsset>(&self, media: MediaFile) -> AssetId {
        let asset = T::pool_mut(&mut self.lock_state()).add(media);
        debug!(pool = %T::KIND, id = %asset.id(), file = %asset.media().name(), "Asset added");
        asset.id().clone()
    }

    fn insert<T: PooledAsset>(&self, asset: T) -> Result<()> {
        let id = asset.id().clone();
        T::pool_mut(&mut self.lock_state()).insert(asset)?;
        debug!(pool = %T::KIND, id = %id, "Asset inserted");
        Ok(())
    }

    fn remove<T: PooledAsset>(&self, id: &AssetId) -> Result<T> {
        let mut state = self.lock_state();
        let removed = T::pool_mut(&mut state).remove(id)?;
        let dropped = T::deck_mut(&mut state).remove_where(|a| a.id() == id);
        debug!(pool = %T::KIND, id = %id, from_deck = dropped, "Asset removed");
        Ok(removed)
    }

    fn list<T: PooledAsset>(&self) -> Vec<T> {
        T::pool(&self.lock_state()).as_slice().to_vec()
    }

    /// Adds a program under a generated id and returns that id.
    pub fn add_program(&self, media: MediaFile) -> AssetId {
        self.add::<Program>(media)
    }

    pub fn add_bumper(&self, media: MediaFile) -> AssetId {
        self.add::<Bumper>(media)
    }

    pub fn add_bumper_audio(&self, media: MediaFile) -> AssetId {
        self.add::<BumperAudio>(media)
    }

    pub fn add_logo(&self, media: MediaFile) -> AssetId {
        self.add::<Logo>(media)
    }

    /// Adds a program that already has an id, as when restoring a project.
    ///
    /// # Errors
    ///
    /// `DuplicateAsset` if the id is taken.
    pub fn insert_program(&self, program: Program) -> Result<()> {
        self.insert(program)
    }

    pub fn insert_bumper(&self, bumper: Bumper) -> Result<()> {
        self.insert(bumper)
    }

    pub fn insert_bumper_audio(&self, audio: BumperAudio) -> Result<()> {
        self.insert(audio)
    }

    pub fn insert_logo(&self, logo: Logo) -> Result<()> {
        self.insert(logo)
    }

    /// Removes a program from its pool and from the working deck, and drops
    /// its view-state. A program already rendering plays to the end.
    pub fn remove_program(&self, id: &AssetId) -> Result<Program> {
        let program = self.remove::<Program>(id)?;
        self.lock_state().view_states.remove(id);
        Ok(program)
    }

    pub fn remove_bumper(&self, id: &AssetId) -> Result<Bumper> {
        self.remove(id)
    }

    pub fn remove_bumper_audio(&self, id: &AssetId) -> Result<BumperAudio> {
        self.remove(id)
    }

    pub fn remove_logo(&self, id: &AssetId) -> Result<Logo> {
        self.remove(id)
    }

    /// Stops playback and empties every pool, deck and view-state.
    ///
    /// The auto-restart flag is kept.
    pub fn clear_all(&self) {
        self.stop_playback();
        let mut state = self.lock_state();
        state.programs.clear();
        state.bumpers.clear();
        state.bumper_audios.clear();
        state.logos.clear();
        state.clear_decks();
        state.view_states.clear();
        info!("All pools cleared");
    }

    pub fn programs(&self) -> Vec<Program> {
        self.list()
    }

    pub fn bumpers(&self) -> Vec<Bumper> {
        self.list()
    }

    pub fn bumper_audios(&self) -> Vec<BumperAudio> {
        self.list()
    }

    pub fn logos(&self) -> Vec<Logo> {
        self.list()
    }

    // --- Introspection ---

    pub fn status(&self) -> PlaybackStatus {
        self.lock_state().status
    }

    pub fn current_stage(&self) -> Option<ActiveStage> {
        self.lock_state().active.clone()
    }

    pub fn is_paused(&self) -> bool {
        self.lock_state().paused
    }

    pub fn auto_restart(&self) -> bool {
        self.lock_state().auto_restart
    }

    /// When set, an exhausted program deck is refilled and the rotation
    /// goes on until stopped.
    pub fn set_auto_restart(&self, enabled: bool) {
        self.lock_state().auto_restart = enabled;
        info!(enabled, "Auto-restart updated");
    }

    pub fn stats(&self) -> PlaybackStats {
        self.lock_state().stats
    }

    pub fn deck_sizes(&self) -> DeckSizes {
        self.lock_state().deck_sizes()
    }

    // --- View-state ---

    pub fn view_state(&self, id: &AssetId) -> Option<ViewState> {
        self.lock_state().view_states.get(id)
    }

    pub fn view_states(&self) -> ViewStates {
        self.lock_state().view_states.clone()
    }

    /// Records the view-state of a program, known or not yet added.
    ///
    /// # Errors
    ///
    /// `InvalidScale` if `state.scale` is not a positive finite number.
    pub fn set_program_position(&self, id: &AssetId, state: ViewState) -> Result<()> {
        crate::view_state::validate_scale(state.scale)?;
        self.lock_state().view_states.set(id.clone(), state);
        Ok(())
    }

    /// Waits for the autonomous loop to finish (after `Done` or a stop).
    ///
    /// Returns at once when no loop is running.
    pub async fn join(&self) {
        let driver = self.lock_driver().take();
        if let Some(task) = driver {
            if let Err(e) = task.await {
                tracing::error!("Playback loop ended abnormally: {}", e);
            }
        }
    }
}
