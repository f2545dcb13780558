//! Commandes de l'opérateur : start/stop, force-play, pause, skip, zoom.

use super::state::ReshuffledAsset;
use super::PlaybackScheduler;
use crate::asset::{AssetId, Bumper, BumperAudio, PoolKind, Stage};
use crate::error::{Error, Result};
use crate::events::{PlaybackStatus, SchedulerEvent, StageOutcome};
use crate::view_state::{validate_scale, MIN_SCALE};
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, error, info};

impl PlaybackScheduler {
    /// Starts the autonomous cycle loop.
    ///
    /// Fresh decks are cut from the four pools. Calling it while already
    /// running does nothing; calling it during a force-play takes over once
    /// the forced stage has ended.
    ///
    /// # Errors
    ///
    /// - `Precondition` when the bumper, bumper-audio or logo pool is empty
    ///   (nothing is changed then)
    /// - `NoRuntime` outside a tokio runtime
    pub fn start_playback(&self) -> Result<()> {
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;

        let generation = {
            let mut state = self.lock_state();
            if state.status == PlaybackStatus::Running {
                debug!("Playback already running");
                return Ok(());
            }
            let missing = state.missing_pools();
            if !missing.is_empty() {
                return Err(Error::Precondition { missing });
            }
            let generation = state.advance_generation();
            state.snapshot_decks();
            state.status = PlaybackStatus::Running;
            generation
        };

        self.sink().clear_done_screen();
        info!(generation, "Playback started");
        self.emit(SchedulerEvent::StatusChanged {
            status: PlaybackStatus::Running,
        });

        let task = runtime.spawn(self.clone().run_loop(generation));
        *self.lock_driver() = Some(task);
        Ok(())
    }

    /// Stops everything at once: the sink is cleared even if a stage is
    /// still pending, and no further cycle starts.
    pub fn stop_playback(&self) {
        let previous = {
            let mut state = self.lock_state();
            let previous = state.status;
            state.interrupt();
            state.status = PlaybackStatus::Idle;
            state.active = None;
            previous
        };

        self.sink().stop();
        if previous != PlaybackStatus::Idle {
            info!(from = ?previous, "Playback stopped");
            self.emit(SchedulerEvent::StatusChanged {
                status: PlaybackStatus::Idle,
            });
        }
    }

    /// Takes the sink away from the loop (or a previous force-play) and
    /// waits until the loop has drained.
    ///
    /// The stage in flight is not cut short: the loop stops after it. A
    /// paused stage is resumed so the drain can end.
    async fn preempt(&self) -> u64 {
        let (generation, was_paused) = {
            let mut state = self.lock_state();
            let generation = state.advance_generation();
            state.status = PlaybackStatus::Preempted;
            (generation, std::mem::take(&mut state.paused))
        };

        if was_paused {
            self.sink().set_paused(false);
        }
        self.sink().clear_done_screen();
        info!(generation, "Playback preempted");
        self.emit(SchedulerEvent::StatusChanged {
            status: PlaybackStatus::Preempted,
        });

        self.join().await;
        generation
    }

    fn finish_preemption(
        &self,
        generation: u64,
        result: Result<StageOutcome>,
    ) -> Result<StageOutcome> {
        let back_to_idle = {
            let mut state = self.lock_state();
            if state.generation == generation && state.status == PlaybackStatus::Preempted {
                state.status = PlaybackStatus::Idle;
                true
            } else {
                false
            }
        };
        if back_to_idle {
            self.emit(SchedulerEvent::StatusChanged {
                status: PlaybackStatus::Idle,
            });
        }

        if let Err(e) = &result {
            error!("Force-play failed: {}", e);
        }
        result
    }

    /// Interrupts whatever plays and plays one program. The autonomous loop
    /// does not resume afterwards.
    ///
    /// # Errors
    ///
    /// - `UnknownAsset` if no program has this id
    /// - `RenderFailure` if the sink could not play it
    pub async fn force_play_program(&self, id: &AssetId) -> Result<StageOutcome> {
        let program = self.lock_state().programs.lookup(id)?;

        let generation = self.preempt().await;
        let view = self.lock_state().view_states.get_or_seed(&program.id);
        let result = self
            .render_stage(
                Stage::Program,
                program.id.clone(),
                generation,
                self.sink().play_program(&program, view),
            )
            .await;
        self.finish_preemption(generation, result)
    }

    /// Force-plays a bumper with an audio track drawn from the audio deck.
    ///
    /// # Errors
    ///
    /// `UnknownAsset`, `Precondition` when there is no audio to pair it
    /// with, or `RenderFailure`.
    pub async fn force_play_bumper(&self, id: &AssetId) -> Result<StageOutcome> {
        let mut events = Vec::new();
        let (bumper, audio, duration) = {
            let mut state = self.lock_state();
            let bumper = state.bumpers.lookup(id)?;
            let audio = BumperAudio::draw_reporting(&mut state, &mut events).ok_or_else(|| {
                Error::Precondition {
                    missing: vec![PoolKind::BumperAudios],
                }
            })?;
            (bumper, audio, state.bumper_duration)
        };
        for event in events {
            self.emit(event);
        }

        let generation = self.preempt().await;
        let result = self
            .render_stage(
                Stage::Bumper,
                bumper.id.clone(),
                generation,
                self.sink().play_bumper(&bumper, &audio, duration),
            )
            .await;
        self.finish_preemption(generation, result)
    }

    /// Force-plays a bumper audio over a bumper drawn from the bumper deck.
    ///
    /// # Errors
    ///
    /// `UnknownAsset`, `Precondition` when there is no bumper, or
    /// `RenderFailure`.
    pub async fn force_play_bumper_audio(&self, id: &AssetId) -> Result<StageOutcome> {
        let mut events = Vec::new();
        let (bumper, audio, duration) = {
            let mut state = self.lock_state();
            let audio = state.bumper_audios.lookup(id)?;
            let bumper = Bumper::draw_reporting(&mut state, &mut events).ok_or_else(|| {
                Error::Precondition {
                    missing: vec![PoolKind::Bumpers],
                }
            })?;
            (bumper, audio, state.bumper_duration)
        };
        for event in events {
            self.emit(event);
        }

        let generation = self.preempt().await;
        let result = self
            .render_stage(
                Stage::Bumper,
                bumper.id.clone(),
                generation,
                self.sink().play_bumper(&bumper, &audio, duration),
            )
            .await;
        self.finish_preemption(generation, result)
    }

    pub async fn force_play_logo(&self, id: &AssetId) -> Result<StageOutcome> {
        let (logo, duration) = {
            let state = self.lock_state();
            (state.logos.lookup(id)?, state.logo_duration)
        };

        let generation = self.preempt().await;
        let result = self
            .render_stage(
                Stage::Logo,
                logo.id.clone(),
                generation,
                self.sink().show_logo(&logo, duration),
            )
            .await;
        self.finish_preemption(generation, result)
    }

    /// Pauses or resumes the active stage and returns the new paused flag.
    ///
    /// Without an active stage nothing happens and `false` is returned.
    pub fn toggle_pause(&self) -> bool {
        let paused = {
            let mut state = self.lock_state();
            if state.active.is_none() {
                return false;
            }
            state.paused = !state.paused;
            state.paused
        };
        self.sink().set_paused(paused);
        debug!(paused, "Pause toggled");
        paused
    }

    /// Resolves the in-flight stage at once, as if it had ended.
    ///
    /// Returns `false` when no stage is rendering.
    pub fn cancel_current_stage(&self) -> bool {
        let state = self.lock_state();
        match &state.active {
            Some(active) => {
                debug!(stage = %active.stage, asset_id = %active.asset_id, "Cancelling stage");
                state.stage_token.cancel();
                true
            }
            None => false,
        }
    }

    /// Ends the current program early; the cycle goes on with its bumper.
    ///
    /// Bumpers and logos cannot be skipped.
    pub fn skip_to_next_program(&self) -> bool {
        let state = self.lock_state();
        match &state.active {
            Some(active) if active.stage == Stage::Program => {
                info!(asset_id = %active.asset_id, "Program skipped");
                state.stage_token.cancel();
                true
            }
            _ => false,
        }
    }

    /// Seeks the active program forward. No effect outside a program stage.
    pub fn jump_forward(&self, by: Duration) -> bool {
        if !self.program_is_active() {
            return false;
        }
        self.sink().jump_forward(by);
        debug!(seconds = by.as_secs_f64(), "Jumped forward");
        true
    }

    fn program_is_active(&self) -> bool {
        matches!(
            self.lock_state().active,
            Some(ref active) if active.stage == Stage::Program
        )
    }

    /// Sets the zoom of the active program and records it in its view-state.
    ///
    /// Returns the id of the program that was zoomed, if any.
    pub fn set_current_scale(&self, scale: f64) -> Result<Option<AssetId>> {
        let scale = validate_scale(scale)?;
        let zoomed = {
            let mut state = self.lock_state();
            match state.active.clone() {
                Some(active) if active.stage == Stage::Program => {
                    state.view_states.set_scale(&active.asset_id, scale);
                    Some(active.asset_id)
                }
                _ => None,
            }
        };
        if zoomed.is_some() {
            self.sink().set_scale(scale);
        }
        Ok(zoomed)
    }

    /// Adds `delta` to the zoom of the active program, never going below
    /// [`MIN_SCALE`]. Returns the new scale.
    pub fn scale_current_by(&self, delta: f64) -> Result<Option<f64>> {
        if !delta.is_finite() {
            return Err(Error::InvalidScale(delta));
        }
        let scale = {
            let mut state = self.lock_state();
            match state.active.clone() {
                Some(active) if active.stage == Stage::Program => {
                    let current = state.view_states.get_or_seed(&active.asset_id).scale;
                    let scale = validate_scale((current + delta).max(MIN_SCALE))?;
                    state.view_states.set_scale(&active.asset_id, scale);
                    Some(scale)
                }
                _ => None,
            }
        };
        if let Some(scale) = scale {
            self.sink().set_scale(scale);
            debug!(scale, "Zoom updated");
        }
        Ok(scale)
    }
}
