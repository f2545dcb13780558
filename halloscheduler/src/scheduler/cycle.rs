//! Boucle autonome et rendu d'un stage.

use super::state::CycleDraw;
use super::PlaybackScheduler;
use crate::asset::{AssetId, Stage};
use crate::error::{Error, RenderError, Result};
use crate::events::{ActiveStage, PlaybackStatus, SchedulerEvent, StageOutcome};
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How a cycle ended, as seen by the loop.
enum CycleEnd {
    Completed,
    /// The program deck ran dry with auto-restart off.
    Exhausted,
    /// A stop, a restart or a force-play took over.
    Interrupted,
}

impl PlaybackScheduler {
    pub(super) fn is_current(&self, generation: u64) -> bool {
        self.lock_state().generation == generation
    }

    /// Body of the task spawned by `start_playback`.
    pub(super) async fn run_loop(self, generation: u64) {
        info!(generation, "Playback loop started");
        loop {
            match self.execute_cycle(generation).await {
                CycleEnd::Completed => tokio::task::yield_now().await,
                CycleEnd::Exhausted => {
                    info!(generation, "All programs played, playback done");
                    break;
                }
                CycleEnd::Interrupted => {
                    debug!(generation, "Playback loop superseded");
                    break;
                }
            }
        }
    }

    /// Draws one cycle and renders its program, bumper and logo stages.
    ///
    /// A failing stage is logged and the next one still runs.
    async fn execute_cycle(&self, generation: u64) -> CycleEnd {
        let mut events = Vec::new();
        let (draw, bumper_duration, logo_duration) = {
            let mut state = self.lock_state();
            if state.generation != generation {
                return CycleEnd::Interrupted;
            }
            let draw = state.draw_cycle(&mut events);
            match draw {
                CycleDraw::Exhausted => {
                    state.status = PlaybackStatus::Done;
                    state.active = None;
                }
                CycleDraw::Ready { .. } => state.stats.cycles_started += 1,
            }
            (draw, state.bumper_duration, state.logo_duration)
        };
        for event in events {
            self.emit(event);
        }

        let (program, bumper, bumper_audio, logo) = match draw {
            CycleDraw::Exhausted => {
                // Sous le verrou : un start concurrent efface l'écran après nous
                let presented = {
                    let state = self.lock_state();
                    let current = state.generation == generation;
                    if current {
                        self.sink().stop();
                        self.sink().show_done_screen();
                    }
                    current
                };
                if !presented {
                    return CycleEnd::Interrupted;
                }
                self.emit(SchedulerEvent::ProgramsExhausted);
                self.emit(SchedulerEvent::StatusChanged {
                    status: PlaybackStatus::Done,
                });
                return CycleEnd::Exhausted;
            }
            CycleDraw::Ready {
                program,
                bumper,
                bumper_audio,
                logo,
            } => (program, bumper, bumper_audio, logo),
        };

        // 1. Programme
        let view = self.lock_state().view_states.get_or_seed(&program.id);
        if let Err(e) = self
            .render_stage(
                Stage::Program,
                program.id.clone(),
                generation,
                self.sink().play_program(&program, view),
            )
            .await
        {
            warn!(stage = %Stage::Program, asset_id = %program.id, "Stage failed: {}", e);
        }
        if !self.is_current(generation) {
            return CycleEnd::Interrupted;
        }

        // 2. Bumper vidéo + audio
        match (bumper, bumper_audio) {
            (Some(bumper), Some(audio)) => {
                if let Err(e) = self
                    .render_stage(
                        Stage::Bumper,
                        bumper.id.clone(),
                        generation,
                        self.sink().play_bumper(&bumper, &audio, bumper_duration),
                    )
                    .await
                {
                    warn!(
                        stage = %Stage::Bumper,
                        asset_id = %bumper.id,
                        audio_id = %audio.id,
                        "Stage failed: {}",
                        e
                    );
                }
            }
            _ => debug!("No bumper pair available, bumper stage skipped"),
        }
        if !self.is_current(generation) {
            return CycleEnd::Interrupted;
        }

        // 3. Logo
        match logo {
            Some(logo) => {
                if let Err(e) = self
                    .render_stage(
                        Stage::Logo,
                        logo.id.clone(),
                        generation,
                        self.sink().show_logo(&logo, logo_duration),
                    )
                    .await
                {
                    warn!(stage = %Stage::Logo, asset_id = %logo.id, "Stage failed: {}", e);
                }
            }
            None => debug!("No logo available, logo stage skipped"),
        }
        if !self.is_current(generation) {
            return CycleEnd::Interrupted;
        }

        CycleEnd::Completed
    }

    /// Renders one stage on the sink, racing it against the stage token.
    ///
    /// Nothing is rendered when `owner` is no longer the current generation;
    /// the stage then reports `Cancelled`.
    pub(super) async fn render_stage<F>(
        &self,
        stage: Stage,
        asset_id: AssetId,
        owner: u64,
        render: F,
    ) -> Result<StageOutcome>
    where
        F: Future<Output = std::result::Result<(), RenderError>>,
    {
        let _gate = self.inner.render_gate.lock().await;

        let token = {
            let mut state = self.lock_state();
            if state.generation != owner {
                debug!(%stage, asset_id = %asset_id, "Stage superseded before rendering");
                return Ok(StageOutcome::Cancelled);
            }
            let token = CancellationToken::new();
            state.stage_token = token.clone();
            state.paused = false;
            state.active = Some(ActiveStage {
                stage,
                asset_id: asset_id.clone(),
            });
            token
        };

        debug!(%stage, asset_id = %asset_id, generation = owner, "Stage started");
        self.emit(SchedulerEvent::StageStarted {
            stage,
            asset_id: asset_id.clone(),
        });

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            result = render => Some(result),
        };

        {
            let mut state = self.lock_state();
            state.active = None;
            state.paused = false;
            if let Some(Err(_)) = result {
                state.stats.render_failures += 1;
            }
        }

        match result {
            None => {
                // Le futur abandonné a pu laisser un média ouvert
                self.sink().stop();
                debug!(%stage, asset_id = %asset_id, "Stage cancelled");
                self.emit(SchedulerEvent::StageFinished {
                    stage,
                    asset_id,
                    outcome: StageOutcome::Cancelled,
                });
                Ok(StageOutcome::Cancelled)
            }
            Some(Ok(())) => {
                debug!(%stage, asset_id = %asset_id, "Stage completed");
                self.emit(SchedulerEvent::StageFinished {
                    stage,
                    asset_id,
                    outcome: StageOutcome::Completed,
                });
                Ok(StageOutcome::Completed)
            }
            Some(Err(source)) => {
                self.emit(SchedulerEvent::StageFailed {
                    stage,
                    asset_id: asset_id.clone(),
                    reason: source.to_string(),
                });
                Err(Error::RenderFailure {
                    stage,
                    asset_id,
                    source,
                })
            }
        }
    }
}
