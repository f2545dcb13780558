//! Sink simulé : aucun décodage, seulement des attentes chronométrées.

use halloscheduler::{
    Bumper, BumperAudio, Logo, MediaFile, MediaSink, Program, RenderError, ViewState,
};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

/// Granularité de l'horloge simulée
const TICK: Duration = Duration::from_millis(100);

#[derive(Default)]
struct Transport {
    paused: bool,
    /// Avance demandée par `jump_forward`, consommée au prochain tick
    pending_jump: Duration,
}

/// Presents media by logging them and waiting for their duration.
///
/// Programs last `program_duration` since nothing is decoded. Pause freezes
/// the clock of every stage; jumps only shorten programs.
pub struct SimulatedSink {
    program_duration: Duration,
    tick: Duration,
    transport: Mutex<Transport>,
}

impl SimulatedSink {
    pub fn new(program_duration: Duration) -> Self {
        Self::with_tick(program_duration, TICK)
    }

    fn with_tick(program_duration: Duration, tick: Duration) -> Self {
        Self {
            program_duration,
            tick,
            transport: Mutex::new(Transport::default()),
        }
    }

    fn transport(&self) -> MutexGuard<'_, Transport> {
        self.transport
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Waits `duration` of unpaused time.
    async fn run_for(&self, duration: Duration, seekable: bool) {
        let mut remaining = duration;
        while !remaining.is_zero() {
            let paused = {
                let mut transport = self.transport();
                if seekable {
                    let jump = std::mem::take(&mut transport.pending_jump);
                    remaining = remaining.saturating_sub(jump);
                }
                transport.paused
            };
            if remaining.is_zero() {
                break;
            }

            let step = remaining.min(self.tick);
            tokio::time::sleep(step).await;
            if !paused {
                remaining -= step;
            }
        }
    }
}

async fn check_exists(media: &MediaFile) -> Result<(), RenderError> {
    let path: &Path = media.path();
    match tokio::fs::try_exists(path).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(RenderError::open(media.name(), "file not found")),
        Err(e) => Err(RenderError::open(media.name(), e.to_string())),
    }
}

#[async_trait::async_trait]
impl MediaSink for SimulatedSink {
    async fn play_program(&self, program: &Program, view: ViewState) -> Result<(), RenderError> {
        check_exists(&program.media).await?;
        self.transport().pending_jump = Duration::ZERO;
        info!(
            "🎬 Program {} ({}) at zoom {:.2}",
            program.id,
            program.media.name(),
            view.scale
        );
        self.run_for(self.program_duration, true).await;
        Ok(())
    }

    async fn play_bumper(
        &self,
        bumper: &Bumper,
        audio: &BumperAudio,
        duration: Duration,
    ) -> Result<(), RenderError> {
        check_exists(&bumper.media).await?;
        check_exists(&audio.media).await?;
        info!(
            "🦇 Bumper {} ({}) with {} ({}) for {}s",
            bumper.id,
            bumper.media.name(),
            audio.id,
            audio.media.name(),
            duration.as_secs()
        );
        self.run_for(duration, false).await;
        Ok(())
    }

    async fn show_logo(&self, logo: &Logo, duration: Duration) -> Result<(), RenderError> {
        check_exists(&logo.media).await?;
        info!(
            "🎃 Logo {} ({}) for {}s",
            logo.id,
            logo.media.name(),
            duration.as_secs()
        );
        self.run_for(duration, false).await;
        Ok(())
    }

    fn stop(&self) {
        let mut transport = self.transport();
        transport.paused = false;
        transport.pending_jump = Duration::ZERO;
        debug!("Simulated sink stopped");
    }

    fn show_done_screen(&self) {
        info!("👻 All programs played");
    }

    fn clear_done_screen(&self) {
        debug!("Done screen cleared");
    }

    fn set_paused(&self, paused: bool) {
        self.transport().paused = paused;
        info!("{}", if paused { "⏸ Paused" } else { "▶ Resumed" });
    }

    fn jump_forward(&self, by: Duration) {
        self.transport().pending_jump += by;
        info!("⏩ Jump forward {}s", by.as_secs());
    }

    fn set_scale(&self, scale: f64) {
        info!("🔍 Zoom {:.2}", scale);
    }
}
