//! Outils partagés par les tests d'intégration du scheduler

#![allow(dead_code)]

use halloscheduler::{
    Bumper, BumperAudio, Logo, MediaFile, MediaSink, PlaybackScheduler, Program, RenderError,
    SchedulerConfig, ViewState,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Appel reçu par le sink
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Program { id: String, scale: f64 },
    /// `play_program` reached its end (not recorded when cancelled)
    ProgramEnded(String),
    Bumper { id: String, audio_id: String, duration: Duration },
    Logo { id: String, duration: Duration },
    Stop,
    DoneScreen,
    ClearDoneScreen,
    Paused(bool),
    Jump(Duration),
    Scale(f64),
}

impl Call {
    pub fn is_render(&self) -> bool {
        matches!(
            self,
            Call::Program { .. } | Call::Bumper { .. } | Call::Logo { .. }
        )
    }
}

/// Sink de test qui enregistre tous les appels.
///
/// Les rendus se terminent immédiatement, sauf :
/// - les assets de `fail_ids`, qui échouent
/// - les programmes retenus (`hold_programs` ou à partir du n-ième appel),
///   qui restent en attente jusqu'à leur libération ou leur annulation
#[derive(Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<Call>>,
    fail_ids: Mutex<HashSet<String>>,
    hold_programs: AtomicBool,
    hold_program_from: AtomicUsize,
    program_calls: AtomicUsize,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail(&self, id: &str) {
        self.fail_ids.lock().unwrap().insert(id.to_string());
    }

    /// Every program call stays pending while set; clearing it lets the
    /// pending ones finish.
    pub fn hold_programs(&self, hold: bool) {
        self.hold_programs.store(hold, Ordering::SeqCst);
    }

    /// Program calls from the `n`-th one (1-based) stay pending.
    pub fn hold_program_from(&self, n: usize) {
        self.hold_program_from.store(n, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn renders(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_render).collect()
    }

    pub fn program_ids(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Program { id, .. } => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn is_held(&self, n: usize) -> bool {
        let from = self.hold_program_from.load(Ordering::SeqCst);
        self.hold_programs.load(Ordering::SeqCst) || (from > 0 && n >= from)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn outcome(&self, id: &str) -> Result<(), RenderError> {
        if self.fail_ids.lock().unwrap().contains(id) {
            Err(RenderError::open(id, "simulated failure"))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl MediaSink for RecordingSink {
    async fn play_program(&self, program: &Program, view: ViewState) -> Result<(), RenderError> {
        self.record(Call::Program {
            id: program.id.to_string(),
            scale: view.scale,
        });
        let n = self.program_calls.fetch_add(1, Ordering::SeqCst) + 1;
        while self.is_held(n) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.record(Call::ProgramEnded(program.id.to_string()));
        self.outcome(program.id.as_str())
    }

    async fn play_bumper(
        &self,
        bumper: &Bumper,
        audio: &BumperAudio,
        duration: Duration,
    ) -> Result<(), RenderError> {
        self.record(Call::Bumper {
            id: bumper.id.to_string(),
            audio_id: audio.id.to_string(),
            duration,
        });
        self.outcome(bumper.id.as_str())
    }

    async fn show_logo(&self, logo: &Logo, duration: Duration) -> Result<(), RenderError> {
        self.record(Call::Logo {
            id: logo.id.to_string(),
            duration,
        });
        self.outcome(logo.id.as_str())
    }

    fn stop(&self) {
        self.record(Call::Stop);
    }

    fn show_done_screen(&self) {
        self.record(Call::DoneScreen);
    }

    fn clear_done_screen(&self) {
        self.record(Call::ClearDoneScreen);
    }

    fn set_paused(&self, paused: bool) {
        self.record(Call::Paused(paused));
    }

    fn jump_forward(&self, by: Duration) {
        self.record(Call::Jump(by));
    }

    fn set_scale(&self, scale: f64) {
        self.record(Call::Scale(scale));
    }
}

/// Scheduler seeded for reproducible draws, with `programs` programs and one
/// bumper, bumper audio and logo.
pub fn scheduler_with(
    sink: &Arc<RecordingSink>,
    programs: usize,
    auto_restart: bool,
) -> PlaybackScheduler {
    let config = SchedulerConfig {
        auto_restart,
        ..SchedulerConfig::default()
    };
    let scheduler = PlaybackScheduler::with_seed(sink.clone(), config, 42);
    for i in 0..programs {
        scheduler.add_program(MediaFile::new(format!("programs/movie{}.mp4", i)));
    }
    scheduler.add_bumper(MediaFile::new("bumpers/bats.mp4"));
    scheduler.add_bumper_audio(MediaFile::new("bumpers/howl.mp3"));
    scheduler.add_logo(MediaFile::new("logos/pumpkin.png"));
    scheduler
}

/// Polls `cond` until it holds or `timeout` expires.
pub async fn wait_until(cond: impl Fn() -> bool, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    cond()
}

pub const TIMEOUT: Duration = Duration::from_secs(2);
