mod console;
mod logging;
mod sink;

use console::ConsoleSettings;
use halloconfig::get_config;
use halloscheduler::{PlaybackScheduler, SchedulerConfigExt, SchedulerEvent};
use sink::SimulatedSink;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ========== Configuration & logging ==========
    let config = get_config();
    logging::init_logging(&config);
    info!("🎃 Halloweeny starting (config in {})", config.directory());

    let sink = Arc::new(SimulatedSink::new(Duration::from_secs(
        config.get_program_seconds()?,
    )));
    let scheduler = PlaybackScheduler::new(sink, config.scheduler_config()?);

    // ========== Projet ==========
    let project_dir = match std::env::args().nth(1) {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from(config.get_project_dir()?),
    };
    match halloproject::import_project(&scheduler, &project_dir).await {
        Ok(summary) => info!(
            "✅ Project loaded from {}: {} programs, {} bumpers, {} bumper audios, {} logos",
            project_dir.display(),
            summary.counts.programs,
            summary.counts.bumpers,
            summary.counts.bumper_audios,
            summary.counts.logos
        ),
        Err(halloproject::Error::MissingDocument(_)) => {
            info!("No project in {}, starting empty", project_dir.display())
        }
        Err(e) => warn!("⚠️ Cannot load project from {}: {}", project_dir.display(), e),
    }

    tokio::spawn(log_events(scheduler.subscribe()));

    // ========== Console ==========
    let settings = ConsoleSettings {
        jump: Duration::from_secs(config.get_jump_seconds()?),
        scale_step: config.get_scale_step()?,
        project_dir,
        internal_name: config.get_internal_name()?,
    };

    tokio::select! {
        result = console::run(scheduler.clone(), settings) => result?,
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }

    scheduler.stop_playback();
    scheduler.join().await;
    info!("👋 Bye");
    Ok(())
}

/// Trace les évènements du scheduler
async fn log_events(mut events: broadcast::Receiver<SchedulerEvent>) {
    loop {
        match events.recv().await {
            Ok(SchedulerEvent::StatusChanged { status }) => info!("Status: {:?}", status),
            Ok(SchedulerEvent::ProgramsExhausted) => debug!("Program deck exhausted"),
            Ok(event) => debug!("{:?}", event),
            Err(broadcast::error::RecvError::Lagged(n)) => warn!("{} scheduler events lost", n),
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
