//! Commandes clavier lues sur stdin.

use anyhow::{Result, anyhow, bail};
use halloscheduler::{AssetId, MediaFile, PlaybackScheduler, PoolKind};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// Commande de l'opérateur
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    TogglePause,
    Skip,
    Jump,
    Stop,
    ToggleAutoRestart,
    ZoomIn,
    ZoomOut,
    ForceProgram(AssetId),
    ForceBumper(AssetId),
    ForceBumperAudio(AssetId),
    ForceLogo(AssetId),
    Add(PoolKind, PathBuf),
    Remove(AssetId),
    /// Export, sous le nom interne par défaut si aucun nom n'est donné
    Export(Option<String>),
    List,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        // Une ligne faite d'espaces vaut la barre d'espace
        if !line.is_empty() && line.trim().is_empty() {
            return Ok(Command::TogglePause);
        }

        let line = line.trim();
        let (word, arg) = match line.split_once(char::is_whitespace) {
            Some((word, arg)) => (word, arg.trim()),
            None => (line, ""),
        };

        let id = || -> Result<AssetId> {
            if arg.is_empty() {
                bail!("'{}' needs an asset id", word);
            }
            Ok(AssetId::from(arg))
        };

        let command = match word {
            "r" => Command::Start,
            "p" => Command::TogglePause,
            "s" => Command::Skip,
            "d" => Command::Jump,
            "x" => Command::Stop,
            "a" => Command::ToggleAutoRestart,
            "+" => Command::ZoomIn,
            "-" => Command::ZoomOut,
            "f" => Command::ForceProgram(id()?),
            "b" => Command::ForceBumper(id()?),
            "ba" => Command::ForceBumperAudio(id()?),
            "l" => Command::ForceLogo(id()?),
            "rm" => Command::Remove(id()?),
            "add" => parse_add(arg)?,
            "e" => Command::Export((!arg.is_empty()).then(|| arg.to_string())),
            "ls" => Command::List,
            "h" | "?" | "help" => Command::Help,
            "q" | "quit" => Command::Quit,
            other => bail!("Unknown command '{}' (h for help)", other),
        };
        Ok(command)
    }
}

/// `add <program|bumper|audio|logo> <path>`
fn parse_add(arg: &str) -> Result<Command> {
    let (kind, path) = arg
        .split_once(char::is_whitespace)
        .ok_or_else(|| anyhow!("usage: add <program|bumper|audio|logo> <path>"))?;
    let kind = match kind {
        "program" => PoolKind::Programs,
        "bumper" => PoolKind::Bumpers,
        "audio" => PoolKind::BumperAudios,
        "logo" => PoolKind::Logos,
        other => bail!("Unknown pool '{}'", other),
    };
    Ok(Command::Add(kind, PathBuf::from(path.trim())))
}

/// Pool of a generated id, from its prefix.
pub fn pool_of(id: &AssetId) -> Option<PoolKind> {
    // "bumper-audio-" doit être testé avant "bumper-"
    [
        PoolKind::BumperAudios,
        PoolKind::Programs,
        PoolKind::Bumpers,
        PoolKind::Logos,
    ]
    .into_iter()
    .find(|kind| {
        id.as_str()
            .strip_prefix(kind.id_prefix())
            .is_some_and(|rest| rest.starts_with('-'))
    })
}

pub const HELP: &str = "\
r            start playback
p | <space>  pause / resume
s            skip to the bumper
d            jump forward
x            stop
a            toggle auto-restart
+ | -        zoom in / out
f <id>       force-play a program
b <id>       force-play a bumper
ba <id>      force-play a bumper audio
l <id>       force-play a logo
add <program|bumper|audio|logo> <path>
rm <id>      remove an asset
e [name]     export the project
ls           list pools
q            quit";

/// Réglages de la console issus de la configuration
#[derive(Debug, Clone)]
pub struct ConsoleSettings {
    pub jump: Duration,
    pub scale_step: f64,
    pub project_dir: PathBuf,
    pub internal_name: String,
}

/// Reads commands from stdin until `q` or end of input.
pub async fn run(scheduler: PlaybackScheduler, settings: ConsoleSettings) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", HELP);

    while let Some(line) = lines.next_line().await? {
        if line.is_empty() {
            continue;
        }
        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(command) => execute(&scheduler, &settings, command).await,
            Err(e) => println!("{}", e),
        }
    }
    Ok(())
}

async fn execute(scheduler: &PlaybackScheduler, settings: &ConsoleSettings, command: Command) {
    match command {
        Command::Start => {
            if let Err(e) = scheduler.start_playback() {
                println!("{}", e);
            }
        }
        Command::TogglePause => {
            scheduler.toggle_pause();
        }
        Command::Skip => {
            if !scheduler.skip_to_next_program() {
                println!("No program playing");
            }
        }
        Command::Jump => {
            if !scheduler.jump_forward(settings.jump) {
                println!("No program playing");
            }
        }
        Command::Stop => scheduler.stop_playback(),
        Command::ToggleAutoRestart => {
            let enabled = !scheduler.auto_restart();
            scheduler.set_auto_restart(enabled);
            println!("Auto-restart {}", if enabled { "on" } else { "off" });
        }
        Command::ZoomIn => zoom(scheduler, settings.scale_step),
        Command::ZoomOut => zoom(scheduler, -settings.scale_step),
        Command::ForceProgram(id) => force_play(scheduler, PoolKind::Programs, id),
        Command::ForceBumper(id) => force_play(scheduler, PoolKind::Bumpers, id),
        Command::ForceBumperAudio(id) => force_play(scheduler, PoolKind::BumperAudios, id),
        Command::ForceLogo(id) => force_play(scheduler, PoolKind::Logos, id),
        Command::Add(kind, path) => {
            let media = MediaFile::new(path);
            let id = match kind {
                PoolKind::Programs => scheduler.add_program(media),
                PoolKind::Bumpers => scheduler.add_bumper(media),
                PoolKind::BumperAudios => scheduler.add_bumper_audio(media),
                PoolKind::Logos => scheduler.add_logo(media),
            };
            println!("Added {}", id);
        }
        Command::Remove(id) => {
            let removed = match pool_of(&id) {
                Some(PoolKind::Programs) => scheduler.remove_program(&id).map(|_| ()),
                Some(PoolKind::Bumpers) => scheduler.remove_bumper(&id).map(|_| ()),
                Some(PoolKind::BumperAudios) => scheduler.remove_bumper_audio(&id).map(|_| ()),
                Some(PoolKind::Logos) => scheduler.remove_logo(&id).map(|_| ()),
                None => {
                    println!("Cannot tell the pool of '{}'", id);
                    return;
                }
            };
            match removed {
                Ok(()) => println!("Removed {}", id),
                Err(e) => println!("{}", e),
            }
        }
        Command::Export(name) => {
            let name = name.unwrap_or_else(|| settings.internal_name.clone());
            match halloproject::export_project(scheduler, &name, &settings.project_dir).await {
                Ok(summary) => println!("Exported to {}", summary.document.display()),
                Err(e) => println!("Export failed: {}", e),
            }
        }
        Command::List => list(scheduler),
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
}

fn zoom(scheduler: &PlaybackScheduler, delta: f64) {
    match scheduler.scale_current_by(delta) {
        Ok(Some(scale)) => println!("Zoom {:.2}", scale),
        Ok(None) => println!("No program playing"),
        Err(e) => println!("{}", e),
    }
}

/// Lance le force-play en tâche de fond pour garder la console réactive
fn force_play(scheduler: &PlaybackScheduler, kind: PoolKind, id: AssetId) {
    let scheduler = scheduler.clone();
    tokio::spawn(async move {
        let result = match kind {
            PoolKind::Programs => scheduler.force_play_program(&id).await,
            PoolKind::Bumpers => scheduler.force_play_bumper(&id).await,
            PoolKind::BumperAudios => scheduler.force_play_bumper_audio(&id).await,
            PoolKind::Logos => scheduler.force_play_logo(&id).await,
        };
        match result {
            Ok(outcome) => info!(asset_id = %id, "Force-play ended: {:?}", outcome),
            Err(e) => warn!(asset_id = %id, "Force-play failed: {}", e),
        }
    });
}

fn list(scheduler: &PlaybackScheduler) {
    let status = scheduler.status();
    let stats = scheduler.stats();
    println!(
        "Status: {:?}, auto-restart: {}, cycles: {}, failures: {}",
        status,
        scheduler.auto_restart(),
        stats.cycles_started,
        stats.render_failures
    );
    if let Some(active) = scheduler.current_stage() {
        println!("Now playing: {} {}", active.stage, active.asset_id);
    }

    for program in scheduler.programs() {
        let scale = scheduler
            .view_state(&program.id)
            .map(|v| v.scale)
            .unwrap_or(1.0);
        println!("  {:<16} {} (zoom {:.2})", program.id, program.media.name(), scale);
    }
    for bumper in scheduler.bumpers() {
        println!("  {:<16} {}", bumper.id, bumper.media.name());
    }
    for audio in scheduler.bumper_audios() {
        println!("  {:<16} {}", audio.id, audio.media.name());
    }
    for logo in scheduler.logos() {
        println!("  {:<16} {}", logo.id, logo.media.name());
    }
}
