//! Document de projet JSON et règles de nommage des fichiers exportés.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use halloscheduler::{
    Asset, AssetId, Bumper, BumperAudio, Logo, PlaybackScheduler, Program, ViewState, ViewStates,
};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};
use tracing::debug;

/// Entrée d'un programme : fichier exporté et vue mémorisée.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramEntry {
    pub id: AssetId,
    pub filename: String,
    #[serde(default)]
    pub position: ViewState,
}

/// Entrée d'un bumper, d'une piste audio ou d'un logo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaEntry {
    pub id: AssetId,
    pub filename: String,
}

/// Everything needed to rebuild a scheduler's pools on another machine.
///
/// Media bytes are not embedded: each entry names a file expected next to
/// the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub exported_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub programs: Vec<ProgramEntry>,
    #[serde(default)]
    pub bumpers: Vec<MediaEntry>,
    #[serde(default)]
    pub bumper_audios: Vec<MediaEntry>,
    #[serde(default)]
    pub logos: Vec<MediaEntry>,
    #[serde(default)]
    pub positions: ViewStates,
    #[serde(default)]
    pub auto_restart: bool,
}

/// `<name>-<id>.<ext>`, or `<name>-<id>` when the original has no extension.
pub fn media_filename(name: &str, id: &AssetId, extension: &str) -> String {
    with_extension(format!("{}-{}", name, id), extension)
}

/// `<name>-<id>-video.<ext>`
pub fn bumper_filename(name: &str, id: &AssetId, extension: &str) -> String {
    with_extension(format!("{}-{}-video", name, id), extension)
}

/// `<name>-config.json`
pub fn document_filename(name: &str) -> String {
    format!("{}-config.json", name)
}

fn with_extension(stem: String, extension: &str) -> String {
    if extension.is_empty() {
        stem
    } else {
        format!("{}.{}", stem, extension)
    }
}

/// Un nom de projet sert de préfixe de fichier : ni vide ni chemin.
pub fn validate_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if !is_plain_filename(trimmed) {
        return Err(Error::InvalidName(name.to_string()));
    }
    Ok(trimmed)
}

/// True when `filename` names an entry of a directory and nothing else:
/// no separator, no absolute path, no `.` or `..`.
pub(crate) fn is_plain_filename(filename: &str) -> bool {
    if filename.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(filename).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn media_entries<T: Asset>(
    name: &str,
    assets: &[T],
    filename: fn(&str, &AssetId, &str) -> String,
) -> Vec<MediaEntry> {
    assets
        .iter()
        .map(|asset| MediaEntry {
            id: asset.id().clone(),
            filename: filename(name, asset.id(), asset.media().extension()),
        })
        .collect()
}

/// Copie des quatre pools prise en une fois.
pub(crate) struct PoolSnapshot {
    pub programs: Vec<Program>,
    pub bumpers: Vec<Bumper>,
    pub bumper_audios: Vec<BumperAudio>,
    pub logos: Vec<Logo>,
}

impl PoolSnapshot {
    pub fn take(scheduler: &PlaybackScheduler) -> Self {
        Self {
            programs: scheduler.programs(),
            bumpers: scheduler.bumpers(),
            bumper_audios: scheduler.bumper_audios(),
            logos: scheduler.logos(),
        }
    }
}

impl ProjectDocument {
    /// Captures `pools` with the view-states and auto-restart flag of
    /// `scheduler`.
    pub(crate) fn from_snapshot(
        scheduler: &PlaybackScheduler,
        pools: &PoolSnapshot,
        name: &str,
    ) -> Result<Self> {
        let name = validate_name(name)?;
        let positions = scheduler.view_states();

        let programs = pools
            .programs
            .iter()
            .map(|program| ProgramEntry {
                id: program.id.clone(),
                filename: media_filename(name, &program.id, program.media.extension()),
                position: positions.get(&program.id).unwrap_or_default(),
            })
            .collect();

        Ok(Self {
            name: name.to_string(),
            exported_at: Some(Utc::now()),
            programs,
            bumpers: media_entries(name, &pools.bumpers, bumper_filename),
            bumper_audios: media_entries(name, &pools.bumper_audios, media_filename),
            logos: media_entries(name, &pools.logos, media_filename),
            positions,
            auto_restart: scheduler.auto_restart(),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sauvegarde le document
    pub async fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| Error::io(path, e))?;
        debug!("Saved project document to {}", path.display());
        Ok(())
    }

    /// Charge un document
    pub async fn load(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::io(path, e))?;
        let document = Self::from_json(&json)?;
        debug!("Loaded project document from {}", path.display());
        Ok(document)
    }

    pub fn entry_count(&self) -> usize {
        self.programs.len() + self.bumpers.len() + self.bumper_audios.len() + self.logos.len()
    }
}
