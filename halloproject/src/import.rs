//! Import d'un répertoire de projet dans un scheduler.

use crate::document::{is_plain_filename, MediaEntry, ProjectDocument};
use crate::error::{Error, Result};
use crate::PoolCounts;
use halloscheduler::{
    Asset, Bumper, BumperAudio, Logo, MediaFile, PlaybackScheduler, PoolKind, Program,
};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Résultat d'un import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub document: PathBuf,
    /// Entrées effectivement ajoutées au scheduler
    pub counts: PoolCounts,
    /// Fichiers référencés par le document mais absents du répertoire
    pub missing_files: Vec<String>,
    /// Entrées refusées : id en double, ou nom de fichier qui sort du
    /// répertoire du projet
    pub rejected: usize,
}

/// Locates the single `*.json` document of a project directory.
pub async fn find_document(dir: impl AsRef<Path>) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| Error::io(dir, e))?;

    let mut found = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| Error::io(dir, e))? {
        let path = entry.path();
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json && path.is_file() {
            found.push(path);
        }
    }

    match found.len() {
        0 => Err(Error::MissingDocument(dir.to_path_buf())),
        1 => Ok(found.remove(0)),
        _ => {
            found.sort();
            Err(Error::AmbiguousDocument {
                dir: dir.to_path_buf(),
                found,
            })
        }
    }
}

/// Replaces the scheduler's pools with the content of a project directory.
///
/// Playback is stopped and every pool cleared before anything is added.
/// Entries whose file is not in `dir` are skipped with a warning, entries
/// whose file name is a path are rejected. Program positions are applied
/// first, then the `positions` map of the document for the programs that
/// were imported.
///
/// # Errors
///
/// `MissingDocument`, `AmbiguousDocument`, `Json` or `Io`. The scheduler is
/// left untouched when the document cannot be read.
pub async fn import_project(
    scheduler: &PlaybackScheduler,
    dir: impl AsRef<Path>,
) -> Result<ImportSummary> {
    let dir = dir.as_ref();
    let path = find_document(dir).await?;
    let document = ProjectDocument::load(&path).await?;
    info!(
        "Importing project '{}' from {} ({} entries)",
        document.name,
        path.display(),
        document.entry_count()
    );

    scheduler.clear_all();

    let mut summary = ImportSummary {
        document: path,
        ..ImportSummary::default()
    };

    let mut imported = HashSet::new();
    for entry in &document.programs {
        let media = MediaEntry {
            id: entry.id.clone(),
            filename: entry.filename.clone(),
        };
        if insert_entry(&media, dir, &mut summary, |p: Program| {
            scheduler.insert_program(p)
        })
        .await
        {
            imported.insert(entry.id.clone());
            if let Err(e) = scheduler.set_program_position(&entry.id, entry.position) {
                warn!(asset_id = %entry.id, "Ignoring position: {}", e);
            }
        }
    }
    for entry in &document.bumpers {
        insert_entry(entry, dir, &mut summary, |b: Bumper| {
            scheduler.insert_bumper(b)
        })
        .await;
    }
    for entry in &document.bumper_audios {
        insert_entry(entry, dir, &mut summary, |a: BumperAudio| {
            scheduler.insert_bumper_audio(a)
        })
        .await;
    }
    for entry in &document.logos {
        insert_entry(entry, dir, &mut summary, |l: Logo| {
            scheduler.insert_logo(l)
        })
        .await;
    }

    for (id, position) in document.positions.iter() {
        if !imported.contains(id) {
            debug!(asset_id = %id, "Position of a program not imported, ignored");
            continue;
        }
        if let Err(e) = scheduler.set_program_position(id, *position) {
            warn!(asset_id = %id, "Ignoring position: {}", e);
        }
    }
    scheduler.set_auto_restart(document.auto_restart);

    info!(
        "Imported {} programs, {} bumpers, {} bumper audios, {} logos ({} missing files)",
        summary.counts.programs,
        summary.counts.bumpers,
        summary.counts.bumper_audios,
        summary.counts.logos,
        summary.missing_files.len()
    );
    Ok(summary)
}

/// Inserts one entry if its file is present. Returns whether it was added.
async fn insert_entry<T, F>(
    entry: &MediaEntry,
    dir: &Path,
    summary: &mut ImportSummary,
    insert: F,
) -> bool
where
    T: Asset,
    F: FnOnce(T) -> halloscheduler::Result<()>,
{
    if !is_plain_filename(&entry.filename) {
        warn!(pool = %T::KIND, asset_id = %entry.id, "Unsafe file name {:?}, entry rejected", entry.filename);
        summary.rejected += 1;
        return false;
    }

    let path = dir.join(&entry.filename);
    let present = tokio::fs::try_exists(&path).await.unwrap_or(false);
    if !present {
        warn!(pool = %T::KIND, asset_id = %entry.id, "Missing file {}, entry skipped", entry.filename);
        summary.missing_files.push(entry.filename.clone());
        return false;
    }

    let asset = T::new(entry.id.clone(), MediaFile::with_name(&entry.filename, path));
    match insert(asset) {
        Ok(()) => {
            debug!(pool = %T::KIND, asset_id = %entry.id, "Entry imported");
            summary.counts.increment(T::KIND);
            true
        }
        Err(e) => {
            warn!(pool = %T::KIND, asset_id = %entry.id, "Entry rejected: {}", e);
            summary.rejected += 1;
            false
        }
    }
}

impl PoolCounts {
    fn increment(&mut self, kind: PoolKind) {
        match kind {
            PoolKind::Programs => self.programs += 1,
            PoolKind::Bumpers => self.bumpers += 1,
            PoolKind::BumperAudios => self.bumper_audios += 1,
            PoolKind::Logos => self.logos += 1,
        }
    }
}
