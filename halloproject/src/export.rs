//! Export d'un scheduler vers un répertoire de projet.

use crate::document::{document_filename, PoolSnapshot, ProjectDocument};
use crate::error::{Error, Result};
use crate::PoolCounts;
use halloscheduler::{Asset, PlaybackScheduler};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Résultat d'un export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    /// Chemin du document JSON écrit
    pub document: PathBuf,
    pub counts: PoolCounts,
}

/// Writes `<name>-config.json` and a copy of every media file into `dir`.
///
/// The directory is created if needed. Existing files with the same names
/// are overwritten.
///
/// # Errors
///
/// - `InvalidName` if `name` cannot be used as a file prefix
/// - `Io` if a media file cannot be copied or the document written
pub async fn export_project(
    scheduler: &PlaybackScheduler,
    name: &str,
    dir: impl AsRef<Path>,
) -> Result<ExportSummary> {
    let dir = dir.as_ref();
    let pools = PoolSnapshot::take(scheduler);
    let document = ProjectDocument::from_snapshot(scheduler, &pools, name)?;

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| Error::io(dir, e))?;

    // Les entrées du document suivent l'ordre du snapshot
    for (asset, entry) in pools.programs.iter().zip(&document.programs) {
        copy_media(asset, &entry.filename, dir).await?;
    }
    for (asset, entry) in pools.bumpers.iter().zip(&document.bumpers) {
        copy_media(asset, &entry.filename, dir).await?;
    }
    for (asset, entry) in pools.bumper_audios.iter().zip(&document.bumper_audios) {
        copy_media(asset, &entry.filename, dir).await?;
    }
    for (asset, entry) in pools.logos.iter().zip(&document.logos) {
        copy_media(asset, &entry.filename, dir).await?;
    }

    let path = dir.join(document_filename(&document.name));
    document.save(&path).await?;

    let counts = PoolCounts {
        programs: document.programs.len(),
        bumpers: document.bumpers.len(),
        bumper_audios: document.bumper_audios.len(),
        logos: document.logos.len(),
    };
    info!(
        "Exported project '{}' to {} ({} programs, {} bumpers, {} bumper audios, {} logos)",
        document.name,
        dir.display(),
        counts.programs,
        counts.bumpers,
        counts.bumper_audios,
        counts.logos
    );

    Ok(ExportSummary {
        document: path,
        counts,
    })
}

async fn copy_media<T: Asset>(asset: &T, filename: &str, dir: &Path) -> Result<()> {
    let source = asset.media().path();
    let target = dir.join(filename);
    // Réexport d'un projet importé : copier un fichier sur lui-même le tronque
    if is_same_file(source, &target).await {
        debug!(pool = %T::KIND, asset_id = %asset.id(), "{} already in place", target.display());
        return Ok(());
    }
    tokio::fs::copy(source, &target)
        .await
        .map_err(|e| Error::io(source, e))?;
    debug!(pool = %T::KIND, asset_id = %asset.id(), "Copied {} -> {}", source.display(), target.display());
    Ok(())
}

async fn is_same_file(a: &Path, b: &Path) -> bool {
    match (
        tokio::fs::canonicalize(a).await,
        tokio::fs::canonicalize(b).await,
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
