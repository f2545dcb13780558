//! # halloproject - Export et import de projets Halloweeny
//!
//! Un projet est un répertoire contenant :
//! - un document JSON `<nom>-config.json` décrivant les pools, les vues
//!   mémorisées des programmes et le flag auto-restart
//! - une copie de chaque média, renommée `<nom>-<id>.<ext>`
//!   (`<nom>-<id>-video.<ext>` pour les bumpers)
//!
//! À l'import, les ids enregistrés sont conservés et chaque entrée est
//! retrouvée par son nom de fichier.
//!
//! # Exemple d'utilisation
//!
//! ```no_run
//! use halloproject::{export_project, import_project};
//! # use halloscheduler::PlaybackScheduler;
//!
//! # async fn demo(scheduler: PlaybackScheduler) -> halloproject::Result<()> {
//! let exported = export_project(&scheduler, "fright-night", "/tmp/fright").await?;
//! println!("Document: {}", exported.document.display());
//!
//! let imported = import_project(&scheduler, "/tmp/fright").await?;
//! println!("{} programs restored", imported.counts.programs);
//! # Ok(())
//! # }
//! ```

mod document;
mod error;
mod export;
mod import;

use serde::Serialize;

// Réexports publics
pub use document::{
    bumper_filename, document_filename, media_filename, validate_name, MediaEntry, ProgramEntry,
    ProjectDocument,
};
pub use error::{Error, Result};
pub use export::{export_project, ExportSummary};
pub use import::{find_document, import_project, ImportSummary};

/// Nombre d'entrées par pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolCounts {
    pub programs: usize,
    pub bumpers: usize,
    pub bumper_audios: usize,
    pub logos: usize,
}
