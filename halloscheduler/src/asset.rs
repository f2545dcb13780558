//! Assets rotated by the scheduler and the handles they point at.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Opaque, stable identifier of an asset inside its pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for AssetId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for AssetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Handle on a media file: its original name and where its bytes live.
///
/// The name is kept apart from the path because an imported file is stored
/// under its export name while the operator knows it by the original one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFile {
    name: String,
    path: PathBuf,
}

impl MediaFile {
    /// Builds a handle whose name is the file name of `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self { name, path }
    }

    pub fn with_name(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Extension of the original file name, empty when it has none.
    pub fn extension(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext,
            _ => "",
        }
    }
}

/// The four asset pools the scheduler rotates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
    Programs,
    Bumpers,
    BumperAudios,
    Logos,
}

impl PoolKind {
    pub const ALL: [PoolKind; 4] = [
        PoolKind::Programs,
        PoolKind::Bumpers,
        PoolKind::BumperAudios,
        PoolKind::Logos,
    ];

    /// Prefix of the ids the scheduler generates for this pool.
    pub fn id_prefix(self) -> &'static str {
        match self {
            PoolKind::Programs => "program",
            PoolKind::Bumpers => "bumper",
            PoolKind::BumperAudios => "bumper-audio",
            PoolKind::Logos => "logo",
        }
    }
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PoolKind::Programs => "programs",
            PoolKind::Bumpers => "bumpers",
            PoolKind::BumperAudios => "bumper audios",
            PoolKind::Logos => "logos",
        };
        f.write_str(name)
    }
}

/// Common view over the four asset types.
pub trait Asset: Clone + Send + Sync + 'static {
    const KIND: PoolKind;

    fn new(id: AssetId, media: MediaFile) -> Self;
    fn id(&self) -> &AssetId;
    fn media(&self) -> &MediaFile;
}

macro_rules! define_asset {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name {
            pub id: AssetId,
            pub media: MediaFile,
        }

        impl Asset for $name {
            const KIND: PoolKind = $kind;

            fn new(id: AssetId, media: MediaFile) -> Self {
                Self { id, media }
            }

            fn id(&self) -> &AssetId {
                &self.id
            }

            fn media(&self) -> &MediaFile {
                &self.media
            }
        }
    };
}

define_asset!(
    /// Long-form video played to its natural end.
    Program,
    PoolKind::Programs
);
define_asset!(
    /// Short video looped for the bumper duration.
    Bumper,
    PoolKind::Bumpers
);
define_asset!(
    /// Audio track paired at random with a bumper at play time.
    BumperAudio,
    PoolKind::BumperAudios
);
define_asset!(
    /// Still image shown for the logo duration.
    Logo,
    PoolKind::Logos
);

/// One of the three render stages of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Program,
    Bumper,
    Logo,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Program => "program",
            Stage::Bumper => "bumper",
            Stage::Logo => "logo",
        };
        f.write_str(name)
    }
}
