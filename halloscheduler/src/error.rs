//! Error types for halloscheduler

use crate::asset::{AssetId, PoolKind, Stage};

/// Failure reported by a [`MediaSink`](crate::MediaSink) for a single render.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RenderError {
    #[error("cannot open {asset}: {reason}")]
    Open { asset: String, reason: String },

    #[error("playback of {asset} failed: {reason}")]
    Playback { asset: String, reason: String },
}

impl RenderError {
    pub fn open(asset: impl Into<String>, reason: impl Into<String>) -> Self {
        RenderError::Open {
            asset: asset.into(),
            reason: reason.into(),
        }
    }

    pub fn playback(asset: impl Into<String>, reason: impl Into<String>) -> Self {
        RenderError::Playback {
            asset: asset.into(),
            reason: reason.into(),
        }
    }
}

/// Scheduler errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot start playback: empty pool(s): {}", format_pools(missing))]
    Precondition { missing: Vec<PoolKind> },

    #[error("{stage} stage failed for {asset_id}: {source}")]
    RenderFailure {
        stage: Stage,
        asset_id: AssetId,
        #[source]
        source: RenderError,
    },

    #[error("no asset {id} in {pool}")]
    UnknownAsset { pool: PoolKind, id: AssetId },

    #[error("asset {id} already registered in {pool}")]
    DuplicateAsset { pool: PoolKind, id: AssetId },

    #[error("invalid zoom scale: {0}")]
    InvalidScale(f64),

    #[error("playback loop must be started from within a tokio runtime")]
    NoRuntime,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn format_pools(pools: &[PoolKind]) -> String {
    pools
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Type Result spécialisé pour halloscheduler
pub type Result<T> = std::result::Result<T, Error>;
