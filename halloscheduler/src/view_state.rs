//! Per-program zoom/position chosen by the operator.

use crate::asset::AssetId;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Zoom scale and offsets of a program.
///
/// `x` and `y` are carried through export/import but not used when rendering;
/// they stay at 0 unless a document sets them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub scale: f64,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            x: 0.0,
            y: 0.0,
        }
    }
}

impl ViewState {
    pub fn with_scale(scale: f64) -> Self {
        Self {
            scale,
            ..Self::default()
        }
    }
}

/// Smallest zoom the scheduler accepts.
pub const MIN_SCALE: f64 = 0.1;

/// Rejects scales that cannot be rendered (non finite or not positive).
pub fn validate_scale(scale: f64) -> Result<f64> {
    if scale.is_finite() && scale > 0.0 {
        Ok(scale)
    } else {
        Err(Error::InvalidScale(scale))
    }
}

/// View-state entries keyed by program id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewStates(BTreeMap<AssetId, ViewState>);

impl ViewStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &AssetId) -> Option<ViewState> {
        self.0.get(id).copied()
    }

    pub fn set(&mut self, id: AssetId, state: ViewState) {
        self.0.insert(id, state);
    }

    /// Returns the entry for `id`, seeding the default one first if missing.
    pub fn get_or_seed(&mut self, id: &AssetId) -> ViewState {
        *self.0.entry(id.clone()).or_default()
    }

    /// Sets the scale of `id`, keeping its offsets.
    pub fn set_scale(&mut self, id: &AssetId, scale: f64) {
        self.0.entry(id.clone()).or_default().scale = scale;
    }

    pub fn remove(&mut self, id: &AssetId) -> Option<ViewState> {
        self.0.remove(id)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AssetId, &ViewState)> {
        self.0.iter()
    }
}

impl FromIterator<(AssetId, ViewState)> for ViewStates {
    fn from_iter<I: IntoIterator<Item = (AssetId, ViewState)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_creates_default_entry() {
        let mut states = ViewStates::new();
        let id = AssetId::from("program-9");
        assert_eq!(states.get_or_seed(&id), ViewState::default());
        assert_eq!(states.len(), 1);
    }

    #[test]
    fn test_seed_keeps_existing_entry() {
        let mut states = ViewStates::new();
        let id = AssetId::from("program-1");
        states.set(id.clone(), ViewState::with_scale(2.0));
        assert_eq!(states.get_or_seed(&id).scale, 2.0);
    }

    #[test]
    fn test_set_scale_keeps_offsets() {
        let mut states = ViewStates::new();
        let id = AssetId::from("program-1");
        states.set(
            id.clone(),
            ViewState {
                scale: 1.0,
                x: 4.0,
                y: -2.0,
            },
        );
        states.set_scale(&id, 1.5);
        let state = states.get(&id).unwrap();
        assert_eq!((state.scale, state.x, state.y), (1.5, 4.0, -2.0));
    }

    #[test]
    fn test_validate_scale() {
        assert!(validate_scale(0.5).is_ok());
        assert!(validate_scale(0.0).is_err());
        assert!(validate_scale(-1.0).is_err());
        assert!(validate_scale(f64::NAN).is_err());
    }
}
