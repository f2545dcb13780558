//! Asset pools: the source populations decks are cut from.

use crate::asset::{Asset, AssetId, MediaFile};
use crate::error::{Error, Result};

/// Ordered collection of assets of one kind.
///
/// Generated ids come from a counter that only ever grows, so an id freed by
/// [`Pool::remove`] or [`Pool::clear`] is never handed out again.
#[derive(Debug, Clone)]
pub struct Pool<T> {
    items: Vec<T>,
    next_index: u64,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next_index: 1,
        }
    }
}

impl<T: Asset> Pool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `media` under a freshly generated id and returns the asset.
    pub fn add(&mut self, media: MediaFile) -> T {
        let id = loop {
            let candidate = AssetId::new(format!("{}-{}", T::KIND.id_prefix(), self.next_index));
            self.next_index += 1;
            // Un id fourni par l'appelant peut occuper le prochain numéro
            if !self.contains(&candidate) {
                break candidate;
            }
        };
        let asset = T::new(id, media);
        self.items.push(asset.clone());
        asset
    }

    /// Appends an asset carrying a caller-supplied id.
    pub fn insert(&mut self, asset: T) -> Result<()> {
        if self.contains(asset.id()) {
            return Err(Error::DuplicateAsset {
                pool: T::KIND,
                id: asset.id().clone(),
            });
        }
        self.items.push(asset);
        Ok(())
    }

    /// Removes the asset with `id` and returns it.
    pub fn remove(&mut self, id: &AssetId) -> Result<T> {
        let index = self
            .items
            .iter()
            .position(|a| a.id() == id)
            .ok_or_else(|| Error::UnknownAsset {
                pool: T::KIND,
                id: id.clone(),
            })?;
        Ok(self.items.remove(index))
    }

    pub fn get(&self, id: &AssetId) -> Option<&T> {
        self.items.iter().find(|a| a.id() == id)
    }

    /// Like [`Pool::get`] but cloned, with an `UnknownAsset` error when absent.
    pub fn lookup(&self, id: &AssetId) -> Result<T> {
        self.get(id).cloned().ok_or_else(|| Error::UnknownAsset {
            pool: T::KIND,
            id: id.clone(),
        })
    }

    pub fn contains(&self, id: &AssetId) -> bool {
        self.items.iter().any(|a| a.id() == id)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
