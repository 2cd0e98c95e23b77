//! Ordered collections of placeable assets.

use serde::{Deserialize, Serialize};

use crate::AssetRef;

/// Ordered sequence of distinct placeable assets.
///
/// A palette is owned independently of any map. Maps only hold a
/// [`PaletteRef`] naming the palette that governs them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    name: String,
    stable_id: String,
    entries: Vec<AssetRef>,
}

impl Palette {
    /// Creates an empty palette with the provided display name and stable identifier.
    #[must_use]
    pub fn new(name: impl Into<String>, stable_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stable_id: stable_id.into(),
            entries: Vec::new(),
        }
    }

    /// Display name of the palette.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stable identifier that maps use to refer to this palette.
    #[must_use]
    pub fn stable_id(&self) -> &str {
        &self.stable_id
    }

    /// Non-owning reference to this palette.
    #[must_use]
    pub fn reference(&self) -> PaletteRef {
        PaletteRef::new(self.name.clone(), self.stable_id.clone())
    }

    /// Number of entries held by the palette.
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the palette holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry stored at the provided slot.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&AssetRef> {
        self.entries.get(index)
    }

    /// Iterator over the entries in palette order.
    pub fn iter(&self) -> impl Iterator<Item = &AssetRef> {
        self.entries.iter()
    }

    /// Slot holding the provided asset.
    #[must_use]
    pub fn index_of(&self, asset: &AssetRef) -> Option<usize> {
        self.entries.iter().position(|entry| entry == asset)
    }

    /// Slot holding the asset with the provided stable identifier.
    #[must_use]
    pub fn index_by_stable_id(&self, id: &str) -> Option<usize> {
        if id.is_empty() {
            return None;
        }
        self.entries.iter().position(|entry| entry.as_str() == id)
    }

    /// Reports whether the palette holds the provided asset.
    #[must_use]
    pub fn contains(&self, asset: &AssetRef) -> bool {
        self.index_of(asset).is_some()
    }

    /// Appends an asset, rejecting empty identifiers and duplicates.
    ///
    /// Returns `true` when the asset was inserted.
    pub fn add(&mut self, asset: AssetRef) -> bool {
        if asset.is_empty() || self.contains(&asset) {
            return false;
        }
        self.entries.push(asset);
        true
    }

    /// Removes the provided asset, returning whether it was present.
    pub fn remove(&mut self, asset: &AssetRef) -> bool {
        match self.index_of(asset) {
            Some(index) => {
                let _ = self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Removes the entry at the provided slot when it exists.
    pub fn remove_at(&mut self, index: usize) -> Option<AssetRef> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    /// Drops entries whose identifiers no longer refer to an asset.
    ///
    /// Returns the number of entries removed.
    pub fn remove_invalid(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| !entry.is_empty());
        before - self.entries.len()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Orders entries by stable identifier.
    pub fn sort_by_id(&mut self) {
        self.entries.sort();
    }
}

/// Non-owning reference from a map to the palette governing it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaletteRef {
    /// Display name captured when the reference was taken.
    pub name: String,
    /// Stable identifier of the referenced palette.
    pub stable_id: String,
}

impl PaletteRef {
    /// Creates a new palette reference.
    #[must_use]
    pub fn new(name: impl Into<String>, stable_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stable_id: stable_id.into(),
        }
    }
}
