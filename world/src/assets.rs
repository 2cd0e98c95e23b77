//! Reverse index from placed assets to the cells they occupy.

use std::collections::{BTreeMap, BTreeSet};

use gridforge_core::{AssetRef, GridCoord};

/// Tracks which cells each asset currently occupies.
#[derive(Clone, Debug, Default)]
pub(crate) struct AssetIndex {
    entries: BTreeMap<AssetRef, BTreeSet<GridCoord>>,
}

impl AssetIndex {
    pub(crate) fn insert(&mut self, asset: &AssetRef, position: GridCoord) {
        let _ = self
            .entries
            .entry(asset.clone())
            .or_default()
            .insert(position);
    }

    pub(crate) fn remove(&mut self, asset: &AssetRef, position: GridCoord) {
        let emptied = match self.entries.get_mut(asset) {
            Some(cells) => {
                let _ = cells.remove(&position);
                cells.is_empty()
            }
            None => false,
        };
        if emptied {
            let _ = self.entries.remove(asset);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Cells occupied by the asset in ascending coordinate order.
    pub(crate) fn positions(&self, asset: &AssetRef) -> Vec<GridCoord> {
        self.entries
            .get(asset)
            .map(|cells| cells.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of cells per asset, ordered by asset identifier.
    pub(crate) fn usage(&self) -> Vec<(AssetRef, usize)> {
        self.entries
            .iter()
            .map(|(asset, cells)| (asset.clone(), cells.len()))
            .collect()
    }
}
