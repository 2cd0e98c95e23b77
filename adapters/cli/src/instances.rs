use std::collections::BTreeSet;

use gridforge_core::Palette;
use gridforge_rendering::{InstanceHost, SpawnRequest};
use tracing::debug;

/// Headless host that resolves assets against a palette and tracks visibility.
///
/// Assets missing from the palette fall back to the record's cached palette
/// slot when that slot exists.
#[derive(Debug)]
pub(crate) struct CatalogHost {
    palette: Palette,
    next: u64,
    live: BTreeSet<u64>,
    hidden: BTreeSet<u64>,
}

impl CatalogHost {
    pub(crate) fn new(palette: Palette) -> Self {
        Self {
            palette,
            next: 0,
            live: BTreeSet::new(),
            hidden: BTreeSet::new(),
        }
    }

    /// Number of live instances that are currently shown.
    pub(crate) fn visible(&self) -> usize {
        self.live.len() - self.hidden.len()
    }
}

impl InstanceHost for CatalogHost {
    type Handle = u64;

    fn spawn(&mut self, request: SpawnRequest<'_>) -> Option<u64> {
        if !self.palette.contains(request.asset) {
            let fallback = usize::try_from(request.palette_index)
                .ok()
                .and_then(|index| self.palette.get(index))?;
            debug!(
                asset = %request.asset,
                slot = request.palette_index,
                %fallback,
                "asset resolved through its palette slot"
            );
        }
        self.next += 1;
        let _ = self.live.insert(self.next);
        Some(self.next)
    }

    fn despawn(&mut self, handle: u64) {
        let _ = self.live.remove(&handle);
        let _ = self.hidden.remove(&handle);
    }

    fn set_visible(&mut self, handle: &u64, visible: bool) {
        if visible {
            let _ = self.hidden.remove(handle);
        } else if self.live.contains(handle) {
            let _ = self.hidden.insert(*handle);
        }
    }
}
