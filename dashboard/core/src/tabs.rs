//! Tab state
//!
//! Exactly one panel is visible at a time.

use serde::{Deserialize, Serialize};

use crate::panel::PanelId;

/// Which panel is visible
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabSet {
    active: PanelId,
}

impl Default for TabSet {
    fn default() -> Self {
        Self::new(PanelId::Epics)
    }
}

impl TabSet {
    /// Start with `active` visible
    #[must_use]
    pub fn new(active: PanelId) -> Self {
        Self { active }
    }

    /// The visible panel
    #[must_use]
    pub fn active(&self) -> PanelId {
        self.active
    }

    /// Make `panel` visible, hiding the previous one
    ///
    /// Returns whether the visible panel changed.
    pub fn switch(&mut self, panel: PanelId) -> bool {
        let changed = self.active != panel;
        self.active = panel;
        changed
    }

    /// Whether `panel` is the visible one
    #[must_use]
    pub fn is_visible(&self, panel: PanelId) -> bool {
        self.active == panel
    }

    /// Panels in tab-bar order with their visibility
    pub fn iter(&self) -> impl Iterator<Item = (PanelId, bool)> + '_ {
        PanelId::ALL.into_iter().map(|p| (p, self.is_visible(p)))
    }
}
