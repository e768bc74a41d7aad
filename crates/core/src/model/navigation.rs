use folio_protocol::SectionId;
use serde::Serialize;

/// Navigation-bar state read by the presentation layer.
///
/// Exactly one section is active at any time. The active id has a single
/// writer, the section tracker; the menu flag is only changed by explicit
/// user actions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationState {
    active: SectionId,
    menu_open: bool,
    /// Bumped on every published change of `active`.
    revision: u64,
}

impl NavigationState {
    pub fn new(initial: SectionId) -> Self {
        Self {
            active: initial,
            menu_open: false,
            revision: 0,
        }
    }

    pub fn active(&self) -> &SectionId {
        &self.active
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active == id
    }

    pub fn menu_open(&self) -> bool {
        self.menu_open
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Flip the mobile menu overlay. Returns the new state.
    pub fn toggle_menu(&mut self) -> bool {
        self.menu_open = !self.menu_open;
        self.menu_open
    }

    pub fn close_menu(&mut self) {
        self.menu_open = false;
    }

    /// Replace the active id; a no-op when unchanged. Returns whether the
    /// value changed.
    pub(crate) fn publish_active(&mut self, id: &SectionId) -> bool {
        if self.active == *id {
            return false;
        }
        self.active = id.clone();
        self.revision += 1;
        true
    }
}
