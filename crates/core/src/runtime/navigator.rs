use folio_protocol::{HostCommand, ScrollBehavior};
use tracing::debug;

use crate::config::NavigatorConfig;
use crate::layout::PageLayout;
use crate::model::NavigationState;

/// Turns navigation requests into smooth-scroll commands.
///
/// Never writes the active section: the tracker observes the scroll while
/// the host animates it and publishes the result itself.
#[derive(Debug, Clone, Default)]
pub struct ScrollNavigator {
    config: NavigatorConfig,
}

impl ScrollNavigator {
    pub fn new(config: NavigatorConfig) -> Self {
        Self { config }
    }

    /// Document offset that puts the section just below the fixed header,
    /// or `None` when the section's element is not mounted.
    ///
    /// A pure function of the current geometry.
    pub fn target_offset(&self, layout: &impl PageLayout, id: &str) -> Option<f64> {
        let client_top = layout.section_client_top(id)?;
        Some(client_top + layout.metrics().scroll_y - self.config.header_height)
    }

    /// Close the mobile menu, then build the scroll command for `id`.
    ///
    /// The menu is closed even when the target is missing; nothing else
    /// changes in that case.
    pub fn navigate(
        &self,
        layout: &impl PageLayout,
        id: &str,
        navigation: &mut NavigationState,
    ) -> Option<HostCommand> {
        navigation.close_menu();
        let Some(top) = self.target_offset(layout, id) else {
            debug!(section = id, "navigation target not mounted");
            return None;
        };
        debug!(section = id, top, "navigating");
        Some(HostCommand::ScrollTo {
            top,
            behavior: ScrollBehavior::Smooth,
        })
    }
}
