use folio_protocol::SectionId;
use tracing::debug;

use crate::config::TrackerConfig;
use crate::layout::PageLayout;
use crate::model::{NavigationState, SectionList};

/// Resolve the index of the active section for the current geometry.
///
/// Scans bottom-up so the furthest section the user has scrolled into wins.
/// A section is reached once `scroll_y + nav_bar_offset` passes its top minus
/// `activation_margin`. Unmounted sections are skipped. With no match the
/// first section is active. Near the end of the document the last section
/// is forced, so a short final section is still reachable.
///
/// A section only stays active while the probe sits between its start and
/// the next section's start. When two tops are closer than the activation
/// margin that window is narrower than a typical wheel step and the earlier
/// section can be skipped entirely while scrolling.
pub fn resolve_active(
    sections: &SectionList,
    layout: &impl PageLayout,
    config: &TrackerConfig,
) -> usize {
    let metrics = layout.metrics();
    let last = sections.len() - 1;

    if metrics.viewport_bottom() >= metrics.document_height - config.bottom_margin {
        return last;
    }

    let probe = metrics.scroll_y + config.nav_bar_offset;
    sections
        .iter()
        .enumerate()
        .rev()
        .find(|(_, section)| {
            layout
                .section_offset_top(&section.id)
                .is_some_and(|top| probe >= top - config.activation_margin)
        })
        .map_or(0, |(index, _)| index)
}

/// Owns the tracker configuration and publishes resolved sections into
/// [`NavigationState`]. The only writer of the active id.
#[derive(Debug, Clone, Default)]
pub struct SectionTracker {
    config: TrackerConfig,
}

impl SectionTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self { config }
    }

    /// Re-evaluate against the live layout. Returns the new id when the
    /// active section changed, `None` when it stayed the same.
    pub fn evaluate(
        &self,
        sections: &SectionList,
        layout: &impl PageLayout,
        navigation: &mut NavigationState,
    ) -> Option<SectionId> {
        let index = resolve_active(sections, layout, &self.config);
        let section = sections.get(index)?;
        if !navigation.publish_active(&section.id) {
            return None;
        }
        debug!(
            section = %section.id,
            scroll_y = layout.metrics().scroll_y,
            "active section changed"
        );
        Some(section.id.clone())
    }
}
