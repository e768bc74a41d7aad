use std::collections::HashMap;

use folio_protocol::{ScrollMetrics, SectionId};

/// Read access to the host's live page geometry.
///
/// Implementations must answer from the current layout on every call; the
/// tracker and navigator never cache offsets. A section whose element is
/// not mounted answers `None`.
pub trait PageLayout {
    fn metrics(&self) -> ScrollMetrics;

    /// Top of the section's element in document coordinates.
    fn section_offset_top(&self, id: &str) -> Option<f64>;

    /// Top of the section's element relative to the viewport.
    fn section_client_top(&self, id: &str) -> Option<f64>;
}

/// Fixed geometry: sections at known document offsets.
///
/// Used by the terminal host, where the document is laid out once per
/// frame, and by tests.
#[derive(Debug, Clone, Default)]
pub struct StaticLayout {
    metrics: ScrollMetrics,
    tops: HashMap<SectionId, f64>,
}

impl StaticLayout {
    pub fn new(viewport_height: f64, document_height: f64) -> Self {
        Self {
            metrics: ScrollMetrics::new(0.0, viewport_height, document_height),
            tops: HashMap::new(),
        }
    }

    pub fn with_section(mut self, id: impl Into<SectionId>, top: f64) -> Self {
        self.tops.insert(id.into(), top);
        self
    }

    /// Lay sections out back to back, starting at 0, with the given heights.
    /// The document height becomes the sum of the heights.
    pub fn stacked<'a>(
        viewport_height: f64,
        sections: impl IntoIterator<Item = (&'a SectionId, f64)>,
    ) -> Self {
        let mut layout = Self::new(viewport_height, 0.0);
        let mut top = 0.0;
        for (id, height) in sections {
            layout.tops.insert(id.clone(), top);
            top += height;
        }
        layout.metrics.document_height = top;
        layout
    }

    pub fn scrolled_to(mut self, scroll_y: f64) -> Self {
        self.metrics.scroll_y = scroll_y;
        self
    }

    pub fn set_scroll_y(&mut self, scroll_y: f64) {
        self.metrics.scroll_y = scroll_y;
    }

    /// Simulate an element being unmounted.
    pub fn remove_section(&mut self, id: &str) {
        self.tops.remove(id);
    }
}

impl PageLayout for StaticLayout {
    fn metrics(&self) -> ScrollMetrics {
        self.metrics
    }

    fn section_offset_top(&self, id: &str) -> Option<f64> {
        self.tops.get(id).copied()
    }

    fn section_client_top(&self, id: &str) -> Option<f64> {
        self.tops.get(id).map(|top| top - self.metrics.scroll_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_top_tracks_scroll() {
        let layout = StaticLayout::new(800.0, 4600.0)
            .with_section("about", 1000.0)
            .scrolled_to(300.0);
        assert_eq!(layout.section_offset_top("about"), Some(1000.0));
        assert_eq!(layout.section_client_top("about"), Some(700.0));
        assert_eq!(layout.section_client_top("missing"), None);
    }

    #[test]
    fn stacked_sums_heights() {
        let ids: Vec<SectionId> = ["home", "about", "contact"].map(SectionId::from).to_vec();
        let layout = StaticLayout::stacked(600.0, ids.iter().zip([900.0, 1200.0, 400.0]));
        assert_eq!(layout.section_offset_top("home"), Some(0.0));
        assert_eq!(layout.section_offset_top("about"), Some(900.0));
        assert_eq!(layout.section_offset_top("contact"), Some(2100.0));
        assert!((layout.metrics().document_height - 2500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn removed_section_reads_as_unmounted() {
        let mut layout = StaticLayout::new(800.0, 2000.0).with_section("home", 0.0);
        layout.remove_section("home");
        assert_eq!(layout.section_offset_top("home"), None);
    }
}
