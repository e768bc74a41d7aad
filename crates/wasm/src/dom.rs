use folio_core::PageLayout;
use folio_protocol::{ScrollBehavior, ScrollMetrics};
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, Window};

/// [`PageLayout`] over the live DOM. Every query reads current geometry;
/// nothing is cached between scroll events.
#[derive(Debug, Clone)]
pub struct DomLayout {
    window: Window,
    document: Document,
}

impl DomLayout {
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self { window, document })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Smooth (or instant) scroll on the browser's own animation timeline.
    pub fn scroll_to(&self, top: f64, behavior: ScrollBehavior) {
        let options = web_sys::ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(match behavior {
            ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
            ScrollBehavior::Instant => web_sys::ScrollBehavior::Instant,
        });
        self.window.scroll_to_with_scroll_to_options(&options);
    }
}

impl PageLayout for DomLayout {
    fn metrics(&self) -> ScrollMetrics {
        let scroll_y = self.window.scroll_y().unwrap_or(0.0);
        let viewport_height = self
            .window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0);
        let document_height = self
            .document
            .document_element()
            .map_or(0.0, |root| f64::from(root.scroll_height()));
        ScrollMetrics::new(scroll_y, viewport_height, document_height)
    }

    fn section_offset_top(&self, id: &str) -> Option<f64> {
        let element = self
            .document
            .get_element_by_id(id)?
            .dyn_into::<HtmlElement>()
            .ok()?;
        Some(f64::from(element.offset_top()))
    }

    fn section_client_top(&self, id: &str) -> Option<f64> {
        let element = self.document.get_element_by_id(id)?;
        Some(element.get_bounding_client_rect().top())
    }
}
