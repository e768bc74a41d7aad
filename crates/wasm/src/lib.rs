mod ambient;
mod dom;
mod listener;
mod timers;

use std::cell::RefCell;
use std::rc::Rc;

use folio_core::model::Content;
use folio_core::{Page, PageConfig, PageLayout};
use folio_protocol::HostCommand;
use wasm_bindgen::prelude::*;

use crate::ambient::AmbientLayer;
use crate::dom::DomLayout;
use crate::listener::PassiveListener;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// State shared between the exported handle and its event callbacks.
struct Shared {
    page: RefCell<Page>,
    on_change: RefCell<Option<js_sys::Function>>,
}

impl Shared {
    /// Tell the presentation layer to re-read navigation state. Called with
    /// no outstanding borrow of `page`, so the callback may query the app.
    fn notify(&self) {
        let (active, menu_open) = {
            let page = self.page.borrow();
            let nav = page.navigation();
            (nav.active().to_string(), nav.menu_open())
        };
        let callback = self.on_change.borrow().clone();
        if let Some(callback) = callback
            && let Err(e) = callback.call2(
                &JsValue::NULL,
                &JsValue::from_str(&active),
                &JsValue::from_bool(menu_open),
            )
        {
            web_sys::console::error_2(&"folio: change listener threw".into(), &e);
        }
    }

    fn on_scroll(&self, layout: &DomLayout) {
        let changed = self.page.borrow_mut().on_scroll(layout);
        if changed.is_some() {
            self.notify();
        }
    }

    fn on_resize(&self, layout: &DomLayout) {
        let changed = self.page.borrow_mut().on_resize(layout);
        if changed.is_some() {
            self.notify();
        }
    }
}

/// Run `subscribe`, then mount the page. A failed subscription leaves the
/// page unmounted, so a retry starts from scratch.
fn mount_after<T, E>(
    page: &RefCell<Page>,
    layout: &impl PageLayout,
    subscribe: impl FnOnce() -> Result<T, E>,
) -> Result<T, E> {
    let subscribed = subscribe()?;
    page.borrow_mut().mount(layout);
    Ok(subscribed)
}

/// Portfolio page runtime bound to the current document.
///
/// ```js
/// const app = new PortfolioApp(null, null);
/// app.on_change((active, menuOpen) => render(active, menuOpen));
/// app.mount();
/// // nav click
/// app.navigate("projects");
/// // teardown
/// app.free();
/// ```
#[wasm_bindgen]
pub struct PortfolioApp {
    shared: Rc<Shared>,
    layout: DomLayout,
    listeners: Vec<PassiveListener>,
    ambient: Option<AmbientLayer>,
}

#[wasm_bindgen]
impl PortfolioApp {
    /// Build the runtime from optional JSON content and config. Missing
    /// content falls back to the bundled content; missing config to the
    /// defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(
        content_json: Option<String>,
        config_json: Option<String>,
    ) -> Result<PortfolioApp, JsError> {
        let content = match content_json.as_deref() {
            Some(json) => Content::from_json(json),
            None => Content::builtin(),
        }
        .map_err(|e| JsError::new(&e.to_string()))?;
        let config = match config_json.as_deref() {
            Some(json) => PageConfig::from_json(json).map_err(|e| JsError::new(&e.to_string()))?,
            None => PageConfig::default(),
        };
        let page = Page::new(content, config).map_err(|e| JsError::new(&e.to_string()))?;
        let layout = DomLayout::new().ok_or_else(|| JsError::new("no window or document"))?;

        Ok(Self {
            shared: Rc::new(Shared {
                page: RefCell::new(page),
                on_change: RefCell::new(None),
            }),
            layout,
            listeners: Vec::new(),
            ambient: None,
        })
    }

    /// Subscribe to scroll and resize, resolve the initial section, and
    /// start the ambient layer. Calling it twice is a no-op.
    pub fn mount(&mut self) -> Result<(), JsError> {
        if self.shared.page.borrow().is_mounted() {
            return Ok(());
        }

        let target: &web_sys::EventTarget = self.layout.window();
        let handlers = [
            ("scroll", Shared::on_scroll as fn(&Shared, &DomLayout)),
            ("resize", Shared::on_resize),
        ];
        self.listeners = mount_after(&self.shared.page, &self.layout, || {
            handlers
                .into_iter()
                .map(|(event, handler)| {
                    let shared = Rc::clone(&self.shared);
                    let layout = self.layout.clone();
                    PassiveListener::new(target, event, move |_| handler(&shared, &layout)).map_err(
                        |e| JsError::new(&format!("failed to listen for {event}: {e:?}")),
                    )
                })
                .collect::<Result<Vec<_>, _>>()
        })?;
        self.shared.notify();

        let (container_id, scheduler) = {
            let page = self.shared.page.borrow();
            (page.config().container_id.clone(), page.ambient_scheduler())
        };
        self.ambient = Some(AmbientLayer::start(
            self.layout.document(),
            &container_id,
            scheduler,
        ));

        web_sys::console::log_1(
            &format!(
                "folio: mounted, active section {}",
                self.shared.page.borrow().navigation().active()
            )
            .into(),
        );
        Ok(())
    }

    /// Release listeners and the ambient timer. Also happens on `free()`.
    pub fn unmount(&mut self) {
        self.listeners.clear();
        self.ambient = None;
        self.shared.page.borrow_mut().unmount();
    }

    /// Register `callback(activeSectionId, menuOpen)`, replacing any
    /// previous one.
    pub fn on_change(&self, callback: js_sys::Function) {
        *self.shared.on_change.borrow_mut() = Some(callback);
    }

    /// Smooth-scroll to a section and close the mobile menu. Unknown or
    /// unmounted sections only close the menu.
    pub fn navigate(&self, section_id: &str) {
        let command = self
            .shared
            .page
            .borrow_mut()
            .request_navigate(section_id, &self.layout);
        self.shared.notify();
        if let Some(HostCommand::ScrollTo { top, behavior }) = command {
            self.layout.scroll_to(top, behavior);
        }
    }

    pub fn toggle_menu(&self) -> bool {
        let open = self.shared.page.borrow_mut().toggle_menu();
        self.shared.notify();
        open
    }

    pub fn close_menu(&self) {
        self.shared.page.borrow_mut().close_menu();
        self.shared.notify();
    }

    pub fn active_section(&self) -> String {
        self.shared.page.borrow().navigation().active().to_string()
    }

    pub fn menu_open(&self) -> bool {
        self.shared.page.borrow().navigation().menu_open()
    }

    pub fn open_demo(&self, media: &str) {
        self.shared.page.borrow_mut().open_demo(media);
    }

    pub fn close_demo(&self) {
        self.shared.page.borrow_mut().close_demo();
    }

    /// Mirror of the dialog component's open-change callback.
    pub fn set_demo_open(&self, open: bool) {
        self.shared.page.borrow_mut().set_demo_open(open);
    }

    pub fn demo_open(&self) -> bool {
        self.shared.page.borrow().demo().is_open()
    }

    pub fn demo_media(&self) -> Option<String> {
        self.shared.page.borrow().demo().media().map(str::to_string)
    }

    /// Number of energy lines currently attached.
    pub fn ambient_live_count(&self) -> usize {
        self.ambient.as_ref().map_or(0, AmbientLayer::live_count)
    }

    /// The content model as JSON, for rendering.
    pub fn content_json(&self) -> Result<String, JsError> {
        serde_json::to_string(self.shared.page.borrow().content())
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Navigation and demo state as JSON.
    pub fn state_json(&self) -> Result<String, JsError> {
        let page = self.shared.page.borrow();
        serde_json::to_string(&serde_json::json!({
            "navigation": page.navigation(),
            "demo": page.demo(),
        }))
        .map_err(|e| JsError::new(&e.to_string()))
    }
}
