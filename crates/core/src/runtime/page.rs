use folio_protocol::{HostCommand, SectionId};
use tracing::debug;

use crate::config::{ConfigError, PageConfig};
use crate::layout::PageLayout;
use crate::model::{Content, DemoOverlay, NavigationState, SectionList};
use crate::runtime::ambient::AmbientScheduler;
use crate::runtime::navigator::ScrollNavigator;
use crate::runtime::tracker::SectionTracker;

/// Owned state container for one mounted portfolio page.
///
/// Holds the navigation state and wires the tracker and navigator to it.
/// Hosts forward scroll/resize events and user actions here and read the
/// resulting state back for rendering. Lifetime is explicit: `mount` runs
/// the first evaluation, `unmount` stops reacting to scroll events.
#[derive(Debug, Clone)]
pub struct Page {
    content: Content,
    config: PageConfig,
    navigation: NavigationState,
    tracker: SectionTracker,
    navigator: ScrollNavigator,
    demo: DemoOverlay,
    mounted: bool,
}

impl Page {
    pub fn new(content: Content, config: PageConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let navigation = NavigationState::new(content.sections.first().id.clone());
        Ok(Self {
            tracker: SectionTracker::new(config.tracker.clone()),
            navigator: ScrollNavigator::new(config.navigator.clone()),
            content,
            config,
            navigation,
            demo: DemoOverlay::default(),
            mounted: false,
        })
    }

    /// Establish the initial active section before any user interaction.
    pub fn mount(&mut self, layout: &impl PageLayout) -> Option<SectionId> {
        self.mounted = true;
        debug!(sections = self.content.sections.len(), "page mounted");
        self.evaluate(layout)
    }

    /// Stop reacting to scroll and resize events.
    pub fn unmount(&mut self) {
        if self.mounted {
            debug!("page unmounted");
        }
        self.mounted = false;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Scroll event. Returns the newly active section, if it changed.
    pub fn on_scroll(&mut self, layout: &impl PageLayout) -> Option<SectionId> {
        if !self.mounted {
            return None;
        }
        self.evaluate(layout)
    }

    /// Layout changed (window resize, late content load).
    pub fn on_resize(&mut self, layout: &impl PageLayout) -> Option<SectionId> {
        self.on_scroll(layout)
    }

    /// User clicked a navigation item. Always closes the mobile menu.
    pub fn request_navigate(&mut self, id: &str, layout: &impl PageLayout) -> Option<HostCommand> {
        self.navigator.navigate(layout, id, &mut self.navigation)
    }

    pub fn toggle_menu(&mut self) -> bool {
        self.navigation.toggle_menu()
    }

    pub fn close_menu(&mut self) {
        self.navigation.close_menu();
    }

    pub fn open_demo(&mut self, media: impl Into<String>) {
        self.demo.open(media);
    }

    pub fn close_demo(&mut self) {
        self.demo.close();
    }

    pub fn set_demo_open(&mut self, open: bool) {
        self.demo.set_open(open);
    }

    /// Build a scheduler for the ambient layer from this page's config.
    pub fn ambient_scheduler(&self) -> AmbientScheduler {
        AmbientScheduler::new(self.config.ambient.clone())
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    pub fn sections(&self) -> &SectionList {
        &self.content.sections
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn demo(&self) -> &DemoOverlay {
        &self.demo
    }

    fn evaluate(&mut self, layout: &impl PageLayout) -> Option<SectionId> {
        self.tracker
            .evaluate(&self.content.sections, layout, &mut self.navigation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::StaticLayout;

    fn page() -> Page {
        let content = Content::builtin().expect("builtin content must parse");
        Page::new(content, PageConfig::default()).expect("default config is valid")
    }

    fn layout(scroll_y: f64) -> StaticLayout {
        StaticLayout::new(800.0, 4600.0)
            .with_section("home", 0.0)
            .with_section("about", 1000.0)
            .with_section("projects", 2500.0)
            .with_section("contact", 4000.0)
            .scrolled_to(scroll_y)
    }

    #[test]
    fn mount_resolves_initial_section() {
        let mut page = page();
        assert!(page.navigation().is_active("home"));
        // Reloaded mid-page: the first evaluation already picks projects.
        assert_eq!(page.mount(&layout(2600.0)).as_deref(), Some("projects"));
        assert!(page.is_mounted());
    }

    #[test]
    fn scroll_before_mount_is_ignored() {
        let mut page = page();
        assert_eq!(page.on_scroll(&layout(2600.0)), None);
        assert!(page.navigation().is_active("home"));
    }

    #[test]
    fn unmount_stops_tracking() {
        let mut page = page();
        page.mount(&layout(0.0));
        page.unmount();
        assert_eq!(page.on_scroll(&layout(4200.0)), None);
        assert!(page.navigation().is_active("home"));
    }

    #[test]
    fn navigation_then_scroll_resynchronizes() {
        let mut page = page();
        page.mount(&layout(0.0));
        page.toggle_menu();

        let Some(HostCommand::ScrollTo { top, .. }) = page.request_navigate("about", &layout(0.0))
        else {
            unreachable!("about is mounted");
        };
        assert_eq!(top, 920.0);
        assert!(!page.navigation().menu_open());
        assert!(page.navigation().is_active("home"));

        // The host lands on the target; the tracker catches up.
        assert_eq!(page.on_scroll(&layout(top)).as_deref(), Some("about"));
    }

    #[test]
    fn resize_reevaluates_layout() {
        let mut page = page();
        page.mount(&layout(900.0));
        assert!(page.navigation().is_active("about"));

        // Content above grew: about now starts further down.
        let taller = StaticLayout::new(800.0, 5600.0)
            .with_section("home", 0.0)
            .with_section("about", 2000.0)
            .with_section("projects", 3500.0)
            .with_section("contact", 5000.0)
            .scrolled_to(900.0);
        assert_eq!(page.on_resize(&taller).as_deref(), Some("home"));
    }

    #[test]
    fn demo_overlay_round_trip() {
        let mut page = page();
        let video = page.content().projects[0].video.clone().unwrap_or_default();
        page.open_demo(video.clone());
        assert!(page.demo().is_open());
        assert_eq!(page.demo().media(), Some(video.as_str()));
        page.set_demo_open(false);
        assert!(!page.demo().is_open());
    }

    #[test]
    fn rejects_invalid_config() {
        let content = Content::builtin().expect("builtin content must parse");
        let mut config = PageConfig::default();
        config.ambient.period_ms = 0;
        assert!(Page::new(content, config).is_err());
    }

    #[test]
    fn rejects_timings_the_browser_cannot_schedule() {
        let content = Content::builtin().expect("builtin content must parse");
        let mut config = PageConfig::default();
        config.ambient.max_duration_ms = u64::MAX;
        assert!(matches!(
            Page::new(content, config),
            Err(ConfigError::TimingTooLong { .. })
        ));
    }

    #[test]
    fn ambient_scheduler_uses_page_config() {
        let page = page();
        assert_eq!(page.ambient_scheduler().config(), &page.config().ambient);
    }
}
