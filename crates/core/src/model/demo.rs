use serde::Serialize;

/// Video-demo dialog bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DemoOverlay {
    open: bool,
    media: Option<String>,
}

impl DemoOverlay {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Media reference of the current (or last shown) demo.
    pub fn media(&self) -> Option<&str> {
        self.media.as_deref()
    }

    pub fn open(&mut self, media: impl Into<String>) {
        self.media = Some(media.into());
        self.open = true;
    }

    /// Close the dialog. The media reference stays so the exit transition
    /// still has something to show.
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Mirror of the dialog's own open-change callback.
    pub fn set_open(&mut self, open: bool) {
        self.open = open;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_then_close_keeps_media() {
        let mut demo = DemoOverlay::default();
        assert!(!demo.is_open());
        assert_eq!(demo.media(), None);

        demo.open("assets/night-shift.mp4");
        assert!(demo.is_open());
        assert_eq!(demo.media(), Some("assets/night-shift.mp4"));

        demo.close();
        assert!(!demo.is_open());
        assert_eq!(demo.media(), Some("assets/night-shift.mp4"));
    }

    #[test]
    fn reopening_switches_media() {
        let mut demo = DemoOverlay::default();
        demo.open("a.mp4");
        demo.set_open(false);
        demo.open("b.mp4");
        assert!(demo.is_open());
        assert_eq!(demo.media(), Some("b.mp4"));
    }
}
