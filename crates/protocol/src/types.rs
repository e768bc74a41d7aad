use serde::{Deserialize, Serialize};

/// Snapshot of the host viewport, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollMetrics {
    /// Current vertical scroll offset of the document.
    pub scroll_y: f64,
    /// Height of the visible viewport.
    pub viewport_height: f64,
    /// Total scrollable height of the document.
    pub document_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_y: f64, viewport_height: f64, document_height: f64) -> Self {
        Self {
            scroll_y,
            viewport_height,
            document_height,
        }
    }

    /// Bottom edge of the viewport in document coordinates.
    pub fn viewport_bottom(&self) -> f64 {
        self.scroll_y + self.viewport_height
    }

    /// Largest offset the document can be scrolled to.
    pub fn max_scroll(&self) -> f64 {
        (self.document_height - self.viewport_height).max(0.0)
    }
}

/// Axis an [`EnergyLine`](crate::EnergyLine) travels along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Spans the container width; its position is a `top` percentage.
    Horizontal,
    /// Spans the container height; its position is a `left` percentage.
    Vertical,
}

impl Orientation {
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Horizontal => "horizontal",
            Orientation::Vertical => "vertical",
        }
    }
}

/// How the host should move the viewport for a [`HostCommand::ScrollTo`](crate::HostCommand).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    /// Interpolated on the host's own animation timeline.
    Smooth,
    /// Jump straight to the target.
    Instant,
}
