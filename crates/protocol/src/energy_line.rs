use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::Orientation;

/// Identifier of one live [`EnergyLine`], unique for the lifetime of its
/// scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineId(pub u64);

impl std::fmt::Display for LineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "energy-line-{}", self.0)
    }
}

/// One transient decorative line segment.
///
/// Carries everything a host needs to draw it; hosts never derive timing on
/// their own. Durations serialize as whole milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyLine {
    pub id: LineId,
    pub orientation: Orientation,
    /// Cross-axis position as a percentage of the container (10..=90).
    pub position_pct: f64,
    #[serde(with = "millis")]
    pub duration: Duration,
    #[serde(with = "millis")]
    pub delay: Duration,
}

impl EnergyLine {
    /// Time from attachment until the line must be detached.
    pub fn lifetime(&self) -> Duration {
        self.duration + self.delay
    }

    /// Space-separated CSS classes for the line's element.
    pub fn class_name(&self) -> String {
        format!("energy-line energy-line-{}", self.orientation.as_str())
    }

    /// Inline style positioning and timing the line's CSS animation.
    pub fn style(&self) -> String {
        let axis = match self.orientation {
            Orientation::Horizontal => "top",
            Orientation::Vertical => "left",
        };
        format!(
            "{axis}: {:.2}%; animation-duration: {:.3}s; animation-delay: {:.3}s;",
            self.position_pct,
            self.duration.as_secs_f64(),
            self.delay.as_secs_f64(),
        )
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
