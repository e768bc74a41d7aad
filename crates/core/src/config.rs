use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} must be finite and non-negative, got {value}")]
    InvalidMargin { field: &'static str, value: f64 },
    #[error("ambient period must be greater than zero")]
    ZeroPeriod,
    #[error("{field}: min {min} exceeds max {max}")]
    InvertedRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
    #[error("{field} is {value} ms, above the {max} ms browser timer limit")]
    TimingTooLong {
        field: &'static str,
        value: u64,
        max: u64,
    },
    #[error("line position range must lie within 0..=100 percent, got {min}..={max}")]
    PositionOutOfBounds { min: f64, max: f64 },
}

/// Host configuration. Every field has a default, so a host may pass a
/// partial JSON object such as `{"navigator": {"header_height": 64}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub tracker: TrackerConfig,
    pub navigator: NavigatorConfig,
    pub ambient: AmbientConfig,
    /// DOM id of the element EnergyLines are attached to.
    pub container_id: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            tracker: TrackerConfig::default(),
            navigator: NavigatorConfig::default(),
            ambient: AmbientConfig::default(),
            container_id: "energy-lines".to_string(),
        }
    }
}

impl PageConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: PageConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tracker.validate()?;
        self.navigator.validate()?;
        self.ambient.validate()
    }
}

/// Geometry margins for active-section resolution, in CSS pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Added to the scroll offset: fixed header height plus a visibility margin.
    pub nav_bar_offset: f64,
    /// Subtracted from a section's top before it counts as reached.
    pub activation_margin: f64,
    /// Distance from the document bottom at which the last section is forced.
    pub bottom_margin: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            nav_bar_offset: 150.0,
            activation_margin: 100.0,
            bottom_margin: 50.0,
        }
    }
}

impl TrackerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_margin("tracker.nav_bar_offset", self.nav_bar_offset)?;
        check_margin("tracker.activation_margin", self.activation_margin)?;
        check_margin("tracker.bottom_margin", self.bottom_margin)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Height of the fixed header the target section must clear.
    pub header_height: f64,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            header_height: 80.0,
        }
    }
}

impl NavigatorConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_margin("navigator.header_height", self.header_height)
    }
}

/// Longest delay a browser timer accepts: a signed 32-bit millisecond count.
pub const MAX_TIMER_MS: u64 = i32::MAX as u64;

/// Timing and placement of ambient EnergyLines. Times are milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientConfig {
    pub period_ms: u64,
    pub min_position_pct: f64,
    pub max_position_pct: f64,
    pub min_duration_ms: u64,
    pub max_duration_ms: u64,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            period_ms: 5_000,
            min_position_pct: 10.0,
            max_position_pct: 90.0,
            min_duration_ms: 3_000,
            max_duration_ms: 6_000,
            min_delay_ms: 0,
            max_delay_ms: 2_000,
        }
    }
}

impl AmbientConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    /// Longest lifetime any line can be given.
    pub fn max_lifetime(&self) -> Duration {
        Duration::from_millis(self.max_duration_ms.saturating_add(self.max_delay_ms))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.period_ms == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        let timings = [
            ("ambient.period_ms", self.period_ms),
            ("ambient.min_duration_ms", self.min_duration_ms),
            ("ambient.max_duration_ms", self.max_duration_ms),
            ("ambient.min_delay_ms", self.min_delay_ms),
            ("ambient.max_delay_ms", self.max_delay_ms),
            // A line's removal timer runs for duration plus delay.
            (
                "ambient.max_duration_ms + max_delay_ms",
                self.max_duration_ms.saturating_add(self.max_delay_ms),
            ),
        ];
        if let Some((field, value)) = timings.into_iter().find(|(_, v)| *v > MAX_TIMER_MS) {
            return Err(ConfigError::TimingTooLong {
                field,
                value,
                max: MAX_TIMER_MS,
            });
        }
        let (min, max) = (self.min_position_pct, self.max_position_pct);
        if !(min.is_finite() && max.is_finite()) || min < 0.0 || max > 100.0 {
            return Err(ConfigError::PositionOutOfBounds { min, max });
        }
        check_range("ambient.position_pct", min, max)?;
        check_range(
            "ambient.duration_ms",
            self.min_duration_ms as f64,
            self.max_duration_ms as f64,
        )?;
        check_range(
            "ambient.delay_ms",
            self.min_delay_ms as f64,
            self.max_delay_ms as f64,
        )
    }
}

fn check_margin(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidMargin { field, value })
    }
}

fn check_range(field: &'static str, min: f64, max: f64) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::InvertedRange { field, min, max });
    }
    Ok(())
}
