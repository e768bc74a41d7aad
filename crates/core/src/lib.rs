//! Runtime core of the folio portfolio page.
//!
//! Host-independent: geometry comes in through [`layout::PageLayout`], side
//! effects go out as [`folio_protocol::HostCommand`]s.

pub mod config;
pub mod layout;
pub mod model;
pub mod runtime;

pub use config::{ConfigError, PageConfig};
pub use layout::{PageLayout, StaticLayout};
pub use runtime::{AmbientScheduler, Page, ScrollNavigator, SectionTracker};
