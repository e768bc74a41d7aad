pub mod commands;
pub mod energy_line;
pub mod section_id;
pub mod types;

pub use commands::HostCommand;
pub use energy_line::{EnergyLine, LineId};
pub use section_id::SectionId;
pub use types::{Orientation, ScrollBehavior, ScrollMetrics};
