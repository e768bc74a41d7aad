pub mod ambient;
pub mod navigator;
pub mod page;
pub mod tracker;

pub use ambient::AmbientScheduler;
pub use navigator::ScrollNavigator;
pub use page::Page;
pub use tracker::{SectionTracker, resolve_active};
