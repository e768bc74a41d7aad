pub mod content;
pub mod demo;
pub mod navigation;
pub mod section;

pub use content::{ContactLink, Content, ContentError, Owner, Project, Skill};
pub use demo::DemoOverlay;
pub use navigation::NavigationState;
pub use section::{Section, SectionList};
