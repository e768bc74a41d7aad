use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Stable identifier of a navigable page section (`"home"`, `"about"`, ...).
///
/// Backed by `Arc<str>` so the active id can be published to observers and
/// copied into host commands without reallocating on every scroll event.
/// Ids are opaque keys: the core compares them and never parses them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SectionId(Arc<str>);

impl SectionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for SectionId {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for SectionId {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Lets `Option<SectionId>` compare through `as_deref` and lets a
/// `&SectionId` go wherever a section id `&str` is expected.
impl std::ops::Deref for SectionId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

/// Map lookups by `&str`. `Arc<str>` hashes exactly like `str`, so the
/// derived `Hash` stays consistent with this.
impl std::borrow::Borrow<str> for SectionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SectionId {
    fn from(s: &str) -> Self {
        SectionId(Arc::from(s))
    }
}

impl From<String> for SectionId {
    fn from(s: String) -> Self {
        SectionId(Arc::from(s))
    }
}

impl std::fmt::Display for SectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// Hand-rolled so the workspace does not need serde's `rc` feature.
impl Serialize for SectionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SectionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(SectionId::from(s))
    }
}
