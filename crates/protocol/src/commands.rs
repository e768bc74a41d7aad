use serde::{Deserialize, Serialize};

use crate::energy_line::{EnergyLine, LineId};
use crate::types::ScrollBehavior;

/// A single side effect the core asks its host to perform.
///
/// The core never touches the viewport or the DOM directly. It returns
/// `HostCommand`s and each host (browser, terminal) carries them out with its
/// own primitives. Every command is self-contained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostCommand {
    /// Move the viewport so its top edge sits at `top` (document pixels).
    /// Fire-and-forget: the host does not report completion.
    ScrollTo { top: f64, behavior: ScrollBehavior },

    /// Create the visual for `line` and append it to the ambient container.
    AttachLine { line: EnergyLine },

    /// Remove the visual created for `id`, and nothing else.
    DetachLine { id: LineId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_command_is_tagged() {
        let cmd = HostCommand::ScrollTo {
            top: 920.0,
            behavior: ScrollBehavior::Smooth,
        };
        let json = serde_json::to_value(&cmd).unwrap_or_default();
        assert_eq!(json["type"], "scroll_to");
        assert_eq!(json["behavior"], "smooth");
        assert_eq!(json["top"], 920.0);
    }

    #[test]
    fn detach_carries_only_the_id() {
        let json = serde_json::to_string(&HostCommand::DetachLine { id: LineId(3) })
            .unwrap_or_default();
        assert_eq!(json, r#"{"type":"detach_line","id":3}"#);
    }
}
