//! Engine command wire format.
//!
//! The editor talks to the signal engine through a one-way channel of JSON
//! objects shaped `{"cmd", "type", "value", "id"}`, all strings. Nothing is
//! ever read back.
//!
//! | cmd      | type                          | value               | id          |
//! |----------|-------------------------------|---------------------|-------------|
//! | `init`   | `""`                          | `""`                | `""`        |
//! | `module` | `freq` / `osc` / `out` / `remove` | frequency / waveform / box id | box id |
//! | `wire`   | `connect` / `disconnect`      | source box id       | destination box id |
//! | `exit`   | `""`                          | `""`                | `""`        |

use crate::id::BoxId;
use crate::parser::Waveform;
use serde::{Deserialize, Serialize};

/// One fire-and-forget command for the signal engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineCommand {
    pub cmd: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    pub id: String,
}

impl EngineCommand {
    fn new(cmd: &str, kind: &str, value: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            cmd: cmd.to_string(),
            kind: kind.to_string(),
            value: value.into(),
            id: id.into(),
        }
    }

    /// Sent once when the workspace mounts.
    pub fn init() -> Self {
        Self::new("init", "", "", "")
    }

    /// Sent when the editor shuts down.
    pub fn exit() -> Self {
        Self::new("exit", "", "", "")
    }

    pub fn add_freq(id: BoxId, freq: f64) -> Self {
        Self::new("module", "freq", format!("{freq}"), id.as_str())
    }

    pub fn add_osc(id: BoxId, wave: Waveform) -> Self {
        Self::new("module", "osc", wave.as_str(), id.as_str())
    }

    pub fn add_out(id: BoxId) -> Self {
        Self::new("module", "out", id.as_str(), id.as_str())
    }

    pub fn remove_module(id: BoxId) -> Self {
        Self::new("module", "remove", id.as_str(), id.as_str())
    }

    pub fn connect_wire(from: BoxId, to: BoxId) -> Self {
        Self::new("wire", "connect", from.as_str(), to.as_str())
    }

    pub fn disconnect_wire(from: BoxId, to: BoxId) -> Self {
        Self::new("wire", "disconnect", from.as_str(), to.as_str())
    }

    /// Serialize to the JSON text handed to the host primitive.
    pub fn to_json(&self) -> String {
        // Four plain string fields cannot fail to serialize.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Decode a command received on the engine side.
    pub fn from_json(text: &str) -> Result<Self, String> {
        serde_json::from_str(text).map_err(|e| format!("Engine command decode error: {e}"))
    }

    /// Classify for dispatch on the engine side.
    pub fn route(&self) -> Route<'_> {
        match self.cmd.as_str() {
            "init" => Route::Init,
            "exit" => Route::Exit,
            "module" => Route::Module {
                kind: &self.kind,
                value: &self.value,
                id: &self.id,
            },
            "wire" => match self.kind.as_str() {
                "connect" | "disconnect" => Route::Wire {
                    connect: self.kind == "connect",
                    from: &self.value,
                    to: &self.id,
                },
                _ => Route::Unknown,
            },
            _ => Route::Unknown,
        }
    }
}

/// Engine-side view of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    Init,
    Exit,
    Module {
        kind: &'a str,
        value: &'a str,
        id: &'a str,
    },
    Wire {
        connect: bool,
        from: &'a str,
        to: &'a str,
    },
    Unknown,
}
