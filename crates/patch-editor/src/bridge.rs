//! Engine bridge: the one-way channel to the signal engine.
//!
//! Commands are fire-and-forget. A bridge never reports failure back to the
//! editor; an unreachable engine is logged and otherwise ignored.

use patch_core::command::EngineCommand;
use std::sync::mpsc::Sender;

/// Sink for engine commands.
pub trait EngineBridge {
    fn invoke(&mut self, command: &EngineCommand);
}

/// Fallback bridge used when no host primitive exists: logs the JSON form of
/// every command and drops it.
#[derive(Debug, Default)]
pub struct LogBridge;

impl EngineBridge for LogBridge {
    fn invoke(&mut self, command: &EngineCommand) {
        log::info!("mock {}", command.to_json());
    }
}

/// Hands commands to another thread (the host's engine loop).
#[derive(Debug)]
pub struct ChannelBridge {
    tx: Sender<EngineCommand>,
}

impl ChannelBridge {
    pub fn new(tx: Sender<EngineCommand>) -> Self {
        Self { tx }
    }
}

impl EngineBridge for ChannelBridge {
    fn invoke(&mut self, command: &EngineCommand) {
        if self.tx.send(command.clone()).is_err() {
            log::warn!("engine loop gone, dropped {}", command.to_json());
        }
    }
}
