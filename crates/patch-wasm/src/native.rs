//! Host engine bridge.
//!
//! The desktop shell injects `window.external.invoke(string)`; each engine
//! command is serialized to JSON and handed to it. In a plain browser the
//! primitive is missing and commands are only echoed to the console.

use js_sys::{Function, Reflect};
use patch_core::command::EngineCommand;
use patch_editor::bridge::EngineBridge;
use wasm_bindgen::{JsCast, JsValue};

#[derive(Debug, Default)]
pub struct HostBridge;

impl HostBridge {
    /// Resolve `window.external` and its `invoke` function, if present.
    fn host_invoke() -> Option<(JsValue, Function)> {
        let window = web_sys::window()?;
        let external = Reflect::get(&window, &JsValue::from_str("external")).ok()?;
        if external.is_undefined() || external.is_null() {
            return None;
        }
        let invoke = Reflect::get(&external, &JsValue::from_str("invoke")).ok()?;
        let invoke = invoke.dyn_into::<Function>().ok()?;
        Some((external, invoke))
    }

    /// Whether the shell primitive is available.
    pub fn is_connected() -> bool {
        Self::host_invoke().is_some()
    }
}

impl EngineBridge for HostBridge {
    fn invoke(&mut self, command: &EngineCommand) {
        let json = command.to_json();
        match Self::host_invoke() {
            Some((external, invoke)) => {
                if let Err(e) = invoke.call1(&external, &JsValue::from_str(&json)) {
                    log::warn!("engine invoke failed: {e:?}");
                }
            }
            None => {
                web_sys::console::log_1(&JsValue::from_str(&format!("mock {json}")));
            }
        }
    }
}
