pub mod command;
pub mod id;
pub mod model;
pub mod parser;

pub use command::{EngineCommand, Route};
pub use id::BoxId;
pub use model::*;
pub use parser::{ModuleCommand, Waveform, classify, parse_float, recognize};
