// LLM abstraction layer

pub mod provider;
pub mod openai;
pub mod scripted;

pub use provider::*;
pub use scripted::ScriptedAdapter;
