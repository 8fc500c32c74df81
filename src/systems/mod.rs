//! Bevy integration: events, systems and the plugin that wire a
//! `ToolManager` resource into an app's frame loop.

pub mod plugins;
pub mod tool_dispatch;

pub use plugins::ToolPlugin;
pub use tool_dispatch::{RenderRequested, ToolClosed, ToolNameChanged};
