//! Interactive tool contract for visualization hosts.
//!
//! Tools are pluggable interaction modes ("select", "pan", "measure", ...)
//! that a host drives with pointer and key events, per-frame ticks and
//! workspace load/save, without knowing what each tool does.
//!
//! - [`tools::Tool`] is the contract, [`tools::ToolCore`] the state every tool carries
//! - [`tools::ToolManager`] is the host side: switching, input routing, persistence
//! - [`systems::ToolPlugin`] wires a manager into a Bevy app

pub mod core;
pub mod logger;
pub mod systems;
pub mod tools;

pub use crate::core::config::{Config, ConfigValue};
pub use crate::core::context::{ContextHandle, DisplayContext, HostContext, SceneManager};
pub use crate::core::io::input::{KeyEvent, PanelKeyEvent, RenderPanel, ViewportMouseEvent};
pub use crate::core::properties::{Property, PropertyValue};
pub use crate::systems::ToolPlugin;
pub use crate::tools::{
    Cursor, Icon, Tool, ToolClassRegistry, ToolCore, ToolFactory, ToolId, ToolManager,
    ToolNotification, ToolResult,
};
