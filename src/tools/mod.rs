//! # Tool Contract Module (`/src/tools/`)
//!
//! A tool is a pluggable interaction mode ("select", "pan", "measure", ...)
//! that the host drives without knowing what it does. This module defines
//! that contract.
//!
//! ## Architecture Overview
//!
//! ```text
//! /src/tools/mod.rs       ← YOU ARE HERE - the Tool trait and its shared state
//! /src/tools/registry.rs  ← class registry, creates tools by class id
//! /src/tools/manager.rs   ← the host side: switching, routing, persistence
//! /src/tools/failed.rs    ← placeholder for classes that could not be created
//! ```
//!
//! ## Tool Implementation Pattern
//!
//! Each tool kind:
//! 1. Holds a `ToolCore` with its identity, icon, shortcut and properties
//! 2. Sets its shortcut and creates its properties in its constructor
//! 3. Implements `activate`/`deactivate`, and overrides the input hooks it needs
//! 4. Is registered with a `ToolClassRegistry` under a class id
//!
//! ## Lifecycle
//!
//! `create` → `initialize(context)` → (`activate` → events/`update` →
//! `deactivate`)* → dropped. `load`/`save` can happen at any point after
//! `initialize`.

pub mod failed;
pub mod manager;
pub mod registry;

pub use failed::FailedTool;
pub use manager::{ToolId, ToolManager};
pub use registry::{ToolClassInfo, ToolClassRegistry, ToolConstructor, ToolFactory};

use crate::core::config::Config;
use crate::core::context::{ContextHandle, DisplayContext};
use crate::core::io::input::{KeyEvent, RenderPanel, ViewportMouseEvent};
use crate::core::properties::Property;
use crate::core::settings::{CLASS_KEY, NAME_KEY};
use bevy::prelude::*;
use std::ops::{BitOr, BitOrAssign};
use std::sync::Arc;

/// What the host should do after a tool handled an event.
///
/// Combines bitwise like the integer flags it replaces:
/// `ToolResult::RENDER | ToolResult::FINISHED`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ToolResult(u8);

impl ToolResult {
    /// Nothing to do
    pub const NONE: ToolResult = ToolResult(0);
    /// The viewport must be redrawn
    pub const RENDER: ToolResult = ToolResult(1);
    /// The tool is done and the host should switch back to the default tool
    pub const FINISHED: ToolResult = ToolResult(2);

    const ALL_BITS: u8 = Self::RENDER.0 | Self::FINISHED.0;

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Build from raw bits; unknown bits are dropped.
    pub const fn from_bits(bits: u8) -> Self {
        ToolResult(bits & Self::ALL_BITS)
    }

    pub const fn needs_render(self) -> bool {
        self.0 & Self::RENDER.0 != 0
    }

    pub const fn is_finished(self) -> bool {
        self.0 & Self::FINISHED.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: ToolResult) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ToolResult {
    type Output = ToolResult;

    fn bitor(self, rhs: ToolResult) -> ToolResult {
        ToolResult(self.0 | rhs.0)
    }
}

impl BitOrAssign for ToolResult {
    fn bitor_assign(&mut self, rhs: ToolResult) {
        self.0 |= rhs.0;
    }
}

/// Notifications a tool emits for its host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolNotification {
    /// The tool wants to be removed
    Close,
    /// The tool's name changed to the given value
    NameChanged(String),
}

/// Toolbar icon of a tool, e.g. a glyph from the icon font or an image path
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Icon(pub String);

impl Icon {
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Pointer shape shown while a tool is active
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Cursor {
    /// The platform's default arrow
    #[default]
    Default,
    /// A cursor made from the tool's icon
    FromIcon(Icon),
    /// A named system cursor such as `"crosshair"` or `"grab"`
    Named(String),
}

impl Cursor {
    pub fn from_icon(icon: &Icon) -> Self {
        if icon.is_empty() {
            Cursor::Default
        } else {
            Cursor::FromIcon(icon.clone())
        }
    }
}

/// State every tool carries: identity, appearance, properties and context.
#[derive(Debug, Default)]
pub struct ToolCore {
    class_id: Option<String>,
    name: String,
    description: String,
    shortcut_key: Option<char>,
    access_all_keys: bool,
    icon: Icon,
    cursor: Cursor,
    property_container: Property,
    context: Option<ContextHandle>,
    notifications: Vec<ToolNotification>,
}

impl ToolCore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used from tool constructors
    pub fn with_shortcut_key(mut self, key: char) -> Self {
        self.shortcut_key = Some(key);
        self
    }

    /// Builder used from tool constructors
    pub fn with_access_all_keys(mut self, access_all_keys: bool) -> Self {
        self.access_all_keys = access_all_keys;
        self
    }

    // Identity ////////////////////////////////////////////////////////////////

    /// Class id the tool was created from; empty until the factory sets it
    pub fn class_id(&self) -> &str {
        self.class_id.as_deref().unwrap_or("")
    }

    /// Record the class id this instance was created from.
    ///
    /// # Panics
    ///
    /// Panics if a different class id was already set.
    pub fn set_class_id(&mut self, class_id: impl Into<String>) {
        let class_id = class_id.into();
        if let Some(existing) = &self.class_id {
            assert!(
                *existing == class_id,
                "class id of tool '{}' is already '{}', cannot change it to '{}'",
                self.name,
                existing,
                class_id
            );
            return;
        }
        self.class_id = Some(class_id);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the tool. A new name queues exactly one
    /// `ToolNotification::NameChanged`; the current name queues nothing.
    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if name == self.name {
            return;
        }
        self.property_container.set_name(name.clone());
        self.name = name.clone();
        self.notifications.push(ToolNotification::NameChanged(name));
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Key that activates the tool; `None` means no shortcut
    pub fn shortcut_key(&self) -> Option<char> {
        self.shortcut_key
    }

    pub fn set_shortcut_key(&mut self, key: Option<char>) {
        self.shortcut_key = key;
    }

    /// Whether the host must send every key to this tool while it is active
    pub fn access_all_keys(&self) -> bool {
        self.access_all_keys
    }

    pub fn set_access_all_keys(&mut self, access_all_keys: bool) {
        self.access_all_keys = access_all_keys;
    }

    // Appearance //////////////////////////////////////////////////////////////

    pub fn icon(&self) -> &Icon {
        &self.icon
    }

    /// Set the toolbar icon. The cursor is reset to one made from the icon.
    pub fn set_icon(&mut self, icon: Icon) {
        self.cursor = Cursor::from_icon(&icon);
        self.icon = icon;
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    // Properties //////////////////////////////////////////////////////////////

    /// Root of the tool's property tree, for display and editing by the host
    pub fn property_container(&self) -> &Property {
        &self.property_container
    }

    pub fn property_container_mut(&mut self) -> &mut Property {
        &mut self.property_container
    }

    // Context /////////////////////////////////////////////////////////////////

    pub fn is_initialized(&self) -> bool {
        self.context.is_some()
    }

    /// Bind the display context.
    ///
    /// # Panics
    ///
    /// Panics if a context is already bound.
    pub fn bind_context(&mut self, context: &Arc<dyn DisplayContext>) {
        assert!(
            self.context.is_none(),
            "tool '{}' ({}) was initialized twice",
            self.name,
            self.class_id()
        );
        self.context = Some(ContextHandle::new(context));
    }

    /// The display context.
    ///
    /// # Panics
    ///
    /// Panics before `initialize`, or if the host dropped the context.
    pub fn context(&self) -> Arc<dyn DisplayContext> {
        match &self.context {
            Some(handle) => handle.get(),
            None => panic!("tool '{}' used before initialize", self.name),
        }
    }

    pub fn try_context(&self) -> Option<Arc<dyn DisplayContext>> {
        self.context.as_ref().and_then(ContextHandle::upgrade)
    }

    /// Show a message in the host's status bar
    pub fn set_status(&self, message: &str) {
        match self.try_context() {
            Some(context) => context.set_status(message),
            None => debug!("Dropping status for uninitialized tool '{}': {}", self.name, message),
        }
    }

    // Notifications ///////////////////////////////////////////////////////////

    /// Ask the host to remove this tool
    pub fn close(&mut self) {
        self.notifications.push(ToolNotification::Close);
    }

    /// Drain queued notifications, oldest first
    pub fn take_notifications(&mut self) -> Vec<ToolNotification> {
        std::mem::take(&mut self.notifications)
    }

    // Persistence /////////////////////////////////////////////////////////////

    /// Write class id, name and the property tree into `config`
    pub fn save(&self, config: &mut Config) {
        self.property_container.save(config);
        config.map_set_value(CLASS_KEY, self.class_id());
        config.map_set_value(NAME_KEY, self.name.as_str());
    }

    /// Restore the name and the property tree from `config`.
    ///
    /// Missing entries keep their current values.
    pub fn load(&mut self, config: &Config) {
        match config.map_get_string(NAME_KEY) {
            Some(name) if !name.is_empty() => self.set_name(name),
            _ => debug!("No saved name for tool '{}', keeping it", self.name),
        }
        self.property_container.load(config);
    }
}

/// Trait that all tools implement.
///
/// Only `core`, `core_mut`, `activate` and `deactivate` are required. All
/// other hooks default to doing nothing (input hooks report
/// `ToolResult::NONE`) and persistence defaults to the property tree.
///
/// Every method is called on the host's frame thread and must return
/// promptly.
pub trait Tool: Send + Sync + 'static {
    fn core(&self) -> &ToolCore;

    fn core_mut(&mut self) -> &mut ToolCore;

    /// Bind the display context, then run `on_initialize`.
    ///
    /// # Panics
    ///
    /// Panics if called twice.
    fn initialize(&mut self, context: &Arc<dyn DisplayContext>) {
        self.core_mut().bind_context(context);
        self.on_initialize();
    }

    /// Setup that needs the display context
    fn on_initialize(&mut self) {}

    /// The tool became the one receiving input
    fn activate(&mut self);

    /// Release everything `activate` created
    fn deactivate(&mut self);

    /// Called once per frame with wall-clock and logical time deltas in seconds
    fn update(&mut self, wall_dt: f32, ros_dt: f32) {
        let _ = (wall_dt, ros_dt);
    }

    fn process_mouse_event(&mut self, event: &ViewportMouseEvent) -> ToolResult {
        let _ = event;
        ToolResult::NONE
    }

    /// Keys other than tool shortcuts, or every key with `access_all_keys`
    fn process_key_event(&mut self, event: &KeyEvent, panel: &RenderPanel) -> ToolResult {
        let _ = (event, panel);
        ToolResult::NONE
    }

    fn load(&mut self, config: &Config) {
        self.core_mut().load(config);
    }

    fn save(&self, config: &mut Config) {
        self.core().save(config);
    }

    // Shortcuts for the host ///////////////////////////////////////////////////

    fn class_id(&self) -> &str {
        self.core().class_id()
    }

    fn name(&self) -> &str {
        self.core().name()
    }

    fn shortcut_key(&self) -> Option<char> {
        self.core().shortcut_key()
    }

    fn access_all_keys(&self) -> bool {
        self.core().access_all_keys()
    }

    fn property_container(&self) -> &Property {
        self.core().property_container()
    }
}
