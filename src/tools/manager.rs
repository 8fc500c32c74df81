//! Tool manager
//!
//! The host side of the tool contract. The manager owns the tool instances,
//! initializes them with the display context, keeps track of the current
//! and default tool, routes input to the current tool, and saves/restores
//! the tool list as part of a workspace.
//!
//! Switching always deactivates the old tool before activating the new one,
//! so a tool never sees two `activate` calls in a row.

use super::failed::FailedTool;
use super::registry::{display_name_from_class_id, ToolFactory};
use super::{Tool, ToolNotification, ToolResult};
use crate::core::config::Config;
use crate::core::context::DisplayContext;
use crate::core::io::input::{KeyEvent, RenderPanel, ViewportMouseEvent};
use crate::core::settings::{CLASS_KEY, TOOLS_KEY};
use bevy::prelude::*;
use std::sync::Arc;

/// Stable identifier of a tool owned by a `ToolManager`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToolId(u32);

struct ToolEntry {
    id: ToolId,
    tool: Box<dyn Tool>,
    /// Placeholder for a class that could not be created
    failed: bool,
}

/// Owns the tools of a host and drives their lifecycle
#[derive(Resource)]
pub struct ToolManager {
    context: Arc<dyn DisplayContext>,
    factory: Box<dyn ToolFactory>,
    tools: Vec<ToolEntry>,
    current: Option<ToolId>,
    default: Option<ToolId>,
    next_id: u32,
}

impl ToolManager {
    pub fn new(context: Arc<dyn DisplayContext>, factory: impl ToolFactory + 'static) -> Self {
        Self {
            context,
            factory: Box::new(factory),
            tools: Vec::new(),
            current: None,
            default: None,
            next_id: 0,
        }
    }

    pub fn context(&self) -> &Arc<dyn DisplayContext> {
        &self.context
    }

    pub fn factory(&self) -> &dyn ToolFactory {
        self.factory.as_ref()
    }

    // Tool list ///////////////////////////////////////////////////////////////

    /// Create, name and initialize a tool of `class_id`.
    ///
    /// Unknown classes get a `FailedTool` placeholder so a workspace still
    /// loads. The first tool that was created successfully becomes the
    /// default and current tool.
    pub fn add_tool(&mut self, class_id: &str) -> ToolId {
        let (mut tool, failed): (Box<dyn Tool>, bool) = match self.factory.create(class_id) {
            Some(tool) => (tool, false),
            None => {
                warn!("Unknown tool class {}, adding a placeholder", class_id);
                let error = format!("tool class '{class_id}' is not registered");
                (Box::new(FailedTool::new(class_id, error)), true)
            }
        };

        match self.factory.class_info(class_id) {
            Some(info) => {
                tool.core_mut().set_name(info.name.clone());
                if !info.icon.is_empty() {
                    tool.core_mut().set_icon(info.icon.clone());
                }
                if tool.core().description().is_empty() {
                    tool.core_mut().set_description(info.description.clone());
                }
            }
            None => tool.core_mut().set_name(display_name_from_class_id(class_id)),
        }

        tool.initialize(&self.context);
        // Naming during setup is not a change the host needs to hear about
        tool.core_mut().take_notifications();

        if let Some(key) = tool.shortcut_key() {
            if let Some(other) = self.tool_by_shortcut(key).and_then(|id| self.tool(id)) {
                warn!(
                    "Shortcut '{}' of {} shadows the one of {}",
                    key,
                    tool.name(),
                    other.name()
                );
            }
        }

        let id = ToolId(self.next_id);
        self.next_id += 1;
        info!("Added tool {} ({}) as {:?}", tool.name(), class_id, id);
        self.tools.push(ToolEntry { id, tool, failed });

        if self.default.is_none() && !failed {
            self.set_default_tool(id);
            self.set_current_tool(id);
        }
        id
    }

    /// Remove a tool, deactivating it first if it is current.
    ///
    /// When the default tool goes, the first remaining tool that is not a
    /// placeholder takes its place; when the current tool goes, the default
    /// tool becomes current.
    pub fn remove_tool(&mut self, id: ToolId) -> bool {
        let Some(index) = self.tools.iter().position(|entry| entry.id == id) else {
            return false;
        };
        if self.current == Some(id) {
            self.tools[index].tool.deactivate();
            self.current = None;
        }
        let entry = self.tools.remove(index);
        info!("Removed tool {} ({:?})", entry.tool.name(), id);

        if self.default == Some(id) {
            self.default = self
                .tools
                .iter()
                .find(|entry| !entry.failed)
                .map(|entry| entry.id);
        }
        if self.current.is_none() {
            if let Some(default) = self.default {
                self.set_current_tool(default);
            }
        }
        true
    }

    /// Deactivate the current tool and drop every tool
    pub fn remove_all(&mut self) {
        if let Some(tool) = self.current_tool_mut() {
            tool.deactivate();
        }
        self.current = None;
        self.default = None;
        self.tools.clear();
    }

    pub fn num_tools(&self) -> usize {
        self.tools.len()
    }

    /// Tool ids in toolbar order
    pub fn tool_ids(&self) -> Vec<ToolId> {
        self.tools.iter().map(|entry| entry.id).collect()
    }

    pub fn tool(&self, id: ToolId) -> Option<&dyn Tool> {
        let entry = self.tools.iter().find(|entry| entry.id == id)?;
        Some(entry.tool.as_ref())
    }

    pub fn tool_mut(&mut self, id: ToolId) -> Option<&mut dyn Tool> {
        let entry = self.tools.iter_mut().find(|entry| entry.id == id)?;
        let tool: &mut dyn Tool = entry.tool.as_mut();
        Some(tool)
    }

    /// Tool bound to `key`; the most recently added one wins
    pub fn tool_by_shortcut(&self, key: char) -> Option<ToolId> {
        let key = key.to_ascii_lowercase();
        self.tools
            .iter()
            .rev()
            .find(|entry| {
                entry
                    .tool
                    .shortcut_key()
                    .is_some_and(|shortcut| shortcut.to_ascii_lowercase() == key)
            })
            .map(|entry| entry.id)
    }

    // Current and default tool ////////////////////////////////////////////////

    pub fn current_tool_id(&self) -> Option<ToolId> {
        self.current
    }

    pub fn current_tool(&self) -> Option<&dyn Tool> {
        self.tool(self.current?)
    }

    pub fn current_tool_mut(&mut self) -> Option<&mut dyn Tool> {
        let id = self.current?;
        self.tool_mut(id)
    }

    pub fn default_tool_id(&self) -> Option<ToolId> {
        self.default
    }

    /// Make `id` the tool to return to. Placeholders cannot be the default.
    pub fn set_default_tool(&mut self, id: ToolId) -> bool {
        match self.tools.iter().find(|entry| entry.id == id) {
            None => {
                warn!("Cannot make unknown tool {:?} the default", id);
                false
            }
            Some(entry) if entry.failed => {
                warn!("Cannot make placeholder {} the default tool", entry.tool.name());
                false
            }
            Some(_) => {
                self.default = Some(id);
                true
            }
        }
    }

    /// Whether `id` stands in for a class the factory could not create
    pub fn is_placeholder(&self, id: ToolId) -> bool {
        self.tools.iter().any(|entry| entry.id == id && entry.failed)
    }

    /// Make `id` the current tool. Switching to the current tool does nothing.
    pub fn set_current_tool(&mut self, id: ToolId) -> bool {
        if self.current == Some(id) {
            return true;
        }
        if self.tool(id).is_none() {
            warn!("Cannot switch to unknown tool {:?}", id);
            return false;
        }

        let previous = self.current.take();
        if let Some(old) = previous.and_then(|old| self.tool_mut(old)) {
            old.deactivate();
        }
        self.current = Some(id);
        if let Some(tool) = self.tool_mut(id) {
            tool.activate();
            info!("Switched from {:?} to {} tool", previous, tool.name());
        }
        true
    }

    fn switch_to_default(&mut self) {
        if let Some(default) = self.default {
            self.set_current_tool(default);
        }
    }

    // Input routing ///////////////////////////////////////////////////////////

    fn apply_result(&mut self, result: ToolResult) {
        if result.needs_render() {
            self.context.queue_render();
        }
        if result.is_finished() {
            debug!("Current tool finished, returning to the default tool");
            self.switch_to_default();
        }
    }

    /// Send a pointer event to the current tool and act on its result
    pub fn handle_mouse_event(&mut self, event: &ViewportMouseEvent) -> ToolResult {
        let Some(tool) = self.current_tool_mut() else {
            return ToolResult::NONE;
        };
        let result = tool.process_mouse_event(event);
        self.apply_result(result);
        result
    }

    /// Route a key event.
    ///
    /// A current tool with `access_all_keys` gets every key. Otherwise a
    /// pressed Escape returns to the default tool, and a pressed shortcut
    /// key of another tool switches to it. Anything else goes to the
    /// current tool.
    pub fn handle_key_event(&mut self, event: &KeyEvent, panel: &RenderPanel) -> ToolResult {
        let takes_all_keys = self
            .current_tool()
            .is_some_and(|tool| tool.access_all_keys());

        if !takes_all_keys && event.pressed {
            if event.key == KeyCode::Escape && self.default.is_some() && self.default != self.current {
                self.switch_to_default();
                return ToolResult::NONE;
            }

            let plain = !(event.modifiers.ctrl || event.modifiers.alt || event.modifiers.super_key);
            let target = event
                .shortcut_char()
                .filter(|_| plain)
                .and_then(|key| self.tool_by_shortcut(key));
            if let Some(target) = target.filter(|target| Some(*target) != self.current) {
                self.set_current_tool(target);
                return ToolResult::NONE;
            }
        }

        let Some(tool) = self.current_tool_mut() else {
            return ToolResult::NONE;
        };
        let result = tool.process_key_event(event, panel);
        self.apply_result(result);
        result
    }

    /// Per-frame tick for the current tool
    pub fn update(&mut self, wall_dt: f32, ros_dt: f32) {
        if let Some(tool) = self.current_tool_mut() {
            tool.update(wall_dt, ros_dt);
        }
    }

    // Notifications ///////////////////////////////////////////////////////////

    /// Drain notifications from every tool, oldest first.
    ///
    /// Tools that asked to close are removed before this returns.
    pub fn process_notifications(&mut self) -> Vec<(ToolId, ToolNotification)> {
        let mut notifications = Vec::new();
        for entry in &mut self.tools {
            for notification in entry.tool.core_mut().take_notifications() {
                notifications.push((entry.id, notification));
            }
        }
        for (id, notification) in &notifications {
            if *notification == ToolNotification::Close {
                self.remove_tool(*id);
            }
        }
        notifications
    }

    // Persistence /////////////////////////////////////////////////////////////

    /// Write every tool, in order, into the `"Tools"` list of `config`
    pub fn save(&self, config: &mut Config) {
        let list = config.map_make_child(TOOLS_KEY);
        *list = Config::List(Vec::new());
        for entry in &self.tools {
            entry.tool.save(list.list_append_new());
        }
    }

    /// Replace all tools with the ones saved in `config`.
    ///
    /// Entries without a class are skipped; unknown classes become
    /// placeholders that keep their saved config.
    pub fn load(&mut self, config: &Config) {
        self.remove_all();
        let Some(tools) = config.map_get_child(TOOLS_KEY) else {
            warn!("No saved tools found, starting with an empty tool list");
            return;
        };
        for tool_config in tools.list_children() {
            let Some(class_id) = tool_config.map_get_string(CLASS_KEY) else {
                warn!("Skipping saved tool without a class");
                continue;
            };
            let id = self.add_tool(&class_id);
            if let Some(tool) = self.tool_mut(id) {
                tool.load(tool_config);
            }
        }
        info!("Loaded {} tools", self.tools.len());
    }
}
