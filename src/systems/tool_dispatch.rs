//! Systems that feed input and frame ticks to the current tool and turn
//! tool notifications into Bevy events.

use crate::core::io::input::{PanelKeyEvent, ViewportId, ViewportMouseEvent};
use crate::tools::{ToolId, ToolManager, ToolNotification};
use bevy::prelude::*;

/// A tool asked for the given viewport to be redrawn
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderRequested {
    pub viewport: ViewportId,
}

/// A tool was renamed; toolbars should refresh its label
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct ToolNameChanged {
    pub tool: ToolId,
    pub name: String,
}

/// A tool closed itself and was removed from the manager
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolClosed {
    pub tool: ToolId,
}

pub fn dispatch_key_events(
    mut key_events: EventReader<PanelKeyEvent>,
    mut manager: ResMut<ToolManager>,
    mut render_requests: EventWriter<RenderRequested>,
) {
    for PanelKeyEvent { event, panel } in key_events.read() {
        if manager.handle_key_event(event, panel).needs_render() {
            render_requests.write(RenderRequested {
                viewport: panel.viewport,
            });
        }
    }
}

pub fn dispatch_mouse_events(
    mut mouse_events: EventReader<ViewportMouseEvent>,
    mut manager: ResMut<ToolManager>,
    mut render_requests: EventWriter<RenderRequested>,
) {
    for event in mouse_events.read() {
        if manager.handle_mouse_event(event).needs_render() {
            render_requests.write(RenderRequested {
                viewport: event.viewport,
            });
        }
    }
}

/// Tick the current tool with wall-clock and virtual (pausable, scalable) time
pub fn update_active_tool(
    real_time: Res<Time<Real>>,
    virtual_time: Res<Time<Virtual>>,
    mut manager: ResMut<ToolManager>,
) {
    manager.update(real_time.delta_secs(), virtual_time.delta_secs());
}

pub fn forward_tool_notifications(
    mut manager: ResMut<ToolManager>,
    mut renamed: EventWriter<ToolNameChanged>,
    mut closed: EventWriter<ToolClosed>,
) {
    for (tool, notification) in manager.process_notifications() {
        match notification {
            ToolNotification::NameChanged(name) => {
                debug!("Tool {:?} renamed to {}", tool, name);
                renamed.write(ToolNameChanged { tool, name });
            }
            ToolNotification::Close => {
                closed.write(ToolClosed { tool });
            }
        }
    }
}

/// Count the frame on the display context once every tool has run
pub fn advance_display_frame(manager: Res<ToolManager>) {
    manager.context().advance_frame();
}
