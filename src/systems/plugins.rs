use bevy::prelude::*;

use crate::core::io::input::{PanelKeyEvent, ViewportMouseEvent};
use crate::systems::tool_dispatch::{
    advance_display_frame, dispatch_key_events, dispatch_mouse_events,
    forward_tool_notifications, update_active_tool, RenderRequested, ToolClosed,
    ToolNameChanged,
};
use crate::tools::ToolManager;

/// Routes input events to the current tool of the `ToolManager` resource.
///
/// The host inserts the manager itself, since only it knows the display
/// context and which tool classes exist:
///
/// ```ignore
/// app.add_plugins(ToolPlugin)
///     .insert_resource(ToolManager::new(context, registry));
/// ```
///
/// Nothing runs until the manager resource exists.
pub struct ToolPlugin;

impl Plugin for ToolPlugin {
    fn build(&self, app: &mut App) {
        info!("[TOOLS] Registering ToolPlugin");

        app.add_event::<ViewportMouseEvent>()
            .add_event::<PanelKeyEvent>()
            .add_event::<RenderRequested>()
            .add_event::<ToolNameChanged>()
            .add_event::<ToolClosed>()
            .add_systems(
                Update,
                (
                    dispatch_key_events,
                    dispatch_mouse_events,
                    update_active_tool,
                    forward_tool_notifications,
                    advance_display_frame,
                )
                    .chain()
                    .run_if(resource_exists::<ToolManager>),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::{DisplayContext, HostContext, SceneNodeId};
    use crate::core::io::input::{KeyEvent, RenderPanel, ViewportId};
    use crate::tools::{Icon, Tool, ToolClassRegistry, ToolCore, ToolResult};
    use std::sync::Arc;

    /// Redraws on every click and counts frames through the scene
    struct ClickTool {
        core: ToolCore,
        ticks: Vec<SceneNodeId>,
    }

    impl Tool for ClickTool {
        fn core(&self) -> &ToolCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut ToolCore {
            &mut self.core
        }

        fn activate(&mut self) {}

        fn deactivate(&mut self) {
            let context = self.core.context();
            for tick in self.ticks.drain(..) {
                context.scene().destroy_node(tick);
            }
        }

        fn update(&mut self, _wall_dt: f32, _ros_dt: f32) {
            let tick = self.core.context().scene().create_node("tick");
            self.ticks.push(tick);
        }

        fn process_mouse_event(&mut self, event: &ViewportMouseEvent) -> ToolResult {
            if event.just_pressed(MouseButton::Left) {
                ToolResult::RENDER
            } else {
                ToolResult::NONE
            }
        }

        fn process_key_event(&mut self, event: &KeyEvent, _panel: &RenderPanel) -> ToolResult {
            if event.key == KeyCode::KeyR {
                ToolResult::RENDER
            } else {
                ToolResult::NONE
            }
        }
    }

    fn click_tool() -> Box<dyn Tool> {
        Box::new(ClickTool {
            core: ToolCore::new(),
            ticks: Vec::new(),
        })
    }

    fn test_app() -> (App, Arc<HostContext>) {
        let host = HostContext::shared("map");
        let mut registry = ToolClassRegistry::new();
        registry.register("test/Click", "", Icon::default(), click_tool);
        let mut manager = ToolManager::new(host.clone(), registry);
        manager.add_tool("test/Click");

        let mut app = App::new();
        app.add_plugins(ToolPlugin)
            .insert_resource(Time::<Real>::default())
            .insert_resource(Time::<Virtual>::default())
            .insert_resource(manager);
        (app, host)
    }

    #[test]
    fn test_mouse_events_reach_current_tool() {
        let (mut app, host) = test_app();
        app.world_mut().send_event(ViewportMouseEvent::pressed(
            ViewportId(3),
            Vec2::new(1.0, 2.0),
            MouseButton::Left,
        ));
        app.update();

        let requests = app.world().resource::<Events<RenderRequested>>();
        assert_eq!(requests.len(), 1);
        assert_eq!(host.take_render_requests(), 1);
    }

    #[test]
    fn test_key_events_reach_current_tool() {
        let (mut app, _host) = test_app();
        let panel = RenderPanel::new(ViewportId(2), UVec2::new(640, 480));
        app.world_mut().send_event(PanelKeyEvent {
            event: KeyEvent::pressed(KeyCode::KeyR),
            panel,
        });
        app.world_mut().send_event(PanelKeyEvent {
            event: KeyEvent::pressed(KeyCode::KeyQ),
            panel,
        });
        app.update();

        let requests = app.world().resource::<Events<RenderRequested>>();
        assert_eq!(requests.len(), 1);
    }

    #[test]
    fn test_current_tool_is_updated_every_frame() {
        let (mut app, host) = test_app();
        app.update();
        app.update();
        assert_eq!(host.scene().node_count(), 2);

        app.world_mut().resource_mut::<ToolManager>().remove_all();
        assert_eq!(host.scene().node_count(), 0);
    }

    #[test]
    fn test_frames_are_counted_on_the_context() {
        let (mut app, host) = test_app();
        for _ in 0..3 {
            app.update();
        }
        assert_eq!(host.frame_count(), 3);
    }

    #[test]
    fn test_notifications_become_events() {
        let (mut app, _host) = test_app();
        let id = {
            let mut manager = app.world_mut().resource_mut::<ToolManager>();
            let id = manager.tool_ids()[0];
            manager.tool_mut(id).unwrap().core_mut().set_name("Clicker");
            id
        };
        app.update();
        assert_eq!(app.world().resource::<Events<ToolNameChanged>>().len(), 1);

        app.world_mut()
            .resource_mut::<ToolManager>()
            .tool_mut(id)
            .unwrap()
            .core_mut()
            .close();
        app.update();
        assert_eq!(app.world().resource::<Events<ToolClosed>>().len(), 1);
        assert_eq!(app.world().resource::<ToolManager>().num_tools(), 0);
    }

    #[test]
    fn test_systems_wait_for_manager() {
        let mut app = App::new();
        app.add_plugins(ToolPlugin);
        app.world_mut().send_event(ViewportMouseEvent::moved(ViewportId(0), Vec2::ZERO));
        app.update();
        assert_eq!(app.world().resource::<Events<RenderRequested>>().len(), 0);
    }
}
