//! Display context
//!
//! The display context is the host's handle onto the shared scene and
//! render facilities. Tools never own it: they keep a `ContextHandle`,
//! a weak reference bound once in `Tool::initialize`, and the host keeps
//! the context alive for as long as any of its tools exist.

use bevy::prelude::*;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Identifier of a node created in the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneNodeId(pub u64);

/// Scene facilities a tool may use for transient markers and previews.
///
/// The scene is shared with the host and other tools, so every method takes
/// `&self` and implementations synchronize internally.
pub trait SceneManager: Send + Sync {
    fn create_node(&self, name: &str) -> SceneNodeId;

    /// Remove a node; returns `false` if it did not exist
    fn destroy_node(&self, id: SceneNodeId) -> bool;

    fn node_count(&self) -> usize;
}

/// What a tool can ask of its host
pub trait DisplayContext: Send + Sync {
    /// Name of the frame everything is displayed relative to
    fn fixed_frame(&self) -> String;

    /// Number of frames rendered so far
    fn frame_count(&self) -> u64;

    /// Called by the host once at the end of every frame
    fn advance_frame(&self) {}

    /// Ask for a redraw of all viewports
    fn queue_render(&self);

    /// Show a message in the host's status bar
    fn set_status(&self, message: &str);

    fn scene(&self) -> &dyn SceneManager;
}

/// Non-owning handle to the display context a tool was initialized with
#[derive(Clone)]
pub struct ContextHandle(Weak<dyn DisplayContext>);

impl ContextHandle {
    pub fn new(context: &Arc<dyn DisplayContext>) -> Self {
        Self(Arc::downgrade(context))
    }

    /// The context, or `None` if the host already dropped it
    pub fn upgrade(&self) -> Option<Arc<dyn DisplayContext>> {
        self.0.upgrade()
    }

    /// The context.
    ///
    /// # Panics
    ///
    /// Panics if the host dropped the context while one of its tools is
    /// still alive, which breaks the host contract.
    pub fn get(&self) -> Arc<dyn DisplayContext> {
        match self.upgrade() {
            Some(context) => context,
            None => panic!("display context was dropped while a tool still refers to it"),
        }
    }
}

impl fmt::Debug for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextHandle")
            .field("alive", &(self.0.strong_count() > 0))
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process scene bookkeeping: named nodes keyed by id
#[derive(Debug, Default)]
pub struct SceneGraph {
    next_id: AtomicU64,
    nodes: Mutex<BTreeMap<SceneNodeId, String>>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_name(&self, id: SceneNodeId) -> Option<String> {
        lock(&self.nodes).get(&id).cloned()
    }
}

impl SceneManager for SceneGraph {
    fn create_node(&self, name: &str) -> SceneNodeId {
        let id = SceneNodeId(self.next_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.nodes).insert(id, name.to_string());
        debug!("Created scene node {:?} ({})", id, name);
        id
    }

    fn destroy_node(&self, id: SceneNodeId) -> bool {
        let removed = lock(&self.nodes).remove(&id).is_some();
        if !removed {
            warn!("Tried to destroy unknown scene node {:?}", id);
        }
        removed
    }

    fn node_count(&self) -> usize {
        lock(&self.nodes).len()
    }
}

/// Display context used by the Bevy integration and by tests
#[derive(Debug)]
pub struct HostContext {
    fixed_frame: Mutex<String>,
    frame_count: AtomicU64,
    pending_renders: AtomicU64,
    status: Mutex<String>,
    scene: SceneGraph,
}

impl HostContext {
    pub fn new(fixed_frame: impl Into<String>) -> Self {
        Self {
            fixed_frame: Mutex::new(fixed_frame.into()),
            frame_count: AtomicU64::new(0),
            pending_renders: AtomicU64::new(0),
            status: Mutex::new(String::new()),
            scene: SceneGraph::new(),
        }
    }

    /// Shared handle in the form tools are initialized with
    pub fn shared(fixed_frame: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new(fixed_frame))
    }

    pub fn set_fixed_frame(&self, frame: impl Into<String>) {
        *lock(&self.fixed_frame) = frame.into();
    }

    /// Number of render requests since the last call, resetting the count
    pub fn take_render_requests(&self) -> u64 {
        self.pending_renders.swap(0, Ordering::Relaxed)
    }

    pub fn status(&self) -> String {
        lock(&self.status).clone()
    }

    pub fn scene_graph(&self) -> &SceneGraph {
        &self.scene
    }
}

impl Default for HostContext {
    fn default() -> Self {
        Self::new("map")
    }
}

impl DisplayContext for HostContext {
    fn fixed_frame(&self) -> String {
        lock(&self.fixed_frame).clone()
    }

    fn frame_count(&self) -> u64 {
        self.frame_count.load(Ordering::Relaxed)
    }

    fn advance_frame(&self) {
        self.frame_count.fetch_add(1, Ordering::Relaxed);
    }

    fn queue_render(&self) {
        self.pending_renders.fetch_add(1, Ordering::Relaxed);
    }

    fn set_status(&self, message: &str) {
        *lock(&self.status) = message.to_string();
    }

    fn scene(&self) -> &dyn SceneManager {
        &self.scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_graph_tracks_nodes() {
        let scene = SceneGraph::new();
        let a = scene.create_node("marker");
        let b = scene.create_node("preview");
        assert_ne!(a, b);
        assert_eq!(scene.node_count(), 2);
        assert_eq!(scene.node_name(b).as_deref(), Some("preview"));

        assert!(scene.destroy_node(a));
        assert!(!scene.destroy_node(a));
        assert_eq!(scene.node_count(), 1);
    }

    #[test]
    fn test_render_requests_are_counted_and_reset() {
        let context = HostContext::default();
        context.queue_render();
        context.queue_render();
        assert_eq!(context.take_render_requests(), 2);
        assert_eq!(context.take_render_requests(), 0);
    }

    #[test]
    fn test_frame_state_is_visible_through_handle() {
        let host = HostContext::shared("map");
        let context: Arc<dyn DisplayContext> = host.clone();
        let handle = ContextHandle::new(&context);

        host.set_fixed_frame("base_link");
        host.advance_frame();
        host.advance_frame();
        assert_eq!(handle.get().fixed_frame(), "base_link");
        assert_eq!(handle.get().frame_count(), 2);
    }

    #[test]
    fn test_handle_does_not_keep_context_alive() {
        let context: Arc<dyn DisplayContext> = HostContext::shared("odom");
        let handle = ContextHandle::new(&context);
        assert_eq!(handle.get().fixed_frame(), "odom");

        drop(context);
        assert!(handle.upgrade().is_none());
    }

    #[test]
    #[should_panic(expected = "display context was dropped")]
    fn test_handle_panics_after_host_drop() {
        let context: Arc<dyn DisplayContext> = HostContext::shared("odom");
        let handle = ContextHandle::new(&context);
        drop(context);
        handle.get();
    }
}
