//! Tool class registry
//!
//! Hosts create tools by class id (e.g. `"demo/Measure"`) so a saved
//! workspace can recreate the same kinds of tools later. `ToolFactory` is
//! the seam plugin loaders implement; `ToolClassRegistry` is the built-in
//! implementation backed by plain constructor functions.

use super::{Icon, Tool};
use bevy::prelude::*;
use std::collections::BTreeMap;
use std::fmt;

/// Creates tool instances by class id
pub trait ToolFactory: Send + Sync {
    /// Create a new, uninitialized tool; `None` for unknown classes.
    ///
    /// The returned tool has its class id set.
    fn create(&self, class_id: &str) -> Option<Box<dyn Tool>>;

    /// All class ids this factory can create, sorted
    fn class_ids(&self) -> Vec<String>;

    /// Metadata for a class, used for default names and icons
    fn class_info(&self, class_id: &str) -> Option<&ToolClassInfo>;
}

/// Function that builds a fresh tool instance
pub type ToolConstructor = fn() -> Box<dyn Tool>;

/// Everything known about a registered tool class
#[derive(Clone)]
pub struct ToolClassInfo {
    pub class_id: String,
    /// Human-readable name, used as the default tool name
    pub name: String,
    pub description: String,
    pub icon: Icon,
    constructor: ToolConstructor,
}

impl fmt::Debug for ToolClassInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolClassInfo")
            .field("class_id", &self.class_id)
            .field("name", &self.name)
            .field("description", &self.description)
            .field("icon", &self.icon)
            .finish_non_exhaustive()
    }
}

/// Registry of tool classes
#[derive(Debug, Default)]
pub struct ToolClassRegistry {
    classes: BTreeMap<String, ToolClassInfo>,
}

impl ToolClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool class. The display name is derived from the class id,
    /// `"demo/MoveCamera"` becomes `"Move Camera"`.
    pub fn register(
        &mut self,
        class_id: &str,
        description: &str,
        icon: Icon,
        constructor: ToolConstructor,
    ) -> &mut Self {
        let info = ToolClassInfo {
            class_id: class_id.to_string(),
            name: display_name_from_class_id(class_id),
            description: description.to_string(),
            icon,
            constructor,
        };
        info!("Registering tool class: {} ({})", info.name, class_id);
        if self.classes.insert(class_id.to_string(), info).is_some() {
            warn!("Tool class {} was registered twice, keeping the latest", class_id);
        }
        self
    }

    pub fn contains(&self, class_id: &str) -> bool {
        self.classes.contains_key(class_id)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl ToolFactory for ToolClassRegistry {
    fn create(&self, class_id: &str) -> Option<Box<dyn Tool>> {
        let info = self.classes.get(class_id)?;
        let mut tool = (info.constructor)();
        tool.core_mut().set_class_id(class_id);
        Some(tool)
    }

    fn class_ids(&self) -> Vec<String> {
        self.classes.keys().cloned().collect()
    }

    fn class_info(&self, class_id: &str) -> Option<&ToolClassInfo> {
        self.classes.get(class_id)
    }
}

/// Last path segment of a class id with spaces between camel-case words
pub fn display_name_from_class_id(class_id: &str) -> String {
    let class_name = class_id.rsplit('/').next().unwrap_or(class_id);
    let mut name = String::with_capacity(class_name.len() + 4);
    let mut previous: Option<char> = None;
    for c in class_name.chars() {
        if let Some(prev) = previous {
            if c.is_uppercase() && prev.is_lowercase() {
                name.push(' ');
            }
        }
        name.push(c);
        previous = Some(c);
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolCore;

    struct NoopTool(ToolCore);

    impl Tool for NoopTool {
        fn core(&self) -> &ToolCore {
            &self.0
        }

        fn core_mut(&mut self) -> &mut ToolCore {
            &mut self.0
        }

        fn activate(&mut self) {}

        fn deactivate(&mut self) {}
    }

    fn noop() -> Box<dyn Tool> {
        Box::new(NoopTool(ToolCore::new().with_shortcut_key('n')))
    }

    #[test]
    fn test_display_names() {
        assert_eq!(display_name_from_class_id("demo/MoveCamera"), "Move Camera");
        assert_eq!(display_name_from_class_id("Select"), "Select");
        assert_eq!(display_name_from_class_id("demo/SetGoal2D"), "Set Goal2D");
        assert_eq!(display_name_from_class_id("a/b/PublishPoint"), "Publish Point");
    }

    #[test]
    fn test_create_sets_class_id() {
        let mut registry = ToolClassRegistry::new();
        registry.register("demo/Noop", "Does nothing", Icon::default(), noop);

        let tool = registry.create("demo/Noop").unwrap();
        assert_eq!(tool.class_id(), "demo/Noop");
        assert_eq!(tool.shortcut_key(), Some('n'));
        assert!(!tool.core().is_initialized());

        assert!(registry.create("demo/Missing").is_none());
    }

    #[test]
    fn test_class_listing() {
        let mut registry = ToolClassRegistry::new();
        registry
            .register("demo/Zoom", "", Icon::default(), noop)
            .register("demo/Noop", "", Icon::new("\u{E010}"), noop);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.class_ids(), vec!["demo/Noop", "demo/Zoom"]);
        let info = registry.class_info("demo/Noop").unwrap();
        assert_eq!(info.name, "Noop");
        assert_eq!(info.icon, Icon::new("\u{E010}"));
    }
}
