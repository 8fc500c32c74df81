//! Placeholder for tools whose class could not be created
//!
//! Restoring a workspace never aborts because one tool class is missing.
//! The host adds a `FailedTool` in its place, which keeps the saved config
//! and writes it back untouched, so the entry survives until the class is
//! available again.

use super::{Tool, ToolCore};
use crate::core::config::Config;
use crate::core::settings::FAILED_TOOL_DESCRIPTION;
use bevy::prelude::*;

pub struct FailedTool {
    core: ToolCore,
    error: String,
    saved_config: Config,
}

impl FailedTool {
    pub fn new(class_id: &str, error: impl Into<String>) -> Self {
        let mut core = ToolCore::new();
        core.set_class_id(class_id);
        core.set_description(FAILED_TOOL_DESCRIPTION);
        Self {
            core,
            error: error.into(),
            saved_config: Config::new(),
        }
    }

    /// Why the real tool could not be created
    pub fn error(&self) -> &str {
        &self.error
    }
}

impl Tool for FailedTool {
    fn core(&self) -> &ToolCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ToolCore {
        &mut self.core
    }

    fn activate(&mut self) {
        warn!(
            "Activated placeholder for tool class {}: {}",
            self.core.class_id(),
            self.error
        );
    }

    fn deactivate(&mut self) {}

    fn load(&mut self, config: &Config) {
        self.saved_config = config.clone();
    }

    fn save(&self, config: &mut Config) {
        if self.saved_config.is_valid() {
            *config = self.saved_config.clone();
        } else {
            self.core.save(config);
        }
    }
}
