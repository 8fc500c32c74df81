//! Property tree
//!
//! Tools expose their editable, persistable settings as a tree of
//! `Property` nodes hanging off their property container. The host shows
//! the tree in its settings panel and the whole tree is written to and
//! restored from a `Config` node.

use crate::core::config::{Config, ConfigValue};
use crate::core::settings::VALUE_KEY;
use bevy::prelude::*;

/// Value held by a property
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PropertyValue {
    /// No value; used by pure container nodes
    #[default]
    Invalid,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl PropertyValue {
    pub fn is_valid(&self) -> bool {
        !matches!(self, PropertyValue::Invalid)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(value) => Some(*value),
            PropertyValue::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(text) => Some(text),
            _ => None,
        }
    }

    /// Convert `self` into the type of `template`.
    ///
    /// An invalid template accepts anything. Returns `None` when no sensible
    /// conversion exists, e.g. `"abc"` into an int.
    pub fn coerce_to(&self, template: &PropertyValue) -> Option<PropertyValue> {
        let config_value = self.to_config_value()?;
        match template {
            PropertyValue::Invalid => Some(self.clone()),
            PropertyValue::Bool(_) => config_value.as_bool().map(PropertyValue::Bool),
            PropertyValue::Int(_) => config_value.as_int().map(PropertyValue::Int),
            PropertyValue::Float(_) => config_value.as_float().map(PropertyValue::Float),
            PropertyValue::String(_) => Some(PropertyValue::String(config_value.as_string())),
        }
    }

    pub fn to_config_value(&self) -> Option<ConfigValue> {
        match self {
            PropertyValue::Invalid => None,
            PropertyValue::Bool(value) => Some(ConfigValue::Bool(*value)),
            PropertyValue::Int(value) => Some(ConfigValue::Int(*value)),
            PropertyValue::Float(value) => Some(ConfigValue::Float(*value)),
            PropertyValue::String(text) => Some(ConfigValue::String(text.clone())),
        }
    }
}

impl From<ConfigValue> for PropertyValue {
    fn from(value: ConfigValue) -> Self {
        match value {
            ConfigValue::Bool(value) => PropertyValue::Bool(value),
            ConfigValue::Int(value) => PropertyValue::Int(value),
            ConfigValue::Float(value) => PropertyValue::Float(value),
            ConfigValue::String(text) => PropertyValue::String(text),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Int(value.into())
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<f32> for PropertyValue {
    fn from(value: f32) -> Self {
        PropertyValue::Float(value.into())
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

/// A node in the property tree
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    name: String,
    description: String,
    value: PropertyValue,
    min: Option<f64>,
    max: Option<f64>,
    should_be_saved: bool,
    children: Vec<Property>,
}

impl Default for Property {
    fn default() -> Self {
        Self::container("")
    }
}

impl Property {
    /// Create a leaf property holding `value`
    pub fn new(
        name: impl Into<String>,
        value: impl Into<PropertyValue>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            value: value.into(),
            min: None,
            max: None,
            should_be_saved: true,
            children: Vec::new(),
        }
    }

    /// Create a node without a value of its own, only used to group children
    pub fn container(name: impl Into<String>) -> Self {
        Self::new(name, PropertyValue::Invalid, "")
    }

    /// Clamp numeric values into `[min, max]`
    ///
    /// # Panics
    ///
    /// Panics if a bound is NaN or `min > max`.
    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        assert!(
            !min.is_nan() && !max.is_nan() && min <= max,
            "invalid bounds [{}, {}] for property '{}'",
            min,
            max,
            self.name
        );
        self.min = Some(min);
        self.max = Some(max);
        self.value = self.clamp(self.value.clone());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    /// Set the value, converted to the property's current type and clamped.
    ///
    /// Returns `true` if the stored value changed. A value that cannot be
    /// converted leaves the property untouched.
    pub fn set_value(&mut self, value: impl Into<PropertyValue>) -> bool {
        let Some(value) = value.into().coerce_to(&self.value) else {
            return false;
        };
        let value = self.clamp(value);
        if value == self.value {
            return false;
        }
        self.value = value;
        true
    }

    fn clamp(&self, value: PropertyValue) -> PropertyValue {
        if self.min.is_none() && self.max.is_none() {
            return value;
        }
        let min = self.min.unwrap_or(f64::NEG_INFINITY);
        let max = self.max.unwrap_or(f64::INFINITY);
        match value {
            // Stay in integer space so large values keep full precision
            PropertyValue::Int(v) => {
                PropertyValue::Int(v.max(min.ceil() as i64).min(max.floor() as i64))
            }
            PropertyValue::Float(v) if !v.is_nan() => PropertyValue::Float(v.clamp(min, max)),
            other => other,
        }
    }

    pub fn should_be_saved(&self) -> bool {
        self.should_be_saved
    }

    /// Exclude this node (and its children) from `save`
    pub fn set_should_be_saved(&mut self, save: bool) {
        self.should_be_saved = save;
    }

    // Children ////////////////////////////////////////////////////////////////

    /// Attach a child and return it. A child with the same name is replaced.
    pub fn add_child(&mut self, child: Property) -> &mut Property {
        let index = match self.children.iter().position(|c| c.name == child.name) {
            Some(index) => {
                warn!(
                    "Property '{}' already has a child named '{}', replacing it",
                    self.name, child.name
                );
                self.children[index] = child;
                index
            }
            None => {
                self.children.push(child);
                self.children.len() - 1
            }
        };
        &mut self.children[index]
    }

    pub fn remove_child(&mut self, name: &str) -> Option<Property> {
        let index = self.children.iter().position(|c| c.name == name)?;
        Some(self.children.remove(index))
    }

    pub fn child(&self, name: &str) -> Option<&Property> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    /// Look up a descendant by a `/` separated path, e.g. `"Grid/Size"`
    pub fn subprop(&self, path: &str) -> Option<&Property> {
        path.split('/')
            .try_fold(self, |node, segment| node.child(segment))
    }

    pub fn subprop_mut(&mut self, path: &str) -> Option<&mut Property> {
        let mut node = self;
        for segment in path.split('/') {
            node = node.child_mut(segment)?;
        }
        Some(node)
    }

    pub fn children(&self) -> impl Iterator<Item = &Property> {
        self.children.iter()
    }

    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    // Persistence /////////////////////////////////////////////////////////////

    /// Write this node into `config`.
    ///
    /// A leaf becomes a plain value (or an empty map if it has none). A node
    /// with children becomes a map of its saved children, plus a `"Value"`
    /// entry when the node carries a value itself.
    pub fn save(&self, config: &mut Config) {
        if self.children.is_empty() {
            match self.value.to_config_value() {
                Some(value) => config.set_value(value),
                None => {
                    config.make_map();
                }
            }
            return;
        }

        if let Some(value) = self.value.to_config_value() {
            config.map_set_value(VALUE_KEY, value);
        }
        for child in &self.children {
            if child.should_be_saved && !child.name.is_empty() {
                child.save(config.map_make_child(&child.name));
            }
        }
        // Make sure a node whose children were all skipped is still a map
        config.make_map();
    }

    /// Restore this node from `config`.
    ///
    /// Children missing from `config` keep their current value. Values of
    /// the wrong type are reported and ignored.
    pub fn load(&mut self, config: &Config) {
        match config {
            Config::Value(value) => self.load_value(value),
            Config::Map(_) => {
                if let Some(value) = config.map_get_value(VALUE_KEY) {
                    self.load_value(value);
                }
                for child in &mut self.children {
                    if child.name.is_empty() {
                        continue;
                    }
                    if let Some(child_config) = config.map_get_child(&child.name) {
                        child.load(child_config);
                    }
                }
            }
            Config::Empty | Config::List(_) => {}
        }
    }

    fn load_value(&mut self, value: &ConfigValue) {
        if !self.value.is_valid() {
            warn!(
                "Ignoring saved value '{}' for property '{}', it holds no value",
                value, self.name
            );
            return;
        }
        match PropertyValue::from(value.clone()).coerce_to(&self.value) {
            Some(coerced) => self.value = self.clamp(coerced),
            None => warn!(
                "Ignoring saved value '{}' for property '{}', keeping {:?}",
                value, self.name, self.value
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_properties() -> Property {
        let mut root = Property::container("");
        root.add_child(Property::new("Label", "a", "Text shown next to the cursor"));
        root.add_child(Property::new("Count", 5, "Number of steps"));
        let grid = root.add_child(Property::new("Grid", true, "Show the grid"));
        grid.add_child(Property::new("Size", 1.5, "Cell size").with_bounds(0.1, 10.0));
        root
    }

    #[test]
    fn test_set_value_coerces_to_existing_type() {
        let mut prop = Property::new("Count", 5, "");
        assert!(prop.set_value("7"));
        assert_eq!(prop.value(), &PropertyValue::Int(7));

        // Unconvertible values are rejected
        assert!(!prop.set_value("seven"));
        assert_eq!(prop.value(), &PropertyValue::Int(7));

        // Same value is not a change
        assert!(!prop.set_value(7));
    }

    #[test]
    fn test_bounds_clamp_values() {
        let mut prop = Property::new("Size", 1.0, "").with_bounds(0.5, 2.0);
        prop.set_value(9.0);
        assert_eq!(prop.value(), &PropertyValue::Float(2.0));

        let mut steps = Property::new("Steps", 3, "").with_bounds(1.0, 4.0);
        steps.set_value(-10);
        assert_eq!(steps.value(), &PropertyValue::Int(1));
    }

    #[test]
    fn test_bounded_ints_keep_precision() {
        let mut count = Property::new("Count", 0, "").with_bounds(0.0, 1e19);
        count.set_value(9_007_199_254_740_993_i64);
        assert_eq!(count.value(), &PropertyValue::Int(9_007_199_254_740_993));

        // Fractional bounds round inwards
        let mut steps = Property::new("Steps", 2, "").with_bounds(0.5, 3.5);
        steps.set_value(0);
        assert_eq!(steps.value(), &PropertyValue::Int(1));
        steps.set_value(9);
        assert_eq!(steps.value(), &PropertyValue::Int(3));
    }

    #[test]
    #[should_panic(expected = "invalid bounds [2, 1] for property 'Size'")]
    fn test_inverted_bounds_panic() {
        let _ = Property::new("Size", 1.0, "").with_bounds(2.0, 1.0);
    }

    #[test]
    #[should_panic(expected = "for property 'Size'")]
    fn test_nan_bounds_panic() {
        let _ = Property::new("Size", 1.0, "").with_bounds(f64::NAN, 1.0);
    }

    #[test]
    fn test_subprop_lookup() {
        let mut root = grid_properties();
        assert_eq!(
            root.subprop("Grid/Size").map(Property::value),
            Some(&PropertyValue::Float(1.5))
        );
        assert!(root.subprop("Grid/Missing").is_none());

        root.subprop_mut("Grid/Size").unwrap().set_value(3.0);
        assert_eq!(
            root.subprop("Grid/Size").and_then(|p| p.value().as_float()),
            Some(3.0)
        );
    }

    #[test]
    fn test_add_child_replaces_same_name() {
        let mut root = Property::container("");
        root.add_child(Property::new("Color", "red", ""));
        root.add_child(Property::new("Color", "blue", ""));
        assert_eq!(root.num_children(), 1);
        assert_eq!(root.child("Color").and_then(|p| p.value().as_str()), Some("blue"));
    }

    #[test]
    fn test_save_layout() {
        let root = grid_properties();
        let mut config = Config::new();
        root.save(&mut config);

        assert_eq!(config.map_get_string("Label").as_deref(), Some("a"));
        assert_eq!(config.map_get_int("Count"), Some(5));
        let grid = config.map_get_child("Grid").unwrap();
        assert_eq!(grid.map_get_bool(VALUE_KEY), Some(true));
        assert_eq!(grid.map_get_float("Size"), Some(1.5));
    }

    #[test]
    fn test_unsaved_children_are_skipped() {
        let mut root = grid_properties();
        root.child_mut("Count").unwrap().set_should_be_saved(false);
        let mut config = Config::new();
        root.save(&mut config);
        assert!(config.map_get_child("Count").is_none());
    }

    #[test]
    fn test_load_restores_saved_values() {
        let mut source = grid_properties();
        source.child_mut("Label").unwrap().set_value("b");
        source.subprop_mut("Grid/Size").unwrap().set_value(4.0);
        let mut config = Config::new();
        source.save(&mut config);

        let mut restored = grid_properties();
        restored.load(&config);
        assert_eq!(restored, source);
    }

    #[test]
    fn test_load_keeps_defaults_for_bad_or_missing_values() {
        let mut config = Config::new();
        config.map_set_value("Count", "lots");
        config.map_make_child("Grid").map_set_value("Size", 100.0);

        let mut root = grid_properties();
        root.load(&config);

        assert_eq!(root.child("Count").unwrap().value(), &PropertyValue::Int(5));
        assert_eq!(root.child("Label").unwrap().value().as_str(), Some("a"));
        // Out of range values are clamped, not rejected
        assert_eq!(root.subprop("Grid/Size").unwrap().value().as_float(), Some(10.0));
    }

    #[test]
    fn test_load_ignores_values_for_pure_groups() {
        let mut root = Property::container("");
        let group = root.add_child(Property::container("Group"));
        group.add_child(Property::new("Size", 2, "Cell size"));

        let config = Config::from_json_str(r#"{"Group": "garbage"}"#).unwrap();
        root.load(&config);

        let group = root.child("Group").unwrap();
        assert_eq!(group.value(), &PropertyValue::Invalid);
        assert_eq!(group.child("Size").unwrap().value(), &PropertyValue::Int(2));

        // Nothing made up is written back
        let mut saved = Config::new();
        root.save(&mut saved);
        let group = saved.map_get_child("Group").unwrap();
        assert!(group.map_get_value(VALUE_KEY).is_none());
        assert_eq!(group.map_get_int("Size"), Some(2));
    }
}
