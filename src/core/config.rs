//! Hierarchical configuration nodes
//!
//! A `Config` is the tree tools and the tool manager read from and write to
//! when a workspace is saved or restored. Nodes are either empty, a single
//! value, an ordered list of nodes, or a map of named nodes. The tree is
//! persisted as plain JSON.
//!
//! Reading is tolerant: the typed getters return `None` instead of failing,
//! and convert between compatible representations (`5` reads as `5.0`,
//! `"true"` reads as `true`) so hand-edited files still load.

use crate::core::errors::{VistoolContext, VistoolResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// A single scalar stored in a config node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl ConfigValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(value) => Some(*value),
            ConfigValue::Int(value) => Some(*value != 0),
            ConfigValue::String(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            ConfigValue::Float(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(value) => Some(*value),
            // Only whole floats convert, 2.5 is not an int
            ConfigValue::Float(value) if value.is_finite() && value.fract() == 0.0 => {
                Some(*value as i64)
            }
            ConfigValue::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(value) => Some(*value),
            ConfigValue::Int(value) => Some(*value as f64),
            ConfigValue::String(text) => text.trim().parse().ok(),
            ConfigValue::Bool(_) => None,
        }
    }

    /// Text form of the value; every scalar has one.
    pub fn as_string(&self) -> String {
        match self {
            ConfigValue::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(value) => write!(f, "{value}"),
            ConfigValue::Int(value) => write!(f, "{value}"),
            ConfigValue::Float(value) => write!(f, "{value}"),
            ConfigValue::String(text) => f.write_str(text),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Int(value)
    }
}

impl From<i32> for ConfigValue {
    fn from(value: i32) -> Self {
        ConfigValue::Int(value.into())
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Float(value)
    }
}

impl From<f32> for ConfigValue {
    fn from(value: f32) -> Self {
        ConfigValue::Float(value.into())
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

/// Shape of a config node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    Empty,
    Value,
    List,
    Map,
}

/// A node in a configuration tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Config {
    #[default]
    Empty,
    Value(ConfigValue),
    List(Vec<Config>),
    Map(BTreeMap<String, Config>),
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> ConfigKind {
        match self {
            Config::Empty => ConfigKind::Empty,
            Config::Value(_) => ConfigKind::Value,
            Config::List(_) => ConfigKind::List,
            Config::Map(_) => ConfigKind::Map,
        }
    }

    /// An empty node is the only invalid one
    pub fn is_valid(&self) -> bool {
        !matches!(self, Config::Empty)
    }

    // Values //////////////////////////////////////////////////////////////////

    pub fn value(&self) -> Option<&ConfigValue> {
        match self {
            Config::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Turn this node into a value node, dropping any children.
    pub fn set_value(&mut self, value: impl Into<ConfigValue>) {
        *self = Config::Value(value.into());
    }

    // Maps ////////////////////////////////////////////////////////////////////

    /// Make this node a map, dropping its content if it was anything else.
    pub fn make_map(&mut self) -> &mut BTreeMap<String, Config> {
        if !matches!(self, Config::Map(_)) {
            *self = Config::Map(BTreeMap::new());
        }
        match self {
            Config::Map(map) => map,
            _ => unreachable!("config node was just turned into a map"),
        }
    }

    pub fn map_set_value(&mut self, key: &str, value: impl Into<ConfigValue>) {
        self.make_map()
            .insert(key.to_string(), Config::Value(value.into()));
    }

    /// Child node under `key`, created empty if missing.
    pub fn map_make_child(&mut self, key: &str) -> &mut Config {
        self.make_map().entry(key.to_string()).or_default()
    }

    pub fn map_get_child(&self, key: &str) -> Option<&Config> {
        match self {
            Config::Map(map) => map.get(key),
            _ => None,
        }
    }

    pub fn map_get_value(&self, key: &str) -> Option<&ConfigValue> {
        self.map_get_child(key).and_then(Config::value)
    }

    pub fn map_get_string(&self, key: &str) -> Option<String> {
        self.map_get_value(key).map(ConfigValue::as_string)
    }

    pub fn map_get_int(&self, key: &str) -> Option<i64> {
        self.map_get_value(key).and_then(ConfigValue::as_int)
    }

    pub fn map_get_float(&self, key: &str) -> Option<f64> {
        self.map_get_value(key).and_then(ConfigValue::as_float)
    }

    pub fn map_get_bool(&self, key: &str) -> Option<bool> {
        self.map_get_value(key).and_then(ConfigValue::as_bool)
    }

    /// Keys of a map node in order; empty for any other kind.
    pub fn map_keys(&self) -> impl Iterator<Item = &str> {
        let map = match self {
            Config::Map(map) => Some(map),
            _ => None,
        };
        map.into_iter().flat_map(|map| map.keys().map(String::as_str))
    }

    // Lists ///////////////////////////////////////////////////////////////////

    fn make_list(&mut self) -> &mut Vec<Config> {
        if !matches!(self, Config::List(_)) {
            *self = Config::List(Vec::new());
        }
        match self {
            Config::List(list) => list,
            _ => unreachable!("config node was just turned into a list"),
        }
    }

    /// Append an empty node to this list and return it.
    pub fn list_append_new(&mut self) -> &mut Config {
        let list = self.make_list();
        let index = list.len();
        list.push(Config::Empty);
        &mut list[index]
    }

    pub fn list_len(&self) -> usize {
        match self {
            Config::List(list) => list.len(),
            _ => 0,
        }
    }

    pub fn list_child(&self, index: usize) -> Option<&Config> {
        match self {
            Config::List(list) => list.get(index),
            _ => None,
        }
    }

    pub fn list_children(&self) -> impl Iterator<Item = &Config> {
        let list = match self {
            Config::List(list) => Some(list),
            _ => None,
        };
        list.into_iter().flatten()
    }

    // Persistence /////////////////////////////////////////////////////////////

    pub fn from_json_str(text: &str) -> VistoolResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_string(&self) -> VistoolResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a config tree from a JSON file
    pub fn read_from_path<P: AsRef<Path>>(path: P) -> VistoolResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).with_file_context("read", path)?;
        serde_json::from_str(&contents).with_file_context("parse", path)
    }

    /// Save a config tree to a JSON file
    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> VistoolResult<()> {
        let path = path.as_ref();
        let json = self.to_json_string()?;
        fs::write(path, json).with_file_context("write", path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_values_and_children() {
        let mut config = Config::new();
        assert!(!config.is_valid());

        config.map_set_value("Class", "demo/Select");
        config.map_make_child("Grid").map_set_value("Size", 10);

        assert_eq!(config.kind(), ConfigKind::Map);
        assert_eq!(config.map_get_string("Class").as_deref(), Some("demo/Select"));
        assert_eq!(
            config.map_get_child("Grid").and_then(|grid| grid.map_get_int("Size")),
            Some(10)
        );
        assert_eq!(config.map_keys().collect::<Vec<_>>(), vec!["Class", "Grid"]);
        assert!(config.map_get_child("Missing").is_none());
    }

    #[test]
    fn test_tolerant_reads() {
        let mut config = Config::new();
        config.map_set_value("Whole", 4);
        config.map_set_value("Half", 2.5);
        config.map_set_value("Flag", "TRUE");
        config.map_set_value("Number", " 12 ");

        assert_eq!(config.map_get_float("Whole"), Some(4.0));
        assert_eq!(config.map_get_int("Half"), None);
        assert_eq!(config.map_get_bool("Flag"), Some(true));
        assert_eq!(config.map_get_int("Number"), Some(12));
        assert_eq!(config.map_get_string("Half").as_deref(), Some("2.5"));
        assert_eq!(config.map_get_bool("Half"), None);
    }

    #[test]
    fn test_list_append_and_read() {
        let mut config = Config::new();
        config.list_append_new().map_set_value("Name", "first");
        config.list_append_new().set_value(3);

        assert_eq!(config.list_len(), 2);
        assert_eq!(
            config.list_child(0).and_then(|c| c.map_get_string("Name")),
            Some("first".to_string())
        );
        assert_eq!(
            config.list_child(1).and_then(Config::value),
            Some(&ConfigValue::Int(3))
        );
        assert!(config.list_child(2).is_none());
        assert_eq!(config.list_children().count(), 2);
    }

    #[test]
    fn test_changing_kind_replaces_content() {
        let mut config = Config::new();
        config.set_value("leaf");
        config.map_set_value("Key", true);
        assert_eq!(config.value(), None);
        assert_eq!(config.map_get_bool("Key"), Some(true));
        // Reading a map as a list never fails, it is just empty
        assert_eq!(config.list_len(), 0);
    }

    #[test]
    fn test_json_shape() {
        let mut config = Config::new();
        config.map_set_value("Class", "demo/Measure");
        config.map_set_value("Precision", 3);
        config.map_set_value("Scale", 1.5);
        config.map_set_value("Visible", false);

        let json = config.to_json_string().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["Class"], "demo/Measure");
        assert_eq!(parsed["Precision"], 3);
        assert_eq!(parsed["Scale"], 1.5);
        assert_eq!(parsed["Visible"], false);

        let restored = Config::from_json_str(&json).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn test_null_is_empty() {
        let config = Config::from_json_str(r#"{"Tools": null}"#).unwrap();
        assert_eq!(config.map_get_child("Tools"), Some(&Config::Empty));
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir()
            .join(format!("vistool-config-{}.json", std::process::id()));
        let mut config = Config::new();
        config.map_make_child("Tools").list_append_new().map_set_value("Class", "demo/Pan");

        config.write_to_path(&path).unwrap();
        let restored = Config::read_from_path(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(restored, config);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = Config::read_from_path("/nonexistent/vistool/workspace.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/vistool/workspace.json"));
    }
}
