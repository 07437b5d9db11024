//! Flat settings store and the validated per-session config built from it.
//!
//! The host populates a [`Settings`] map (UI widgets, JSON file, whatever);
//! the core only ever reads it. Each operation snapshots the map into a
//! [`BakeConfig`] up front, so a half-edited settings panel can never change
//! a conversion mid-flight and there is no process-wide state.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{BakeError, BakeResult};

/// Texture resolution used when the `resolution` setting is absent.
pub const DEFAULT_RESOLUTION: u32 = 512;

/// Typed setting value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Str(String),
    Int(i32),
}

/// String key -> typed value container, read-only to the core.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(flatten)]
    map: HashMap<String, SettingValue>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: SettingValue) -> &mut Self {
        self.map.insert(key.into(), value);
        self
    }

    pub fn set_str(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.set(key, SettingValue::Str(value.into()))
    }

    pub fn set_int(&mut self, key: impl Into<String>, value: i32) -> &mut Self {
        self.set(key, SettingValue::Int(value))
    }

    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.map.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.map.get(key) {
            Some(SettingValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i32> {
        match self.map.get(key) {
            Some(SettingValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Present and non-empty. An empty string counts as absent, matching how
    /// unfilled UI fields land in the store.
    pub fn has(&self, key: &str) -> bool {
        match self.map.get(key) {
            Some(SettingValue::Str(s)) => !s.is_empty(),
            Some(SettingValue::Int(_)) => true,
            None => false,
        }
    }
}

/// Validated, immutable snapshot of the settings a bake session needs.
///
/// Owned by the session that created it; built fresh per operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BakeConfig {
    pub collection: String,
    pub description: String,
    /// Procedural/animated texture node driving the bake.
    pub sequence_node: String,
    /// Mesh the texture is baked against; its name prefixes artifact files.
    pub emitter_node: String,
    /// Attribute whose expression script receives the generated conditionals.
    pub attribute_id: String,
    pub object_name: Option<String>,
    pub resolution: u32,
    /// User-supplied trailing expression; falls back to the previous script's
    /// last `$a` line when absent.
    pub expression_override: Option<String>,
}

impl BakeConfig {
    /// Validate required keys and snapshot the rest. Fails with
    /// [`BakeError::MissingSetting`] before any side effect.
    pub fn from_settings(settings: &Settings) -> BakeResult<Self> {
        let required = |key: &'static str| -> BakeResult<String> {
            match settings.get(key) {
                Some(SettingValue::Str(s)) if !s.is_empty() => Ok(s.clone()),
                // Numeric node names happen; stringify rather than reject.
                Some(SettingValue::Int(v)) => Ok(v.to_string()),
                _ => Err(BakeError::MissingSetting(key)),
            }
        };

        let optional = |key: &str| -> Option<String> {
            settings
                .get_str(key)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };

        Ok(Self {
            collection: required("collection")?,
            description: required("description")?,
            sequence_node: required("sequence_node")?,
            emitter_node: required("emitter_node")?,
            attribute_id: required("attribute_id")?,
            object_name: optional("object_name"),
            resolution: settings
                .get_int("resolution")
                .filter(|v| *v > 0)
                .map(|v| v as u32)
                .unwrap_or(DEFAULT_RESOLUTION),
            expression_override: optional("expression_override"),
        })
    }

    /// Store reference for the target attribute, scoped by object when the
    /// optional `object_name` is set.
    pub fn attribute_ref(&self) -> String {
        match &self.object_name {
            Some(obj) => format!("{}/{}", obj, self.attribute_id),
            None => self.attribute_id.clone(),
        }
    }

    /// On-disk directory holding this attribute's baked artifacts.
    pub fn paint_dir(&self, desc_root: &Path) -> PathBuf {
        desc_root.join("paintmaps").join(&self.attribute_id)
    }

    /// `${DESC}`-rooted reference embedded in generated scripts. The
    /// placeholder is resolved by the host, never by this crate.
    pub fn map_reference(&self, file_name: &str) -> String {
        format!("${{DESC}}/paintmaps/{}/{}", self.attribute_id, file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_settings() -> Settings {
        let mut s = Settings::new();
        s.set_str("collection", "fur_col")
            .set_str("description", "scalp")
            .set_str("sequence_node", "noise1")
            .set_str("emitter_node", "head_geo")
            .set_str("attribute_id", "length");
        s
    }

    #[test]
    fn test_config_from_full_settings() {
        let cfg = BakeConfig::from_settings(&full_settings()).unwrap();
        assert_eq!(cfg.collection, "fur_col");
        assert_eq!(cfg.resolution, DEFAULT_RESOLUTION);
        assert!(cfg.expression_override.is_none());
        assert!(cfg.object_name.is_none());
    }

    #[test]
    fn test_missing_required_key_fails() {
        let mut s = full_settings();
        s.map.remove("attribute_id");
        match BakeConfig::from_settings(&s) {
            Err(BakeError::MissingSetting(key)) => assert_eq!(key, "attribute_id"),
            other => panic!("expected MissingSetting, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_string_counts_as_missing() {
        let mut s = full_settings();
        s.set_str("collection", "");
        assert!(!s.has("collection"));
        assert!(matches!(
            BakeConfig::from_settings(&s),
            Err(BakeError::MissingSetting("collection"))
        ));
    }

    #[test]
    fn test_int_valued_required_key_is_stringified() {
        let mut s = full_settings();
        s.set_int("collection", 5);
        let cfg = BakeConfig::from_settings(&s).unwrap();
        assert_eq!(cfg.collection, "5");
    }

    #[test]
    fn test_optional_keys() {
        let mut s = full_settings();
        s.set_int("resolution", 1024)
            .set_str("expression_override", "$a * 0.5");
        let cfg = BakeConfig::from_settings(&s).unwrap();
        assert_eq!(cfg.resolution, 1024);
        assert_eq!(cfg.expression_override.as_deref(), Some("$a * 0.5"));
    }

    #[test]
    fn test_non_positive_resolution_falls_back_to_default() {
        let mut s = full_settings();
        s.set_int("resolution", 0);
        let cfg = BakeConfig::from_settings(&s).unwrap();
        assert_eq!(cfg.resolution, DEFAULT_RESOLUTION);
    }

    #[test]
    fn test_map_reference_and_paint_dir() {
        let cfg = BakeConfig::from_settings(&full_settings()).unwrap();
        assert_eq!(
            cfg.map_reference("head_geo.7.ptx"),
            "${DESC}/paintmaps/length/head_geo.7.ptx"
        );
        assert_eq!(
            cfg.paint_dir(Path::new("/proj/desc")),
            PathBuf::from("/proj/desc/paintmaps/length")
        );
    }

    #[test]
    fn test_attribute_ref_scoped_by_object() {
        let mut cfg = BakeConfig::from_settings(&full_settings()).unwrap();
        assert_eq!(cfg.attribute_ref(), "length");
        cfg.object_name = Some("head_grp".to_owned());
        assert_eq!(cfg.attribute_ref(), "head_grp/length");
    }

    #[test]
    fn test_settings_json_round_trip() {
        let json = r#"{
            "collection": "fur_col",
            "description": "scalp",
            "sequence_node": "noise1",
            "emitter_node": "head_geo",
            "attribute_id": "length",
            "resolution": 256
        }"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        let cfg = BakeConfig::from_settings(&s).unwrap();
        assert_eq!(cfg.resolution, 256);
        assert_eq!(cfg.emitter_node, "head_geo");
    }
}
