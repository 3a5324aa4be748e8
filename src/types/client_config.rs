// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The `config` entry of a client config document: one entry per platform.

use crate::error::Result;
use crate::types::platform::Platform;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use tracing::warn;

/// Configuration of one platform variant as handed to the mobile client.
///
/// Unknown fields are carried through untouched so rewriting the document
/// does not drop them. A missing `variantId` reads as empty.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub variant_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub variant_secret: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Platform keyed push configuration of a single mobile client.
///
/// Entries that are not a known platform, or whose content does not match
/// [`PlatformConfig`], are kept verbatim and written back unchanged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClientConfig {
    platforms: BTreeMap<Platform, PlatformConfig>,
    other: BTreeMap<String, serde_json::Value>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Entry<'a> {
    Platform(&'a PlatformConfig),
    Raw(&'a serde_json::Value),
}

impl Serialize for ClientConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut entries: BTreeMap<&str, Entry<'_>> = self
            .other
            .iter()
            .map(|(key, value)| (key.as_str(), Entry::Raw(value)))
            .collect();
        for (platform, config) in &self.platforms {
            entries.insert(platform.as_str(), Entry::Platform(config));
        }

        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (key, entry) in entries {
            map.serialize_entry(key, &entry)?;
        }
        map.end()
    }
}

impl ClientConfig {
    /// Parse the stored JSON.
    ///
    /// Content that is not a JSON object yields an empty config. Entries
    /// stored before are lost when the result is written back, hence the
    /// warning.
    pub fn parse(raw: &[u8]) -> Self {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return ClientConfig::default();
        }

        let entries: BTreeMap<String, serde_json::Value> = match serde_json::from_slice(raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    "Malformed client config '{}', treating it as empty: {}",
                    String::from_utf8_lossy(raw),
                    e
                );
                return ClientConfig::default();
            }
        };

        let mut config = ClientConfig::default();
        for (key, value) in entries {
            let Ok(platform) = key.parse::<Platform>() else {
                config.other.insert(key, value);
                continue;
            };
            match PlatformConfig::deserialize(&value) {
                Ok(platform_config) => {
                    config.platforms.insert(platform, platform_config);
                }
                Err(e) => {
                    warn!("Keeping unreadable {} client config as is: {}", platform, e);
                    config.other.insert(key, value);
                }
            }
        }
        config
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn get(&self, platform: Platform) -> Option<&PlatformConfig> {
        self.platforms.get(&platform)
    }

    /// Set the entry of `platform`, replacing an unreadable one
    pub fn insert(&mut self, platform: Platform, config: PlatformConfig) {
        self.other.retain(|key, _| key.parse::<Platform>().ok() != Some(platform));
        self.platforms.insert(platform, config);
    }

    /// Take out the entry of `platform`.
    ///
    /// An unreadable entry is removed as well and still reports the
    /// `variantId` it carries.
    pub fn remove(&mut self, platform: Platform) -> Option<PlatformConfig> {
        let mut removed = self.platforms.remove(&platform);

        let raw_keys: Vec<String> = self
            .other
            .keys()
            .filter(|key| key.parse::<Platform>().ok() == Some(platform))
            .cloned()
            .collect();
        for key in raw_keys {
            if let Some(value) = self.other.remove(&key) {
                removed.get_or_insert_with(|| PlatformConfig {
                    variant_id: value
                        .get("variantId")
                        .and_then(serde_json::Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    ..Default::default()
                });
            }
        }

        removed
    }

    /// No entries at all, known platform or not
    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty() && self.other.is_empty()
    }

    /// The readable platform entries
    pub fn iter(&self) -> impl Iterator<Item = (&Platform, &PlatformConfig)> {
        self.platforms.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform_config(variant_id: &str) -> PlatformConfig {
        PlatformConfig {
            variant_id: variant_id.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_both_platforms() {
        let config = ClientConfig::parse(
            br#"{"android":{"variantId":"v1","foo":"bar"},"ios":{"variantId":"v2"}}"#,
        );

        assert_eq!(config.iter().count(), 2);
        assert_eq!(config.get(Platform::Android).unwrap().variant_id, "v1");
        assert_eq!(config.get(Platform::Ios).unwrap().variant_id, "v2");
    }

    #[test]
    fn test_parse_accepts_capitalized_keys() {
        let config = ClientConfig::parse(br#"{"Android":{"variantId":"foo"}}"#);
        assert_eq!(config.get(Platform::Android).unwrap().variant_id, "foo");
    }

    #[test]
    fn test_parse_missing_variant_id_is_empty() {
        let config = ClientConfig::parse(br#"{"ios":{"variantSecret":"s"}}"#);
        assert_eq!(config.get(Platform::Ios).unwrap().variant_id, "");
    }

    #[test]
    fn test_parse_malformed_is_empty() {
        assert!(ClientConfig::parse(b"{not json").is_empty());
        assert!(ClientConfig::parse(b"").is_empty());
        assert!(ClientConfig::parse(b"null").is_empty());
    }

    #[test]
    fn test_serialization_keeps_unknown_fields() {
        let config = ClientConfig::parse(
            br#"{"android":{"variantId":"myVariantId", "foo":"bar"}, "ios":{"variantId":"yourVariantId","pop":"cake"}}"#,
        );
        let mut config = config;
        config.remove(Platform::Android);

        assert_eq!(
            config.to_json().unwrap(),
            r#"{"ios":{"variantId":"yourVariantId","pop":"cake"}}"#
        );
    }

    #[test]
    fn test_serialization_is_ordered_by_platform() {
        let mut config = ClientConfig::default();
        config.insert(Platform::Ios, platform_config("v2"));
        config.insert(
            Platform::Android,
            PlatformConfig {
                sender_id: Some("p".to_string()),
                variant_id: "v1".to_string(),
                variant_secret: "s".to_string(),
                ..Default::default()
            },
        );

        assert_eq!(
            config.to_json().unwrap(),
            r#"{"android":{"senderId":"p","variantId":"v1","variantSecret":"s"},"ios":{"variantId":"v2"}}"#
        );
    }

    #[test]
    fn test_unknown_platform_is_kept() {
        let mut config = ClientConfig::parse(
            br#"{"android":{"variantId":"v1"},"ios":{"variantId":"v2"},"web":{"variantId":"w1"}}"#,
        );

        assert_eq!(config.get(Platform::Android).unwrap().variant_id, "v1");
        assert_eq!(config.get(Platform::Ios).unwrap().variant_id, "v2");

        config.remove(Platform::Android);
        config.remove(Platform::Ios);
        assert!(!config.is_empty());
        assert_eq!(config.to_json().unwrap(), r#"{"web":{"variantId":"w1"}}"#);
    }

    #[test]
    fn test_unreadable_platform_entry_is_kept() {
        let mut config = ClientConfig::parse(
            br#"{"android":{"senderId":42,"variantId":"v1"},"ios":{"variantId":"v2"}}"#,
        );

        assert!(config.get(Platform::Android).is_none());
        assert_eq!(config.get(Platform::Ios).unwrap().variant_id, "v2");
        assert_eq!(
            config.to_json().unwrap(),
            r#"{"android":{"senderId":42,"variantId":"v1"},"ios":{"variantId":"v2"}}"#
        );

        let removed = config.remove(Platform::Android).unwrap();
        assert_eq!(removed.variant_id, "v1");
        assert_eq!(config.to_json().unwrap(), r#"{"ios":{"variantId":"v2"}}"#);
    }

    #[test]
    fn test_insert_replaces_unreadable_entry() {
        let mut config = ClientConfig::parse(br#"{"Android":{"senderId":42}}"#);
        config.insert(Platform::Android, platform_config("v1"));

        assert_eq!(config.to_json().unwrap(), r#"{"android":{"variantId":"v1"}}"#);
    }
}
