use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::version::Version;

// Only the fields the installer reads are typed. Everything else the portal
// sends is kept in `extra` so the catalog can be relayed unchanged.

/// Catalog page returned by `GET /api/mods`.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ModList {
    pub results: Vec<ModSummary>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ModSummary {
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ModDetails {
    pub name: String,
    /// Upstream order is kept; the first matching release wins.
    #[serde(default)]
    pub releases: Vec<Release>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Release {
    pub version: Version,
    pub download_url: String,
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ModDetails {
    pub fn find_release(&self, version: &Version) -> Option<&Release> {
        self.releases.iter().find(|r| r.version.equals(version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_matching_release_wins() {
        let details: ModDetails = serde_json::from_value(json!({
            "name": "rail-tools",
            "releases": [
                {"version": "1.0.0", "download_url": "/download/rail-tools/a", "file_name": "rail-tools_1.0.0.zip"},
                {"version": "1.1.0", "download_url": "/download/rail-tools/b", "file_name": "rail-tools_1.1.0.zip"},
                {"version": "1.1", "download_url": "/download/rail-tools/c", "file_name": "rail-tools_1.1.0-dup.zip"}
            ]
        }))
        .unwrap();

        let found = details.find_release(&Version::new(1, 1, 0)).unwrap();
        assert_eq!(found.download_url, "/download/rail-tools/b");
        assert!(details.find_release(&Version::new(2, 0, 0)).is_none());
    }

    #[test]
    fn tolerates_missing_optional_fields() {
        let list: ModList = serde_json::from_value(json!({
            "results": [{"name": "a"}, {"name": "b", "downloads_count": 12}]
        }))
        .unwrap();
        assert_eq!(list.results.len(), 2);
        assert!(list.extra.is_empty());
        assert_eq!(list.results[1].extra["downloads_count"], 12);
    }

    #[test]
    fn relays_unknown_fields_unchanged() {
        let upstream = json!({
            "name": "belts",
            "description": "Faster belts",
            "category": "logistics",
            "releases": [{
                "version": "1.1.0",
                "download_url": "/download/belts/a",
                "file_name": "belts_1.1.0.zip",
                "info_json": {"factorio_version": "1.1", "dependencies": ["base >= 1.1"]}
            }]
        });
        let details: ModDetails = serde_json::from_value(upstream.clone()).unwrap();
        assert_eq!(serde_json::to_value(&details).unwrap(), upstream);
    }
}
