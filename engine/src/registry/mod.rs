//! Profile registry - store and reuse field mappings.
//!
//! Saves named [`FieldMapping`]s to disk together with the column
//! fingerprint of the files they apply to, so a repeat import of the same
//! spreadsheet layout can pick its mapping up automatically via
//! [`ProfileRegistry::find_compatible`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ProfileError, ProfileResult};
use crate::mapping::FieldMapping;

/// Directory where profiles are stored (relative to current dir), unless
/// `TABLEPORT_PROFILE_DIR` overrides it.
const DEFAULT_PROFILE_DIR: &str = ".tableport/profiles";

/// A stored mapping profile with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredProfile {
    /// Unique identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// The field mapping.
    pub mapping: FieldMapping,
    /// Column headers this profile was created for.
    pub columns: Vec<String>,
    /// Creation timestamp.
    pub created_at: String,
    /// Last time this profile was used.
    pub last_used: Option<String>,
    /// Number of times used.
    pub use_count: u32,
}

/// Registry for managing mapping profiles.
pub struct ProfileRegistry {
    /// Directory where profiles are stored.
    profile_dir: PathBuf,
    /// Loaded profiles (id -> profile).
    profiles: HashMap<String, StoredProfile>,
}

impl ProfileRegistry {
    /// Create a registry, loading existing profiles from disk.
    pub fn new() -> Self {
        match std::env::var("TABLEPORT_PROFILE_DIR") {
            Ok(dir) if !dir.is_empty() => Self::with_dir(dir),
            _ => Self::with_dir(DEFAULT_PROFILE_DIR),
        }
    }

    /// Create a registry with a custom directory.
    pub fn with_dir(dir: impl AsRef<Path>) -> Self {
        let mut registry = Self {
            profile_dir: PathBuf::from(dir.as_ref()),
            profiles: HashMap::new(),
        };
        registry.load_all();
        registry
    }

    /// Load all profiles from the registry directory.
    fn load_all(&mut self) {
        if !self.profile_dir.exists() {
            return;
        }

        let entries = match fs::read_dir(&self.profile_dir) {
            Ok(e) => e,
            Err(_) => return,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "json") {
                if let Ok(content) = fs::read_to_string(&path) {
                    if let Ok(profile) = serde_json::from_str::<StoredProfile>(&content) {
                        self.profiles.insert(profile.id.clone(), profile);
                    }
                }
            }
        }
    }

    /// Get all stored profiles.
    pub fn list(&self) -> Vec<&StoredProfile> {
        self.profiles.values().collect()
    }

    /// Get a profile by ID.
    pub fn get(&self, id: &str) -> Option<&StoredProfile> {
        self.profiles.get(id)
    }

    /// Find profiles compatible with the given column headers.
    ///
    /// Returns profiles scoring above 0.5, best first; ties break toward the
    /// more-used profile.
    pub fn find_compatible(&self, columns: &[String]) -> Vec<(&StoredProfile, f64)> {
        let mut compatible: Vec<_> = self
            .profiles
            .values()
            .filter_map(|p| {
                let score = self.column_overlap(&p.columns, columns);
                if score > 0.5 {
                    Some((p, score))
                } else {
                    None
                }
            })
            .collect();

        compatible.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.0.use_count.cmp(&a.0.use_count))
        });

        compatible
    }

    /// Share of the stored columns that appear in the given headers,
    /// case-insensitively.
    fn column_overlap(&self, stored: &[String], columns: &[String]) -> f64 {
        if stored.is_empty() {
            return 0.0;
        }

        let columns_lower: Vec<String> = columns.iter().map(|c| c.to_lowercase()).collect();
        let match_count = stored
            .iter()
            .filter(|col| columns_lower.contains(&col.to_lowercase()))
            .count();

        match_count as f64 / stored.len() as f64
    }

    /// Save a new profile to the registry.
    pub fn save(
        &mut self,
        mapping: FieldMapping,
        name: &str,
        columns: Vec<String>,
    ) -> ProfileResult<String> {
        fs::create_dir_all(&self.profile_dir)?;

        let id = self.generate_id(name);
        let profile = StoredProfile {
            id: id.clone(),
            name: name.to_string(),
            mapping,
            columns,
            created_at: chrono::Utc::now().to_rfc3339(),
            last_used: None,
            use_count: 0,
        };

        let path = self.profile_dir.join(format!("{}.json", id));
        let content = serde_json::to_string_pretty(&profile)?;
        fs::write(&path, content)?;

        self.profiles.insert(id.clone(), profile);
        Ok(id)
    }

    /// Import a mapping from a JSON file as a new profile.
    ///
    /// The profile's column fingerprint is taken from the mapping's display
    /// labels, since those are what imported headers look like.
    pub fn import(&mut self, path: &Path, name: Option<&str>) -> ProfileResult<String> {
        let content = fs::read_to_string(path)?;
        let mapping = FieldMapping::from_json(&content)?;

        let profile_name = name.unwrap_or_else(|| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("imported")
        });

        let columns: Vec<String> = mapping.labels().map(String::from).collect();
        self.save(mapping, profile_name, columns)
    }

    /// Record a use of a profile, bumping its counters on disk.
    pub fn update_stats(&mut self, id: &str) {
        if let Some(profile) = self.profiles.get_mut(id) {
            profile.last_used = Some(chrono::Utc::now().to_rfc3339());
            profile.use_count += 1;

            let path = self.profile_dir.join(format!("{}.json", id));
            if let Ok(content) = serde_json::to_string_pretty(profile) {
                let _ = fs::write(&path, content);
            }
        }
    }

    /// Delete a profile from the registry.
    pub fn delete(&mut self, id: &str) -> ProfileResult<()> {
        if self.profiles.remove(id).is_some() {
            let path = self.profile_dir.join(format!("{}.json", id));
            fs::remove_file(&path)?;
            Ok(())
        } else {
            Err(ProfileError::NotFound(id.to_string()))
        }
    }

    /// Generate a unique ID from a name.
    fn generate_id(&self, name: &str) -> String {
        let slug: String = name
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '-' })
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-");

        let timestamp = chrono::Utc::now().timestamp_millis();
        format!("{}-{}", slug, timestamp)
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::new()
    }
}
