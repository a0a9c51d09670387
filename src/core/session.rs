//! Step state store: persists user-supplied configuration across wizard
//! steps.
//!
//! Backed by a JSON document under the install workspace. The contract is
//! deliberately small — exists/get/set — and every `set` writes through to
//! disk so a later invocation (the next step) observes the value. Values
//! live until the installation completes or the workspace is cleared.

use crate::core::context::SetupContext;
use crate::core::error::SetupError;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// Well-known session keys.
pub mod keys {
    pub const LIBRARY_PATH: &str = "library_path";
    pub const DEBUG_EMAIL: &str = "debug_email";
    pub const DATABASE_HOSTNAME: &str = "database_hostname";
    pub const DATABASE_NAME: &str = "database_name";
    pub const DATABASE_USERNAME: &str = "database_username";
    pub const DATABASE_PASSWORD: &str = "database_password";
    pub const SITE_DOMAIN: &str = "site_domain";
    pub const SITE_TITLE: &str = "site_title";
    pub const LANGUAGES: &str = "languages";
    pub const DEFAULT_LANGUAGE: &str = "default_language";
    pub const ADMIN_PASSWORD: &str = "admin_password";
    pub const PROVISIONED: &str = "provisioned";

    /// Keys that must be present before steps 3 and 4 may run.
    pub const STEP2_REQUIRED: &[&str] = &[
        DATABASE_HOSTNAME,
        DATABASE_NAME,
        DATABASE_USERNAME,
        DATABASE_PASSWORD,
        SITE_DOMAIN,
        LANGUAGES,
        DEFAULT_LANGUAGE,
    ];
}

#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    values: BTreeMap<String, JsonValue>,
}

impl SessionStore {
    /// Load the session for this root; a missing file is an empty session.
    pub fn load(ctx: &SetupContext) -> Result<Self, SetupError> {
        let path = ctx.session_path();
        let values = if path.is_file() {
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, values })
    }

    /// True when every named key is present.
    pub fn exists(&self, keys: &[&str]) -> bool {
        keys.iter().all(|k| self.values.contains_key(*k))
    }

    pub fn get_str(&self, key: &str) -> Option<String> {
        self.values
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }

    pub fn get_list(&self, key: &str) -> Option<Vec<String>> {
        let items = self.values.get(key)?.as_array()?;
        Some(
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.values
            .get(key)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    /// Fetch a string value that an earlier step must have produced.
    pub fn require_str(&self, key: &str) -> Result<String, SetupError> {
        self.get_str(key)
            .ok_or_else(|| SetupError::MissingState(key.to_string()))
    }

    pub fn require_list(&self, key: &str) -> Result<Vec<String>, SetupError> {
        self.get_list(key)
            .ok_or_else(|| SetupError::MissingState(key.to_string()))
    }

    /// Set one key and write the session through to disk.
    pub fn set(&mut self, key: &str, value: JsonValue) -> Result<(), SetupError> {
        self.values.insert(key.to_string(), value);
        self.save()
    }

    pub fn set_str(&mut self, key: &str, value: &str) -> Result<(), SetupError> {
        self.set(key, JsonValue::String(value.to_string()))
    }

    pub fn set_list(&mut self, key: &str, values: &[String]) -> Result<(), SetupError> {
        let items = values
            .iter()
            .map(|v| JsonValue::String(v.clone()))
            .collect();
        self.set(key, JsonValue::Array(items))
    }

    pub fn set_bool(&mut self, key: &str, value: bool) -> Result<(), SetupError> {
        self.set(key, JsonValue::Bool(value))
    }

    fn save(&self) -> Result<(), SetupError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}
