use crate::adapters::firestore::{FirestoreSettings, DEFAULT_BASE_URL, DEFAULT_DATABASE};
use crate::core::schedule::{parse_utc_offset, LocalConvention};
use crate::core::service::{
    DEFAULT_GROUPS_COLLECTION, DEFAULT_RESERVATIONS_COLLECTION, DEFAULT_ROOMS_COLLECTION,
};
use crate::core::sweeper::DEFAULT_SWEEP_INTERVAL;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{BookingError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Firestore,
    Memory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub collections: CollectionsConfig,
    pub schedule: ScheduleConfig,
    pub memory: MemorySeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub kind: StoreKind,
    pub base_url: String,
    pub project_id: String,
    pub database: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::Firestore,
            base_url: DEFAULT_BASE_URL.to_string(),
            project_id: String::new(),
            database: DEFAULT_DATABASE.to_string(),
            api_key: None,
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionsConfig {
    pub groups: String,
    pub rooms: String,
    pub reservations: String,
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            groups: DEFAULT_GROUPS_COLLECTION.to_string(),
            rooms: DEFAULT_ROOMS_COLLECTION.to_string(),
            reservations: DEFAULT_RESERVATIONS_COLLECTION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// 未設定時依本機時區規則換算，含日光節約時間
    pub utc_offset: Option<String>,
    pub sweep_interval_seconds: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            utc_offset: None,
            sweep_interval_seconds: DEFAULT_SWEEP_INTERVAL.as_secs(),
        }
    }
}

/// 記憶體儲存的初始參考資料
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemorySeedConfig {
    pub groups: Vec<String>,
    pub rooms: Vec<String>,
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content)?;
        toml::from_str(&processed)
            .map_err(|e| BookingError::config("toml_parsing", format!("TOML parsing error: {}", e)))
    }

    /// 替換環境變數 (例如 ${FIRESTORE_API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| BookingError::config("toml_parsing", e.to_string()))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn firestore_settings(&self) -> FirestoreSettings {
        FirestoreSettings {
            base_url: self.store.base_url.clone(),
            project_id: self.store.project_id.clone(),
            database: self.store.database.clone(),
            api_key: self.store.api_key.clone().filter(|key| !key.is_empty()),
            timeout: Duration::from_secs(self.store.timeout_seconds),
        }
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        if self.store.kind == StoreKind::Firestore {
            validation::validate_url("store.base_url", &self.store.base_url)?;
            validation::validate_non_empty_string("store.project_id", &self.store.project_id)?;
            validation::validate_substituted("store.project_id", &self.store.project_id)?;
            validation::validate_non_empty_string("store.database", &self.store.database)?;
            if let Some(key) = &self.store.api_key {
                validation::validate_substituted("store.api_key", key)?;
            }
            validation::validate_range("store.timeout_seconds", self.store.timeout_seconds, 1, 300)?;
        }

        validation::validate_collection_name("collections.groups", &self.collections.groups)?;
        validation::validate_collection_name("collections.rooms", &self.collections.rooms)?;
        validation::validate_collection_name(
            "collections.reservations",
            &self.collections.reservations,
        )?;

        if let Some(raw) = &self.schedule.utc_offset {
            if parse_utc_offset(raw).is_none() {
                return Err(BookingError::config(
                    "schedule.utc_offset",
                    format!("'{}' is not an offset like +03:00", raw),
                ));
            }
        }
        validation::validate_range(
            "schedule.sweep_interval_seconds",
            self.schedule.sweep_interval_seconds,
            1,
            86_400,
        )?;

        Ok(())
    }
}

impl ConfigProvider for AppConfig {
    fn groups_collection(&self) -> &str {
        &self.collections.groups
    }

    fn rooms_collection(&self) -> &str {
        &self.collections.rooms
    }

    fn reservations_collection(&self) -> &str {
        &self.collections.reservations
    }

    fn local_convention(&self) -> LocalConvention {
        self.schedule
            .utc_offset
            .as_deref()
            .and_then(parse_utc_offset)
            .map(LocalConvention::Fixed)
            .unwrap_or(LocalConvention::Host)
    }

    fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.schedule.sweep_interval_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_collections_and_interval() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.store.kind, StoreKind::Firestore);
        assert_eq!(config.collections.groups, "jumuiaGroups");
        assert_eq!(config.collections.reservations, "reservations");
        assert_eq!(config.sweep_interval(), Duration::from_secs(10));
    }

    #[test]
    fn test_firestore_requires_project() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert!(config.validate().is_err());

        let config = AppConfig::from_toml_str("[store]\nproject_id = \"jumuia\"\n").unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_memory_store_skips_firestore_checks() {
        let config = AppConfig::from_toml_str(
            r#"
            [store]
            kind = "memory"

            [memory]
            groups = ["St. Joseph"]
            rooms = ["Hall"]
            "#,
        )
        .unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.memory.rooms, vec!["Hall".to_string()]);
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("JUMUIA_BOOKING_TEST_PROJECT", "parish-prod");
        let config = AppConfig::from_toml_str(
            "[store]\nproject_id = \"${JUMUIA_BOOKING_TEST_PROJECT}\"\napi_key = \"${JUMUIA_BOOKING_TEST_UNSET_KEY}\"\n",
        )
        .unwrap();
        assert_eq!(config.store.project_id, "parish-prod");
        // 未設定的變數保留原樣並在驗證時被擋下
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_local_convention() {
        let config =
            AppConfig::from_toml_str("[schedule]\nutc_offset = \"+03:00\"\n").unwrap();
        assert_eq!(
            config.local_convention(),
            LocalConvention::Fixed(chrono::FixedOffset::east_opt(3 * 3600).unwrap())
        );

        // 未設定偏移時跟隨本機時區，而非啟動當下的固定偏移
        let unset = AppConfig::from_toml_str("").unwrap();
        assert_eq!(unset.local_convention(), LocalConvention::Host);

        let bad = AppConfig::from_toml_str(
            "[store]\nkind = \"memory\"\n[schedule]\nutc_offset = \"EAT\"\n",
        )
        .unwrap();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_bad_collection_name() {
        let config = AppConfig::from_toml_str(
            "[store]\nkind = \"memory\"\n[collections]\nrooms = \"rooms/extra\"\n",
        )
        .unwrap();
        assert!(config.validate().is_err());
    }
}
