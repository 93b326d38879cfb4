//! リードの永続化
//!
//! キー・バリュー型の保存先（`Storage`）に、リード一覧を1つのJSON配列として
//! まるごと書き込む。部分更新はしない。

use crate::error::Result;
use lead_ai_common::Lead;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// リード一覧のキー
pub const LEADS_KEY: &str = "savedLeads";
/// 読めなかったリード一覧の退避先
pub const LEADS_BACKUP_KEY: &str = "savedLeads.corrupt";
/// CRM設定のキー
pub const CRM_SETTINGS_KEY: &str = "crmSettings";
/// 直近の解析結果のキー
pub const LAST_ANALYSIS_KEY: &str = "lastAnalysis";

/// キー・バリュー型の保存先
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// 1キー1ファイル（`<dir>/<key>.json`）
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        // 一時ファイルに書いてから置き換える
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// テスト用のメモリ上の保存先（クローンは同じ中身を共有）
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // 書き込み途中のパニックでも中身は整合している
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}

/// リード一覧の読み書き
#[derive(Debug, Clone)]
pub struct LeadStore<S: Storage> {
    storage: S,
}

impl<S: Storage> LeadStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// 全件読み込み。未保存なら空
    ///
    /// 読めない要素は飛ばし、元の内容は `LEADS_BACKUP_KEY` に退避する。
    /// 配列として読めなければ退避したうえで空から始める。
    pub fn load(&self) -> Vec<Lead> {
        let raw = match self.storage.get(LEADS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("リードの読み込みに失敗: {}", e);
                return Vec::new();
            }
        };

        let items = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
            Ok(items) => items,
            Err(e) => {
                warn!("保存済みリードが壊れています。空の一覧から開始します: {}", e);
                self.back_up(&raw);
                return Vec::new();
            }
        };

        let total = items.len();
        let leads: Vec<Lead> = items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match serde_json::from_value::<Lead>(item) {
                Ok(lead) => Some(lead),
                Err(e) => {
                    warn!(index, "読めないリードを飛ばします: {}", e);
                    None
                }
            })
            .collect();

        if leads.len() < total {
            self.back_up(&raw);
        }
        debug!(count = leads.len(), skipped = total - leads.len(), "リードを読み込みました");
        leads
    }

    fn back_up(&self, raw: &str) {
        match self.storage.set(LEADS_BACKUP_KEY, raw) {
            Ok(()) => warn!(key = LEADS_BACKUP_KEY, "元のリード一覧を退避しました"),
            Err(e) => warn!("リード一覧の退避に失敗: {}", e),
        }
    }

    /// 全件書き込み
    pub fn save(&self, leads: &[Lead]) -> Result<()> {
        let content = serde_json::to_string(leads)?;
        self.storage.set(LEADS_KEY, &content)?;
        debug!(count = leads.len(), "リードを保存しました");
        Ok(())
    }
}

/// CRM連携設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CrmSettings {
    pub provider: String,
    pub api_key: String,
    pub api_secret: String,
    pub api_url: String,
    pub auto_sync: bool,
    pub sync_updates: bool,
    pub bi_directional: bool,
    pub sync_frequency: String,
}

impl Default for CrmSettings {
    fn default() -> Self {
        Self {
            provider: "salesforce".into(),
            api_key: String::new(),
            api_secret: String::new(),
            api_url: String::new(),
            auto_sync: true,
            sync_updates: true,
            bi_directional: false,
            sync_frequency: "realtime".into(),
        }
    }
}

impl CrmSettings {
    /// 表示用（シークレットを伏せる）
    pub fn redacted(&self) -> Self {
        let mask = |s: &str| if s.is_empty() { String::new() } else { "********".to_string() };
        Self {
            api_key: mask(&self.api_key),
            api_secret: mask(&self.api_secret),
            ..self.clone()
        }
    }
}

/// CRM設定の読み書き
#[derive(Debug, Clone)]
pub struct SettingsStore<S: Storage> {
    storage: S,
}

impl<S: Storage> SettingsStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn load(&self) -> CrmSettings {
        match self.storage.get(CRM_SETTINGS_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("CRM設定が壊れています。既定値を使用します: {}", e);
                CrmSettings::default()
            }),
            Ok(None) => CrmSettings::default(),
            Err(e) => {
                warn!("CRM設定の読み込みに失敗: {}", e);
                CrmSettings::default()
            }
        }
    }

    pub fn save(&self, settings: &CrmSettings) -> Result<()> {
        let content = serde_json::to_string(settings)?;
        self.storage.set(CRM_SETTINGS_KEY, &content)
    }
}
