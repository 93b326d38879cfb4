//! エラーケーステスト
//!
//! 入力不備・保存データ破損時のエラーハンドリングを検証

use lead_ai_rust::analysis::normalize_url;
use lead_ai_rust::cli::{FilterArgs, SortArgs};
use lead_ai_rust::config::Config;
use lead_ai_rust::error::LeadAiError;
use lead_ai_rust::store::{
    FileStorage, LeadStore, SettingsStore, Storage, CRM_SETTINGS_KEY, LEADS_BACKUP_KEY, LEADS_KEY,
};
use tempfile::tempdir;

/// 空のURLは解析しない
#[test]
fn test_empty_url_rejected() {
    let result = normalize_url("   ");
    assert!(matches!(result, Err(LeadAiError::InvalidUrl(_))));
}

/// http(s) 以外のスキームは拒否
#[test]
fn test_non_http_scheme_rejected() {
    assert!(normalize_url("ftp://example.com").is_err());
}

/// 未知のソート項目
#[test]
fn test_unknown_sort_field() {
    let args = SortArgs {
        sort: Some("revenue".into()),
        asc: false,
    };
    let err = args.to_spec().unwrap_err();
    assert!(matches!(err, LeadAiError::InvalidSortField(_)));
    assert!(err.to_string().contains("revenue"));
}

/// 未知の期間モード
#[test]
fn test_unknown_date_mode() {
    let args = FilterArgs {
        added: Some("fortnight".into()),
        ..Default::default()
    };
    assert!(matches!(args.to_spec(), Err(LeadAiError::InvalidDateMode(_))));
}

/// 壊れたリード一覧は空として読み込む
#[test]
fn test_corrupt_leads_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let storage = FileStorage::new(dir.path());
    storage.set(LEADS_KEY, "{not json").unwrap();

    let store = LeadStore::new(storage);
    assert!(store.load().is_empty());
}

/// 配列以外のJSONも空扱い
#[test]
fn test_leads_file_with_wrong_shape() {
    let dir = tempdir().expect("Failed to create temp dir");
    let storage = FileStorage::new(dir.path());
    storage.set(LEADS_KEY, r#"{"leads": []}"#).unwrap();

    assert!(LeadStore::new(storage.clone()).load().is_empty());
    // 元の内容は退避される
    assert_eq!(
        storage.get(LEADS_BACKUP_KEY).unwrap().as_deref(),
        Some(r#"{"leads": []}"#)
    );
}

/// 壊れたCRM設定は既定値
#[test]
fn test_corrupt_crm_settings() {
    let dir = tempdir().expect("Failed to create temp dir");
    let storage = FileStorage::new(dir.path());
    storage.set(CRM_SETTINGS_KEY, "[1, 2").unwrap();

    let settings = SettingsStore::new(storage).load();
    assert_eq!(settings.provider, "salesforce");
    assert!(settings.auto_sync);
}

/// 壊れた設定ファイルはエラー
#[test]
fn test_corrupt_config_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "backend_url = 1").unwrap();

    let result = Config::load_from(&path);
    assert!(matches!(result, Err(LeadAiError::JsonParse(_))));
}

/// エラーメッセージにIDが含まれる
#[test]
fn test_error_messages() {
    let err = LeadAiError::LeadNotFound("lead_42".into());
    assert!(err.to_string().contains("lead_42"));

    let err = LeadAiError::NoLeadsSelected;
    assert!(!err.to_string().is_empty());
}
