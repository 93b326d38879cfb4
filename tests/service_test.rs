//! ユースケース層のテスト
//!
//! ローカル先行の書き込みと、バックエンド応答ごとの結果記録を検証

use chrono::Utc;
use lead_ai_rust::common::{
    AnalysisReport, CrmStatus, Lead, LeadTier, RemoteSync, SalesInsights, Verification,
    VerificationStatus,
};
use lead_ai_rust::controller::ViewController;
use lead_ai_rust::error::{LeadAiError, Result};
use lead_ai_rust::export::ExportFormat;
use lead_ai_rust::gateway::*;
use lead_ai_rust::notice::NoticeLevel;
use lead_ai_rust::service::{AnalyzeOptions, EmailExport, LeadService};
use lead_ai_rust::store::{CrmSettings, LeadStore, MemoryStorage, SettingsStore, Storage};
use std::sync::Mutex;

/// 応答を差し替えられるゲートウェイ
#[derive(Default)]
struct FakeGateway {
    offline: bool,
    reject: bool,
    report: AnalysisReport,
    crm_failures: Vec<String>,
    crm_omitted: Vec<String>,
    server_leads: Vec<Lead>,
    saved: Mutex<Vec<String>>,
    synced: Mutex<Vec<Vec<String>>>,
    emails: Mutex<Vec<EmailExportRequest>>,
}

impl FakeGateway {
    fn online() -> Self {
        Self::default()
    }

    fn offline() -> Self {
        Self {
            offline: true,
            ..Default::default()
        }
    }

    fn check(&self) -> Result<()> {
        if self.offline {
            return Err(LeadAiError::Gateway("connection refused".into()));
        }
        Ok(())
    }

    fn status(&self) -> StatusReply {
        if self.reject {
            StatusReply {
                status: "error".into(),
                message: Some("quota exceeded".into()),
            }
        } else {
            StatusReply::success("ok")
        }
    }
}

impl Gateway for FakeGateway {
    async fn analyze(&self, _url: &str) -> Result<AnalysisReport> {
        self.check()?;
        Ok(self.report.clone())
    }

    async fn save_lead(&self, lead: &Lead) -> Result<StatusReply> {
        self.check()?;
        self.saved.lock().unwrap().push(lead.id.clone());
        Ok(self.status())
    }

    async fn verify_lead(&self, request: &VerifyRequest) -> Result<VerifyReply> {
        self.check()?;
        let mut verification = Verification::new(request.status, Utc::now(), request.notes.clone());
        verification.notes = format!("{} (server)", request.notes);
        Ok(VerifyReply {
            reply: self.status(),
            verification: Some(verification),
        })
    }

    async fn crm_sync(&self, request: &CrmSyncRequest) -> Result<CrmSyncReply> {
        self.check()?;
        self.synced.lock().unwrap().push(request.lead_ids.clone());
        let results = request
            .lead_ids
            .iter()
            .filter(|id| !self.crm_omitted.contains(id))
            .map(|id| {
                if self.crm_failures.contains(id) {
                    CrmSyncResult::failed(id, "duplicate record")
                } else {
                    CrmSyncResult::synced(id, format!("CRM-{}", id))
                }
            })
            .collect();
        Ok(CrmSyncReply {
            reply: self.status(),
            results,
        })
    }

    async fn export_report(&self, _kind: ServerExport, report: &AnalysisReport) -> Result<Vec<u8>> {
        self.check()?;
        Ok(serde_json::to_vec(report)?)
    }

    async fn email_export(&self, request: &EmailExportRequest) -> Result<StatusReply> {
        self.check()?;
        self.emails.lock().unwrap().push(request.clone());
        Ok(self.status())
    }

    async fn get_leads(&self) -> Result<GetLeadsReply> {
        self.check()?;
        Ok(GetLeadsReply {
            reply: self.status(),
            leads: Some(self.server_leads.clone()),
        })
    }

    async fn test_crm_connection(&self, test: &ConnectionTest) -> Result<StatusReply> {
        self.check()?;
        if test.api_key.is_empty() {
            return Ok(StatusReply {
                status: "error".into(),
                message: Some("missing api key".into()),
            });
        }
        Ok(StatusReply::success(format!("connected to {}", test.provider)))
    }
}

fn service_with(gateway: FakeGateway, leads: &[Lead]) -> (LeadService<FakeGateway, MemoryStorage>, MemoryStorage) {
    let storage = MemoryStorage::new();
    let store = LeadStore::new(storage.clone());
    store.save(leads).unwrap();
    let controller = ViewController::new(store, 10);
    let settings = SettingsStore::new(storage.clone());
    (LeadService::new(gateway, controller, settings), storage)
}

fn leads(count: usize) -> Vec<Lead> {
    (1..=count)
        .map(|i| Lead::new(format!("lead_{}", i), format!("Company {}", i), Utc::now()))
        .collect()
}

fn has_notice(service: &LeadService<FakeGateway, MemoryStorage>, level: NoticeLevel) -> bool {
    service.notices().iter().any(|n| n.level == level)
}

/// サーバーに届けば Synced
#[tokio::test]
async fn test_save_lead_synced() {
    let (mut service, storage) = service_with(FakeGateway::online(), &[]);

    let id = service.save_lead(Lead::new("lead_1", "Acme", Utc::now())).await.unwrap();

    assert_eq!(id, "lead_1");
    assert_eq!(service.gateway().saved.lock().unwrap().as_slice(), ["lead_1"]);
    assert_eq!(service.controller().get(&id).unwrap().remote_sync, RemoteSync::Synced);
    assert!(has_notice(&service, NoticeLevel::Success));

    let persisted = LeadStore::new(storage).load();
    assert_eq!(persisted[0].remote_sync, RemoteSync::Synced);
}

/// 通信失敗でもローカルには残る
#[tokio::test]
async fn test_save_lead_offline_keeps_local() {
    let (mut service, storage) = service_with(FakeGateway::offline(), &[]);

    let id = service.save_lead(Lead::new("lead_1", "Acme", Utc::now())).await.unwrap();

    let lead = service.controller().get(&id).unwrap();
    assert!(matches!(&lead.remote_sync, RemoteSync::LocalOnly { reason } if reason.contains("connection refused")));
    assert!(has_notice(&service, NoticeLevel::Warning));
    assert_eq!(LeadStore::new(storage).load().len(), 1);
}

/// サーバーが拒否した場合は理由を残す
#[tokio::test]
async fn test_save_lead_rejected() {
    let gateway = FakeGateway {
        reject: true,
        ..Default::default()
    };
    let (mut service, _) = service_with(gateway, &[]);

    let id = service.save_lead(Lead::new("lead_1", "Acme", Utc::now())).await.unwrap();
    assert_eq!(
        service.controller().get(&id).unwrap().remote_sync,
        RemoteSync::LocalOnly {
            reason: "quota exceeded".into()
        }
    );
}

/// サーバーの検証レコードで置き換える
#[tokio::test]
async fn test_verify_uses_server_record() {
    let (mut service, _) = service_with(FakeGateway::online(), &leads(1));

    let found = service
        .verify_lead("lead_1", VerificationStatus::Verified, "checked")
        .await
        .unwrap();
    assert!(found);

    let verification = service.controller().get("lead_1").unwrap().verification.clone().unwrap();
    assert_eq!(verification.status, VerificationStatus::Verified);
    assert_eq!(verification.notes, "checked (server)");
    assert_eq!(verification.remote_sync, RemoteSync::Synced);
}

/// オフライン時はローカルの検証だけ残る
#[tokio::test]
async fn test_verify_offline() {
    let (mut service, _) = service_with(FakeGateway::offline(), &leads(1));

    service
        .verify_lead("lead_1", VerificationStatus::Flagged, "spam")
        .await
        .unwrap();

    let verification = service.controller().get("lead_1").unwrap().verification.clone().unwrap();
    assert_eq!(verification.status, VerificationStatus::Flagged);
    assert_eq!(verification.notes, "spam");
    assert!(matches!(verification.remote_sync, RemoteSync::LocalOnly { .. }));
}

/// 存在しないリードの検証
#[tokio::test]
async fn test_verify_missing_lead() {
    let (mut service, _) = service_with(FakeGateway::online(), &leads(1));
    let found = service
        .verify_lead("lead_404", VerificationStatus::Verified, "")
        .await
        .unwrap();
    assert!(!found);
}

/// 結果ごとに Synced / Failed を付ける
#[tokio::test]
async fn test_crm_sync_partial_failure() {
    let gateway = FakeGateway {
        crm_failures: vec!["lead_2".into()],
        ..Default::default()
    };
    let (mut service, _) = service_with(gateway, &leads(3));

    let synced = service
        .sync_to_crm(&["lead_1".into(), "lead_2".into()])
        .await
        .unwrap();
    assert_eq!(synced, 1);

    let c = service.controller();
    let ok = c.get("lead_1").unwrap().crm.clone().unwrap();
    assert_eq!(ok.status, CrmStatus::Synced);
    assert_eq!(ok.crm_id.as_deref(), Some("CRM-lead_1"));

    let failed = c.get("lead_2").unwrap().crm.clone().unwrap();
    assert_eq!(failed.status, CrmStatus::Failed);
    assert_eq!(failed.error.as_deref(), Some("duplicate record"));

    assert_eq!(c.get("lead_3").unwrap().crm_status(), None);
    assert!(has_notice(&service, NoticeLevel::Warning));
}

/// 結果が返らなかったリードは Failed になり、警告が出る
#[tokio::test]
async fn test_crm_sync_missing_result_marks_failed() {
    let gateway = FakeGateway {
        crm_omitted: vec!["lead_2".into()],
        ..Default::default()
    };
    let (mut service, storage) = service_with(gateway, &leads(2));

    let synced = service
        .sync_to_crm(&["lead_1".into(), "lead_2".into()])
        .await
        .unwrap();
    assert_eq!(synced, 1);

    let c = service.controller();
    assert_eq!(c.get("lead_1").unwrap().crm_status(), Some(CrmStatus::Synced));
    let missing = c.get("lead_2").unwrap().crm.clone().unwrap();
    assert_eq!(missing.status, CrmStatus::Failed);
    assert_eq!(missing.error.as_deref(), Some("no result returned"));

    assert!(has_notice(&service, NoticeLevel::Warning));
    assert!(!has_notice(&service, NoticeLevel::Success));

    let stored = LeadStore::new(storage).load();
    let stored_missing = stored.iter().find(|l| l.id == "lead_2").unwrap();
    assert_eq!(stored_missing.crm_status(), Some(CrmStatus::Failed));
}

/// 通信失敗時は対象すべて Failed
#[tokio::test]
async fn test_crm_sync_offline_marks_failed() {
    let (mut service, _) = service_with(FakeGateway::offline(), &leads(2));

    let synced = service
        .sync_to_crm(&["lead_1".into(), "lead_2".into()])
        .await
        .unwrap();
    assert_eq!(synced, 0);
    for id in ["lead_1", "lead_2"] {
        assert_eq!(service.controller().get(id).unwrap().crm_status(), Some(CrmStatus::Failed));
    }
    assert!(has_notice(&service, NoticeLevel::Danger));
}

/// 対象がなければ送信しない
#[tokio::test]
async fn test_crm_sync_without_selection() {
    let (mut service, _) = service_with(FakeGateway::online(), &leads(1));

    let result = service.sync_to_crm(&["ghost".into()]).await;
    assert!(matches!(result, Err(LeadAiError::NoLeadsSelected)));
    assert!(service.gateway().synced.lock().unwrap().is_empty());
}

/// 同期リクエストには保存済みのCRM設定が載る
#[tokio::test]
async fn test_crm_sync_sends_ids_in_order() {
    let (mut service, _) = service_with(FakeGateway::online(), &leads(3));
    service
        .update_crm_settings(&CrmSettings {
            provider: "hubspot".into(),
            ..Default::default()
        })
        .unwrap();

    service
        .sync_to_crm(&["lead_3".into(), "lead_1".into()])
        .await
        .unwrap();
    let sent = service.gateway().synced.lock().unwrap().clone();
    assert_eq!(sent, vec![vec!["lead_3".to_string(), "lead_1".to_string()]]);
    assert_eq!(service.crm_settings().provider, "hubspot");
}

/// 宛先・対象の検証
#[tokio::test]
async fn test_email_export_validation() {
    let (mut service, _) = service_with(FakeGateway::online(), &leads(2));
    let email = |recipient: &str| EmailExport {
        recipient: recipient.into(),
        subject: "Leads".into(),
        message: String::new(),
        format: ExportFormat::Csv,
        field_selection: vec!["company.name".into()],
    };

    let result = service.email_export(email("not-an-email"), leads(1)).await;
    assert!(matches!(result, Err(LeadAiError::MissingRecipient(_))));

    let result = service.email_export(email("sales@acme.io"), Vec::new()).await;
    assert!(matches!(result, Err(LeadAiError::NoLeadsSelected)));

    let sent = service.email_export(email(" sales@acme.io "), leads(2)).await.unwrap();
    assert!(sent);

    let emails = service.gateway().emails.lock().unwrap();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].recipient, "sales@acme.io");
    assert_eq!(emails[0].leads.len(), 2);
    assert_eq!(emails[0].field_selection, vec!["company.name".to_string()]);
}

/// サーバー一覧の取り込み
#[tokio::test]
async fn test_pull_leads_merges() {
    let mut renamed = Lead::new("lead_1", "Renamed", Utc::now());
    renamed.ai_readiness_score = Some(4.0);
    let gateway = FakeGateway {
        server_leads: vec![renamed, Lead::new("lead_7", "Remote Co", Utc::now())],
        ..Default::default()
    };
    let (mut service, _) = service_with(gateway, &leads(2));

    assert_eq!(service.pull_leads().await.unwrap(), 2);
    let ids: Vec<&str> = service.controller().leads().iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["lead_1", "lead_2", "lead_7"]);
    assert_eq!(service.controller().get("lead_1").unwrap().company_name, "Renamed");
}

/// 取り込み失敗は通知のみ
#[tokio::test]
async fn test_pull_leads_offline() {
    let (mut service, _) = service_with(FakeGateway::offline(), &leads(2));
    assert_eq!(service.pull_leads().await.unwrap(), 0);
    assert_eq!(service.controller().leads().len(), 2);
    assert!(has_notice(&service, NoticeLevel::Warning));
}

/// 解析 → 保存 → 自動同期
#[tokio::test]
async fn test_analyze_save_and_auto_sync() {
    let gateway = FakeGateway {
        report: AnalysisReport {
            company_name: Some("Acme Robotics".into()),
            ai_readiness_score: Some(7.2),
            sales_insights: Some(SalesInsights {
                lead_score: Some(81.0),
                lead_tier: Some(LeadTier::Hot),
                ..Default::default()
            }),
            ..Default::default()
        },
        ..Default::default()
    };
    let (mut service, storage) = service_with(gateway, &[]);

    let report = service
        .analyze(
            "acme.io",
            AnalyzeOptions {
                save: true,
                verify: true,
                auto_sync: true,
            },
        )
        .await
        .unwrap();
    assert_eq!(report.ai_readiness_score, Some(7.2));
    assert_eq!(service.last_analysis().unwrap().url, "https://acme.io");

    let saved = &service.controller().leads()[0];
    assert_eq!(saved.company_name, "Acme Robotics");
    assert_eq!(saved.tier(), Some(LeadTier::Hot));
    assert_eq!(saved.verification_status(), Some(VerificationStatus::Pending));
    assert_eq!(saved.crm_status(), Some(CrmStatus::Synced));
    assert_eq!(service.gateway().synced.lock().unwrap().len(), 1);

    // 保存先にも反映済み
    assert!(storage.get("savedLeads").unwrap().unwrap().contains("Acme Robotics"));
}

/// 自動同期を切っていれば Queued のまま
#[tokio::test]
async fn test_auto_sync_disabled_in_settings() {
    let gateway = FakeGateway {
        report: AnalysisReport {
            sales_insights: Some(SalesInsights::default()),
            ..Default::default()
        },
        ..Default::default()
    };
    let (mut service, _) = service_with(gateway, &[]);
    service
        .update_crm_settings(&CrmSettings {
            auto_sync: false,
            ..Default::default()
        })
        .unwrap();

    service
        .analyze(
            "https://acme.io",
            AnalyzeOptions {
                save: true,
                verify: false,
                auto_sync: true,
            },
        )
        .await
        .unwrap();

    assert_eq!(service.controller().leads()[0].crm_status(), Some(CrmStatus::Queued));
    assert!(service.gateway().synced.lock().unwrap().is_empty());
}

/// 解析失敗は保存しない
#[tokio::test]
async fn test_analyze_failure() {
    let (mut service, _) = service_with(FakeGateway::offline(), &[]);
    let result = service.analyze("acme.io", AnalyzeOptions::default()).await;
    assert!(result.is_err());
    assert!(service.last_analysis().is_none());
    assert!(service.controller().leads().is_empty());
    assert!(has_notice(&service, NoticeLevel::Danger));
}

/// 解析前の保存は何もしない
#[tokio::test]
async fn test_save_without_analysis() {
    let (mut service, _) = service_with(FakeGateway::online(), &[]);
    assert_eq!(service.save_last_analysis().await.unwrap(), None);
    assert!(has_notice(&service, NoticeLevel::Warning));
}

/// 接続テスト
#[tokio::test]
async fn test_crm_connection() {
    let (mut service, _) = service_with(FakeGateway::online(), &[]);
    assert!(!service.test_crm_connection().await.unwrap());

    service
        .update_crm_settings(&CrmSettings {
            api_key: "k".into(),
            ..Default::default()
        })
        .unwrap();
    assert!(service.test_crm_connection().await.unwrap());

    let notices = service.take_notices();
    assert!(notices.iter().any(|n| n.message.contains("salesforce")));
    assert!(service.notices().is_empty());
}
