//! リード操作のユースケース
//!
//! 書き込みは常にローカル先行（一覧を更新して保存）で、その後バックエンドへ反映する。
//! バックエンドの失敗は致命的にせず、通知を積んで結果を `RemoteSync` に記録する。

use crate::analysis::{lead_id, new_lead_from_report, normalize_url};
use crate::controller::ViewController;
use crate::error::{LeadAiError, Result};
use crate::export::ExportFormat;
use crate::gateway::{
    ConnectionTest, CrmSyncRequest, EmailExportRequest, Gateway, ServerExport, VerifyRequest,
};
use crate::notice::Notice;
use crate::store::{CrmSettings, SettingsStore, Storage};
use chrono::Utc;
use lazy_static::lazy_static;
use lead_ai_common::{
    AnalysisReport, CrmState, CrmStatus, Lead, RemoteSync, Verification, VerificationStatus,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

const VERIFIED_BY: &str = "User";

/// 解析時のオプション
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzeOptions {
    /// 解析後にリードとして保存
    pub save: bool,
    /// 検証待ち（Pending）を付ける
    pub verify: bool,
    /// 営業インサイトがあればCRM同期待ちにする
    pub auto_sync: bool,
}

/// 直近の解析結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastAnalysis {
    pub url: String,
    pub report: AnalysisReport,
}

/// メール送信の入力
#[derive(Debug, Clone)]
pub struct EmailExport {
    pub recipient: String,
    pub subject: String,
    pub message: String,
    pub format: ExportFormat,
    pub field_selection: Vec<String>,
}

pub struct LeadService<G: Gateway, S: Storage> {
    gateway: G,
    controller: ViewController<S>,
    settings: SettingsStore<S>,
    last_analysis: Option<LastAnalysis>,
    notices: Vec<Notice>,
}

impl<G: Gateway, S: Storage> LeadService<G, S> {
    pub fn new(gateway: G, controller: ViewController<S>, settings: SettingsStore<S>) -> Self {
        Self {
            gateway,
            controller,
            settings,
            last_analysis: None,
            notices: Vec::new(),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn controller(&self) -> &ViewController<S> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut ViewController<S> {
        &mut self.controller
    }

    pub fn last_analysis(&self) -> Option<&LastAnalysis> {
        self.last_analysis.as_ref()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// 溜まった通知を取り出す
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    // ---- 解析 ----

    pub async fn analyze(&mut self, raw_url: &str, options: AnalyzeOptions) -> Result<AnalysisReport> {
        let url = normalize_url(raw_url)?;
        info!(url = %url, "解析を開始");

        let mut report = match self.gateway.analyze(&url).await {
            Ok(report) => report,
            Err(e) => {
                self.notify(Notice::danger(format!("Analysis failed: {}", e)));
                return Err(e);
            }
        };

        let now = Utc::now();
        if options.verify {
            report.verification = Some(Verification::pending(now));
        }
        if options.auto_sync && report.sales_insights.is_some() {
            report.crm = Some(CrmState::with_status(CrmStatus::Queued, now));
        }

        self.last_analysis = Some(LastAnalysis {
            url: url.clone(),
            report: report.clone(),
        });
        self.notify(Notice::success(format!("Analysis of {} complete", url)));

        if options.save {
            self.save_last_analysis().await?;
        }
        Ok(report)
    }

    /// 直近の解析結果をリードとして保存
    pub async fn save_last_analysis(&mut self) -> Result<Option<String>> {
        let Some(last) = self.last_analysis.clone() else {
            self.notify(Notice::warning("Analyze a website before saving a lead"));
            return Ok(None);
        };

        let now = Utc::now();
        let lead = new_lead_from_report(&last.report, &last.url, lead_id(now), now);
        let queued = lead.crm_status() == Some(CrmStatus::Queued);
        let id = self.save_lead(lead).await?;

        if queued && self.settings.load().auto_sync {
            self.sync_to_crm(std::slice::from_ref(&id)).await?;
        }
        Ok(Some(id))
    }

    /// ローカル保存 → `/save-lead`
    pub async fn save_lead(&mut self, lead: Lead) -> Result<String> {
        let id = self.controller.save_lead(lead)?;
        let Some(saved) = self.controller.get(&id).cloned() else {
            return Ok(id);
        };

        let outcome = match self.gateway.save_lead(&saved).await {
            Ok(reply) if reply.is_success() => {
                self.notify(Notice::success(format!(
                    "Lead \"{}\" saved successfully",
                    saved.company_name
                )));
                RemoteSync::Synced
            }
            Ok(reply) => {
                let reason = reply.message_or("server rejected the lead").to_string();
                self.notify(Notice::warning(format!("Warning: {}", reason)));
                RemoteSync::LocalOnly { reason }
            }
            Err(e) => {
                self.notify(Notice::warning("Lead saved locally but server sync failed"));
                RemoteSync::LocalOnly { reason: e.to_string() }
            }
        };
        self.controller.set_remote_sync(&id, outcome)?;
        Ok(id)
    }

    // ---- 検証 ----

    /// ローカル更新 → `/verify-lead`。該当リードがなければ `false`
    pub async fn verify_lead(&mut self, id: &str, status: VerificationStatus, notes: &str) -> Result<bool> {
        if !self.controller.verify_lead(id, status, notes, Utc::now())? {
            debug!(id, "検証対象のリードがありません");
            return Ok(false);
        }

        let request = VerifyRequest {
            id: id.to_string(),
            status,
            notes: notes.to_string(),
            verified_by: VERIFIED_BY.to_string(),
        };

        match self.gateway.verify_lead(&request).await {
            Ok(reply) if reply.reply.is_success() => {
                match reply.verification {
                    Some(mut verification) => {
                        verification.remote_sync = RemoteSync::Synced;
                        self.controller.set_verification(id, verification)?;
                    }
                    None => {
                        self.controller.set_verification_remote_sync(id, RemoteSync::Synced)?;
                    }
                }
                let verb = match status {
                    VerificationStatus::Flagged => "flagged",
                    _ => "verified",
                };
                self.notify(Notice::success(format!("Lead {} successfully", verb)));
            }
            Ok(reply) => {
                let reason = reply.reply.message_or("server rejected the verification").to_string();
                self.notify(Notice::warning(format!("Verification error: {}", reason)));
                self.controller
                    .set_verification_remote_sync(id, RemoteSync::LocalOnly { reason })?;
            }
            Err(e) => {
                self.notify(Notice::warning("Lead verified locally but server sync failed"));
                self.controller
                    .set_verification_remote_sync(id, RemoteSync::LocalOnly { reason: e.to_string() })?;
            }
        }
        Ok(true)
    }

    // ---- CRM ----

    /// 同期待ちにしてから `/crm-sync`。同期できた件数を返す
    pub async fn sync_to_crm(&mut self, ids: &[String]) -> Result<usize> {
        let targets: Vec<String> = self
            .controller
            .select(ids)
            .into_iter()
            .map(|lead| lead.id)
            .collect();
        if targets.is_empty() {
            self.notify(Notice::warning("Please select at least one lead to sync to CRM"));
            return Err(LeadAiError::NoLeadsSelected);
        }

        self.controller.mark_crm_queued(&targets, Utc::now())?;
        self.notify(Notice::info(format!("Syncing {} leads to CRM...", targets.len())));

        let request = CrmSyncRequest {
            lead_ids: targets.clone(),
            settings: self.settings.load(),
        };

        match self.gateway.crm_sync(&request).await {
            Ok(reply) if reply.reply.is_success() => {
                let now = Utc::now();
                self.controller.apply_crm_results(&reply.results, now)?;
                let missing: Vec<String> = targets
                    .iter()
                    .filter(|id| !reply.results.iter().any(|r| &r.id == *id))
                    .cloned()
                    .collect();
                if !missing.is_empty() {
                    warn!(count = missing.len(), "CRM 同期の結果が返らなかったリードがあります");
                    self.mark_failed(&missing, "no result returned")?;
                }
                let synced = reply.results.iter().filter(|r| r.is_success()).count();
                let failed = reply.results.len() - synced + missing.len();
                if failed == 0 {
                    self.notify(Notice::success("Successfully synced leads to CRM"));
                } else {
                    self.notify(Notice::warning(format!(
                        "Synced {} leads to CRM, {} failed",
                        synced, failed
                    )));
                }
                Ok(synced)
            }
            Ok(reply) => {
                let reason = reply.reply.message_or("unknown error").to_string();
                self.mark_failed(&targets, &reason)?;
                self.notify(Notice::danger(format!("CRM sync error: {}", reason)));
                Ok(0)
            }
            Err(e) => {
                self.mark_failed(&targets, &e.to_string())?;
                self.notify(Notice::danger("CRM sync failed. Please try again."));
                Ok(0)
            }
        }
    }

    fn mark_failed(&mut self, ids: &[String], reason: &str) -> Result<()> {
        let now = Utc::now();
        for id in ids {
            let mut crm = CrmState::with_status(CrmStatus::Failed, now);
            crm.error = Some(reason.to_string());
            self.controller.set_crm(id, crm)?;
        }
        Ok(())
    }

    pub fn crm_settings(&self) -> CrmSettings {
        self.settings.load()
    }

    pub fn update_crm_settings(&mut self, settings: &CrmSettings) -> Result<()> {
        self.settings.save(settings)?;
        self.notify(Notice::success("CRM settings saved"));
        Ok(())
    }

    /// 接続テスト。成功なら `true`
    pub async fn test_crm_connection(&mut self) -> Result<bool> {
        let settings = self.settings.load();
        self.notify(Notice::info("Testing CRM connection..."));

        match self.gateway.test_crm_connection(&ConnectionTest::from(&settings)).await {
            Ok(reply) if reply.is_success() => {
                self.notify(Notice::success(format!(
                    "CRM connection successful: {}",
                    reply.message_or("ok")
                )));
                Ok(true)
            }
            Ok(reply) => {
                self.notify(Notice::danger(format!(
                    "CRM connection failed: {}",
                    reply.message_or("unknown error")
                )));
                Ok(false)
            }
            Err(e) => {
                debug!("接続テスト失敗: {}", e);
                self.notify(Notice::danger("Connection test failed. Please check your network."));
                Ok(false)
            }
        }
    }

    // ---- サーバー連携 ----

    /// `/get-leads` の一覧を統合。統合した件数を返す
    pub async fn pull_leads(&mut self) -> Result<usize> {
        match self.gateway.get_leads().await {
            Ok(reply) if reply.reply.is_success() => {
                let leads = reply.leads.unwrap_or_default();
                let merged = self.controller.merge_server_leads(leads)?;
                self.notify(Notice::info(format!("Loaded {} leads from server", merged)));
                Ok(merged)
            }
            Ok(reply) => {
                self.notify(Notice::warning(format!(
                    "Could not load leads from server: {}",
                    reply.reply.message_or("unknown error")
                )));
                Ok(0)
            }
            Err(e) => {
                self.notify(Notice::warning(format!("Could not load leads from server: {}", e)));
                Ok(0)
            }
        }
    }

    /// `/email-export`。送信できたら `true`
    pub async fn email_export(&mut self, email: EmailExport, leads: Vec<Lead>) -> Result<bool> {
        let recipient = email.recipient.trim().to_string();
        if !EMAIL_RE.is_match(&recipient) {
            self.notify(Notice::warning("Please enter a recipient email address"));
            return Err(LeadAiError::MissingRecipient(email.recipient));
        }
        if leads.is_empty() {
            self.notify(Notice::warning("Please select at least one lead to export"));
            return Err(LeadAiError::NoLeadsSelected);
        }

        self.notify(Notice::info(format!("Preparing to email {} leads...", leads.len())));
        let request = EmailExportRequest {
            recipient: recipient.clone(),
            subject: email.subject,
            message: email.message,
            format: email.format,
            leads,
            field_selection: email.field_selection,
        };

        match self.gateway.email_export(&request).await {
            Ok(reply) if reply.is_success() => {
                self.notify(Notice::success(format!("Export successfully sent to {}", recipient)));
                Ok(true)
            }
            Ok(reply) => {
                self.notify(Notice::danger(format!(
                    "Email error: {}",
                    reply.message_or("unknown error")
                )));
                Ok(false)
            }
            Err(e) => {
                debug!("メール送信失敗: {}", e);
                self.notify(Notice::danger("Failed to send email. Please try again."));
                Ok(false)
            }
        }
    }

    /// 直近の解析結果をサーバー側でレポート化して保存
    pub async fn export_last_analysis(&mut self, kind: ServerExport, output: Option<&Path>) -> Result<Option<PathBuf>> {
        let Some(last) = self.last_analysis.clone() else {
            self.notify(Notice::warning("Analyze a website before exporting a report"));
            return Ok(None);
        };

        let bytes = match self.gateway.export_report(kind, &last.report).await {
            Ok(bytes) => bytes,
            Err(e) => {
                self.notify(Notice::danger(format!("Export failed: {}", e)));
                return Ok(None);
            }
        };

        let path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(kind.default_file_name()));
        std::fs::write(&path, bytes)?;
        self.notify(Notice::success(format!("Report saved to {}", path.display())));
        Ok(Some(path))
    }

    /// 解析結果を直接セット（保存済みレポートの読み込み用）
    pub fn set_last_analysis(&mut self, url: String, report: AnalysisReport) {
        self.last_analysis = Some(LastAnalysis { url, report });
    }
}
