//! バックエンドなしで動かすための擬似ゲートウェイ
//!
//! 保存されたリードはメモリ上に保持し、`get_leads` で返す。
//! CRM同期は一定時間待ってから全件成功とする。

use super::types::*;
use super::Gateway;
use crate::analysis::new_lead_from_report;
use crate::error::{LeadAiError, Result};
use chrono::Utc;
use lead_ai_common::export::{csv_core, FieldSelection};
use lead_ai_common::{AnalysisReport, Lead, Verification};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

#[derive(Clone)]
pub struct SimulatedGateway {
    batch_delay: Duration,
    single_delay: Duration,
    saved: Arc<Mutex<Vec<Lead>>>,
}

impl SimulatedGateway {
    /// 複数件同期の待ち時間を指定（1件のときはその3/4）
    pub fn new(batch_delay: Duration) -> Self {
        Self {
            batch_delay,
            single_delay: batch_delay * 3 / 4,
            saved: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn saved(&self) -> std::sync::MutexGuard<'_, Vec<Lead>> {
        self.saved.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn delay_for(&self, count: usize) -> Duration {
        if count == 1 {
            self.single_delay
        } else {
            self.batch_delay
        }
    }
}

impl Gateway for SimulatedGateway {
    async fn analyze(&self, url: &str) -> Result<AnalysisReport> {
        Err(LeadAiError::Gateway(format!(
            "擬似バックエンドでは解析できません: {}",
            url
        )))
    }

    async fn save_lead(&self, lead: &Lead) -> Result<StatusReply> {
        let mut saved = self.saved();
        match saved.iter_mut().find(|l| l.id == lead.id) {
            Some(existing) => *existing = lead.clone(),
            None => saved.push(lead.clone()),
        }
        Ok(StatusReply::success("Lead saved (simulated)"))
    }

    async fn verify_lead(&self, request: &VerifyRequest) -> Result<VerifyReply> {
        let verification = Verification::new(request.status, Utc::now(), request.notes.clone());
        if let Some(lead) = self.saved().iter_mut().find(|l| l.id == request.id) {
            lead.verification = Some(verification.clone());
        }
        Ok(VerifyReply {
            reply: StatusReply::success("Lead verification updated"),
            verification: Some(verification),
        })
    }

    async fn crm_sync(&self, request: &CrmSyncRequest) -> Result<CrmSyncReply> {
        let delay = self.delay_for(request.lead_ids.len());
        debug!(count = request.lead_ids.len(), ?delay, "擬似CRM同期");
        tokio::time::sleep(delay).await;

        let results = request
            .lead_ids
            .iter()
            .map(|id| CrmSyncResult::synced(id.clone(), format!("SIM-{}", id)))
            .collect();
        Ok(CrmSyncReply {
            reply: StatusReply::success(format!(
                "Synced to {} (simulated)",
                request.settings.provider
            )),
            results,
        })
    }

    async fn export_report(&self, kind: ServerExport, report: &AnalysisReport) -> Result<Vec<u8>> {
        match kind {
            ServerExport::Json => Ok(serde_json::to_vec_pretty(report)?),
            ServerExport::Csv => {
                let url = report.url.clone().unwrap_or_default();
                let lead = new_lead_from_report(report, &url, String::new(), Utc::now());
                Ok(csv_core::generate_csv(&[lead], &FieldSelection::all()).into_bytes())
            }
        }
    }

    async fn email_export(&self, request: &EmailExportRequest) -> Result<StatusReply> {
        Ok(StatusReply::success(format!(
            "{} leads queued for {} (simulated)",
            request.leads.len(),
            request.recipient
        )))
    }

    async fn get_leads(&self) -> Result<GetLeadsReply> {
        Ok(GetLeadsReply {
            reply: StatusReply::success("ok"),
            leads: Some(self.saved().clone()),
        })
    }

    async fn test_crm_connection(&self, test: &ConnectionTest) -> Result<StatusReply> {
        if test.api_key.trim().is_empty() {
            return Ok(StatusReply {
                status: "error".into(),
                message: Some("API key is required".into()),
            });
        }
        Ok(StatusReply::success(format!("Connected to {} (simulated)", test.provider)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CrmSettings;

    #[tokio::test]
    async fn test_crm_sync_marks_all_synced() {
        let gateway = SimulatedGateway::new(Duration::from_millis(20));
        let request = CrmSyncRequest {
            lead_ids: vec!["a".into(), "b".into()],
            settings: CrmSettings::default(),
        };
        let reply = gateway.crm_sync(&request).await.unwrap();
        assert!(reply.reply.is_success());
        assert!(reply.results.iter().all(CrmSyncResult::is_success));
        assert_eq!(reply.results[1].crm_id.as_deref(), Some("SIM-b"));
    }

    #[test]
    fn test_single_lead_delay() {
        let gateway = SimulatedGateway::new(Duration::from_millis(2000));
        assert_eq!(gateway.delay_for(1), Duration::from_millis(1500));
        assert_eq!(gateway.delay_for(3), Duration::from_millis(2000));
    }

    #[tokio::test]
    async fn test_saved_leads_are_returned() {
        let gateway = SimulatedGateway::new(Duration::ZERO);
        let lead = Lead::new("lead_1", "Acme", Utc::now());
        gateway.save_lead(&lead).await.unwrap();
        gateway.save_lead(&lead).await.unwrap();

        let reply = gateway.get_leads().await.unwrap();
        assert_eq!(reply.leads.map(|l| l.len()), Some(1));
    }

    #[tokio::test]
    async fn test_connection_requires_key() {
        let gateway = SimulatedGateway::new(Duration::ZERO);
        let reply = gateway
            .test_crm_connection(&ConnectionTest::from(&CrmSettings::default()))
            .await
            .unwrap();
        assert!(!reply.is_success());
    }
}
