//! バックエンドゲートウェイ
//!
//! 解析・永続化・CRM連携などのHTTPエンドポイントを抽象化する。
//! 実サーバー向けの `HttpGateway` と、オフライン用の `SimulatedGateway` がある。

mod http;
mod simulated;
pub mod types;

pub use http::HttpGateway;
pub use simulated::SimulatedGateway;
pub use types::*;

use crate::config::Config;
use crate::error::Result;
use lead_ai_common::{AnalysisReport, Lead};
use std::time::Duration;

#[allow(async_fn_in_trait)]
pub trait Gateway {
    /// `POST /analyze`
    async fn analyze(&self, url: &str) -> Result<AnalysisReport>;

    /// `POST /save-lead`
    async fn save_lead(&self, lead: &Lead) -> Result<StatusReply>;

    /// `POST /verify-lead`
    async fn verify_lead(&self, request: &VerifyRequest) -> Result<VerifyReply>;

    /// `POST /crm-sync`
    async fn crm_sync(&self, request: &CrmSyncRequest) -> Result<CrmSyncReply>;

    /// `POST /export-csv` / `POST /export-json`
    async fn export_report(&self, kind: ServerExport, report: &AnalysisReport) -> Result<Vec<u8>>;

    /// `POST /email-export`
    async fn email_export(&self, request: &EmailExportRequest) -> Result<StatusReply>;

    /// `GET /get-leads`
    async fn get_leads(&self) -> Result<GetLeadsReply>;

    /// `POST /test-crm-connection`
    async fn test_crm_connection(&self, test: &ConnectionTest) -> Result<StatusReply>;
}

/// 設定に応じて選ぶゲートウェイ
pub enum BackendGateway {
    Http(HttpGateway),
    Simulated(SimulatedGateway),
}

impl BackendGateway {
    pub fn from_config(config: &Config) -> Result<Self> {
        if config.simulate_backend {
            Ok(BackendGateway::Simulated(SimulatedGateway::new(Duration::from_millis(
                config.simulated_delay_ms,
            ))))
        } else {
            Ok(BackendGateway::Http(HttpGateway::new(
                &config.backend_url,
                Duration::from_secs(config.timeout_seconds),
            )?))
        }
    }

    pub fn is_simulated(&self) -> bool {
        matches!(self, BackendGateway::Simulated(_))
    }
}

impl Gateway for BackendGateway {
    async fn analyze(&self, url: &str) -> Result<AnalysisReport> {
        match self {
            BackendGateway::Http(g) => g.analyze(url).await,
            BackendGateway::Simulated(g) => g.analyze(url).await,
        }
    }

    async fn save_lead(&self, lead: &Lead) -> Result<StatusReply> {
        match self {
            BackendGateway::Http(g) => g.save_lead(lead).await,
            BackendGateway::Simulated(g) => g.save_lead(lead).await,
        }
    }

    async fn verify_lead(&self, request: &VerifyRequest) -> Result<VerifyReply> {
        match self {
            BackendGateway::Http(g) => g.verify_lead(request).await,
            BackendGateway::Simulated(g) => g.verify_lead(request).await,
        }
    }

    async fn crm_sync(&self, request: &CrmSyncRequest) -> Result<CrmSyncReply> {
        match self {
            BackendGateway::Http(g) => g.crm_sync(request).await,
            BackendGateway::Simulated(g) => g.crm_sync(request).await,
        }
    }

    async fn export_report(&self, kind: ServerExport, report: &AnalysisReport) -> Result<Vec<u8>> {
        match self {
            BackendGateway::Http(g) => g.export_report(kind, report).await,
            BackendGateway::Simulated(g) => g.export_report(kind, report).await,
        }
    }

    async fn email_export(&self, request: &EmailExportRequest) -> Result<StatusReply> {
        match self {
            BackendGateway::Http(g) => g.email_export(request).await,
            BackendGateway::Simulated(g) => g.email_export(request).await,
        }
    }

    async fn get_leads(&self) -> Result<GetLeadsReply> {
        match self {
            BackendGateway::Http(g) => g.get_leads().await,
            BackendGateway::Simulated(g) => g.get_leads().await,
        }
    }

    async fn test_crm_connection(&self, test: &ConnectionTest) -> Result<StatusReply> {
        match self {
            BackendGateway::Http(g) => g.test_crm_connection(test).await,
            BackendGateway::Simulated(g) => g.test_crm_connection(test).await,
        }
    }
}
