//! 実バックエンド（Flaskサーバー）へのHTTPクライアント

use super::types::*;
use super::Gateway;
use crate::error::{LeadAiError, Result};
use lead_ai_common::{AnalysisReport, Lead};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// レスポンス本文をJSONとして読む（HTTPステータスに関わらず）
    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            LeadAiError::Gateway(format!("HTTP {}: 応答を解釈できません: {}", status, e))
        })
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        debug!(path, "POST");
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::read_json(response).await
    }
}

impl Gateway for HttpGateway {
    async fn analyze(&self, url: &str) -> Result<AnalysisReport> {
        debug!(url, "POST /analyze");
        let response = self
            .client
            .post(self.url("/analyze"))
            .form(&[("url", url)])
            .send()
            .await?;
        let value: Value = Self::read_json(response).await?;

        if let Some(error) = value.get("error").and_then(Value::as_str) {
            return Err(LeadAiError::Backend(error.to_string()));
        }
        Ok(serde_json::from_value(value)?)
    }

    async fn save_lead(&self, lead: &Lead) -> Result<StatusReply> {
        self.post_json("/save-lead", lead).await
    }

    async fn verify_lead(&self, request: &VerifyRequest) -> Result<VerifyReply> {
        self.post_json("/verify-lead", request).await
    }

    async fn crm_sync(&self, request: &CrmSyncRequest) -> Result<CrmSyncReply> {
        self.post_json("/crm-sync", request).await
    }

    async fn export_report(&self, kind: ServerExport, report: &AnalysisReport) -> Result<Vec<u8>> {
        debug!(path = kind.endpoint(), "POST");
        let response = self
            .client
            .post(self.url(kind.endpoint()))
            .json(report)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn email_export(&self, request: &EmailExportRequest) -> Result<StatusReply> {
        self.post_json("/email-export", request).await
    }

    async fn get_leads(&self) -> Result<GetLeadsReply> {
        debug!("GET /get-leads");
        let response = self.client.get(self.url("/get-leads")).send().await?;
        Self::read_json(response).await
    }

    async fn test_crm_connection(&self, test: &ConnectionTest) -> Result<StatusReply> {
        self.post_json("/test-crm-connection", test).await
    }
}
