use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::TransportError;
use crate::models::job::SubmitResponse;
use crate::models::{EnhancedReport, JobSnapshot, SimulationConfig};
use crate::transport::{Credentials, JobTransport};

const MAX_ERROR_BODY: usize = 512;

pub struct HttpTransport {
    client: Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl HttpTransport {
    pub fn new(cfg: &Config) -> Result<Self, TransportError> {
        Self::with_base_url(
            &cfg.api_base_url,
            cfg.api_token.as_deref().and_then(Credentials::from_token),
            cfg.request_timeout,
        )
    }

    pub fn with_base_url(
        base_url: &str,
        credentials: Option<Credentials>,
        request_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match self.credentials.as_ref().and_then(|c| c.bearer()) {
            Some(bearer) => req.header("Authorization", bearer),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, TransportError> {
        let resp = self
            .authorize(req)
            .send()
            .await
            .map_err(classify_send_error)?;
        decode(resp).await
    }
}

// Only failures on the way to the service count as unreachable.
fn classify_send_error(e: reqwest::Error) -> TransportError {
    if let Some(status) = e.status() {
        return TransportError::Status {
            status: status.as_u16(),
            message: e.to_string(),
        };
    }
    if e.is_builder() {
        TransportError::Client(e.to_string())
    } else if e.is_connect() || e.is_timeout() || e.is_request() {
        TransportError::Unreachable(e.to_string())
    } else if e.is_decode() {
        TransportError::Decode(e.to_string())
    } else {
        TransportError::Client(e.to_string())
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, TransportError> {
    let status = resp.status();
    if !status.is_success() {
        let mut body = resp.text().await.unwrap_or_default();
        let cut = body
            .char_indices()
            .nth(MAX_ERROR_BODY)
            .map_or(body.len(), |(i, _)| i);
        body.truncate(cut);
        return Err(TransportError::Status {
            status: status.as_u16(),
            message: body,
        });
    }

    resp.json::<T>()
        .await
        .map_err(|e| TransportError::Decode(e.to_string()))
}

#[async_trait]
impl JobTransport for HttpTransport {
    async fn submit(&self, config: &SimulationConfig) -> Result<String, TransportError> {
        debug!(strategy = %config.strategy_id, "POST /backtest/run");
        let req = self.client.post(self.url("/backtest/run")).json(config);
        let resp: SubmitResponse = self.send(req).await?;
        Ok(resp.backtest_id)
    }

    async fn fetch_status(&self, job_id: &str) -> Result<JobSnapshot, TransportError> {
        let req = self.client.get(self.url(&format!("/backtest/{}", job_id)));
        self.send(req).await
    }

    async fn fetch_enhanced(&self, job_id: &str) -> Result<EnhancedReport, TransportError> {
        let req = self
            .client
            .get(self.url(&format!("/backtest/{}/enhanced", job_id)));
        self.send(req).await
    }
}
