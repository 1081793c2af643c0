//! HTTP Transport Adapter
//!
//! Implements `CoordinatorGateway` and `BranchGateway` over HTTP with JSON
//! bodies.

use super::wire::{NewGidResponse, PhaseBody, RegisterBranchBody};
use crate::config::TccConfig;
use crate::domain::{
    BranchOp, BranchRegistration, BranchResponse, GatewayError, Phase, ResponseClass, TccError,
    TransactionContext,
};
use crate::ports::{BranchGateway, CoordinatorGateway};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

/// reqwest-backed transport for coordinator and branch calls.
///
/// One request per call; retries are the coordinator's job.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with the timeouts from `config`.
    pub fn new(config: &TccConfig) -> Result<Self, TccError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| TccError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn post_phase<B: Serialize + Sync + ?Sized>(
        &self,
        dtm: &str,
        phase: Phase,
        body: &B,
    ) -> Result<(), GatewayError> {
        let url = endpoint(dtm, phase);
        debug!(url = %url, %phase, "calling coordinator");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        read_response(response).await.map(|_| ())
    }
}

fn endpoint(dtm: &str, phase: Phase) -> String {
    format!("{}/{}", dtm.trim_end_matches('/'), phase.endpoint())
}

fn transport_error(e: reqwest::Error) -> GatewayError {
    GatewayError::Transport(e.to_string())
}

async fn read_response(response: reqwest::Response) -> Result<BranchResponse, GatewayError> {
    let status = response.status().as_u16();
    let body = response.text().await.map_err(transport_error)?;

    match ResponseClass::classify(status, &body) {
        ResponseClass::Success => Ok(BranchResponse { status, body }),
        class => Err(GatewayError::Rejected {
            status,
            class,
            body,
        }),
    }
}

#[async_trait]
impl CoordinatorGateway for HttpTransport {
    async fn prepare(&self, ctx: &TransactionContext) -> Result<(), GatewayError> {
        self.post_phase(ctx.dtm(), Phase::Prepare, &PhaseBody::from_context(ctx))
            .await
    }

    async fn submit(&self, ctx: &TransactionContext) -> Result<(), GatewayError> {
        self.post_phase(ctx.dtm(), Phase::Submit, &PhaseBody::from_context(ctx))
            .await
    }

    async fn abort(&self, ctx: &TransactionContext) -> Result<(), GatewayError> {
        self.post_phase(ctx.dtm(), Phase::Abort, &PhaseBody::from_context(ctx))
            .await
    }

    async fn register_branch(
        &self,
        ctx: &TransactionContext,
        registration: &BranchRegistration,
    ) -> Result<(), GatewayError> {
        let body = RegisterBranchBody {
            gid: ctx.gid(),
            trans_type: ctx.kind(),
            registration,
        };
        self.post_phase(ctx.dtm(), Phase::RegisterBranch, &body)
            .await
    }

    async fn new_gid(&self, dtm: &str) -> Result<String, GatewayError> {
        let url = endpoint(dtm, Phase::NewGid);
        debug!(url = %url, "requesting new gid");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(transport_error)?;
        let response = read_response(response).await?;

        let parsed: NewGidResponse = serde_json::from_str(&response.body)
            .map_err(|e| GatewayError::Decode(e.to_string()))?;
        if parsed.gid.is_empty() {
            return Err(GatewayError::Decode("empty gid".to_string()));
        }
        Ok(parsed.gid)
    }
}

#[async_trait]
impl BranchGateway for HttpTransport {
    async fn request_branch(
        &self,
        ctx: &TransactionContext,
        branch_id: &str,
        op: BranchOp,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<BranchResponse, GatewayError> {
        debug!(url, branch_id, %op, "calling branch");

        let mut request = self
            .client
            .post(url)
            .query(&ctx.branch_params(branch_id, op))
            .json(payload);
        for (name, value) in &ctx.options().branch_headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(transport_error)?;
        read_response(response).await
    }
}
