//! # Global Transaction Lifecycle
//!
//! `prepare → business function → {submit | abort}`.
//!
//! Once `prepare` has succeeded exactly one terminal call is attempted,
//! whether the business function returns `Ok`, returns `Err`, panics, or
//! is dropped mid-flight.

use super::invoker::BranchInvoker;
use super::registrar::BranchRegistrar;
use super::tcc::Tcc;
use crate::adapters::HttpTransport;
use crate::config::TccConfig;
use crate::domain::{
    invariant_identity_present, Phase, Result, TccError, TransKind, TransOptions,
    TransactionContext,
};
use crate::ports::{BranchGateway, CoordinatorGateway};
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Failure reason recorded when the transaction future is dropped.
pub const REASON_CANCELLED: &str = "global transaction cancelled before completion";

/// Drives global transactions against a coordinator.
#[derive(Clone)]
pub struct GlobalTransactionCoordinatorClient {
    coordinator: Arc<dyn CoordinatorGateway>,
    registrar: BranchRegistrar,
    invoker: BranchInvoker,
    coordinator_url: String,
    default_options: TransOptions,
}

impl GlobalTransactionCoordinatorClient {
    /// Create a client from its two outbound ports.
    pub fn new(coordinator: Arc<dyn CoordinatorGateway>, branches: Arc<dyn BranchGateway>) -> Self {
        Self {
            registrar: BranchRegistrar::new(Arc::clone(&coordinator)),
            invoker: BranchInvoker::new(branches),
            coordinator,
            coordinator_url: String::new(),
            default_options: TransOptions::default(),
        }
    }

    /// Create a client that talks HTTP/JSON to the coordinator and branches.
    pub fn http(config: &TccConfig) -> Result<Self> {
        config.validate()?;
        let transport = Arc::new(HttpTransport::new(config)?);
        Ok(Self::new(transport.clone(), transport)
            .with_coordinator_url(config.coordinator_url.clone())
            .with_options(config.options.clone()))
    }

    /// Set the coordinator address reported by [`Self::coordinator_url`].
    pub fn with_coordinator_url(mut self, url: impl Into<String>) -> Self {
        self.coordinator_url = url.into();
        self
    }

    /// Set the options every new transaction starts from.
    pub fn with_options(mut self, options: TransOptions) -> Self {
        self.default_options = options;
        self
    }

    /// Configured coordinator address; empty unless built from config.
    pub fn coordinator_url(&self) -> &str {
        &self.coordinator_url
    }

    /// Run `business` inside a new global transaction `gid`.
    pub async fn global_transaction<F, Fut, T>(&self, dtm: &str, gid: &str, business: F) -> Result<T>
    where
        F: FnOnce(Tcc) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.global_transaction_with(dtm, gid, |_| {}, business)
            .await
    }

    /// Like [`Self::global_transaction`], letting `custom` adjust the
    /// context (options, custom data) before `prepare` is sent.
    #[instrument(skip_all, fields(gid = %gid))]
    pub async fn global_transaction_with<C, F, Fut, T>(
        &self,
        dtm: &str,
        gid: &str,
        custom: C,
        business: F,
    ) -> Result<T>
    where
        C: FnOnce(&mut TransactionContext),
        F: FnOnce(Tcc) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut ctx = TransactionContext::open(dtm, gid, TransKind::Tcc)?;
        *ctx.options_mut() = self.default_options.clone();
        custom(&mut ctx);
        self.run(ctx, business).await
    }

    /// Like [`Self::global_transaction_with`], with a gid allocated by the
    /// coordinator.
    pub async fn global_transaction_auto<C, F, Fut, T>(
        &self,
        dtm: &str,
        custom: C,
        business: F,
    ) -> Result<T>
    where
        C: FnOnce(&mut TransactionContext),
        F: FnOnce(Tcc) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let gid = self
            .coordinator
            .new_gid(dtm)
            .await
            .map_err(|e| TccError::GidAllocationFailed(e.to_string()))?;
        self.global_transaction_with(dtm, &gid, custom, business)
            .await
    }

    /// Send `prepare`. No branch may run if this fails.
    pub async fn prepare(&self, ctx: &TransactionContext) -> Result<()> {
        if !invariant_identity_present(ctx.dtm(), ctx.gid()) {
            return Err(TccError::InvalidArgument(
                "coordinator address and gid are required".to_string(),
            ));
        }
        self.coordinator
            .prepare(ctx)
            .await
            .map_err(|e| TccError::PrepareFailed {
                gid: ctx.gid().to_string(),
                reason: e.to_string(),
            })
    }

    async fn run<F, Fut, T>(&self, ctx: TransactionContext, business: F) -> Result<T>
    where
        F: FnOnce(Tcc) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let ctx = Arc::new(ctx);
        self.prepare(&ctx).await?;
        info!(dtm = %ctx.dtm(), "global transaction prepared");

        let mut guard = CompletionGuard::arm(Arc::clone(&self.coordinator), Arc::clone(&ctx));
        let tcc = Tcc::new(
            Arc::clone(&ctx),
            self.registrar.clone(),
            self.invoker.clone(),
        );
        let outcome = AssertUnwindSafe(async move { business(tcc).await })
            .catch_unwind()
            .await;
        guard.disarm();

        let result = outcome.unwrap_or_else(|panic| {
            let message = panic_message(panic.as_ref());
            warn!(panic = %message, "business function panicked");
            Err(TccError::BusinessFault(message))
        });
        self.complete(&ctx, result).await
    }

    /// Issue the single terminal call for `ctx`.
    async fn complete<T>(&self, ctx: &TransactionContext, result: Result<T>) -> Result<T> {
        let result = match (result, ctx.failure_reason()) {
            (Ok(_), Some(reason)) => Err(TccError::Business(reason)),
            (other, _) => other,
        };

        match result {
            Ok(value) => {
                self.coordinator.submit(ctx).await.map_err(|e| {
                    warn!(error = %e, "submit failed, outcome left to coordinator");
                    TccError::CompletionUncertain {
                        phase: Phase::Submit,
                        reason: e.to_string(),
                        original: None,
                    }
                })?;
                info!("global transaction submitted");
                Ok(value)
            }
            Err(err) => {
                ctx.record_failure(err.to_string());
                match self.coordinator.abort(ctx).await {
                    Ok(()) => {
                        info!(reason = %err, "global transaction aborted");
                        Err(err)
                    }
                    Err(e) => {
                        warn!(error = %e, reason = %err, "abort failed, outcome left to coordinator");
                        Err(TccError::CompletionUncertain {
                            phase: Phase::Abort,
                            reason: e.to_string(),
                            original: Some(err.to_string()),
                        })
                    }
                }
            }
        }
    }
}

/// Owes the coordinator an `abort` until disarmed.
///
/// Only fires when the transaction future is dropped while the business
/// function is still running; every other exit path disarms it first.
struct CompletionGuard {
    coordinator: Arc<dyn CoordinatorGateway>,
    ctx: Arc<TransactionContext>,
    armed: bool,
}

impl CompletionGuard {
    fn arm(coordinator: Arc<dyn CoordinatorGateway>, ctx: Arc<TransactionContext>) -> Self {
        Self {
            coordinator,
            ctx,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.ctx.record_failure(REASON_CANCELLED);

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(gid = %self.ctx.gid(), "transaction dropped outside a runtime, abort not sent");
            return;
        };
        warn!(gid = %self.ctx.gid(), "transaction dropped before completion, aborting");

        let coordinator = Arc::clone(&self.coordinator);
        let ctx = Arc::clone(&self.ctx);
        handle.spawn(async move {
            if let Err(e) = coordinator.abort(&ctx).await {
                warn!(gid = %ctx.gid(), error = %e, "abort after cancellation failed");
            }
        });
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
