// backend_common/src/context/mod.rs
//
// Request-scoped context carrying identity and tracing metadata

use std::ops::Deref;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Identity and tracing values of a single client request
///
/// The default value is the "zero" carrier: every field empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiContext {
    /// API token presented by the client
    pub token: String,
    /// Tracks logs across a request-response cycle
    pub request_id: String,
    /// Tracks logs across a user's session
    pub correlation_id: String,
    pub user_id: String,
    /// Username bound to the token
    pub user_name: String,
    /// When the request was received
    pub request_time: Option<DateTime<Utc>>,
    /// Free-form values a service wants to carry along
    pub extras: serde_json::Value,
}

impl ApiContext {
    /// Create a carrier for a fresh request with generated tracking ids
    pub fn new_request() -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            correlation_id: Uuid::new_v4().to_string(),
            request_time: Some(Utc::now()),
            ..Self::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = correlation_id.into();
        self
    }

    /// Set both user id and user name
    pub fn with_user(mut self, user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self.user_name = user_name.into();
        self
    }

    pub fn with_request_time(mut self, request_time: DateTime<Utc>) -> Self {
        self.request_time = Some(request_time);
        self
    }

    pub fn with_extras(mut self, extras: serde_json::Value) -> Self {
        self.extras = extras;
        self
    }
}

/// Cancellable base context with an optional deadline
///
/// Clones share cancellation state. Values are never mutated in place;
/// attaching a carrier yields a new context.
#[derive(Debug, Clone)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
    // Only reachable through this module, so no other value can collide with it.
    api: Option<Arc<ApiContext>>,
}

impl Context {
    /// Root context: never cancelled unless `cancel` is called, no deadline
    pub fn background() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
            api: None,
        }
    }

    /// Derive a child that is cancelled with its parent but can also be
    /// cancelled on its own
    pub fn with_cancel(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
            api: self.api.clone(),
        }
    }

    /// Derive a child with a deadline; an earlier parent deadline wins
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let mut child = self.with_cancel();
        child.deadline = Some(match self.deadline {
            Some(parent) if parent < deadline => parent,
            _ => deadline,
        });
        child
    }

    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True once the deadline, if any, has passed
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Completes when the context is cancelled
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// The attached carrier, if any
    pub fn api_context(&self) -> Option<&ApiContext> {
        self.api.as_deref()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

/// Attach `api` to a context derived from `ctx`
///
/// `ctx` itself is left untouched; the derived context shares its
/// cancellation and deadline.
pub fn with_api_context(ctx: &Context, api: ApiContext) -> Context {
    Context {
        token: ctx.token.clone(),
        deadline: ctx.deadline,
        api: Some(Arc::new(api)),
    }
}

/// Retrieve the carrier attached to `ctx`
///
/// Returns the zero carrier and `false` if there is no context or nothing
/// was attached.
pub fn get_api_context(ctx: Option<&Context>) -> (ApiContext, bool) {
    match ctx.and_then(Context::api_context) {
        Some(api) => (api.clone(), true),
        None => (ApiContext::default(), false),
    }
}

/// Combine a context and its carrier into one handle
pub fn upgrade_context(ctx: Option<&Context>) -> CustomContext {
    let (api, _) = get_api_context(ctx);
    CustomContext {
        context: ctx.cloned().unwrap_or_default(),
        api,
    }
}

/// A base context together with its request carrier
///
/// Dereferences to the carrier so identity fields read directly.
#[derive(Debug, Clone, Default)]
pub struct CustomContext {
    pub context: Context,
    pub api: ApiContext,
}

impl CustomContext {
    /// Shortcut for tests and background jobs: a background context
    /// carrying `api`
    pub fn from_api(api: ApiContext) -> Self {
        let context = with_api_context(&Context::background(), api.clone());
        Self { context, api }
    }

    pub fn is_cancelled(&self) -> bool {
        self.context.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.context.deadline()
    }

    pub async fn cancelled(&self) {
        self.context.cancelled().await
    }
}

impl Deref for CustomContext {
    type Target = ApiContext;

    fn deref(&self) -> &Self::Target {
        &self.api
    }
}
