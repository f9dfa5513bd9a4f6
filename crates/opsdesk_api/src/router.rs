//! Request routing: authentication first, then kind lookup, then dispatch.

use crate::auth::Authenticator;
use crate::endpoint::{ResourceEndpoint, ResourceHandler};
use crate::envelope::{ApiRequest, ApiResponse, ApiStatus};
use log::warn;
use opsdesk_core::{
    AuditLogKind, ChatMessageKind, DataMigrationKind, DbPool, EpicKind, KindConfig,
    KpiMetricKind, NotificationKind, PortfolioKind, ReleaseKind, ServiceRequestKind,
    SessionKind, SlaPolicyKind, SprintKind, TeamKind, TimeSheetKind, UserKind,
};

/// Resource endpoint for every registered kind behind one authenticator.
pub struct Api {
    authenticator: Box<dyn Authenticator>,
    handlers: Vec<Box<dyn ResourceHandler>>,
}

impl Api {
    /// Builds the endpoint with every configured kind sharing `pool`.
    pub fn new(pool: DbPool, authenticator: impl Authenticator + 'static) -> Self {
        let mut api = Self::empty(authenticator);
        api.register(ResourceEndpoint::<EpicKind>::from_pool(pool.clone()))
            .register(ResourceEndpoint::<SprintKind>::from_pool(pool.clone()))
            .register(ResourceEndpoint::<ReleaseKind>::from_pool(pool.clone()))
            .register(ResourceEndpoint::<TeamKind>::from_pool(pool.clone()))
            .register(ResourceEndpoint::<PortfolioKind>::from_pool(pool.clone()))
            .register(ResourceEndpoint::<UserKind>::from_pool(pool.clone()))
            .register(ResourceEndpoint::<SessionKind>::from_pool(pool.clone()))
            .register(ResourceEndpoint::<AuditLogKind>::from_pool(pool.clone()))
            .register(ResourceEndpoint::<ChatMessageKind>::from_pool(pool.clone()))
            .register(ResourceEndpoint::<NotificationKind>::from_pool(pool.clone()))
            .register(ResourceEndpoint::<TimeSheetKind>::from_pool(pool.clone()))
            .register(ResourceEndpoint::<KpiMetricKind>::from_pool(pool.clone()))
            .register(ResourceEndpoint::<SlaPolicyKind>::from_pool(pool.clone()))
            .register(ResourceEndpoint::<ServiceRequestKind>::from_pool(pool.clone()))
            .register(ResourceEndpoint::<DataMigrationKind>::from_pool(pool));
        api
    }

    /// Builds an endpoint with no kinds registered.
    pub fn empty(authenticator: impl Authenticator + 'static) -> Self {
        Self {
            authenticator: Box::new(authenticator),
            handlers: Vec::new(),
        }
    }

    /// Registers `handler`, replacing any handler for the same kind.
    pub fn register(&mut self, handler: impl ResourceHandler + 'static) -> &mut Self {
        let name = handler.config().name;
        self.handlers.retain(|existing| existing.config().name != name);
        self.handlers.push(Box::new(handler));
        self
    }

    /// Configurations of the registered kinds, in registration order.
    pub fn kinds(&self) -> Vec<KindConfig> {
        self.handlers.iter().map(|handler| handler.config()).collect()
    }

    pub fn handle(&self, request: ApiRequest) -> ApiResponse {
        if let Err(err) = self
            .authenticator
            .authenticate(request.authorization.as_deref())
        {
            warn!(
                "event=api_auth module=api status=error action={} error={}",
                request.action.name(),
                err
            );
            return ApiResponse::failure(ApiStatus::Unauthorized, err.to_string());
        }

        let Some(handler) = self.find_handler(&request.kind) else {
            return ApiResponse::failure(
                ApiStatus::NotFound,
                format!("unknown resource kind `{}`", request.kind),
            );
        };
        handler.handle(request.action)
    }

    fn find_handler(&self, kind: &str) -> Option<&dyn ResourceHandler> {
        let kind = kind.trim();
        self.handlers
            .iter()
            .find(|handler| {
                let config = handler.config();
                config.name == kind || config.table == kind
            })
            .map(|handler| &**handler)
    }
}
