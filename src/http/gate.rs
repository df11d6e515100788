//! Request gate.
//!
//! # Responsibilities
//! - Resolve effective enablement (annotation header or static flag)
//! - Run the bypass evaluator
//! - Route to the downstream handler or the maintenance dispatcher
//!
//! # Design Decisions
//! - Exposed as an axum middleware; `Next` is the downstream handler and
//!   receives the original request untouched
//! - The engine is immutable after construction apart from the file cache,
//!   so it is shared as `Arc<Warden>` across all requests

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
    Router,
};
use std::sync::Arc;
use tracing::Level;

use crate::bypass::{BypassEvaluator, BypassReason, EnablementRule};
use crate::config::schema::WardenConfig;
use crate::config::validation::{validate_config, WardenError};
use crate::http::dispatcher::MaintenanceDispatcher;
use crate::http::writer::BufferedResponse;
use crate::observability::LogLevel;

/// Per-request outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Maintenance is not active for this request.
    Disabled,
    /// Maintenance is active but a rule let the request through.
    Bypass(BypassReason),
    /// Serve maintenance content.
    Maintenance,
}

impl Decision {
    pub fn passes_through(&self) -> bool {
        !matches!(self, Decision::Maintenance)
    }
}

/// The maintenance engine.
pub struct Warden {
    enablement: EnablementRule,
    bypass: BypassEvaluator,
    dispatcher: MaintenanceDispatcher,
    log_level: LogLevel,
}

impl Warden {
    /// Validate `config` and build the engine. Fails fast on any invalid
    /// setting, including an unreadable maintenance file.
    pub fn new(config: &WardenConfig) -> Result<Self, WardenError> {
        let validated = validate_config(config)?;
        let log_level = validated.log_level;

        if log_level.allows(Level::INFO) {
            tracing::info!(
                source = %validated.source,
                status = validated.status.as_u16(),
                enabled = config.enabled,
                "Maintenance gate configured"
            );
        }

        Ok(Self {
            enablement: validated.enablement,
            bypass: BypassEvaluator::new(validated.rules, log_level),
            dispatcher: MaintenanceDispatcher::new(
                validated.source,
                validated.status,
                validated.content_type,
                validated.timeout,
                log_level,
            ),
            log_level,
        })
    }

    /// Verbosity this engine emits events at. A host installing its own
    /// subscriber can use it as the default filter.
    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    /// Decide what to do with a request without serving it.
    pub fn decide<B>(&self, req: &Request<B>) -> Decision {
        if !self.enablement.is_enabled(req.headers()) {
            return Decision::Disabled;
        }
        match self.bypass.should_bypass(req) {
            Some(reason) => Decision::Bypass(reason),
            None => Decision::Maintenance,
        }
    }

    /// Gate a request in front of `next`.
    pub async fn handle(&self, req: Request<Body>, next: Next) -> Response {
        match self.decide(&req) {
            Decision::Disabled => {
                if self.log_level.allows(Level::DEBUG) {
                    tracing::debug!(uri = %req.uri(), "Maintenance mode is disabled, passing request through");
                }
                next.run(req).await
            }
            Decision::Bypass(reason) => {
                if self.log_level.allows(Level::DEBUG) {
                    tracing::debug!(uri = %req.uri(), %reason, "Bypassing maintenance mode");
                }
                next.run(req).await
            }
            Decision::Maintenance => {
                if self.log_level.allows(Level::INFO) {
                    tracing::info!(uri = %req.uri(), "Serving maintenance page");
                }
                let mut sink = BufferedResponse::new();
                self.dispatcher.serve(req, &mut sink).await;
                sink.into_response()
            }
        }
    }

    /// Put the gate in front of every route of `router`.
    pub fn attach<S>(self: Arc<Self>, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.layer(middleware::from_fn_with_state(self, maintenance_middleware))
    }
}

/// Axum middleware entry point.
pub async fn maintenance_middleware(
    State(warden): State<Arc<Warden>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    warden.handle(req, next).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warden(config: WardenConfig) -> Warden {
        Warden::new(&WardenConfig {
            maintenance_content: "<h1>Down</h1>".to_string(),
            ..config
        })
        .unwrap()
    }

    fn request(path: &str, headers: &[(&str, &str)]) -> Request<Body> {
        let mut builder = Request::builder().uri(path);
        for (k, v) in headers {
            builder = builder.header(*k, *v);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_disabled_wins_over_everything() {
        let w = warden(WardenConfig {
            enabled: false,
            ..WardenConfig::default()
        });
        assert_eq!(w.decide(&request("/", &[])), Decision::Disabled);
        assert!(w.decide(&request("/", &[])).passes_through());
    }

    #[test]
    fn test_annotation_then_bypass() {
        let w = warden(WardenConfig {
            enabled: false,
            enabled_annotation: "maintenance/enabled".to_string(),
            enabled_annotation_header: "X-Annotations".to_string(),
            ..WardenConfig::default()
        });

        let annotated = [("X-Annotations", "maintenance/enabled=true")];
        assert_eq!(w.decide(&request("/", &annotated)), Decision::Maintenance);

        let bypassed = [
            ("X-Annotations", "maintenance/enabled=true"),
            ("X-Maintenance-Bypass", "true"),
        ];
        assert_eq!(
            w.decide(&request("/", &bypassed)),
            Decision::Bypass(BypassReason::Header)
        );

        let wrong = [("X-Annotations", "maintenance/enabled=false")];
        assert_eq!(w.decide(&request("/", &wrong)), Decision::Disabled);
    }

    #[test]
    fn test_maintenance_when_nothing_matches() {
        let w = warden(WardenConfig::default());
        let decision = w.decide(&request("/dashboard", &[]));
        assert_eq!(decision, Decision::Maintenance);
        assert!(!decision.passes_through());
    }

    #[test]
    fn test_log_level_from_config() {
        assert_eq!(warden(WardenConfig::default()).log_level(), LogLevel::Error);
        let quiet = warden(WardenConfig {
            log_level: 0,
            ..WardenConfig::default()
        });
        assert_eq!(quiet.log_level(), LogLevel::None);
    }

    #[test]
    fn test_https_maintenance_service() {
        let w = Warden::new(&WardenConfig {
            maintenance_service: "https://maintenance.example.com".to_string(),
            ..WardenConfig::default()
        })
        .unwrap();
        assert_eq!(w.decide(&request("/", &[])), Decision::Maintenance);
    }
}
