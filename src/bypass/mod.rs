//! Bypass decision subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request
//!     → enablement.rs (annotation header or static flag)
//!     → evaluator.rs (favicon → paths → header → JWT)
//!         → claims.rs (unverified payload decode)
//!     → pass through, or hand off to the maintenance dispatcher
//! ```
//!
//! # Design Decisions
//! - Rules are resolved once at construction; evaluation allocates nothing
//!   on the common path
//! - JWT failures are swallowed as "no bypass" and logged at debug

pub mod claims;
pub mod enablement;
pub mod evaluator;

pub use claims::{extract_claim, ClaimError};
pub use enablement::{AnnotationRule, EnablementRule};
pub use evaluator::{BypassEvaluator, BypassReason, BypassRules, HeaderRule, JwtRule};
