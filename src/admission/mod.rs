//! Admission webhook.
//!
//! Wire types for the review envelope, the interceptor that answers
//! reviews, and the HTTPS server the API server calls into.

pub mod interceptor;
pub mod review;
pub mod server;

pub use interceptor::IngressInterceptor;
pub use review::{AdmissionRequest, AdmissionResponse, AdmissionReview, ReviewStatus};
pub use server::{build_router, start_admission_server};
