//! Client side of the design audit service.
//!
//! [`AuditSession`] drives single-image and multi-frame audits against any
//! [`AuditBackend`]; [`HttpAuditBackend`] is the production transport that
//! invokes the `audit-design` function over HTTP. Frames can be sourced from
//! a Figma file through [`FigmaClient`].

pub mod backend;
pub mod figma;
pub mod image;
pub mod session;

pub use backend::{AuditBackend, EndpointError, HttpAuditBackend, DEFAULT_FUNCTION_NAME};
pub use figma::{FigmaClient, FigmaError, DEFAULT_FIGMA_API_URL};
pub use image::{EncodedImage, ImageError};
pub use session::AuditSession;
