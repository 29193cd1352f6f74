//! Pre-execution guards for GraphQL documents
//!
//! Guards run on the parsed document before any resolver is invoked, so a
//! rejected request costs no store round trips.

mod depth;

pub use depth::{operation_depth, DepthGuard};
