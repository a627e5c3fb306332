/*
 * Responsibility
 * - Edge authentication pipeline, outermost first:
 *   strip_identity → relay → policy
 */
pub mod policy;
pub mod relay;
pub mod strip_identity;

pub use policy::{Access, AccessPolicy, AccessRule};
pub use relay::{RelayOutcome, authenticate};
