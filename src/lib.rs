//  LIB.rs
//    by Lut99
//
//  Description:
//!   An executable semantics engine for a normative, ODP-derived enterprise-modelling
//!   language: communities of roles, artifacts and the deontic tokens (permits, burdens,
//!   embargoes) that constrain which actions a party may perform and when.
//!
//!   The crate is split into the static [`model`] a community is built from, the mutable
//!   [`runtime`] state an [`engine::Engine`] carries while it runs, the [`guard`] expression
//!   language guards and token lifecycles are written in, and the [`tracer`] that records
//!   every dispatch decision the engine makes.
//

#[cfg(feature = "config")]
pub mod config;
pub mod engine;
pub mod guard;
pub mod model;
pub mod runtime;
pub mod tracer;
pub mod value;

pub use engine::{DriverError, Engine};
pub use model::Community;
pub use value::Value;
