//! Plan-execution core for roster.
//!
//! A planner turns a team request into a JSON plan; [`plan`] decodes and
//! validates it; [`executor`] runs its operations in order against a
//! [`roster_store::GraphStore`] through the handlers in [`registry`].

pub mod executor;
pub mod plan;
pub mod planner;
pub mod registry;
