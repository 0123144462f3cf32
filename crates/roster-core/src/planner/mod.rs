//! Planner adapters: the [`Planner`] trait and the OpenAI backend.

pub mod openai;
pub mod trait_def;

pub use openai::{OpenAiPlanner, PlannerConfig};
pub use trait_def::Planner;
