//! Built-in tool implementations for the agentic runtime.
//!
//! - `math`: pure arithmetic functions and [`DomainError`]
//! - `calculator`: the nine [`MathTool`]s wrapping them for the model

pub mod calculator;
pub mod math;

pub use calculator::{register_math_tools, MathTool, Operation};
pub use math::DomainError;
