//! The nine calculator tools exposed to the model.
//!
//! Every tool is one [`MathTool`] value: a name, a description, and an
//! [`Operation`] that decides the argument shape and the pure function
//! from [`super::math`] to call.

use async_trait::async_trait;
use num_bigint::BigUint;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Number, Value};
use tracing::debug;

use super::math;
use crate::registry::{RegistryError, ToolRegistry};
use crate::tool::{Tool, ToolDefinition, ToolError, ToolResult};

/// Arithmetic operation behind a calculator tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulus,
    Factorial,
    SquareRoot,
    Gcd,
    Lcm,
}

impl Operation {
    pub const ALL: [Operation; 9] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
        Operation::Modulus,
        Operation::Factorial,
        Operation::SquareRoot,
        Operation::Gcd,
        Operation::Lcm,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::Divide => "divide",
            Operation::Modulus => "modulus",
            Operation::Factorial => "factorial",
            Operation::SquareRoot => "square_root",
            Operation::Gcd => "gcd",
            Operation::Lcm => "lcm",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Operation::Add => "Add two numbers.",
            Operation::Subtract => "Subtract b from a.",
            Operation::Multiply => "Multiply two numbers.",
            Operation::Divide => "Divide a by b.",
            Operation::Modulus => "Return the remainder when a is divided by b.",
            Operation::Factorial => "Calculate the factorial of a number.",
            Operation::SquareRoot => "Return the square root of a number.",
            Operation::Gcd => "Return the greatest common divisor of two numbers.",
            Operation::Lcm => "Return the least common multiple of two numbers.",
        }
    }

    fn input_schema(self) -> Value {
        match self {
            Operation::Factorial => json!({
                "type": "object",
                "properties": {
                    "n": { "type": "integer", "description": "Non-negative integer" }
                },
                "required": ["n"],
                "additionalProperties": false
            }),
            Operation::SquareRoot => json!({
                "type": "object",
                "properties": {
                    "a": { "type": "number", "description": "Non-negative number" }
                },
                "required": ["a"],
                "additionalProperties": false
            }),
            _ => json!({
                "type": "object",
                "properties": {
                    "a": { "type": "integer", "description": "First operand" },
                    "b": { "type": "integer", "description": "Second operand" }
                },
                "required": ["a", "b"],
                "additionalProperties": false
            }),
        }
    }

    fn output_schema(self) -> Value {
        match self {
            Operation::Divide | Operation::SquareRoot => json!({ "type": "number" }),
            Operation::Modulus | Operation::Gcd => json!({ "type": "integer" }),
            Operation::Add
            | Operation::Subtract
            | Operation::Multiply
            | Operation::Factorial
            | Operation::Lcm => json!({
                "type": ["integer", "string"],
                "pattern": "^-?[0-9]+$",
                "description": "Decimal string when the result does not fit in 64 bits"
            }),
        }
    }

    /// Decode `input` and run the operation.
    pub fn apply(self, input: Value) -> Result<Value, ToolError> {
        let value = match self {
            Operation::Add => {
                let BinaryArgs { a, b } = decode(input)?;
                wide_integer(math::add(a, b))
            }
            Operation::Subtract => {
                let BinaryArgs { a, b } = decode(input)?;
                wide_integer(math::subtract(a, b))
            }
            Operation::Multiply => {
                let BinaryArgs { a, b } = decode(input)?;
                wide_integer(math::multiply(a, b))
            }
            Operation::Divide => {
                let BinaryArgs { a, b } = decode(input)?;
                json!(math::divide(a, b)?)
            }
            Operation::Modulus => {
                let BinaryArgs { a, b } = decode(input)?;
                json!(math::modulus(a, b)?)
            }
            Operation::Factorial => {
                let FactorialArgs { n } = decode(input)?;
                big_integer(&math::factorial(n)?)
            }
            Operation::SquareRoot => {
                let SquareRootArgs { a } = decode(input)?;
                json!(math::square_root(a)?)
            }
            Operation::Gcd => {
                let BinaryArgs { a, b } = decode(input)?;
                json!(math::gcd(a, b))
            }
            Operation::Lcm => {
                let BinaryArgs { a, b } = decode(input)?;
                wide_integer(math::lcm(a, b)?)
            }
        };
        Ok(value)
    }
}

// serde_json numbers stop at 64 bits without `arbitrary_precision`.
fn wide_integer(n: i128) -> Value {
    if let Ok(small) = i64::try_from(n) {
        Value::from(small)
    } else if let Ok(small) = u64::try_from(n) {
        Value::from(small)
    } else {
        Value::String(n.to_string())
    }
}

fn big_integer(n: &BigUint) -> Value {
    match u64::try_from(n) {
        Ok(small) => Value::from(small),
        Err(_) => Value::String(n.to_string()),
    }
}

#[derive(Debug, Deserialize)]
struct BinaryArgs {
    #[serde(deserialize_with = "whole_number")]
    a: i64,
    #[serde(deserialize_with = "whole_number")]
    b: i64,
}

#[derive(Debug, Deserialize)]
struct FactorialArgs {
    #[serde(deserialize_with = "whole_number")]
    n: i64,
}

#[derive(Debug, Deserialize)]
struct SquareRootArgs {
    a: f64,
}

/// Accepts `6` and `6.0` alike; models often send integers as floats.
fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let number = Number::deserialize(deserializer)?;
    if let Some(n) = number.as_i64() {
        return Ok(n);
    }
    match number.as_f64() {
        // i64::MAX as f64 rounds up to 2^63, which is out of range.
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Ok(f as i64)
        }
        _ => Err(D::Error::custom(format!(
            "expected a whole number within the 64-bit range, found {number}"
        ))),
    }
}

fn decode<T: serde::de::DeserializeOwned>(input: Value) -> Result<T, ToolError> {
    serde_json::from_value(input).map_err(|e| ToolError::InvalidInput(e.to_string()))
}

/// A calculator tool backed by one [`Operation`].
#[derive(Debug, Clone, Copy)]
pub struct MathTool {
    operation: Operation,
}

impl MathTool {
    pub fn new(operation: Operation) -> Self {
        Self { operation }
    }
}

#[async_trait]
impl Tool for MathTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.operation.name().to_string(),
            description: self.operation.description().to_string(),
            input_schema: self.operation.input_schema(),
            output_schema: self.operation.output_schema(),
        }
    }

    async fn execute(&self, input: Value) -> Result<ToolResult, ToolError> {
        debug!(tool = self.operation.name(), %input, "evaluating");
        let value = self.operation.apply(input)?;

        Ok(ToolResult {
            tool_call_id: String::new(), // Set by caller
            content: value.to_string(),
            is_error: false,
        })
    }
}

/// Register all nine calculator tools.
pub fn register_math_tools(registry: &mut ToolRegistry) -> Result<(), RegistryError> {
    for operation in Operation::ALL {
        registry.register(MathTool::new(operation))?;
    }
    Ok(())
}
