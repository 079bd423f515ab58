//! Calculator tool.
//!
//! Expressions are evaluated by `meval`, which only knows arithmetic and a
//! fixed set of math functions and constants (`sqrt`, `abs`, `exp`, `ln`,
//! the trigonometric functions, `floor`, `ceil`, `round`, `min`, `max`,
//! `pi`, `e`). Nothing else is callable.

use serde_json::{Value, json};
use tracing::info;

use super::ToolHandler;
use super::error::ToolError;
use super::schema::{ParamSpec, ToolArgs, ToolName, ToolSpec};

/// Largest magnitude reported as an exact integer.
const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

/// Evaluate an expression.
///
/// Whole results come back as JSON integers, others as floats. Results
/// that are infinite or not a number are errors.
pub fn evaluate(expression: &str) -> Result<Value, ToolError> {
    let value = meval::eval_str(expression).map_err(|e| ToolError::Failed(e.to_string()))?;
    if !value.is_finite() {
        return Err(ToolError::Failed(format!(
            "expression {expression:?} has no finite value"
        )));
    }

    if value.fract() == 0.0 && value.abs() <= MAX_EXACT {
        Ok(json!(value as i64))
    } else {
        Ok(json!(value))
    }
}

/// The `calculator` tool.
#[derive(Debug, Clone)]
pub struct Calculator {
    spec: ToolSpec,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator {
    pub fn new() -> Self {
        let spec = ToolSpec::new(
            ToolName::Calculator,
            "For mathematical calculation, always use this tool to evaluate an expression. \
             Supports + - * / % ^, parentheses, sqrt, abs, exp, ln, sin, cos, tan, floor, ceil, \
             round, min, max and the constants pi and e.",
        )
        .param(ParamSpec::string(
            "expression",
            "The expression to evaluate, for example \"(3 + 4) * 2\" or \"sqrt(2) * pi\".",
        ));
        Self { spec }
    }
}

impl ToolHandler for Calculator {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    fn call(&self, args: &ToolArgs) -> Result<Value, ToolError> {
        let expression = args.str("expression");
        let result = evaluate(expression)?;
        info!(expression, %result, "calculated");
        Ok(result)
    }
}
