//! `calculator` tool

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{FailurePolicy, Tool};
use crate::error::ToolError;
use crate::mcp::types::{text_output_schema, CallToolResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
        }
    }

    pub fn apply(self, lhs: f64, rhs: f64) -> Result<f64, ToolError> {
        match self {
            Operator::Add => Ok(lhs + rhs),
            Operator::Subtract => Ok(lhs - rhs),
            Operator::Multiply => Ok(lhs * rhs),
            Operator::Divide if rhs == 0.0 => Err(ToolError::DivisionByZero),
            Operator::Divide => Ok(lhs / rhs),
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CalculatorArgs {
    /// First operand
    pub num1: f64,

    /// Second operand
    pub num2: f64,

    /// Operator (+, -, *, /)
    pub operator: Operator,
}

pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    type Args = CalculatorArgs;

    const NAME: &'static str = "calculator";
    const DESCRIPTION: &'static str =
        "Takes two numbers and an operator and returns the result of the arithmetic.";
    const FAILURE_POLICY: FailurePolicy = FailurePolicy::ReportAsText;

    fn output_schema(&self) -> Option<Value> {
        Some(text_output_schema("Calculation result"))
    }

    async fn call(&self, args: CalculatorArgs) -> Result<CallToolResult, ToolError> {
        let result = args.operator.apply(args.num1, args.num2)?;
        let text = format!(
            "{} {} {} = {}",
            args.num1,
            args.operator.symbol(),
            args.num2,
            result
        );
        Ok(CallToolResult::structured_text(text.clone(), text))
    }
}
