//! Calculator tool: Evaluates arithmetic expressions.
//!
//! Accepts digits, `+ - * /`, parentheses, decimal points and whitespace;
//! any other character is refused before parsing. Evaluation is a small
//! recursive-descent parser, so nothing the model sends is ever executed.

use agentic_core::error::ToolError;
use agentic_core::tool::{Tool, ToolContext};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tokio_util::sync::CancellationToken;

use crate::args::error_payload;

pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Evaluates a basic arithmetic expression. Use for math."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "expr": {
                    "type": "string",
                    "description": "Arithmetic expression, e.g. '(2 + 3) * 4'"
                }
            },
            "required": ["expr"],
            "additionalProperties": false
        })
    }

    async fn execute(
        &self,
        arguments: &Map<String, Value>,
        _context: &ToolContext,
        _cancel: &CancellationToken,
    ) -> Result<Value, ToolError> {
        let expr = arguments.get("expr").and_then(Value::as_str).unwrap_or("");
        if expr.trim().is_empty() {
            return Ok(error_payload("expr is required"));
        }
        if !is_allowed(expr) {
            return Ok(error_payload("invalid characters in expression"));
        }

        Ok(match evaluate(expr) {
            Ok(value) if value.is_finite() => json!({ "result": number(value) }),
            Ok(_) => error_payload("result is not a finite number"),
            Err(e) => error_payload(format!("failed to evaluate expression: {e}")),
        })
    }
}

fn is_allowed(expr: &str) -> bool {
    expr.chars()
        .all(|c| c.is_ascii_digit() || c.is_whitespace() || "+-*/().".contains(c))
}

/// Integral results become JSON integers so `2+2` reads back as `4`, not `4.0`.
fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        json!(value as i64)
    } else {
        json!(value)
    }
}

// ── Expression evaluator ──────────────────────────────────────────────────
//
// expr    = term (('+' | '-') term)*
// term    = factor (('*' | '/') factor)*
// factor  = '-' factor | '+' factor | number | '(' expr ')'

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("Unexpected character '{0}' at offset {1}")]
    UnexpectedChar(char, usize),

    #[error("Invalid number: {0}")]
    BadNumber(String),

    #[error("Unexpected end of expression")]
    UnexpectedEnd,

    #[error("Expected closing parenthesis")]
    UnclosedParen,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Expression nests deeper than {0} levels")]
    TooDeep(usize),
}

/// Deepest run of unary signs and parentheses the evaluator will follow.
pub const MAX_DEPTH: usize = 256;

/// Evaluate an arithmetic expression over `f64`.
pub fn evaluate(expr: &str) -> Result<f64, EvalError> {
    let mut cursor = Cursor {
        src: expr.as_bytes(),
        pos: 0,
        depth: 0,
    };
    let value = cursor.expr()?;
    cursor.skip_ws();
    match cursor.peek() {
        None => Ok(value),
        Some(b) => Err(EvalError::UnexpectedChar(b as char, cursor.pos)),
    }
}

struct Cursor<'a> {
    src: &'a [u8],
    pos: usize,
    depth: usize,
}

impl Cursor<'_> {
    fn skip_ws(&mut self) {
        while self.src.get(self.pos).is_some_and(u8::is_ascii_whitespace) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    /// Next non-whitespace byte, consumed only if it is one of `ops`.
    fn eat(&mut self, ops: &[u8]) -> Option<u8> {
        self.skip_ws();
        let b = self.peek().filter(|b| ops.contains(b))?;
        self.pos += 1;
        Some(b)
    }

    fn expr(&mut self) -> Result<f64, EvalError> {
        let mut acc = self.term()?;
        while let Some(op) = self.eat(b"+-") {
            let rhs = self.term()?;
            acc = if op == b'+' { acc + rhs } else { acc - rhs };
        }
        Ok(acc)
    }

    fn term(&mut self) -> Result<f64, EvalError> {
        let mut acc = self.factor()?;
        while let Some(op) = self.eat(b"*/") {
            let rhs = self.factor()?;
            if op == b'*' {
                acc *= rhs;
            } else if rhs == 0.0 {
                return Err(EvalError::DivisionByZero);
            } else {
                acc /= rhs;
            }
        }
        Ok(acc)
    }

    fn factor(&mut self) -> Result<f64, EvalError> {
        if self.depth >= MAX_DEPTH {
            return Err(EvalError::TooDeep(MAX_DEPTH));
        }
        self.depth += 1;
        let value = self.nested_factor();
        self.depth -= 1;
        value
    }

    fn nested_factor(&mut self) -> Result<f64, EvalError> {
        if let Some(sign) = self.eat(b"-+") {
            let inner = self.factor()?;
            return Ok(if sign == b'-' { -inner } else { inner });
        }
        if self.eat(b"(").is_some() {
            let inner = self.expr()?;
            return match self.eat(b")") {
                Some(_) => Ok(inner),
                None => Err(EvalError::UnclosedParen),
            };
        }
        self.number()
    }

    fn number(&mut self) -> Result<f64, EvalError> {
        self.skip_ws();
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_digit() || b == b'.')
        {
            self.pos += 1;
        }
        if start == self.pos {
            return match self.peek() {
                None => Err(EvalError::UnexpectedEnd),
                Some(b) => Err(EvalError::UnexpectedChar(b as char, self.pos)),
            };
        }
        let text = String::from_utf8_lossy(&self.src[start..self.pos]);
        text.parse()
            .map_err(|_| EvalError::BadNumber(text.into_owned()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
