//! Evaluation of arithmetic expressions over `+ - * /`, parentheses and
//! named variables.
//!
//! ```
//! use exprcalc::{Context, Evaluator};
//!
//! let vars: Context = vec![("var1", 2.1), ("var2", 4.2)].into_iter().collect();
//! let result = Evaluator::new("2.1/(var1 + var2)")
//!     .with_lookup(&vars)
//!     .evaluate()
//!     .unwrap();
//!
//! assert!((result - 0.33).abs() < 0.01);
//! ```

pub mod eval;
pub mod lexer;
pub mod vars;

pub use crate::eval::{Context, EvalError, Evaluator, Lookup, LookupError, Unbound};
pub use crate::lexer::{tokenize, LexError, Scanner, Span, Token, TokenKind, Tokens};

/// Evaluates `input` in one go, resolving variables through `lookup` if given.
pub fn evaluate(input: &str, lookup: Option<&dyn Lookup>) -> Result<f64, EvalError> {
    let mut evaluator = Evaluator::new(input);

    if let Some(lookup) = lookup {
        evaluator.bind(lookup);
    }

    evaluator.evaluate()
}
