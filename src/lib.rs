//! Parses template strings containing shell-style variable expansions
//! (`$IDENT`, `${IDENT}`, `${IDENT:-default}`, `${IDENT:1:7}`, ...) into an
//! [`Expression`] tree. Resolving the expansions against an environment is
//! left to the consumer of the tree.

pub mod parser;
mod scanner;

pub use parser::ast::{Expression, ExpressionItem, Modifier, VariableExpansion};
pub use parser::{parse, ParseError, ParseResult};

/// Parses `input` and returns the variable names it references, in order of
/// appearance, including those referenced inside default values and messages.
pub fn identifiers(input: &str) -> ParseResult<Vec<String>> {
    let expression = parse(input)?;
    Ok(expression
        .identifiers()
        .into_iter()
        .map(ToOwned::to_owned)
        .collect())
}
