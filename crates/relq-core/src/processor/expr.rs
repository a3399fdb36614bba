//! Expression handlers used inside `where`, `having` and `order by`.

use std::sync::Arc;

use super::Processor;
use crate::ast::{Node, Operator, Sexp, Tag};
use crate::domain::Resolution;
use crate::error::{CompileError, Result};
use crate::query::{insert_bind, protect_literal};
use crate::value::SqlValue;

impl Processor<'_> {
    pub(super) fn process_field(&mut self, node: &Node) -> Result<String> {
        let name = Self::atom(node, 0)?;
        self.resolve_field(name)
    }

    /// Integers, reals, pagination parameters and method names render as is.
    pub(super) fn process_literal(&mut self, node: &Node) -> Result<String> {
        Self::atom(node, 0).map(str::to_string)
    }

    pub(super) fn process_null(&mut self, _node: &Node) -> Result<String> {
        Ok(String::from("NULL"))
    }

    /// Quoted at compile time, not bound.
    pub(super) fn process_string(&mut self, node: &Node) -> Result<String> {
        let value = SqlValue::Text(Self::atom(node, 0)?.to_string());
        let quoted = match &self.options.connection {
            Some(connection) => connection.quote(&value),
            None => self.query.dialect.quote_value(&value),
        };
        Ok(protect_literal(&quoted))
    }

    /// `"#{title}"` strings are evaluated at execution time through the
    /// expression translator.
    pub(super) fn process_dstring(&mut self, node: &Node) -> Result<String> {
        let source = format!("\"{}\"", Self::atom(node, 0)?);
        let Some(translator) = &self.options.translator else {
            return Err(CompileError::Expression {
                expression: source,
                message: String::from("no expression translator configured"),
            });
        };
        let expression = translator
            .translate(&source)
            .map_err(|message| CompileError::Expression {
                expression: source.clone(),
                message,
            })?;
        Ok(insert_bind(&expression))
    }

    /// `argument.method`, translated by the domain.
    pub(super) fn process_function(&mut self, node: &Node) -> Result<String> {
        let argument = self.process(Self::child(node, 0)?)?;
        let method = self.process(Self::child(node, 1)?)?;
        let domain = Arc::clone(&self.domain);
        match domain.process_function(self, &argument, &method)? {
            Resolution::Matched(sql) => Ok(sql),
            Resolution::NotApplicable => Err(CompileError::FunctionNotAllowed(method)),
        }
    }

    pub(super) fn process_interval(&mut self, node: &Node) -> Result<String> {
        let value = self.process(Self::child(node, 0)?)?;
        let unit = Self::atom(node, 1)?;
        Ok(format!("INTERVAL {value} {}", unit.to_ascii_uppercase()))
    }

    /// A parenthesized expression or an `IN` list.
    pub(super) fn process_par(&mut self, node: &Node) -> Result<String> {
        if let [inner] = node.children.as_slice() {
            // `or` already renders its own parentheses
            if inner.tag() == Some(Tag::Op(Operator::Or)) {
                return self.process(inner);
            }
        }
        let items = node
            .children
            .iter()
            .map(|child| self.process(child))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!("({})", items.join(",")))
    }

    /// Negated `like`, `regexp`, `in` and `between` read as `x NOT LIKE y`.
    pub(super) fn process_not(&mut self, node: &Node) -> Result<String> {
        let operand = Self::child(node, 0)?;
        if let Sexp::Node(inner) = operand {
            match (inner.tag, inner.children.as_slice()) {
                (Tag::Op(op @ (Operator::Like | Operator::Regexp | Operator::In)), [left, right]) => {
                    let left = self.process(left)?;
                    let right = self.process(right)?;
                    return Ok(format!("{left} NOT {} {right}", op.sql()));
                }
                (Tag::Op(Operator::Between), [value, low, high]) => {
                    let value = self.process(value)?;
                    let low = self.process(low)?;
                    let high = self.process(high)?;
                    return Ok(format!("{value} NOT BETWEEN {low} AND {high}"));
                }
                _ => {}
            }
        }
        Ok(format!("NOT {}", self.process(operand)?))
    }

    pub(super) fn process_or(&mut self, node: &Node) -> Result<String> {
        let left = self.process(Self::child(node, 0)?)?;
        let right = self.process(Self::child(node, 1)?)?;
        Ok(format!("({left} OR {right})"))
    }

    pub(super) fn process_equal(&mut self, node: &Node) -> Result<String> {
        let left = Self::child(node, 0)?;
        let right = Self::child(node, 1)?;
        let domain = Arc::clone(&self.domain);
        match domain.process_equal(self, left, right)? {
            Resolution::Matched(sql) => Ok(sql),
            Resolution::NotApplicable => self.binary(Operator::Equal, left, right),
        }
    }

    pub(super) fn process_between(&mut self, node: &Node) -> Result<String> {
        let value = self.process(Self::child(node, 0)?)?;
        let low = self.process(Self::child(node, 1)?)?;
        let high = self.process(Self::child(node, 2)?)?;
        Ok(format!("{value} BETWEEN {low} AND {high}"))
    }

    pub(super) fn process_change_sign(&mut self, node: &Node) -> Result<String> {
        Ok(format!("-{}", self.process(Self::child(node, 0)?)?))
    }

    /// `left OP right`, the rendering of every operator without a handler.
    pub(super) fn binary(&mut self, op: Operator, left: &Sexp, right: &Sexp) -> Result<String> {
        let left = self.process(left)?;
        let right = self.process(right)?;
        Ok(format!("{left} {} {right}", op.sql()))
    }
}
