//! Operator-precedence stack machine.
//!
//! Tokens are scanned left to right. Leaves attach to the node on top of the
//! stack; an operator first pops every open node binding at least as tightly,
//! then steals the last child of the new top as its own first operand and is
//! pushed in turn. Parentheses push a marker that nothing but `)` can pop.

use super::error::SyntaxError;
use super::precedence::{
    operator_precedence, precedence, token_to_binary_op, token_to_prefix_op, PAR_CLOSE,
};
use crate::ast::{Node, Operator, Sexp, Tag};
use crate::lexer::{Keyword, Lexer, Span, Token, TokenKind};

/// What the scanner expects next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Relation,
    AfterRelation,
    Operand,
    AfterOperand,
    LimitValue,
    AfterLimit,
    OffsetValue,
    PaginateParam,
    OrderItem,
    AfterOrderItem,
    OrderSeparator,
    GroupItem,
    AfterGroupItem,
    Tail,
}

impl State {
    const fn accepts_end(self) -> bool {
        matches!(
            self,
            Self::AfterRelation
                | Self::AfterOperand
                | Self::AfterLimit
                | Self::AfterOrderItem
                | Self::OrderSeparator
                | Self::AfterGroupItem
                | Self::Tail
        )
    }
}

/// An open node on the reduction stack.
#[derive(Debug)]
struct Frame {
    node: Node,
    /// State to resume once a parenthesis marker is closed.
    resume: Option<State>,
    opened_at: Span,
}

/// Relation language parser.
pub struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    root: Node,
    stack: Vec<Frame>,
    state: State,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given input.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            tokens: Lexer::new(input).tokenize(),
            pos: 0,
            root: Node::new(Tag::Query),
            stack: Vec::new(),
            state: State::Relation,
        }
    }

    /// Parses the whole input into a `[:query, ...]` tree.
    ///
    /// # Errors
    ///
    /// Returns a `SyntaxError` carrying the unconsumed input on any lexical or
    /// structural error.
    pub fn parse(mut self) -> Result<Node, SyntaxError> {
        loop {
            let token = self.current().clone();
            if let TokenKind::Error(reason) = &token.kind {
                return Err(SyntaxError::lexical(self.input, token.span, reason));
            }
            if token.is_eof() {
                return self.finish(&token);
            }
            self.pos += 1;
            self.step(&token)?;
        }
    }

    fn step(&mut self, token: &Token) -> Result<(), SyntaxError> {
        match self.state {
            State::Relation => self.relation(token),
            State::AfterRelation => self.after_relation(token),
            State::Operand => self.operand(token),
            State::AfterOperand => self.after_operand(token),
            State::LimitValue | State::OffsetValue => {
                let TokenKind::Integer(value) = &token.kind else {
                    return Err(self.error(token));
                };
                self.append(Node::leaf(Tag::Integer, value.clone()));
                self.state = if self.state == State::LimitValue {
                    State::AfterLimit
                } else {
                    State::Tail
                };
                Ok(())
            }
            State::AfterLimit => {
                let second_value = matches!(
                    self.stack.last(),
                    Some(frame) if frame.node.tag == Tag::Limit && frame.node.children.len() == 2
                );
                if token.kind == TokenKind::Comma && second_value {
                    self.state = State::LimitValue;
                    Ok(())
                } else {
                    self.clause(token)
                }
            }
            State::PaginateParam => {
                let TokenKind::Identifier(name) = &token.kind else {
                    return Err(self.error(token));
                };
                self.append(Node::leaf(Tag::Param, name.clone()));
                self.state = State::Tail;
                Ok(())
            }
            State::OrderItem | State::GroupItem => {
                let TokenKind::Identifier(name) = &token.kind else {
                    return Err(self.error(token));
                };
                self.append(Node::leaf(Tag::Field, name.clone()));
                self.state = if self.state == State::OrderItem {
                    State::AfterOrderItem
                } else {
                    State::AfterGroupItem
                };
                Ok(())
            }
            State::AfterOrderItem => match &token.kind {
                TokenKind::Keyword(Keyword::Asc) => {
                    self.close_over(Tag::Asc, None, token.span)?;
                    self.state = State::OrderSeparator;
                    Ok(())
                }
                TokenKind::Keyword(Keyword::Desc) => {
                    self.close_over(Tag::Desc, None, token.span)?;
                    self.state = State::OrderSeparator;
                    Ok(())
                }
                TokenKind::Comma => {
                    self.state = State::OrderItem;
                    Ok(())
                }
                _ => self.clause(token),
            },
            State::OrderSeparator | State::AfterGroupItem => {
                if token.kind == TokenKind::Comma {
                    self.state = if self.state == State::OrderSeparator {
                        State::OrderItem
                    } else {
                        State::GroupItem
                    };
                    Ok(())
                } else {
                    self.clause(token)
                }
            }
            State::Tail => self.clause(token),
        }
    }

    fn relation(&mut self, token: &Token) -> Result<(), SyntaxError> {
        match &token.kind {
            TokenKind::Identifier(name) => {
                self.pop_stack(precedence(Tag::Relation), token.span)?;
                self.push(Node::leaf(Tag::Relation, name.clone()), None, token.span);
                self.state = State::AfterRelation;
                Ok(())
            }
            TokenKind::LeftParen => {
                self.push(
                    Node::new(Tag::ClausePar),
                    Some(State::AfterRelation),
                    token.span,
                );
                Ok(())
            }
            _ => Err(self.error(token)),
        }
    }

    fn after_relation(&mut self, token: &Token) -> Result<(), SyntaxError> {
        match &token.kind {
            TokenKind::Keyword(Keyword::In) => self.scope(token.span),
            TokenKind::Keyword(Keyword::Where) => self.open(Tag::Filter, State::Operand, token),
            TokenKind::Keyword(Keyword::From) => self.open(Tag::From, State::Relation, token),
            TokenKind::Keyword(Keyword::Or) => self.open(Tag::ClauseOr, State::Relation, token),
            TokenKind::Keyword(Keyword::And) => self.open(Tag::ClauseAnd, State::Relation, token),
            _ => self.clause(token),
        }
    }

    fn operand(&mut self, token: &Token) -> Result<(), SyntaxError> {
        let leaf = match &token.kind {
            TokenKind::Integer(value) => Node::leaf(Tag::Integer, value.clone()),
            TokenKind::Real(value) => Node::leaf(Tag::Real, value.clone()),
            TokenKind::String(value) => Node::leaf(Tag::String, value.clone()),
            TokenKind::DString(value) => Node::leaf(Tag::DString, value.clone()),
            TokenKind::Identifier(name) => Node::leaf(Tag::Field, name.clone()),
            TokenKind::Keyword(Keyword::Null) => Node::new(Tag::Null),
            TokenKind::Minus if self.negative_literal(token).is_some() => {
                let Some(leaf) = self.negative_literal(token) else {
                    return Err(self.error(token));
                };
                self.pos += 1;
                leaf
            }
            TokenKind::LeftParen => {
                self.push(Node::new(Tag::Par), Some(State::AfterOperand), token.span);
                return Ok(());
            }
            kind => {
                let Some(op) = token_to_prefix_op(kind) else {
                    return Err(self.error(token));
                };
                self.push(Node::new(Tag::Op(op)), None, token.span);
                return Ok(());
            }
        };
        self.append(leaf);
        self.state = State::AfterOperand;
        Ok(())
    }

    /// `-` directly followed by a number is a signed literal, not a prefix op.
    fn negative_literal(&self, minus: &Token) -> Option<Node> {
        let next = self.current();
        if !minus.span.touches(next.span) {
            return None;
        }
        match &next.kind {
            TokenKind::Integer(value) => Some(Node::leaf(Tag::Integer, format!("-{value}"))),
            TokenKind::Real(value) => Some(Node::leaf(Tag::Real, format!("-{value}"))),
            _ => None,
        }
    }

    fn after_operand(&mut self, token: &Token) -> Result<(), SyntaxError> {
        match &token.kind {
            TokenKind::Keyword(Keyword::And) if self.pending_between().is_some() => {
                if let Some(index) = self.pending_between() {
                    while self.stack.len() > index + 1 {
                        self.pop_frame(token.span)?;
                    }
                }
                self.state = State::Operand;
                Ok(())
            }
            TokenKind::Keyword(Keyword::Not) => self.negated(token),
            TokenKind::Keyword(Keyword::Is) => {
                self.open(Tag::Op(Operator::Is), State::Operand, token)
            }
            TokenKind::Keyword(Keyword::Between) => {
                self.open(Tag::Op(Operator::Between), State::Operand, token)
            }
            TokenKind::Keyword(Keyword::In) => {
                // A scope only follows a relation, never an expression.
                if self.current().kind != TokenKind::LeftParen {
                    return Err(self.error(token));
                }
                self.open(Tag::Op(Operator::In), State::Operand, token)
            }
            TokenKind::Keyword(Keyword::From) => {
                if self.inside_expression_par() {
                    return Err(self.error(token));
                }
                self.open(Tag::From, State::Relation, token)
            }
            TokenKind::Dot => {
                let name = self.expect_identifier()?;
                self.close_over(
                    Tag::Function,
                    Some(Node::leaf(Tag::Method, name).into()),
                    token.span,
                )
            }
            TokenKind::Comma => self.comma(token),
            TokenKind::Identifier(word) => {
                let unit = interval_unit(word).filter(|_| self.last_is_number());
                let Some(unit) = unit else {
                    return Err(self.error(token));
                };
                self.close_over(Tag::Interval, Some(Sexp::Atom(unit.into())), token.span)
            }
            kind => match token_to_binary_op(kind) {
                Some(op) => self.open(Tag::Op(op), State::Operand, token),
                None => self.clause(token),
            },
        }
    }

    /// `not like`, `not regexp`, `not in (...)`, `not between`.
    fn negated(&mut self, token: &Token) -> Result<(), SyntaxError> {
        let next = self.current().clone();
        let op = match next.kind {
            TokenKind::Keyword(Keyword::Like) => Operator::Like,
            TokenKind::Keyword(Keyword::Regexp) => Operator::Regexp,
            TokenKind::Keyword(Keyword::In) => Operator::In,
            TokenKind::Keyword(Keyword::Between) => Operator::Between,
            _ => return Err(self.error(&next)),
        };
        self.pos += 1;
        if op == Operator::In && self.current().kind != TokenKind::LeftParen {
            return Err(self.error(&next));
        }
        self.pop_stack(operator_precedence(op), token.span)?;
        let operand = self.take_last(token.span)?;
        self.push(Node::new(Tag::Op(Operator::Not)), None, token.span);
        self.push(
            Node::with_children(Tag::Op(op), vec![operand]),
            None,
            next.span,
        );
        self.state = State::Operand;
        Ok(())
    }

    /// Modifier clauses shared by every state that may end a relation.
    fn clause(&mut self, token: &Token) -> Result<(), SyntaxError> {
        if token.kind == TokenKind::RightParen {
            return self.close_paren(token);
        }
        if self.inside_expression_par() {
            return Err(self.error(token));
        }
        let (tag, next) = match &token.kind {
            TokenKind::Keyword(Keyword::Limit) => (Tag::Limit, State::LimitValue),
            TokenKind::Keyword(Keyword::Offset) => (Tag::Offset, State::OffsetValue),
            TokenKind::Keyword(Keyword::Paginate) => (Tag::Paginate, State::PaginateParam),
            TokenKind::Keyword(Keyword::Having) => (Tag::Having, State::Operand),
            TokenKind::Keyword(Keyword::Order) => {
                self.expect_keyword(Keyword::By)?;
                (Tag::Order, State::OrderItem)
            }
            TokenKind::Keyword(Keyword::Group) => {
                self.expect_keyword(Keyword::By)?;
                (Tag::Group, State::GroupItem)
            }
            _ => return Err(self.error(token)),
        };
        self.open(tag, next, token)
    }

    /// `in <scope>` closes over whatever relation precedes it.
    fn scope(&mut self, at: Span) -> Result<(), SyntaxError> {
        let name = self.expect_identifier()?;
        self.close_over(Tag::Scope, Some(Sexp::Atom(name)), at)?;
        self.state = State::AfterRelation;
        Ok(())
    }

    fn comma(&mut self, token: &Token) -> Result<(), SyntaxError> {
        if !self.inside_expression_par() {
            return Err(self.error(token));
        }
        while self
            .stack
            .last()
            .is_some_and(|frame| frame.node.tag != Tag::Par)
        {
            self.pop_frame(token.span)?;
        }
        self.state = State::Operand;
        Ok(())
    }

    fn close_paren(&mut self, token: &Token) -> Result<(), SyntaxError> {
        self.pop_stack(PAR_CLOSE, token.span)?;
        let open = matches!(
            self.stack.last(),
            Some(frame) if frame.node.tag.is_paren() && !frame.node.children.is_empty()
        );
        if !open {
            return Err(self.error(token));
        }
        if let Some(frame) = self.stack.pop() {
            self.state = frame.resume.unwrap_or(State::AfterOperand);
            self.append(frame.node);
        }
        Ok(())
    }

    fn finish(mut self, eof: &Token) -> Result<Node, SyntaxError> {
        let empty = self.stack.is_empty() && self.root.children.is_empty();
        if !(self.state.accepts_end() || (self.state == State::Relation && empty)) {
            return Err(self.error(eof));
        }
        if let Some(frame) = self.stack.iter().rev().find(|f| f.node.tag.is_paren()) {
            return Err(SyntaxError::unmatched(self.input, frame.opened_at));
        }
        while !self.stack.is_empty() {
            self.pop_frame(eof.span)?;
        }
        Ok(self.root)
    }

    // Stack primitives

    fn top_mut(&mut self) -> &mut Node {
        match self.stack.last_mut() {
            Some(frame) => &mut frame.node,
            None => &mut self.root,
        }
    }

    fn append(&mut self, node: Node) {
        self.top_mut().children.push(node.into());
    }

    fn push(&mut self, node: Node, resume: Option<State>, opened_at: Span) {
        self.stack.push(Frame {
            node,
            resume,
            opened_at,
        });
    }

    fn take_last(&mut self, at: Span) -> Result<Sexp, SyntaxError> {
        let input = self.input;
        self.top_mut()
            .children
            .pop()
            .ok_or_else(|| SyntaxError::near(input, at))
    }

    /// Closes the top frame into its parent.
    fn pop_frame(&mut self, at: Span) -> Result<(), SyntaxError> {
        let Some(frame) = self.stack.pop() else {
            return Ok(());
        };
        if frame.node.tag == Tag::Op(Operator::Between) && frame.node.children.len() != 3 {
            return Err(SyntaxError::near(self.input, at));
        }
        self.append(frame.node);
        Ok(())
    }

    /// Pops every frame binding at least as tightly as `prec`.
    fn pop_stack(&mut self, prec: i8, at: Span) -> Result<(), SyntaxError> {
        while self
            .stack
            .last()
            .is_some_and(|frame| precedence(frame.node.tag) >= prec)
        {
            self.pop_frame(at)?;
        }
        Ok(())
    }

    /// Pops, wraps the last child in `tag`, and pushes the result.
    fn open(&mut self, tag: Tag, next: State, token: &Token) -> Result<(), SyntaxError> {
        self.pop_stack(precedence(tag), token.span)?;
        let operand = self.take_last(token.span)?;
        self.push(Node::with_children(tag, vec![operand]), None, token.span);
        self.state = next;
        Ok(())
    }

    /// Pops, wraps the last child in `tag` together with `extra`, no push.
    fn close_over(&mut self, tag: Tag, extra: Option<Sexp>, at: Span) -> Result<(), SyntaxError> {
        self.pop_stack(precedence(tag), at)?;
        let operand = self.take_last(at)?;
        let mut children = vec![operand];
        children.extend(extra);
        self.append(Node::with_children(tag, children));
        Ok(())
    }

    /// Index of a `between` still waiting for its `and`, if reachable.
    fn pending_between(&self) -> Option<usize> {
        let between = Tag::Op(Operator::Between);
        for (index, frame) in self.stack.iter().enumerate().rev() {
            if frame.node.tag == between {
                let above = usize::from(index + 1 < self.stack.len());
                return (frame.node.children.len() + above == 2).then_some(index);
            }
            if precedence(frame.node.tag) <= precedence(between) {
                return None;
            }
        }
        None
    }

    fn inside_expression_par(&self) -> bool {
        self.stack
            .iter()
            .rev()
            .find(|frame| frame.node.tag.is_paren())
            .is_some_and(|frame| frame.node.tag == Tag::Par)
    }

    fn last_is_number(&self) -> bool {
        let top = match self.stack.last() {
            Some(frame) => &frame.node,
            None => &self.root,
        };
        matches!(
            top.children.last().and_then(Sexp::tag),
            Some(Tag::Integer | Tag::Real)
        )
    }

    // Token helpers

    fn current(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn expect_identifier(&mut self) -> Result<String, SyntaxError> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Identifier(name) => {
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.error(&token)),
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), SyntaxError> {
        if self.current().is_keyword(keyword) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(self.current()))
        }
    }

    fn error(&self, token: &Token) -> SyntaxError {
        SyntaxError::near(self.input, token.span)
    }
}

/// Normalizes an interval unit word (`days` -> `day`).
fn interval_unit(word: &str) -> Option<&'static str> {
    let lower = word.to_ascii_lowercase();
    match lower.strip_suffix('s').unwrap_or(&lower) {
        "second" => Some("second"),
        "minute" => Some("minute"),
        "hour" => Some("hour"),
        "day" => Some("day"),
        "week" => Some("week"),
        "month" => Some("month"),
        "year" => Some("year"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sexp(input: &str) -> String {
        Parser::new(input)
            .parse()
            .unwrap_or_else(|e| panic!("Failed to parse {input:?}: {e}"))
            .to_string()
    }

    fn syntax_error(input: &str) -> SyntaxError {
        match Parser::new(input).parse() {
            Ok(tree) => panic!("Expected a syntax error for {input:?}, got {tree}"),
            Err(e) => e,
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(sexp(""), "[:query]");
        assert_eq!(sexp("   "), "[:query]");
    }

    #[test]
    fn test_single_relation() {
        assert_eq!(sexp("objects"), r#"[:query, [:relation, "objects"]]"#);
    }

    #[test]
    fn test_documented_example() {
        assert_eq!(
            sexp("letters where foo > 5 from managers in site limit 5 group by section_id"),
            concat!(
                r#"[:query, [:group, [:limit, [:from, [:filter, [:relation, "letters"], "#,
                r#"[:>, [:field, "foo"], [:integer, "5"]]], [:scope, [:relation, "managers"], "site"]], "#,
                r#"[:integer, "5"]], [:field, "section_id"]]]"#
            )
        );
    }

    #[test]
    fn test_from_chain_is_left_nested() {
        assert_eq!(
            sexp("a from b from c"),
            r#"[:query, [:from, [:from, [:relation, "a"], [:relation, "b"]], [:relation, "c"]]]"#
        );
    }

    #[test]
    fn test_scope_before_filter() {
        assert_eq!(
            sexp("letters in site where id = 1"),
            concat!(
                r#"[:query, [:filter, [:scope, [:relation, "letters"], "site"], "#,
                r#"[:=, [:field, "id"], [:integer, "1"]]]]"#
            )
        );
    }

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(
            sexp("a where x = 1 + 2 * 3"),
            concat!(
                r#"[:query, [:filter, [:relation, "a"], [:=, [:field, "x"], "#,
                r#"[:+, [:integer, "1"], [:*, [:integer, "2"], [:integer, "3"]]]]]]"#
            )
        );
        assert_eq!(
            sexp("a where x = y - z - 1"),
            concat!(
                r#"[:query, [:filter, [:relation, "a"], [:=, [:field, "x"], "#,
                r#"[:-, [:-, [:field, "y"], [:field, "z"]], [:integer, "1"]]]]]"#
            )
        );
    }

    #[test]
    fn test_and_binds_looser_than_comparison() {
        assert_eq!(
            sexp("a where b = 1 and c = 2 or d = 3"),
            concat!(
                r#"[:query, [:filter, [:relation, "a"], [:or, [:and, "#,
                r#"[:=, [:field, "b"], [:integer, "1"]], [:=, [:field, "c"], [:integer, "2"]]], "#,
                r#"[:=, [:field, "d"], [:integer, "3"]]]]]"#
            )
        );
    }

    #[test]
    fn test_parenthesized_expression() {
        assert_eq!(
            sexp("a where (b + 1) * 2 > 3"),
            concat!(
                r#"[:query, [:filter, [:relation, "a"], [:>, [:*, [:par, "#,
                r#"[:+, [:field, "b"], [:integer, "1"]]], [:integer, "2"]], [:integer, "3"]]]]"#
            )
        );
    }

    #[test]
    fn test_in_list_and_not_like() {
        assert_eq!(
            sexp("a where id in (1, 2) and name not like 'x%'"),
            concat!(
                r#"[:query, [:filter, [:relation, "a"], [:and, [:in, [:field, "id"], "#,
                r#"[:par, [:integer, "1"], [:integer, "2"]]], [:not, [:like, [:field, "name"], "#,
                r#"[:string, "x%"]]]]]]"#
            )
        );
    }

    #[test]
    fn test_between_and() {
        assert_eq!(
            sexp("a where x between 1 + 1 and 5 and y = 2"),
            concat!(
                r#"[:query, [:filter, [:relation, "a"], [:and, [:between, [:field, "x"], "#,
                r#"[:+, [:integer, "1"], [:integer, "1"]], [:integer, "5"]], "#,
                r#"[:=, [:field, "y"], [:integer, "2"]]]]]"#
            )
        );
    }

    #[test]
    fn test_is_not_null() {
        assert_eq!(
            sexp("a where x is not null"),
            r#"[:query, [:filter, [:relation, "a"], [:is, [:field, "x"], [:not, [:null]]]]]"#
        );
    }

    #[test]
    fn test_prefix_and_negative_literal() {
        assert_eq!(
            sexp("a where x = -5 and - y > 2"),
            concat!(
                r#"[:query, [:filter, [:relation, "a"], [:and, [:=, [:field, "x"], "#,
                r#"[:integer, "-5"]], [:>, [:@-, [:field, "y"]], [:integer, "2"]]]]]"#
            )
        );
    }

    #[test]
    fn test_function_and_interval() {
        assert_eq!(
            sexp("a where event_at.year = 2008 or event_at > now - 3 days"),
            concat!(
                r#"[:query, [:filter, [:relation, "a"], [:or, [:=, [:function, [:field, "event_at"], "#,
                r#"[:method, "year"]], [:integer, "2008"]], [:>, [:field, "event_at"], "#,
                r#"[:-, [:field, "now"], [:interval, [:integer, "3"], "day"]]]]]]"#
            )
        );
    }

    #[test]
    fn test_order_and_pagination() {
        assert_eq!(
            sexp("foo order by name asc, first_name desc, id"),
            concat!(
                r#"[:query, [:order, [:relation, "foo"], [:asc, [:field, "name"]], "#,
                r#"[:desc, [:field, "first_name"]], [:field, "id"]]]"#
            )
        );
        assert_eq!(
            sexp("objects limit 10 paginate page"),
            r#"[:query, [:paginate, [:limit, [:relation, "objects"], [:integer, "10"]], [:param, "page"]]]"#
        );
        assert_eq!(
            sexp("objects limit 5, 10"),
            r#"[:query, [:limit, [:relation, "objects"], [:integer, "5"], [:integer, "10"]]]"#
        );
    }

    #[test]
    fn test_clause_or_with_parentheses() {
        assert_eq!(
            sexp("(letters) or (icons from objects)"),
            concat!(
                r#"[:query, [:clause_or, [:clause_par, [:relation, "letters"]], "#,
                r#"[:clause_par, [:from, [:relation, "icons"], [:relation, "objects"]]]]]"#
            )
        );
    }

    #[test]
    fn test_group_having() {
        assert_eq!(
            sexp("objects group by kpath having id > 3"),
            concat!(
                r#"[:query, [:having, [:group, [:relation, "objects"], [:field, "kpath"]], "#,
                r#"[:>, [:field, "id"], [:integer, "3"]]]]"#
            )
        );
    }

    #[test]
    fn test_syntax_error_remainder() {
        let err = syntax_error("this is a bad source");
        assert_eq!(err.remainder, "is a bad source");
        assert_eq!(err.to_string(), "Syntax error near 'is a bad source'.");
    }

    #[test]
    fn test_unmatched_parentheses() {
        assert!(syntax_error("(letters").message.contains("unmatched"));
        assert_eq!(syntax_error("letters)").remainder, ")");
        assert_eq!(syntax_error("a where (x = 1").remainder, "(x = 1");
    }

    #[test]
    fn test_incomplete_input() {
        assert_eq!(syntax_error("letters from").remainder, "");
        assert_eq!(syntax_error("a where x between 1").remainder, "");
        assert_eq!(syntax_error("objects order name").remainder, "name");
        assert_eq!(syntax_error("objects limit x").remainder, "x");
    }

    #[test]
    fn test_scope_after_expression_is_rejected() {
        assert_eq!(syntax_error("objects where id = 1 in site").remainder, "in site");
        assert_eq!(syntax_error("objects where id in site").remainder, "in site");
    }

    #[test]
    fn test_lexical_error() {
        let err = syntax_error("a where x = 'open");
        assert_eq!(err.remainder, "'open");
    }
}
