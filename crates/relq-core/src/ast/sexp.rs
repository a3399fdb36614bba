//! Tagged S-expression nodes.

use std::fmt;

/// Expression operators, including the word forms (`eq`, `div`, `and`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `not` (keyword form, binds loosely)
    Not,
    /// `!`
    Bang,
    /// Unary `-`
    ChangeSign,
    /// Unary `~`
    InvertBits,
    /// `^`
    BitXor,
    /// `*`
    Times,
    /// `/`
    Division,
    /// `div`
    IntegerDivision,
    /// `%` or `mod`
    Modulo,
    /// `-`
    Minus,
    /// `+`
    Plus,
    /// `<<`
    LeftShift,
    /// `>>`
    RightShift,
    /// `&`
    BitAnd,
    /// `|`
    BitOr,
    /// `=` or `eq`
    Equal,
    /// `<=>`
    NullSafeEqual,
    /// `>=` or `ge`
    GreaterOrEqual,
    /// `>` or `gt`
    Greater,
    /// `<=` or `le`
    LessOrEqual,
    /// `<` or `lt`
    Less,
    /// `!=`, `<>` or `ne`
    NotEqual,
    /// `is`
    Is,
    /// `like`
    Like,
    /// `regexp`
    Regexp,
    /// `in`
    In,
    /// `between .. and ..`
    Between,
    /// `and` or `&&`
    And,
    /// `xor`
    Xor,
    /// `or` or `||`
    Or,
    /// `:=`
    Assign,
}

impl Operator {
    /// Canonical symbol, used as the node tag.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Not => "not",
            Self::Bang => "!",
            Self::ChangeSign => "@-",
            Self::InvertBits => "@~",
            Self::BitXor => "^",
            Self::Times => "*",
            Self::Division => "/",
            Self::IntegerDivision => "div",
            Self::Modulo => "%",
            Self::Minus => "-",
            Self::Plus => "+",
            Self::LeftShift => "<<",
            Self::RightShift => ">>",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::Equal => "=",
            Self::NullSafeEqual => "<=>",
            Self::GreaterOrEqual => ">=",
            Self::Greater => ">",
            Self::LessOrEqual => "<=",
            Self::Less => "<",
            Self::NotEqual => "<>",
            Self::Is => "is",
            Self::Like => "like",
            Self::Regexp => "regexp",
            Self::In => "in",
            Self::Between => "between",
            Self::And => "and",
            Self::Xor => "xor",
            Self::Or => "or",
            Self::Assign => ":=",
        }
    }

    /// SQL spelling used by the generic binary rendering.
    #[must_use]
    pub fn sql(&self) -> String {
        self.symbol().to_ascii_uppercase()
    }
}

/// Node tags. Closed set: every tag the parser can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Query,
    Relation,
    Scope,
    From,
    Filter,
    ClauseOr,
    ClauseAnd,
    ClausePar,
    Par,
    Order,
    Group,
    Having,
    Limit,
    Offset,
    Paginate,
    Asc,
    Desc,
    Field,
    Param,
    String,
    DString,
    Integer,
    Real,
    Null,
    Method,
    Function,
    Interval,
    Void,
    Op(Operator),
}

impl Tag {
    /// Name as shown in the tree notation (`:relation`, `:>`, ...).
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Relation => "relation",
            Self::Scope => "scope",
            Self::From => "from",
            Self::Filter => "filter",
            Self::ClauseOr => "clause_or",
            Self::ClauseAnd => "clause_and",
            Self::ClausePar => "clause_par",
            Self::Par => "par",
            Self::Order => "order",
            Self::Group => "group",
            Self::Having => "having",
            Self::Limit => "limit",
            Self::Offset => "offset",
            Self::Paginate => "paginate",
            Self::Asc => "asc",
            Self::Desc => "desc",
            Self::Field => "field",
            Self::Param => "param",
            Self::String => "string",
            Self::DString => "dstring",
            Self::Integer => "integer",
            Self::Real => "real",
            Self::Null => "null",
            Self::Method => "method",
            Self::Function => "function",
            Self::Interval => "interval",
            Self::Void => "void",
            Self::Op(op) => op.symbol(),
        }
    }

    /// Returns true for either kind of parenthesis marker.
    #[must_use]
    pub const fn is_paren(&self) -> bool {
        matches!(self, Self::Par | Self::ClausePar)
    }
}

/// A tagged node: `(tag, children...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub tag: Tag,
    pub children: Vec<Sexp>,
}

impl Node {
    /// Creates a node without children.
    #[must_use]
    pub const fn new(tag: Tag) -> Self {
        Self {
            tag,
            children: Vec::new(),
        }
    }

    /// Creates a node with the given children.
    #[must_use]
    pub const fn with_children(tag: Tag, children: Vec<Sexp>) -> Self {
        Self { tag, children }
    }

    /// Creates a leaf such as `[:field, "name"]`.
    #[must_use]
    pub fn leaf(tag: Tag, text: impl Into<String>) -> Self {
        Self {
            tag,
            children: vec![Sexp::Atom(text.into())],
        }
    }
}

/// A child in the tree: a nested node or a raw string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sexp {
    Node(Node),
    Atom(String),
}

impl Sexp {
    /// Returns the node tag, if this is a node.
    #[must_use]
    pub const fn tag(&self) -> Option<Tag> {
        match self {
            Self::Node(node) => Some(node.tag),
            Self::Atom(_) => None,
        }
    }

    /// Returns the raw text, if this is an atom.
    #[must_use]
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Self::Atom(text) => Some(text),
            Self::Node(_) => None,
        }
    }

    /// Returns the node, if this is a node.
    #[must_use]
    pub const fn as_node(&self) -> Option<&Node> {
        match self {
            Self::Node(node) => Some(node),
            Self::Atom(_) => None,
        }
    }
}

impl From<Node> for Sexp {
    fn from(node: Node) -> Self {
        Self::Node(node)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[:{}", self.tag.name())?;
        for child in &self.children {
            write!(f, ", {child}")?;
        }
        write!(f, "]")
    }
}

impl fmt::Display for Sexp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(node) => node.fmt(f),
            Self::Atom(text) => write!(f, "{text:?}"),
        }
    }
}
