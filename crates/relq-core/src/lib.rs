//! # relq-core
//!
//! A compiler from a small pseudo-SQL relation language to parameterized SQL.
//!
//! Sources such as `"letters where foo > 5 from managers in site limit 5"`
//! describe a walk through the relations of an application's data model.
//! They are compiled in three steps:
//!
//! - the [`parser`] turns the text into a tagged tree with an
//!   operator-precedence stack machine,
//! - the [`processor`] walks the tree and resolves every relation, scope and
//!   field through the application's [`Domain`]s,
//! - the resulting [`Query`] renders SQL with `?` placeholders and the
//!   ordered list of bind expressions, or executable SQL once values are
//!   known.
//!
//! ## Example
//!
//! ```ignore
//! use relq_core::{Catalog, CompileOptions, StatementKind};
//!
//! let catalog = Catalog::new().with_domain(ObjectsDomain);
//! let query = catalog.compile("objects", "letters from project", &CompileOptions::new())?;
//!
//! assert_eq!(
//!     query.to_s(StatementKind::Find),
//!     "[\"SELECT objects.* FROM objects,objects AS ob1 WHERE objects.kpath LIKE 'NNL%' \
//!      AND objects.parent_id = ob1.id AND ob1.id = ? GROUP BY objects.id\", project_id]"
//! );
//! ```
//!
//! The compiler never talks to a database: quoting and the evaluation of
//! bind expressions are supplied by the caller through [`Connection`],
//! [`ExpressionTranslator`] and [`Bindings`].

pub mod ast;
pub mod catalog;
pub mod config;
pub mod connection;
pub mod dialect;
pub mod domain;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod processor;
pub mod query;
pub mod value;

pub use ast::{Node, Sexp, Tag};
pub use catalog::{Catalog, CompileOptions};
pub use config::{CustomQueries, CustomQuery};
pub use connection::{Connection, ExpressionTranslator};
pub use dialect::{Dialect, GenericDialect, PostgresDialect, SqliteDialect};
pub use domain::{Domain, Resolution, ScopeFields};
pub use error::{CompileError, Result};
pub use parser::{parse, SyntaxError};
pub use processor::Processor;
pub use query::{insert_bind, Query, StatementKind};
pub use value::{from_fn, Bindings, SqlValue, ToSqlValue};
