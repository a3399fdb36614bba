//! Walk context saved and restored around nested relations.

/// What the processor is currently rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Relation,
    Scope,
    Filter,
    Order,
    Group,
    Having,
    Limit,
    Paginate,
}

/// Which resolver hook is being tried for the current relation.
///
/// `add_table` uses it to decide whether the scope is applied before the
/// table is added (join relations) or after (filter relations).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeType {
    Join,
    Context,
    Filter,
}

/// Per-relation state of the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    /// Outermost relation of a `from` chain (the returned records).
    pub first: bool,
    /// Innermost relation of a `from` chain (tied to the caller's record).
    pub last: bool,
    pub scope: Option<String>,
    pub scope_type: Option<ScopeType>,
    /// Overrides the alias used to render fields.
    pub table_alias: Option<String>,
    pub phase: Phase,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            first: true,
            last: true,
            scope: None,
            scope_type: None,
            table_alias: None,
            phase: Phase::Relation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_single_relation() {
        let context = Context::default();
        assert!(context.first);
        assert!(context.last);
        assert_eq!(context.phase, Phase::Relation);
        assert!(context.scope.is_none());
    }
}
