//! Capabilities supplied by the embedding application.
//!
//! The compiler never talks to a database. Quoting literal values and
//! translating interpolated expressions are delegated to these traits.

use crate::value::SqlValue;

/// Quotes values the way the live database connection would.
pub trait Connection: Send + Sync {
    /// Returns the quoted SQL literal for `value`.
    fn quote(&self, value: &SqlValue) -> String;
}

impl<F> Connection for F
where
    F: Fn(&SqlValue) -> String + Send + Sync,
{
    fn quote(&self, value: &SqlValue) -> String {
        self(value)
    }
}

/// Translates the source of an interpolated string (`"#{title}"`) into a bind
/// expression evaluated at execution time.
pub trait ExpressionTranslator: Send + Sync {
    /// Returns the translated expression.
    ///
    /// # Errors
    ///
    /// Returns a human readable reason when the expression is not allowed.
    fn translate(&self, source: &str) -> Result<String, String>;
}

impl<F> ExpressionTranslator for F
where
    F: Fn(&str) -> Result<String, String> + Send + Sync,
{
    fn translate(&self, source: &str) -> Result<String, String> {
        self(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_connection() {
        let conn = |value: &SqlValue| format!("<{}>", value.to_sql_inline());
        assert_eq!(conn.quote(&SqlValue::Int(3)), "<3>");
    }

    #[test]
    fn test_closure_translator() {
        let translator = |src: &str| {
            if src.contains("system") {
                Err(String::from("forbidden method"))
            } else {
                Ok(format!("safe({src})"))
            }
        };
        assert_eq!(translator.translate("\"#{title}\""), Ok(String::from("safe(\"#{title}\")")));
        assert!(translator.translate("system('ls')").is_err());
    }
}
