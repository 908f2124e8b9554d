//! The parameterised statement shape every planner produces, plus the
//! quoting helpers shared by all of them.

use latticestore_types::Value;

/// A single parameterised statement: `query` contains positional `?`
/// placeholders bound, in order, to `params`. Never contains interpolated
/// user values.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub query: String,
    pub params: Vec<Value>,
}

/// Double-quote an identifier, escaping embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `"keyspace"."family"`.
pub fn qualified(keyspace: &str, family: &str) -> String {
    format!("{}.{}", quote_ident(keyspace), quote_ident(family))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_and_escapes_identifiers() {
        assert_eq!(quote_ident("data"), "\"data\"");
        assert_eq!(quote_ident("weird\"name"), "\"weird\"\"name\"");
    }

    #[test]
    fn builds_qualified_name() {
        assert_eq!(qualified("ks", "data"), "\"ks\".\"data\"");
    }
}
