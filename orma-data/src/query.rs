use std::borrow::Cow;

use crate::value::Value;

/// Driver-neutral placeholder used by every generated statement.
pub const PLACEHOLDER: &str = "?";

/// SQL dialect of the backend a statement is sent to.
///
/// Generated statements use `?` placeholders and backtick-quoted identifiers;
/// [`Dialect::translate`] rewrites them into the backend's native syntax.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Dialect {
    /// MySQL / MariaDB: `?` placeholders, backtick quoting (no rewrite).
    #[default]
    MySql,
    /// SQLite: `?` placeholders, accepts backtick quoting (no rewrite).
    Sqlite,
    /// Postgres: `$1, $2, ...` placeholders, double-quote quoting.
    Postgres,
}

impl Dialect {
    fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${index}"),
            Dialect::MySql | Dialect::Sqlite => PLACEHOLDER.to_string(),
        }
    }

    fn quote_char(self) -> char {
        match self {
            Dialect::Postgres => '"',
            Dialect::MySql | Dialect::Sqlite => '`',
        }
    }

    /// Rewrite placeholders and identifier quotes for this dialect.
    ///
    /// Characters inside single-quoted string literals are left alone.
    pub fn translate(self, sql: &str) -> Cow<'_, str> {
        if self != Dialect::Postgres {
            return Cow::Borrowed(sql);
        }
        Cow::Owned(self.rewrite(sql, |_| false))
    }

    /// [`translate`](Self::translate) `sql` and return the arguments to bind.
    ///
    /// On Postgres a bound null carries a parameter type, which the server
    /// refuses to assign to a column of another type (`bigint` into
    /// `boolean`). Null arguments are written as an untyped `NULL` literal
    /// and left out of the bound arguments.
    pub fn prepare<'a>(
        self,
        sql: &'a str,
        args: &'a [Value],
    ) -> (Cow<'a, str>, Cow<'a, [Value]>) {
        if self != Dialect::Postgres || !args.iter().any(Value::is_null) {
            return (self.translate(sql), Cow::Borrowed(args));
        }
        let sql = self.rewrite(sql, |position| args.get(position).is_some_and(Value::is_null));
        let bound = args.iter().filter(|arg| !arg.is_null()).cloned().collect();
        (Cow::Owned(sql), Cow::Owned(bound))
    }

    /// `inline_null` is asked, per `?` in statement order, whether to write
    /// `NULL` in its place instead of a numbered placeholder.
    fn rewrite(self, sql: &str, inline_null: impl Fn(usize) -> bool) -> String {
        let mut out = String::with_capacity(sql.len() + 8);
        let mut position = 0usize;
        let mut index = 0usize;
        let mut in_literal = false;
        for c in sql.chars() {
            match c {
                '\'' => {
                    // A doubled quote closes and reopens, which keeps the state right.
                    in_literal = !in_literal;
                    out.push(c);
                }
                '?' if !in_literal => {
                    if inline_null(position) {
                        out.push_str("NULL");
                    } else {
                        index += 1;
                        out.push_str(&self.placeholder(index));
                    }
                    position += 1;
                }
                '`' if !in_literal => out.push(self.quote_char()),
                _ => out.push(c),
            }
        }
        out
    }
}

/// Backtick-quote an identifier for a generated template.
pub fn quote_identifier(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

/// `count` comma-separated placeholders: `?, ?, ?`.
pub fn placeholders(count: usize) -> String {
    vec![PLACEHOLDER; count].join(", ")
}

/// Row limit of a `find_all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Count(u64),
    Range { offset: u64, count: u64 },
}

/// Optional `where` / `order by` / `limit` parts appended to a select template.
///
/// ```
/// use orma_data::{FindOptions, Value};
///
/// let options = FindOptions::new()
///     .filter("`age` > ?", [18])
///     .order_by("`created_at` desc")
///     .range(20, 10);
/// let (sql, args) = options.apply("select `id` from `users`");
/// assert_eq!(
///     sql,
///     "select `id` from `users` where `age` > ? order by `created_at` desc limit ? offset ?"
/// );
/// assert_eq!(args, vec![Value::Int(18), Value::Int(10), Value::Int(20)]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    where_clause: Option<String>,
    args: Vec<Value>,
    order_by: Option<String>,
    limit: Option<Limit>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw `where` clause with positional `?` arguments.
    pub fn filter<I>(mut self, clause: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.where_clause = Some(clause.into()).filter(|c: &String| !c.trim().is_empty());
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn order_by(mut self, expr: impl Into<String>) -> Self {
        self.order_by = Some(expr.into()).filter(|e: &String| !e.trim().is_empty());
        self
    }

    pub fn limit(mut self, count: u64) -> Self {
        self.limit = Some(Limit::Count(count));
        self
    }

    pub fn range(mut self, offset: u64, count: u64) -> Self {
        self.limit = Some(Limit::Range { offset, count });
        self
    }

    pub fn where_clause(&self) -> Option<&str> {
        self.where_clause.as_deref()
    }

    /// Arguments of the `where` clause.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn get_limit(&self) -> Option<Limit> {
        self.limit
    }

    /// Append the clauses to `base` in `where`, `order by`, `limit` order.
    ///
    /// Limit values are bound as trailing arguments.
    pub fn apply(&self, base: &str) -> (String, Vec<Value>) {
        let mut sql = base.to_string();
        let mut args = self.args.clone();
        if let Some(clause) = &self.where_clause {
            sql.push_str(" where ");
            sql.push_str(clause);
        }
        if let Some(expr) = &self.order_by {
            sql.push_str(" order by ");
            sql.push_str(expr);
        }
        match self.limit {
            Some(Limit::Count(count)) => {
                sql.push_str(" limit ?");
                args.push(limit_value(count));
            }
            Some(Limit::Range { offset, count }) => {
                sql.push_str(" limit ? offset ?");
                args.push(limit_value(count));
                args.push(limit_value(offset));
            }
            None => {}
        }
        (sql, args)
    }
}

fn limit_value(n: u64) -> Value {
    Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_select_is_untouched() {
        let (sql, args) = FindOptions::new().apply("select `id` from `t`");
        assert_eq!(sql, "select `id` from `t`");
        assert!(args.is_empty());
    }

    #[test]
    fn clauses_keep_fixed_order() {
        let (sql, args) = FindOptions::new()
            .limit(5)
            .order_by("`id` desc")
            .filter("`name` = ?", ["a"])
            .apply("select `id` from `t`");
        assert_eq!(
            sql,
            "select `id` from `t` where `name` = ? order by `id` desc limit ?"
        );
        assert_eq!(args, vec![Value::Text("a".into()), Value::Int(5)]);
    }

    #[test]
    fn blank_clauses_are_dropped() {
        let (sql, _) = FindOptions::new()
            .filter("  ", Vec::<Value>::new())
            .order_by("")
            .apply("select `id` from `t`");
        assert_eq!(sql, "select `id` from `t`");
    }

    #[test]
    fn mysql_and_sqlite_keep_statements() {
        let sql = "update `t` set `a`=? where `id`=?";
        assert!(matches!(Dialect::MySql.translate(sql), Cow::Borrowed(_)));
        assert_eq!(Dialect::Sqlite.translate(sql), sql);
    }

    #[test]
    fn postgres_numbers_placeholders_and_requotes() {
        assert_eq!(
            Dialect::Postgres.translate("select `id` from `t` where `id`=? and `a`=?"),
            "select \"id\" from \"t\" where \"id\"=$1 and \"a\"=$2"
        );
    }

    #[test]
    fn postgres_leaves_literals_alone() {
        assert_eq!(
            Dialect::Postgres.translate("select `id` from `t` where `a` = 'why?' and `b`=?"),
            "select \"id\" from \"t\" where \"a\" = 'why?' and \"b\"=$1"
        );
        assert_eq!(
            Dialect::Postgres.translate("select 'it''s `x`?' , ?"),
            "select 'it''s `x`?' , $1"
        );
    }

    #[test]
    fn postgres_inlines_null_arguments() {
        let args = [Value::Null, Value::Int(9), Value::Null, Value::Int(5)];
        let (sql, bound) = Dialect::Postgres.prepare(
            "update `users` set `active`=?, `age`=?, `avatar`=? where `id`=?",
            &args,
        );
        assert_eq!(
            sql,
            "update \"users\" set \"active\"=NULL, \"age\"=$1, \"avatar\"=NULL where \"id\"=$2"
        );
        assert_eq!(&*bound, &[Value::Int(9), Value::Int(5)]);
    }

    #[test]
    fn other_dialects_bind_nulls() {
        let args = [Value::Null, Value::Int(5)];
        let sql = "update `users` set `active`=? where `id`=?";
        let (native, bound) = Dialect::MySql.prepare(sql, &args);
        assert_eq!(native, sql);
        assert!(matches!(bound, Cow::Borrowed(_)));
        let (_, bound) = Dialect::Postgres.prepare(sql, &args[1..]);
        assert!(matches!(bound, Cow::Borrowed(_)));
    }

    #[test]
    fn placeholder_lists() {
        assert_eq!(placeholders(3), "?, ?, ?");
        assert_eq!(placeholders(1), "?");
        assert_eq!(quote_identifier("user"), "`user`");
    }
}
