//! Read-query assembly: an ordered list of clause fragments rendered onto a
//! base template in one final step.
//!
//! Fragment order is the contract: row-security fragment, conditional
//! clauses (id, then OR-groups), ORDER BY, LIKE wrapping, pagination.
//! Conditionals land at the template's `{filter}` token when present,
//! otherwise at the end; the `WHERE`/`AND` connector is decided per fragment
//! against the statement as assembled so far, never precomputed.

use super::table::has_top_level_where;

/// The literal token marking where conditional clauses belong in a template.
pub(crate) const FILTER_TOKEN: &str = "{filter}";

#[derive(Debug)]
pub(crate) struct QueryAssembly {
    base: String,
    security: Option<String>,
    conditions: Vec<String>,
    or_groups: Vec<Vec<String>>,
    order_by: Option<String>,
    like_wrap: Option<(String, String)>,
    pagination: Option<(u64, u64)>,
}

impl QueryAssembly {
    pub fn new(base: String) -> Self {
        Self {
            base,
            security: None,
            conditions: Vec::new(),
            or_groups: Vec::new(),
            order_by: None,
            like_wrap: None,
            pagination: None,
        }
    }

    /// Raw row-security fragment, appended to the template before any
    /// conditionals are considered.
    pub fn security(&mut self, fragment: String) {
        self.security = Some(fragment);
    }

    /// One conditional expression joined with `WHERE`/`AND`.
    pub fn condition(&mut self, expression: String) {
        self.conditions.push(expression);
    }

    /// One parenthesized OR-group of expressions.
    pub fn or_group(&mut self, expressions: Vec<String>) {
        if !expressions.is_empty() {
            self.or_groups.push(expressions);
        }
    }

    pub fn order_by(&mut self, clause: String) {
        self.order_by = Some(clause);
    }

    /// Wrap the assembled query as a subquery filtered with LIKE.
    pub fn like_wrap(&mut self, column: String, pattern: String) {
        self.like_wrap = Some((column, pattern));
    }

    pub fn pagination(&mut self, limit: u64, offset: u64) {
        self.pagination = Some((limit, offset));
    }

    /// Render the final SQL text. Consumes the assembly; statements are
    /// built fresh per call.
    pub fn render(self) -> String {
        let mut sql = self.base;
        if let Some(fragment) = self.security {
            sql.push_str(&fragment);
        }

        let mut conditionals = String::new();
        {
            // Connector state tracks the statement with the token ignored,
            // plus every conditional added in this pass.
            let mut has_where = has_top_level_where(&sql.replace(FILTER_TOKEN, ""));
            let mut push = |text: String, conditionals: &mut String| {
                let connector = if has_where { "AND" } else { "WHERE" };
                has_where = true;
                conditionals.push_str(&format!(" {connector} {text}"));
            };
            for condition in self.conditions {
                push(condition, &mut conditionals);
            }
            for group in self.or_groups {
                push(format!("({})", group.join(" OR ")), &mut conditionals);
            }
        }

        if !conditionals.is_empty() {
            if sql.contains(FILTER_TOKEN) {
                // Templates carry the token after a space, so the fragment's
                // own leading space is dropped on substitution.
                sql = sql.replacen(FILTER_TOKEN, conditionals.trim_start(), 1);
            } else {
                sql.push_str(&conditionals);
            }
        }
        // Any leftover token (no conditionals supplied) vanishes along with
        // the space that introduced it.
        sql = sql
            .replace(&format!(" {FILTER_TOKEN}"), "")
            .replace(FILTER_TOKEN, "");

        if let Some(order) = self.order_by {
            sql.push_str(&format!(" ORDER BY {order}"));
        }

        if let Some((column, pattern)) = self.like_wrap {
            let escaped = pattern.replace('\'', "''");
            sql = format!(
                "SELECT * FROM ({}) AS like_scope WHERE like_scope.{} LIKE '{}'",
                sql.trim(),
                column,
                escaped
            );
        }

        if let Some((limit, offset)) = self.pagination {
            sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}"));
        }

        sql.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conditionals_land_at_the_filter_token() {
        let mut assembly =
            QueryAssembly::new("SELECT * FROM users u WHERE u.active = 1 {filter}".to_string());
        assembly.condition("users.id IN (1,2)".to_string());
        assembly.or_group(vec!["users.age=30".to_string(), "users.age=40".to_string()]);
        assert_eq!(
            assembly.render(),
            "SELECT * FROM users u WHERE u.active = 1 AND users.id IN (1,2) AND (users.age=30 OR users.age=40)"
        );
    }

    #[test]
    fn first_conditional_gets_where_when_template_has_none() {
        let mut assembly = QueryAssembly::new("SELECT * FROM users {filter}".to_string());
        assembly.condition("users.id IN (7)".to_string());
        assert_eq!(
            assembly.render(),
            "SELECT * FROM users WHERE users.id IN (7)"
        );
    }

    #[test]
    fn conditionals_append_when_no_token_exists() {
        let mut assembly = QueryAssembly::new("SELECT * FROM users".to_string());
        assembly.or_group(vec!["users.name='x'".to_string()]);
        assert_eq!(
            assembly.render(),
            "SELECT * FROM users WHERE (users.name='x')"
        );
    }

    #[test]
    fn order_like_and_pagination_stack_in_contract_order() {
        let mut assembly = QueryAssembly::new("SELECT * FROM users {filter}".to_string());
        assembly.order_by("users.name ASC".to_string());
        assembly.like_wrap("name".to_string(), "%ada%".to_string());
        assembly.pagination(100, 0);
        assert_eq!(
            assembly.render(),
            "SELECT * FROM (SELECT * FROM users ORDER BY users.name ASC) AS like_scope \
             WHERE like_scope.name LIKE '%ada%' LIMIT 100 OFFSET 0"
        );
    }

    #[test]
    fn leftover_token_is_stripped() {
        let assembly = QueryAssembly::new("SELECT * FROM users {filter}".to_string());
        assert_eq!(assembly.render(), "SELECT * FROM users");
    }

    #[test]
    fn security_fragment_precedes_conditionals_in_connector_state() {
        let mut assembly = QueryAssembly::new("SELECT * FROM docs".to_string());
        assembly.security(" WHERE docs.owner = 5".to_string());
        assembly.condition("docs.id IN (1)".to_string());
        assert_eq!(
            assembly.render(),
            "SELECT * FROM docs WHERE docs.owner = 5 AND docs.id IN (1)"
        );
    }
}
