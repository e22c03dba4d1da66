//! The seam between the gateway and the hosted auth service / row store.

use async_trait::async_trait;
use serde_json::Value;

use super::error::GatewayError;
use super::models::{Row, Session, SignUpOutcome};

/// Equality filter on one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A read against one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub table: String,
    /// Comma-separated column list, `*` for all.
    pub columns: String,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
    /// Expect exactly one row; anything else is an error.
    pub single: bool,
}

impl Select {
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: "*".to_string(),
            filters: Vec::new(),
            order: None,
            limit: None,
            single: false,
        }
    }

    pub fn columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    pub fn order(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.into(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn single(mut self) -> Self {
        self.single = true;
        self
    }
}

/// Hosted authentication service and row store.
///
/// `auth` carries the caller's session when there is one; the store uses it
/// to scope rows to their owner.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, GatewayError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, GatewayError>;

    async fn sign_out(&self, session: &Session) -> Result<(), GatewayError>;

    /// Exchange a one-time email verification token.
    async fn verify_email(&self, token: &str) -> Result<(), GatewayError>;

    async fn insert(
        &self,
        auth: Option<&Session>,
        table: &str,
        row: Row,
    ) -> Result<(), GatewayError>;

    async fn select(&self, auth: Option<&Session>, query: &Select)
        -> Result<Vec<Row>, GatewayError>;

    async fn delete(
        &self,
        auth: Option<&Session>,
        table: &str,
        filters: &[Filter],
    ) -> Result<(), GatewayError>;

    async fn rpc(
        &self,
        auth: Option<&Session>,
        name: &str,
        args: Value,
    ) -> Result<Value, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn select_builder_accumulates() {
        let q = Select::from("saved_palettes")
            .columns("id")
            .eq("user_id", "u1")
            .order("created_at", false)
            .limit(1);
        assert_eq!(q.table, "saved_palettes");
        assert_eq!(q.columns, "id");
        assert_eq!(q.filters, vec![Filter::eq("user_id", json!("u1"))]);
        assert_eq!(
            q.order,
            Some(Order {
                column: "created_at".into(),
                ascending: false
            })
        );
        assert_eq!(q.limit, Some(1));
        assert!(!q.single);
    }

    #[test]
    fn select_defaults_to_all_columns() {
        let q = Select::from("stats").single();
        assert_eq!(q.columns, "*");
        assert!(q.single);
        assert!(q.filters.is_empty());
    }
}
