//! In-process [`Backend`] with the same observable contract as the hosted
//! store: one-time verification tokens, row ownership on `saved_palettes`,
//! atomic counters and a "schema not created yet" state.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Duration, SecondsFormat, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use super::backend::{Backend, Filter, Select};
use super::error::{AuthError, GatewayError};
use super::models::{Principal, Row, Session, SignUpOutcome, StatName};
use super::schema::{
    CREATE_TABLE_RPC, INCREMENT_STAT_RPC, SAVED_PALETTES_TABLE, STATS_TABLE,
};

const MIN_PASSWORD_LEN: usize = 6;
const SESSION_TTL_SECS: i64 = 3600;

/// Tables whose rows are visible only to the principal in `user_id`.
const OWNED_TABLES: &[&str] = &[SAVED_PALETTES_TABLE];

/// A verification email the backend "sent".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationMail {
    pub email: String,
    pub token: String,
}

struct UserRecord {
    id: String,
    password: String,
    verified: bool,
}

struct StoredRow {
    seq: u64,
    data: Row,
}

#[derive(Default)]
struct State {
    users: HashMap<String, UserRecord>,
    /// access token -> principal
    sessions: HashMap<String, Principal>,
    /// verification token -> email
    pending: HashMap<String, String>,
    outbox: Vec<VerificationMail>,
    tables: HashMap<String, Vec<StoredRow>>,
    next_seq: u64,
}

pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    /// A store with every table already created.
    pub fn new() -> Self {
        let backend = Self::without_schema();
        backend
            .lock()
            .tables
            .insert(SAVED_PALETTES_TABLE.to_string(), Vec::new());
        backend
    }

    /// A store where `saved_palettes` has not been created yet.
    pub fn without_schema() -> Self {
        let mut state = State::default();
        let mut stats = Row::new();
        stats.insert("id".into(), json!(1));
        stats.insert(StatName::Generated.as_str().into(), json!(0));
        stats.insert(StatName::Downloaded.as_str().into(), json!(0));
        state.tables.insert(
            STATS_TABLE.to_string(),
            vec![StoredRow { seq: 0, data: stats }],
        );
        state.next_seq = 1;
        Self {
            state: Mutex::new(state),
        }
    }

    /// Every verification email sent so far, oldest first.
    pub fn outbox(&self) -> Vec<VerificationMail> {
        self.lock().outbox.clone()
    }

    /// The most recent verification token mailed to `email`.
    pub fn last_verification_token(&self, email: &str) -> Option<String> {
        self.lock()
            .outbox
            .iter()
            .rev()
            .find(|m| m.email == email)
            .map(|m| m.token.clone())
    }

    pub fn table_exists(&self, table: &str) -> bool {
        self.lock().tables.contains_key(table)
    }

    /// Number of rows in `table` across all owners.
    pub fn row_count(&self, table: &str) -> usize {
        self.lock().tables.get(table).map_or(0, Vec::len)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl State {
    /// Resolve the caller; an unknown token means the session is gone.
    fn caller(&self, auth: Option<&Session>) -> Result<Option<Principal>, GatewayError> {
        match auth {
            None => Ok(None),
            Some(s) => self
                .sessions
                .get(&s.access_token)
                .cloned()
                .map(Some)
                .ok_or_else(|| AuthError::SessionExpired.into()),
        }
    }

    fn table_mut(&mut self, table: &str) -> Result<&mut Vec<StoredRow>, GatewayError> {
        self.tables
            .get_mut(table)
            .ok_or_else(|| GatewayError::SchemaMissing(table.to_string()))
    }
}

fn matches_filters(row: &Row, filters: &[Filter]) -> bool {
    filters
        .iter()
        .all(|f| row.get(&f.column) == Some(&f.value))
}

fn visible_to(table: &str, row: &Row, caller: Option<&Principal>) -> bool {
    if !OWNED_TABLES.contains(&table) {
        return true;
    }
    match caller {
        Some(p) => row.get("user_id").and_then(Value::as_str) == Some(p.id.as_str()),
        None => false,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn project(row: &Row, columns: &str) -> Row {
    if columns.trim() == "*" {
        return row.clone();
    }
    columns
        .split(',')
        .map(str::trim)
        .filter_map(|c| row.get(c).map(|v| (c.to_string(), v.clone())))
        .collect()
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, GatewayError> {
        let mut state = self.lock();
        if state.users.contains_key(email) {
            return Err(AuthError::EmailTaken.into());
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword(format!(
                "Password should be at least {MIN_PASSWORD_LEN} characters."
            ))
            .into());
        }

        let id = Uuid::new_v4().to_string();
        state.users.insert(
            email.to_string(),
            UserRecord {
                id: id.clone(),
                password: password.to_string(),
                verified: false,
            },
        );
        let token = Uuid::new_v4().simple().to_string();
        state.pending.insert(token.clone(), email.to_string());
        state.outbox.push(VerificationMail {
            email: email.to_string(),
            token,
        });

        Ok(SignUpOutcome {
            principal: Principal {
                id,
                email: Some(email.to_string()),
            },
            confirmation_sent: true,
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, GatewayError> {
        let mut state = self.lock();
        let user = match state.users.get(email) {
            Some(u) if u.password == password => u,
            _ => return Err(AuthError::InvalidCredentials.into()),
        };
        if !user.verified {
            return Err(AuthError::EmailNotConfirmed.into());
        }

        let principal = Principal {
            id: user.id.clone(),
            email: Some(email.to_string()),
        };
        let access_token = Uuid::new_v4().simple().to_string();
        state
            .sessions
            .insert(access_token.clone(), principal.clone());

        Ok(Session {
            access_token,
            refresh_token: None,
            expires_at: Some(Utc::now() + Duration::seconds(SESSION_TTL_SECS)),
            principal,
        })
    }

    async fn sign_out(&self, session: &Session) -> Result<(), GatewayError> {
        self.lock().sessions.remove(&session.access_token);
        Ok(())
    }

    async fn verify_email(&self, token: &str) -> Result<(), GatewayError> {
        let mut state = self.lock();
        let email = state
            .pending
            .remove(token)
            .ok_or(AuthError::InvalidToken)?;
        if let Some(user) = state.users.get_mut(&email) {
            user.verified = true;
        }
        Ok(())
    }

    async fn insert(
        &self,
        auth: Option<&Session>,
        table: &str,
        mut row: Row,
    ) -> Result<(), GatewayError> {
        let mut state = self.lock();
        let caller = state.caller(auth)?;
        if !visible_to(table, &row, caller.as_ref()) {
            return Err(GatewayError::Forbidden(format!(
                "new row violates row-level security policy for table \"{table}\""
            )));
        }

        let seq = state.next_seq;
        row.entry("id")
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        row.entry("created_at").or_insert_with(|| {
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false))
        });
        state.table_mut(table)?.push(StoredRow { seq, data: row });
        state.next_seq += 1;
        Ok(())
    }

    async fn select(
        &self,
        auth: Option<&Session>,
        query: &Select,
    ) -> Result<Vec<Row>, GatewayError> {
        let mut state = self.lock();
        let caller = state.caller(auth)?;
        let table = query.table.as_str();
        let rows = state.table_mut(table)?;

        let mut hits: Vec<&StoredRow> = rows
            .iter()
            .filter(|r| visible_to(table, &r.data, caller.as_ref()))
            .filter(|r| matches_filters(&r.data, &query.filters))
            .collect();

        if let Some(order) = &query.order {
            hits.sort_by(|a, b| {
                let ord = compare_values(a.data.get(&order.column), b.data.get(&order.column))
                    .then(a.seq.cmp(&b.seq));
                if order.ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
        }
        if let Some(limit) = query.limit {
            hits.truncate(limit);
        }

        if query.single && hits.len() != 1 {
            return Err(GatewayError::Backend {
                status: 406,
                code: Some("PGRST116".into()),
                message: format!(
                    "JSON object requested, multiple (or no) rows returned ({})",
                    hits.len()
                ),
            });
        }

        Ok(hits
            .into_iter()
            .map(|r| project(&r.data, &query.columns))
            .collect())
    }

    async fn delete(
        &self,
        auth: Option<&Session>,
        table: &str,
        filters: &[Filter],
    ) -> Result<(), GatewayError> {
        let mut state = self.lock();
        let caller = state.caller(auth)?;
        let rows = state.table_mut(table)?;
        rows.retain(|r| {
            !(visible_to(table, &r.data, caller.as_ref()) && matches_filters(&r.data, filters))
        });
        Ok(())
    }

    async fn rpc(
        &self,
        auth: Option<&Session>,
        name: &str,
        args: Value,
    ) -> Result<Value, GatewayError> {
        let mut state = self.lock();
        state.caller(auth)?;

        match name {
            INCREMENT_STAT_RPC => {
                let stat = args
                    .get("stat_name")
                    .and_then(Value::as_str)
                    .filter(|s| {
                        *s == StatName::Generated.as_str() || *s == StatName::Downloaded.as_str()
                    })
                    .ok_or_else(|| GatewayError::Backend {
                        status: 400,
                        code: Some("P0001".into()),
                        message: format!("unknown stat name in {args}"),
                    })?
                    .to_string();
                let stats = state
                    .table_mut(STATS_TABLE)?
                    .first_mut()
                    .ok_or_else(|| GatewayError::SchemaMissing(STATS_TABLE.to_string()))?;
                let current = stats.data.get(&stat).and_then(Value::as_u64).unwrap_or(0);
                stats.data.insert(stat, json!(current + 1));
                Ok(Value::Null)
            }
            CREATE_TABLE_RPC => {
                state
                    .tables
                    .entry(SAVED_PALETTES_TABLE.to_string())
                    .or_default();
                Ok(Value::Null)
            }
            other => Err(GatewayError::Backend {
                status: 404,
                code: Some("PGRST202".into()),
                message: format!("Could not find the function public.{other}"),
            }),
        }
    }
}
