//! [`Backend`] over Supabase's HTTP APIs.
//!
//! Auth calls go to GoTrue under `/auth/v1`, row and RPC calls go to
//! PostgREST under `/rest/v1`. Every request carries the project's anon key;
//! requests made on behalf of a user also carry that user's access token so
//! row-level security applies.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::config::Config;

use super::backend::{Backend, Filter, Select};
use super::error::{AuthError, GatewayError};
use super::models::{Principal, Row, Session, SignUpOutcome};

/// PostgREST media type asking for a single object instead of an array.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// HTTP client for one Supabase project.
pub struct SupabaseBackend {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    confirmation_sent_at: Option<String>,
}

impl From<UserResponse> for Principal {
    fn from(user: UserResponse) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

/// `/signup` answers with the bare user when confirmation is required, or
/// with a full session when the project auto-confirms.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    WithSession { user: UserResponse },
    User(UserResponse),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: UserResponse,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = match (self.expires_at, self.expires_in) {
            (Some(at), _) => DateTime::from_timestamp(at, 0),
            (None, Some(secs)) => Some(now + Duration::seconds(secs)),
            (None, None) => None,
        };
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            principal: self.user.into(),
        }
    }
}

/// GoTrue error bodies come in two generations; accept both.
#[derive(Debug, Default, Deserialize)]
struct AuthErrorBody {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl AuthErrorBody {
    fn message(&self) -> String {
        self.msg
            .as_deref()
            .or(self.error_description.as_deref())
            .or(self.message.as_deref())
            .or(self.error.as_deref())
            .unwrap_or("unknown error")
            .to_string()
    }
}

#[derive(Debug, Default, Deserialize)]
struct RestErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl SupabaseBackend {
    /// Create a backend from loaded configuration.
    pub fn new(config: &Config) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(
            client,
            config.supabase_url.clone(),
            config.anon_key.clone(),
        ))
    }

    /// Create a backend reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: String, anon_key: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, path)
    }

    fn request(&self, method: Method, url: String, auth: Option<&Session>) -> RequestBuilder {
        let bearer = auth.map_or(self.anon_key.as_str(), |s| s.access_token.as_str());
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    // ---- private helpers ----

    async fn auth_call<T: serde::de::DeserializeOwned>(
        request: RequestBuilder,
        verifying: bool,
    ) -> Result<T, GatewayError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let parsed: AuthErrorBody = serde_json::from_str(&body).unwrap_or_default();
            return Err(classify_auth_error(status, &parsed, verifying));
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn rest_call(request: RequestBuilder, table: &str) -> Result<String, GatewayError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let parsed: RestErrorBody = serde_json::from_str(&body).unwrap_or_default();
            return Err(classify_rest_error(status, table, parsed, &body));
        }
        Ok(body)
    }
}

#[async_trait]
impl Backend for SupabaseBackend {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, GatewayError> {
        let request = self
            .request(Method::POST, self.auth_url("signup"), None)
            .json(&serde_json::json!({ "email": email, "password": password }));
        let user = match Self::auth_call::<SignUpResponse>(request, false).await? {
            SignUpResponse::WithSession { user } | SignUpResponse::User(user) => user,
        };
        let confirmation_sent = user.confirmation_sent_at.is_some();
        Ok(SignUpOutcome {
            principal: user.into(),
            confirmation_sent,
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, GatewayError> {
        let request = self
            .request(
                Method::POST,
                self.auth_url("token?grant_type=password"),
                None,
            )
            .json(&serde_json::json!({ "email": email, "password": password }));
        let token: TokenResponse = Self::auth_call(request, false).await?;
        Ok(token.into_session(Utc::now()))
    }

    async fn sign_out(&self, session: &Session) -> Result<(), GatewayError> {
        let response = self
            .request(Method::POST, self.auth_url("logout"), Some(session))
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let parsed: AuthErrorBody = response.json().await.unwrap_or_default();
        Err(classify_auth_error(status, &parsed, false))
    }

    async fn verify_email(&self, token: &str) -> Result<(), GatewayError> {
        let request = self
            .request(Method::POST, self.auth_url("verify"), None)
            .json(&serde_json::json!({ "type": "email", "token_hash": token }));
        Self::auth_call::<Value>(request, true).await?;
        Ok(())
    }

    async fn insert(
        &self,
        auth: Option<&Session>,
        table: &str,
        row: Row,
    ) -> Result<(), GatewayError> {
        let request = self
            .request(Method::POST, self.rest_url(table), auth)
            .header("Prefer", "return=minimal")
            .json(&row);
        Self::rest_call(request, table).await?;
        Ok(())
    }

    async fn select(
        &self,
        auth: Option<&Session>,
        query: &Select,
    ) -> Result<Vec<Row>, GatewayError> {
        let mut request = self
            .request(Method::GET, self.rest_url(&query.table), auth)
            .query(&select_params(query));
        if query.single {
            request = request.header("Accept", SINGLE_OBJECT);
        }
        let body = Self::rest_call(request, &query.table).await?;
        if query.single {
            Ok(vec![serde_json::from_str::<Row>(&body)?])
        } else {
            Ok(serde_json::from_str::<Vec<Row>>(&body)?)
        }
    }

    async fn delete(
        &self,
        auth: Option<&Session>,
        table: &str,
        filters: &[Filter],
    ) -> Result<(), GatewayError> {
        let params: Vec<(String, String)> = filters.iter().map(filter_param).collect();
        let request = self
            .request(Method::DELETE, self.rest_url(table), auth)
            .query(&params);
        Self::rest_call(request, table).await?;
        Ok(())
    }

    async fn rpc(
        &self,
        auth: Option<&Session>,
        name: &str,
        args: Value,
    ) -> Result<Value, GatewayError> {
        let request = self
            .request(Method::POST, self.rest_url(&format!("rpc/{name}")), auth)
            .json(&args);
        let body = Self::rest_call(request, name).await?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

fn filter_param(filter: &Filter) -> (String, String) {
    let value = match &filter.value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    (filter.column.clone(), format!("eq.{value}"))
}

/// PostgREST query string for a select.
fn select_params(query: &Select) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), query.columns.clone())];
    params.extend(query.filters.iter().map(filter_param));
    if let Some(order) = &query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push(("order".to_string(), format!("{}.{direction}", order.column)));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

fn classify_auth_error(status: StatusCode, body: &AuthErrorBody, verifying: bool) -> GatewayError {
    let message = body.message();
    if status.is_server_error() {
        return GatewayError::Backend {
            status: status.as_u16(),
            code: body.error_code.clone(),
            message,
        };
    }

    let code = body.error_code.as_deref().or(body.error.as_deref());
    let lowered = message.to_ascii_lowercase();
    let auth = match code {
        Some("invalid_credentials") => AuthError::InvalidCredentials,
        Some("invalid_grant") if lowered.contains("email not confirmed") => {
            AuthError::EmailNotConfirmed
        }
        Some("invalid_grant") => AuthError::InvalidCredentials,
        Some("email_not_confirmed") => AuthError::EmailNotConfirmed,
        Some("user_already_exists") | Some("email_exists") => AuthError::EmailTaken,
        Some("weak_password") => AuthError::WeakPassword(message),
        Some("otp_expired") | Some("flow_state_expired") => AuthError::InvalidToken,
        Some("session_not_found") | Some("session_expired") | Some("bad_jwt") => {
            AuthError::SessionExpired
        }
        _ if lowered.contains("already registered") => AuthError::EmailTaken,
        _ if lowered.contains("password should be") => AuthError::WeakPassword(message),
        _ if verifying && matches!(status.as_u16(), 400 | 401 | 403 | 404) => {
            AuthError::InvalidToken
        }
        _ => AuthError::Other(message),
    };
    GatewayError::Auth(auth)
}

fn classify_rest_error(
    status: StatusCode,
    table: &str,
    body: RestErrorBody,
    raw: &str,
) -> GatewayError {
    let message = body.message.unwrap_or_else(|| raw.to_string());
    match body.code.as_deref() {
        Some("PGRST205") | Some("42P01") => GatewayError::SchemaMissing(table.to_string()),
        Some("PGRST301") | Some("PGRST303") => AuthError::SessionExpired.into(),
        Some("42501") => GatewayError::Forbidden(message),
        _ if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN => {
            GatewayError::Forbidden(message)
        }
        code => GatewayError::Backend {
            status: status.as_u16(),
            code: code.map(str::to_string),
            message,
        },
    }
}
