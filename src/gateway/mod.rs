//! Palette persistence gateway.
//!
//! [`PaletteGateway`] is a thin adapter over a [`Backend`]: it scopes every
//! row operation to the principal held by the shared [`SessionContext`],
//! maps rows to typed values and logs each failure before returning it.
//! Nothing here retries on its own.

pub mod backend;
pub mod error;
pub mod memory;
pub mod models;
pub mod schema;
pub mod session;
pub mod supabase;

use std::future::Future;
use std::sync::Arc;

use serde_json::json;

use crate::generator::ColorPalette;

pub use backend::{Backend, Filter, Select};
pub use error::{AuthError, GatewayError};
pub use memory::MemoryBackend;
pub use models::{GlobalStats, Principal, SavedPalette, Session, SignUpOutcome, StatName};
pub use session::SessionContext;
pub use supabase::SupabaseBackend;

use models::{from_row, to_row, NewPaletteRow, PaletteRow};
use schema::{
    CREATE_SAVED_PALETTES_SQL, CREATE_TABLE_RPC, INCREMENT_STAT_RPC, SAVED_PALETTES_TABLE,
    STATS_TABLE,
};

pub struct PaletteGateway {
    backend: Arc<dyn Backend>,
    session: Arc<SessionContext>,
}

impl PaletteGateway {
    pub fn new(backend: Arc<dyn Backend>, session: Arc<SessionContext>) -> Self {
        Self { backend, session }
    }

    /// Log a failed operation and hand the error back. A session the store
    /// reports as expired is dropped so subscribers see the sign-out.
    fn failed(&self, op: &'static str, err: GatewayError) -> GatewayError {
        if matches!(err, GatewayError::Auth(AuthError::SessionExpired)) {
            self.session.clear();
        }
        if err.is_auth() {
            tracing::warn!(op, error = %err, "gateway operation rejected");
        } else {
            tracing::error!(op, error = %err, "gateway operation failed");
        }
        err
    }

    /// The session context this gateway reads the principal from.
    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    // ---- authentication ----

    /// Register a new account. The backend mails a verification token; the
    /// caller is not signed in.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SignUpOutcome, GatewayError> {
        tracing::debug!(email, "signing up");
        let outcome = self
            .backend
            .sign_up(email, password)
            .await
            .map_err(|e| self.failed("sign_up", e))?;
        tracing::info!(
            user_id = %outcome.principal.id,
            confirmation_sent = outcome.confirmation_sent,
            "account registered",
        );
        Ok(outcome)
    }

    /// Exchange a one-time verification token. A rejected token stays
    /// rejected; there is no retry with the same token.
    pub async fn verify_email(&self, token: &str) -> Result<(), GatewayError> {
        self.backend
            .verify_email(token)
            .await
            .map_err(|e| self.failed("verify_email", e))?;
        tracing::info!("email verified");
        Ok(())
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Principal, GatewayError> {
        tracing::debug!(email, "signing in");
        let session = self
            .backend
            .sign_in(email, password)
            .await
            .map_err(|e| self.failed("sign_in", e))?;
        let principal = session.principal.clone();
        self.session.set(session);
        Ok(principal)
    }

    /// Clear the local session and revoke it server-side. Signing out while
    /// signed out is a no-op.
    pub async fn sign_out(&self) -> Result<(), GatewayError> {
        let Some(session) = self.session.clear() else {
            return Ok(());
        };
        self.backend
            .sign_out(&session)
            .await
            .map_err(|e| self.failed("sign_out", e))
    }

    pub fn current_principal(&self) -> Option<Principal> {
        self.session.current_principal()
    }

    // ---- saved palettes ----

    pub async fn save_palette(&self, palette: &ColorPalette) -> Result<(), GatewayError> {
        let session = self.session.require().map_err(|e| self.failed("save_palette", e))?;
        let row = to_row(&NewPaletteRow::new(&session.principal, palette))?;
        tracing::debug!(name = %palette.name, user_id = %session.principal.id, "saving palette");
        self.backend
            .insert(Some(&session), SAVED_PALETTES_TABLE, row)
            .await
            .map_err(|e| self.failed("save_palette", e))
    }

    /// All of the caller's palettes, newest first.
    pub async fn list_saved_palettes(&self) -> Result<Vec<SavedPalette>, GatewayError> {
        let session = self
            .session
            .require()
            .map_err(|e| self.failed("list_saved_palettes", e))?;
        let query = Select::from(SAVED_PALETTES_TABLE)
            .eq("user_id", session.principal.id.as_str())
            .order("created_at", false);
        let rows = self
            .backend
            .select(Some(&session), &query)
            .await
            .map_err(|e| self.failed("list_saved_palettes", e))?;

        rows.into_iter()
            .map(|row| from_row::<PaletteRow>(row).map(SavedPalette::from))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| self.failed("list_saved_palettes", e))
    }

    /// Delete one of the caller's palettes. Unknown or foreign ids succeed
    /// without effect.
    pub async fn delete_saved_palette(&self, id: &str) -> Result<(), GatewayError> {
        let session = self
            .session
            .require()
            .map_err(|e| self.failed("delete_saved_palette", e))?;
        let filters = [
            Filter::eq("id", id),
            Filter::eq("user_id", session.principal.id.as_str()),
        ];
        tracing::debug!(id, user_id = %session.principal.id, "deleting palette");
        self.backend
            .delete(Some(&session), SAVED_PALETTES_TABLE, &filters)
            .await
            .map_err(|e| self.failed("delete_saved_palette", e))
    }

    // ---- global statistics ----

    pub async fn increment_stat(&self, stat: StatName) -> Result<(), GatewayError> {
        let session = self.session.current_session();
        self.backend
            .rpc(
                session.as_ref(),
                INCREMENT_STAT_RPC,
                json!({ "stat_name": stat.as_str() }),
            )
            .await
            .map_err(|e| self.failed("increment_stat", e))?;
        Ok(())
    }

    pub async fn global_stats(&self) -> Result<GlobalStats, GatewayError> {
        let session = self.session.current_session();
        let mut rows = self
            .backend
            .select(session.as_ref(), &Select::from(STATS_TABLE).single())
            .await
            .map_err(|e| self.failed("global_stats", e))?;
        let row = rows.pop().unwrap_or_default();
        from_row(row).map_err(|e| self.failed("global_stats", e))
    }

    // ---- schema bootstrap ----

    pub async fn check_table_exists(&self) -> Result<bool, GatewayError> {
        let session = self.session.current_session();
        let probe = Select::from(SAVED_PALETTES_TABLE).columns("id").limit(1);
        match self.backend.select(session.as_ref(), &probe).await {
            Ok(_) => Ok(true),
            Err(GatewayError::SchemaMissing(_)) => Ok(false),
            Err(e) => Err(self.failed("check_table_exists", e)),
        }
    }

    /// Create `saved_palettes` if it does not exist yet. Safe to repeat.
    pub async fn create_table(&self) -> Result<(), GatewayError> {
        let session = self.session.current_session();
        tracing::info!(table = SAVED_PALETTES_TABLE, "creating table");
        self.backend
            .rpc(
                session.as_ref(),
                CREATE_TABLE_RPC,
                json!({ "sql": CREATE_SAVED_PALETTES_SQL }),
            )
            .await
            .map_err(|e| self.failed("create_table", e))?;
        Ok(())
    }

    /// Create the table when missing. Returns whether it had to be created.
    pub async fn ensure_schema(&self) -> Result<bool, GatewayError> {
        if self.check_table_exists().await? {
            return Ok(false);
        }
        self.create_table().await?;
        Ok(true)
    }

    /// Run `op`; if it fails because the table is missing, create the table
    /// once and run `op` a second time.
    pub async fn with_schema_recovery<T, F, Fut>(&self, mut op: F) -> Result<T, GatewayError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GatewayError>>,
    {
        match op().await {
            Err(GatewayError::SchemaMissing(table)) => {
                tracing::warn!(table = %table, "table missing, creating it and retrying");
                self.create_table().await?;
                op().await
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn gateway(backend: Arc<MemoryBackend>) -> PaletteGateway {
        PaletteGateway::new(backend, Arc::new(SessionContext::new()))
    }

    async fn signed_in(backend: &Arc<MemoryBackend>, gw: &PaletteGateway, email: &str) {
        gw.sign_up(email, "s3cret-pw").await.unwrap();
        let token = backend.last_verification_token(email).unwrap();
        gw.verify_email(&token).await.unwrap();
        gw.sign_in(email, "s3cret-pw").await.unwrap();
    }

    #[tokio::test]
    async fn row_operations_require_a_principal() {
        let gw = gateway(Arc::new(MemoryBackend::new()));
        let palette = ColorPalette::default();

        assert_matches!(gw.save_palette(&palette).await, Err(GatewayError::NotSignedIn));
        assert_matches!(gw.list_saved_palettes().await, Err(GatewayError::NotSignedIn));
        assert_matches!(
            gw.delete_saved_palette("anything").await,
            Err(GatewayError::NotSignedIn)
        );
    }

    #[tokio::test]
    async fn sign_in_publishes_principal() {
        let backend = Arc::new(MemoryBackend::new());
        let gw = gateway(backend.clone());
        let mut rx = gw.session().subscribe();

        signed_in(&backend, &gw, "dana@example.com").await;
        rx.changed().await.unwrap();
        assert_eq!(
            rx.borrow().as_ref().and_then(|p| p.email.clone()).as_deref(),
            Some("dana@example.com")
        );

        gw.sign_out().await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_none());
        assert!(gw.current_principal().is_none());
    }

    #[tokio::test]
    async fn sign_out_when_signed_out_is_noop() {
        let gw = gateway(Arc::new(MemoryBackend::new()));
        gw.sign_out().await.unwrap();
    }

    #[tokio::test]
    async fn failed_sign_in_leaves_session_empty() {
        let backend = Arc::new(MemoryBackend::new());
        let gw = gateway(backend.clone());
        gw.sign_up("eve@example.com", "s3cret-pw").await.unwrap();

        assert_matches!(
            gw.sign_in("eve@example.com", "s3cret-pw").await,
            Err(GatewayError::Auth(AuthError::EmailNotConfirmed))
        );
        assert!(gw.current_principal().is_none());
    }

    #[tokio::test]
    async fn delete_filter_carries_owner() {
        let backend = Arc::new(MemoryBackend::new());
        let gw = gateway(backend.clone());
        signed_in(&backend, &gw, "finn@example.com").await;

        gw.save_palette(&ColorPalette::default()).await.unwrap();
        let id = gw.list_saved_palettes().await.unwrap()[0].id.clone();

        gw.delete_saved_palette("not-a-real-id").await.unwrap();
        assert_eq!(gw.list_saved_palettes().await.unwrap().len(), 1);

        gw.delete_saved_palette(&id).await.unwrap();
        assert!(gw.list_saved_palettes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn check_and_create_table() {
        let backend = Arc::new(MemoryBackend::without_schema());
        let gw = gateway(backend.clone());

        assert!(!gw.check_table_exists().await.unwrap());
        assert!(gw.ensure_schema().await.unwrap());
        assert!(gw.check_table_exists().await.unwrap());
        assert!(!gw.ensure_schema().await.unwrap());
        gw.create_table().await.unwrap();
        assert!(backend.table_exists(SAVED_PALETTES_TABLE));
    }

    #[tokio::test]
    async fn schema_recovery_retries_once() {
        let backend = Arc::new(MemoryBackend::without_schema());
        let gw = gateway(backend.clone());
        signed_in(&backend, &gw, "gus@example.com").await;

        let palette = ColorPalette::default();
        let mut attempts = 0;
        gw.with_schema_recovery(|| {
            attempts += 1;
            gw.save_palette(&palette)
        })
        .await
        .unwrap();

        assert_eq!(attempts, 2);
        assert_eq!(backend.row_count(SAVED_PALETTES_TABLE), 1);
    }

    #[tokio::test]
    async fn schema_recovery_passes_other_errors_through() {
        let gw = gateway(Arc::new(MemoryBackend::without_schema()));
        let mut attempts = 0;
        let result = gw
            .with_schema_recovery(|| {
                attempts += 1;
                gw.list_saved_palettes()
            })
            .await;
        assert_matches!(result, Err(GatewayError::NotSignedIn));
        assert_eq!(attempts, 1);
    }

    #[tokio::test]
    async fn stats_start_at_zero_and_increment() {
        let gw = gateway(Arc::new(MemoryBackend::new()));
        assert_eq!(gw.global_stats().await.unwrap(), GlobalStats::default());

        gw.increment_stat(StatName::Generated).await.unwrap();
        gw.increment_stat(StatName::Generated).await.unwrap();
        gw.increment_stat(StatName::Downloaded).await.unwrap();

        let stats = gw.global_stats().await.unwrap();
        assert_eq!(stats.generated, 2);
        assert_eq!(stats.downloaded, 1);
    }
}
