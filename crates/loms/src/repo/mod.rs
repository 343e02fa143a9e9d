//! Repository functions.
//!
//! The source threads an in-flight transaction through `context.Context` so
//! a repository factory can bind each call to "the pool" or "the
//! transaction" implicitly. Rust has no ambient per-call context; per
//! SPEC_FULL.md §4.5 we resolve that as an explicit capability instead —
//! every function below is generic over `impl sqlx::PgExecutor<'_>`, which
//! both `&PgPool` and `&mut Transaction<'_, Postgres>` satisfy. That makes
//! the "repository factory" of the source collapse to nothing: callers just
//! pass whichever executor the current scope holds.

pub mod order;
pub mod outbox;
pub mod stock;
