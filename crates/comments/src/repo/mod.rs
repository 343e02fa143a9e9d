//! Per-shard repository queries. Every function is generic over
//! `impl sqlx::PgExecutor<'_>` where it issues a single statement, or
//! takes `&mut sqlx::PgConnection` where it needs the same connection
//! across several statements inside a caller-held transaction.

pub mod comment;
