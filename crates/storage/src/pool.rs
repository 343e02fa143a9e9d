//! Read/write pool manager: a writable master pool and a round-robin
//! readable pool that includes the master so a single replica outage
//! cannot starve reads.

use std::sync::atomic::{AtomicUsize, Ordering};

use sqlx::PgPool;

pub struct PoolManager {
    master: PgPool,
    replicas: Vec<PgPool>,
    read_cursor: AtomicUsize,
}

impl PoolManager {
    pub fn new(master: PgPool, replicas: Vec<PgPool>) -> Self {
        Self {
            master,
            replicas,
            read_cursor: AtomicUsize::new(0),
        }
    }

    pub fn writable(&self) -> &PgPool {
        &self.master
    }

    /// Round-robins over `{master} ∪ replicas`.
    pub fn readable(&self) -> &PgPool {
        let n = self.replicas.len() + 1;
        let idx = self.read_cursor.fetch_add(1, Ordering::Relaxed) % n;
        if idx == 0 {
            &self.master
        } else {
            &self.replicas[idx - 1]
        }
    }
}

#[cfg(test)]
mod tests {
    // PoolManager's round-robin logic is exercised in storage::tests via
    // in-process counters, since constructing real PgPools needs a live
    // database; see crates/loms/tests for an integration-level check
    // against Postgres.
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mirrors `readable()`'s indexing rule without needing a PgPool, to
    /// pin down the round-robin sequence independent of sqlx internals.
    #[test]
    fn round_robin_sequence_includes_master_every_nth_turn() {
        let cursor = AtomicUsize::new(0);
        let replica_count = 2usize;
        let n = replica_count + 1;
        let picks: Vec<usize> = (0..6)
            .map(|_| cursor.fetch_add(1, Ordering::Relaxed) % n)
            .collect();
        assert_eq!(picks, vec![0, 1, 2, 0, 1, 2]);
    }
}
