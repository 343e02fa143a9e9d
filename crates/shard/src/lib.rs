//! Consistent-hash shard routing: maps a partition key or entity id to one
//! of an ordered set of buckets, then to the pool that owns that bucket.

use std::io::Cursor;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ShardConfigError {
    #[error("shard bucket positions must be strictly increasing")]
    NotIncreasing,
    #[error("shard bucket position {0} exceeds bucket_count {1}")]
    PositionOutOfRange(u32, u32),
    #[error("at least one shard is required")]
    Empty,
}

/// `murmur3_x64_128` (seed 0) truncated to its low 64 bits, matching the
/// `spaolacci/murmur3` `Sum64` function the original Go service calls.
pub fn murmur3_sum64(data: &[u8]) -> u64 {
    let hash = murmur3::murmur3_x64_128(&mut Cursor::new(data), 0)
        .expect("hashing an in-memory buffer never fails");
    hash as u64
}

/// One shard: a pool-like handle and the (exclusive) upper bound of the
/// bucket range it owns.
#[derive(Debug, Clone)]
pub struct Shard<P> {
    pub pool: P,
    pub bucket_position: u32,
}

/// An ordered consistent-hash ring over `bucket_count` buckets.
#[derive(Debug)]
pub struct ShardRing<P> {
    bucket_count: u32,
    shards: Vec<Shard<P>>,
}

impl<P> ShardRing<P> {
    pub fn new(bucket_count: u32, shards: Vec<Shard<P>>) -> Result<Self, ShardConfigError> {
        if shards.is_empty() {
            return Err(ShardConfigError::Empty);
        }
        for w in shards.windows(2) {
            if w[1].bucket_position <= w[0].bucket_position {
                return Err(ShardConfigError::NotIncreasing);
            }
        }
        for s in &shards {
            if s.bucket_position > bucket_count {
                return Err(ShardConfigError::PositionOutOfRange(
                    s.bucket_position,
                    bucket_count,
                ));
            }
        }
        Ok(Self {
            bucket_count,
            shards,
        })
    }

    pub fn bucket_count(&self) -> u32 {
        self.bucket_count
    }

    /// `bucket = murmur3(decimal(key)) mod N`, then ring lookup.
    pub fn bucket_for_key(&self, key: i64) -> u32 {
        let hash = murmur3_sum64(key.to_string().as_bytes());
        (hash % self.bucket_count as u64) as u32
    }

    /// `bucket = id mod N`, then ring lookup. Entity ids must have been
    /// minted so that `id mod N` equals the bucket chosen at insert time.
    pub fn bucket_for_entity_id(&self, id: i64) -> u32 {
        (id.rem_euclid(self.bucket_count as i64)) as u32
    }

    fn pool_for_bucket(&self, bucket: u32) -> &P {
        for shard in &self.shards {
            if bucket < shard.bucket_position {
                return &shard.pool;
            }
        }
        &self.shards[0].pool
    }

    pub fn route_by_key(&self, key: i64) -> &P {
        self.pool_for_bucket(self.bucket_for_key(key))
    }

    pub fn route_by_entity_id(&self, id: i64) -> &P {
        self.pool_for_bucket(self.bucket_for_entity_id(id))
    }

    pub fn all_pools(&self) -> impl Iterator<Item = &P> {
        self.shards.iter().map(|s| &s.pool)
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(bucket_count: u32, positions: &[u32]) -> ShardRing<u32> {
        let shards = positions
            .iter()
            .enumerate()
            .map(|(i, &bucket_position)| Shard {
                pool: i as u32,
                bucket_position,
            })
            .collect();
        ShardRing::new(bucket_count, shards).unwrap()
    }

    #[test]
    fn rejects_non_increasing_positions() {
        let shards = vec![
            Shard {
                pool: 0,
                bucket_position: 5,
            },
            Shard {
                pool: 1,
                bucket_position: 5,
            },
        ];
        assert_eq!(
            ShardRing::new(10, shards).unwrap_err(),
            ShardConfigError::NotIncreasing
        );
    }

    #[test]
    fn rejects_position_over_bucket_count() {
        let shards = vec![Shard {
            pool: 0,
            bucket_position: 11,
        }];
        assert_eq!(
            ShardRing::new(10, shards).unwrap_err(),
            ShardConfigError::PositionOutOfRange(11, 10)
        );
    }

    #[test]
    fn routes_wrap_to_first_shard() {
        // Two shards: [0,5) -> shard 0, [5,10) -> shard 1. A bucket >= the
        // last shard's position wraps to shard 0.
        let r = ring(10, &[5, 10]);
        for bucket in 0..5u32 {
            assert_eq!(*r.pool_for_bucket(bucket), 0);
        }
        for bucket in 5..10u32 {
            assert_eq!(*r.pool_for_bucket(bucket), 1);
        }
    }

    #[test]
    fn entity_id_routes_by_modulo() {
        let r = ring(4, &[2, 4]);
        assert_eq!(r.bucket_for_entity_id(8), 0);
        assert_eq!(r.bucket_for_entity_id(9), 1);
        assert_eq!(r.bucket_for_entity_id(10), 2);
        assert_eq!(r.bucket_for_entity_id(11), 3);
        assert_eq!(*r.route_by_entity_id(11), 1); // bucket 3 -> wraps to shard 0
    }

    #[test]
    fn hash_is_deterministic_and_key_dependent() {
        let a = murmur3_sum64(b"100");
        let b = murmur3_sum64(b"100");
        let c = murmur3_sum64(b"101");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn key_routing_is_stable_for_same_key() {
        let r = ring(16, &[4, 8, 12, 16]);
        let bucket = r.bucket_for_key(123456789);
        assert_eq!(bucket, r.bucket_for_key(123456789));
        assert!(bucket < 16);
    }
}
