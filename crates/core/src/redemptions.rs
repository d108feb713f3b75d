//! Redemption Log

use rustc_hash::FxHashMap;
use uuid::Uuid;

/// Multiset of users that have redeemed a promo code.
///
/// Append-only from the point of view of the engine: validation only reads it,
/// the checkout commit records new entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedemptionLog {
    counts: FxHashMap<Uuid, u32>,
    total: u64,
}

impl RedemptionLog {
    /// Empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a log from pre-aggregated `(user, count)` pairs.
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (Uuid, u32)>,
    {
        let mut log = Self::new();

        for (user, count) in counts {
            if count == 0 {
                continue;
            }

            let entry = log.counts.entry(user).or_insert(0);

            *entry = entry.saturating_add(count);
            log.total = log.total.saturating_add(u64::from(count));
        }

        log
    }

    /// Append a redemption by `user`.
    pub fn record(&mut self, user: Uuid) {
        let entry = self.counts.entry(user).or_insert(0);

        *entry = entry.saturating_add(1);
        self.total = self.total.saturating_add(1);
    }

    /// Number of times `user` appears in the log.
    #[must_use]
    pub fn count_for(&self, user: &Uuid) -> u32 {
        self.counts.get(user).copied().unwrap_or(0)
    }

    /// Total number of entries.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct users.
    #[must_use]
    pub fn distinct_users(&self) -> usize {
        self.counts.len()
    }

    /// Whether nobody has redeemed yet.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total == 0
    }
}

impl FromIterator<Uuid> for RedemptionLog {
    fn from_iter<T: IntoIterator<Item = Uuid>>(iter: T) -> Self {
        let mut log = Self::new();

        for user in iter {
            log.record(user);
        }

        log
    }
}
