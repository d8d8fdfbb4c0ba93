//! Inventory Rebalancer
//!
//! Keeps feed stock proportional to head-count. When a livestock group
//! shrinks, every feed record of the group is scaled by `new / old`; a group
//! reduced to zero gets `"0"` everywhere. Increases never touch feeds.
//!
//! The head-count write and the feed writes form one logical unit without a
//! database transaction: on the first failed feed write the rebalancer stops,
//! writes the old head-count back, and restores the feeds it already changed.
//! A failed compensating write is logged as a critical inconsistency.

use serde::Serialize;
use tracing::{error, info, warn};

use crate::constants::inventory::QUANTITY_DECIMALS;
use crate::storage::{Database, FeedStore, LivestockStore};
use crate::types::{FeedItem, Result};

/// Storage operations the rebalancer performs.
pub trait HerdInventory {
    fn set_head_count(&self, livestock_id: &str, count: i64) -> Result<()>;
    fn feeds(&self, livestock_id: &str) -> Result<Vec<FeedItem>>;
    fn set_feed_quantity(&self, feed_id: &str, quantity: &str) -> Result<()>;
}

impl HerdInventory for Database {
    fn set_head_count(&self, livestock_id: &str, count: i64) -> Result<()> {
        LivestockStore::new(self).set_count(livestock_id, count)
    }

    fn feeds(&self, livestock_id: &str) -> Result<Vec<FeedItem>> {
        FeedStore::new(self).list_for_livestock(livestock_id)
    }

    fn set_feed_quantity(&self, feed_id: &str, quantity: &str) -> Result<()> {
        FeedStore::new(self).set_quantity(feed_id, quantity)
    }
}

// =============================================================================
// Outcome Types
// =============================================================================

/// A feed whose stored quantity could not be read and was reset to zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityWarning {
    pub feed_id: String,
    pub stored: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RebalanceReport {
    /// Feeds written with a scaled quantity
    pub scaled: usize,
    pub warnings: Vec<QuantityWarning>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RebalanceOutcome {
    /// Count did not decrease; feeds were not read.
    Unchanged,
    Rebalanced(RebalanceReport),
}

/// Per-feed failure detail.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedUpdateError {
    pub feed_id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct RebalanceFailure {
    pub message: String,
    pub details: Vec<FeedUpdateError>,
    /// Head-count and every changed feed were written back
    pub rolled_back: bool,
}

// =============================================================================
// Rebalancing
// =============================================================================

/// New quantity for a stored value, or `None` when the stored text is not a
/// non-negative number.
pub fn scaled_quantity(stored: &str, old_count: i64, new_count: i64) -> Option<String> {
    let current = stored.trim().parse::<f64>().ok()?;
    if !current.is_finite() || current < 0.0 {
        return None;
    }
    if new_count == 0 {
        return Some("0".to_string());
    }
    let ratio = new_count as f64 / old_count as f64;
    Some(format!("{:.*}", QUANTITY_DECIMALS, current * ratio))
}

pub struct InventoryRebalancer<'a, S: HerdInventory> {
    store: &'a S,
}

impl<'a, S: HerdInventory> InventoryRebalancer<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Scale feeds after the head-count of `livestock_id` has already been
    /// written as `new_count`.
    pub fn after_count_change(
        &self,
        livestock_id: &str,
        old_count: i64,
        new_count: i64,
    ) -> std::result::Result<RebalanceOutcome, RebalanceFailure> {
        if new_count >= old_count {
            return Ok(RebalanceOutcome::Unchanged);
        }

        let feeds = match self.store.feeds(livestock_id) {
            Ok(feeds) => feeds,
            Err(e) => {
                error!("Loading feeds of {} failed: {}", livestock_id, e);
                return Err(self.roll_back(livestock_id, old_count, &[], Vec::new()));
            }
        };

        let mut report = RebalanceReport::default();
        // (feed id, previous quantity) for every write that succeeded
        let mut written: Vec<(&str, &str)> = Vec::with_capacity(feeds.len());

        for feed in &feeds {
            let scaled = scaled_quantity(&feed.quantity, old_count, new_count);
            let is_valid = scaled.is_some();
            let next = match scaled {
                Some(quantity) => quantity,
                None => {
                    warn!(
                        "Invalid quantity '{}' for feed {}, setting to 0",
                        feed.quantity, feed.id
                    );
                    report.warnings.push(QuantityWarning {
                        feed_id: feed.id.clone(),
                        stored: feed.quantity.clone(),
                    });
                    "0".to_string()
                }
            };

            if let Err(e) = self.store.set_feed_quantity(&feed.id, &next) {
                error!("Failed to update feed {}: {}", feed.id, e);
                let detail = FeedUpdateError {
                    feed_id: feed.id.clone(),
                    message: format!("Failed to update feed {} ({}): {}", feed.id, feed.name, e),
                };
                return Err(self.roll_back(livestock_id, old_count, &written, vec![detail]));
            }

            written.push((&feed.id, &feed.quantity));
            if is_valid {
                report.scaled += 1;
            }
        }

        info!(
            "Rebalanced {} feeds of {} ({} -> {} head)",
            report.scaled, livestock_id, old_count, new_count
        );
        Ok(RebalanceOutcome::Rebalanced(report))
    }

    fn roll_back(
        &self,
        livestock_id: &str,
        old_count: i64,
        written: &[(&str, &str)],
        mut details: Vec<FeedUpdateError>,
    ) -> RebalanceFailure {
        let mut rolled_back = true;

        if let Err(e) = self.store.set_head_count(livestock_id, old_count) {
            error!(
                "CRITICAL: failed to restore head-count of {} to {}: {}",
                livestock_id, old_count, e
            );
            rolled_back = false;
        }

        for (feed_id, previous) in written.iter().rev() {
            if let Err(e) = self.store.set_feed_quantity(feed_id, previous) {
                error!(
                    "CRITICAL: failed to restore feed {} to '{}': {}",
                    feed_id, previous, e
                );
                details.push(FeedUpdateError {
                    feed_id: feed_id.to_string(),
                    message: format!("Failed to restore feed {}: {}", feed_id, e),
                });
                rolled_back = false;
            }
        }

        let message = if rolled_back {
            "Failed to adjust feed quantities after livestock count change. Operation rolled back."
        } else {
            "Failed to adjust feed quantities after livestock count change. Rollback failed, data may be inconsistent."
        };

        RebalanceFailure {
            message: message.to_string(),
            details,
            rolled_back,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AgriError, LivestockStatus, NewInventoryItem, NewLivestock};
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory store with scripted write failures.
    #[derive(Default)]
    struct ScriptedInventory {
        counts: Mutex<HashMap<String, i64>>,
        feeds: Mutex<Vec<FeedItem>>,
        failing_feeds: HashSet<String>,
        fail_count_writes: bool,
        reads: AtomicUsize,
        writes: AtomicUsize,
    }

    impl ScriptedInventory {
        fn with_feeds(count: i64, quantities: &[&str]) -> Self {
            let store = Self::default();
            store.counts.lock().unwrap().insert("herd".into(), count);
            *store.feeds.lock().unwrap() = quantities
                .iter()
                .enumerate()
                .map(|(i, q)| FeedItem {
                    id: format!("f{}", i),
                    livestock_id: "herd".into(),
                    name: format!("Корм {}", i),
                    quantity: q.to_string(),
                    unit: "кг".into(),
                    price_per_unit: None,
                    created_at: String::new(),
                })
                .collect();
            store
        }

        fn quantities(&self) -> Vec<String> {
            self.feeds
                .lock()
                .unwrap()
                .iter()
                .map(|f| f.quantity.clone())
                .collect()
        }

        fn count(&self) -> i64 {
            self.counts.lock().unwrap()["herd"]
        }
    }

    impl HerdInventory for ScriptedInventory {
        fn set_head_count(&self, livestock_id: &str, count: i64) -> Result<()> {
            if self.fail_count_writes {
                return Err(AgriError::Storage("disk full".into()));
            }
            self.counts
                .lock()
                .unwrap()
                .insert(livestock_id.to_string(), count);
            Ok(())
        }

        fn feeds(&self, _livestock_id: &str) -> Result<Vec<FeedItem>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.feeds.lock().unwrap().clone())
        }

        fn set_feed_quantity(&self, feed_id: &str, quantity: &str) -> Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            let mut feeds = self.feeds.lock().unwrap();
            if self.failing_feeds.contains(feed_id) {
                return Err(AgriError::Storage("database is locked".into()));
            }
            let feed = feeds.iter_mut().find(|f| f.id == feed_id).unwrap();
            feed.quantity = quantity.to_string();
            Ok(())
        }
    }

    fn shrink(
        store: &ScriptedInventory,
        old: i64,
        new: i64,
    ) -> std::result::Result<RebalanceOutcome, RebalanceFailure> {
        store.set_head_count("herd", new).unwrap();
        InventoryRebalancer::new(store).after_count_change("herd", old, new)
    }

    #[test]
    fn test_scaled_quantity() {
        assert_eq!(scaled_quantity("50.00", 10, 5).as_deref(), Some("25.00"));
        assert_eq!(scaled_quantity("100", 3, 1).as_deref(), Some("33.33"));
        assert_eq!(scaled_quantity(" 7.5 ", 2, 1).as_deref(), Some("3.75"));
        assert_eq!(scaled_quantity("12.5", 4, 0).as_deref(), Some("0"));
        assert_eq!(scaled_quantity("много", 4, 2), None);
        assert_eq!(scaled_quantity("-3", 4, 2), None);
        assert_eq!(scaled_quantity("NaN", 4, 2), None);
        assert_eq!(scaled_quantity("abc", 4, 0), None);
    }

    #[test]
    fn test_halving_scales_feeds() {
        let store = ScriptedInventory::with_feeds(10, &["50.00", "8"]);
        let outcome = shrink(&store, 10, 5).unwrap();

        assert_eq!(store.quantities(), vec!["25.00", "4.00"]);
        assert_eq!(
            outcome,
            RebalanceOutcome::Rebalanced(RebalanceReport {
                scaled: 2,
                warnings: vec![],
            })
        );
    }

    #[test]
    fn test_zero_head_count_zeroes_everything() {
        let store = ScriptedInventory::with_feeds(7, &["50.00", "3.14", "0"]);
        shrink(&store, 7, 0).unwrap();
        assert_eq!(store.quantities(), vec!["0", "0", "0"]);
    }

    #[test]
    fn test_invalid_quantity_self_heals() {
        let store = ScriptedInventory::with_feeds(4, &["abc", "20", "-1"]);
        let outcome = shrink(&store, 4, 2).unwrap();

        assert_eq!(store.quantities(), vec!["0", "10.00", "0"]);
        let RebalanceOutcome::Rebalanced(report) = outcome else {
            panic!("expected a rebalance");
        };
        assert_eq!(report.scaled, 1);
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(report.warnings[0].stored, "abc");
        assert_eq!(store.count(), 2);
    }

    #[test]
    fn test_write_failure_rolls_back() {
        let mut store = ScriptedInventory::with_feeds(10, &["50", "30", "20"]);
        store.failing_feeds.insert("f1".into());

        let failure = shrink(&store, 10, 5).unwrap_err();

        assert!(failure.rolled_back);
        assert!(failure.message.ends_with("Operation rolled back."));
        assert_eq!(failure.details.len(), 1);
        assert_eq!(failure.details[0].feed_id, "f1");
        assert_eq!(store.count(), 10);
        // f0 was scaled, then restored; f2 never touched
        assert_eq!(store.quantities(), vec!["50", "30", "20"]);
    }

    #[test]
    fn test_failed_count_restore_is_reported() {
        let mut store = ScriptedInventory::with_feeds(10, &["50"]);
        store.failing_feeds.insert("f0".into());
        store.set_head_count("herd", 5).unwrap();
        store.fail_count_writes = true;

        let failure = InventoryRebalancer::new(&store)
            .after_count_change("herd", 10, 5)
            .unwrap_err();

        assert!(!failure.rolled_back);
        assert!(failure.message.contains("Rollback failed"));
        assert_eq!(store.count(), 5);
    }

    #[test]
    fn test_increase_never_reads_feeds() {
        let store = ScriptedInventory::with_feeds(5, &["50"]);
        let outcome = shrink(&store, 5, 12).unwrap();

        assert_eq!(outcome, RebalanceOutcome::Unchanged);
        assert_eq!(store.reads.load(Ordering::SeqCst), 0);
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
        assert_eq!(store.quantities(), vec!["50"]);

        let same = shrink(&store, 12, 12).unwrap();
        assert_eq!(same, RebalanceOutcome::Unchanged);
    }

    #[test]
    fn test_rebalance_on_sqlite() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        let user = crate::storage::UserStore::new(&db)
            .create("farmer", "hash", None)
            .unwrap();
        let herd = LivestockStore::new(&db)
            .create(
                &user.id,
                &NewLivestock {
                    kind: "Коровы".into(),
                    count: 10,
                    status: LivestockStatus::Healthy,
                },
            )
            .unwrap();
        let feed = FeedStore::new(&db)
            .create(
                &herd.id,
                &NewInventoryItem {
                    name: "Сено".into(),
                    quantity: "50.00".into(),
                    unit: None,
                    price_per_unit: None,
                    application_date: None,
                },
            )
            .unwrap();

        db.set_head_count(&herd.id, 5).unwrap();
        InventoryRebalancer::new(&db)
            .after_count_change(&herd.id, 10, 5)
            .unwrap();

        let stored = FeedStore::new(&db).get(&feed.id).unwrap().unwrap();
        assert_eq!(stored.quantity, "25.00");
    }
}
