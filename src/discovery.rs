//! Incremental discovery of result-feed listings.
//!
//! Google Maps loads results lazily while the left panel scrolls, so the loop
//! alternates scroll / settle / re-count until the target is reached or the
//! feed stops growing. The feed itself sits behind [`ResultFeed`] and all
//! delays behind [`ScrollTuning`], so the stall/backoff policy runs in tests
//! without a browser.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

/// One discovered entry in the result feed: display label + detail link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingStub {
    pub name: String,
    pub link: String,
}

/// Live, re-queryable view of the scrollable result feed.
pub trait ResultFeed {
    /// Whether the feed container currently exists in the document.
    fn container_present(&self) -> bool;
    /// Trigger one scroll-growth action on the container.
    fn scroll_feed(&self) -> Result<()>;
    /// Number of result anchors currently loaded.
    fn anchor_count(&self) -> Result<usize>;
    /// Read all loaded anchors as stubs, in feed order. Anchors without a
    /// label keep an empty name rather than being dropped.
    fn read_stubs(&self) -> Result<Vec<ListingStub>>;
}

/// Delay/ceiling knobs for the scroll loop. Tests zero the delays.
#[derive(Debug, Clone)]
pub struct ScrollTuning {
    pub max_scrolls: usize,
    /// Settle delay when the target is small: the feed usually already holds
    /// enough items, so a long wait just adds latency.
    pub settle_small: Duration,
    /// Settle delay for large targets, which load slowly.
    pub settle_large: Duration,
    /// Targets below this use the small settle delay.
    pub small_target_threshold: usize,
    /// Extra wait after a first stalled iteration, giving a slow feed one
    /// more chance before giving up.
    pub stall_recovery: Duration,
}

impl Default for ScrollTuning {
    fn default() -> Self {
        Self {
            max_scrolls: 20,
            settle_small: Duration::from_secs(3),
            settle_large: Duration::from_secs(15),
            small_target_threshold: 20,
            stall_recovery: Duration::from_secs(30),
        }
    }
}

/// Terminal state of one discovery run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeedOutcome {
    /// Target count reached.
    Converged,
    /// Feed has no more content (missing container, two consecutive stalls,
    /// or the iteration ceiling).
    Exhausted,
}

// Loop-internal scroll bookkeeping. Never escapes this module.
struct ScrollState {
    last_observed_count: usize,
    stall_strikes: u32,
    elapsed_iterations: usize,
}

/// Scroll the feed until at least `target` anchors are loaded or the feed
/// stops producing, then read the loaded anchors and return at most `target`
/// stubs in feed order.
pub async fn discover_listings<F: ResultFeed>(
    feed: &F,
    target: usize,
    tuning: &ScrollTuning,
) -> Result<Vec<ListingStub>> {
    let mut state = ScrollState {
        last_observed_count: 0,
        stall_strikes: 0,
        elapsed_iterations: 0,
    };

    let outcome = loop {
        if state.elapsed_iterations >= tuning.max_scrolls {
            println!("⚠️ Scroll ceiling of {} iterations reached.", tuning.max_scrolls);
            break FeedOutcome::Exhausted;
        }
        state.elapsed_iterations += 1;

        if !feed.container_present() {
            println!("❌ Feed panel not found!");
            break FeedOutcome::Exhausted;
        }

        feed.scroll_feed()?;
        println!("🔽 Scrolled panel: {}", state.elapsed_iterations);

        let settle = if target < tuning.small_target_threshold {
            tuning.settle_small
        } else {
            tuning.settle_large
        };
        sleep(settle).await;

        let current = feed.anchor_count()?;
        println!("📦 Listings loaded: {}", current);

        if current >= target {
            println!("✅ Target of {} listings reached.", target);
            break FeedOutcome::Converged;
        }

        if current == state.last_observed_count {
            state.stall_strikes += 1;
            if state.stall_strikes >= 2 {
                println!("⚠️ No more new results. Stopping scroll.");
                break FeedOutcome::Exhausted;
            }
            println!("⏳ No new results. Waiting for slow feed...");
            sleep(tuning.stall_recovery).await;
        } else {
            state.stall_strikes = 0;
        }

        state.last_observed_count = current;
    };

    // Terminal read regardless of outcome: partial results beat none.
    let mut stubs = feed.read_stubs()?;
    stubs.truncate(target);
    println!("📦 Total listings found: {} ({:?})", stubs.len(), outcome);
    Ok(stubs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Scripted feed: replays a fixed sequence of anchor counts, one per
    /// measurement, holding the last value once the script runs out.
    struct ScriptedFeed {
        counts: Vec<usize>,
        present: bool,
        measured: Mutex<usize>,
        scrolls: Mutex<usize>,
    }

    impl ScriptedFeed {
        fn new(counts: Vec<usize>) -> Self {
            Self { counts, present: true, measured: Mutex::new(0), scrolls: Mutex::new(0) }
        }

        fn scroll_count(&self) -> usize {
            *self.scrolls.lock().unwrap()
        }

        fn current(&self) -> usize {
            let idx = *self.measured.lock().unwrap();
            if idx == 0 {
                0
            } else {
                self.counts[(idx - 1).min(self.counts.len() - 1)]
            }
        }
    }

    impl ResultFeed for ScriptedFeed {
        fn container_present(&self) -> bool {
            self.present
        }

        fn scroll_feed(&self) -> Result<()> {
            *self.scrolls.lock().unwrap() += 1;
            Ok(())
        }

        fn anchor_count(&self) -> Result<usize> {
            let mut idx = self.measured.lock().unwrap();
            *idx += 1;
            Ok(self.counts[(*idx - 1).min(self.counts.len() - 1)])
        }

        fn read_stubs(&self) -> Result<Vec<ListingStub>> {
            Ok((0..self.current())
                .map(|i| ListingStub {
                    name: format!("Listing {}", i),
                    link: format!("https://maps.example/place/{}", i),
                })
                .collect())
        }
    }

    fn instant_tuning() -> ScrollTuning {
        ScrollTuning {
            max_scrolls: 20,
            settle_small: Duration::ZERO,
            settle_large: Duration::ZERO,
            small_target_threshold: 20,
            stall_recovery: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_converges_when_target_reached() {
        let feed = ScriptedFeed::new(vec![4, 9, 12]);
        let stubs = discover_listings(&feed, 10, &instant_tuning()).await.unwrap();
        assert_eq!(stubs.len(), 10);
        // Converged on the third measurement, no further scrolling
        assert_eq!(feed.scroll_count(), 3);
    }

    #[tokio::test]
    async fn test_output_capped_at_target() {
        let feed = ScriptedFeed::new(vec![25]);
        let stubs = discover_listings(&feed, 5, &instant_tuning()).await.unwrap();
        assert_eq!(stubs.len(), 5);
        assert_eq!(feed.scroll_count(), 1);
    }

    #[tokio::test]
    async fn test_two_consecutive_stalls_stop_the_loop() {
        // [3,3,3]: growth, strike one, strike two
        let feed = ScriptedFeed::new(vec![3, 3, 3]);
        let stubs = discover_listings(&feed, 10, &instant_tuning()).await.unwrap();
        assert_eq!(feed.scroll_count(), 3);
        assert_eq!(stubs.len(), 3);
    }

    #[tokio::test]
    async fn test_growth_resets_stall_strikes() {
        // Stall at 3, recover to 6, stall twice at 6
        let feed = ScriptedFeed::new(vec![3, 3, 6, 6, 6]);
        let stubs = discover_listings(&feed, 10, &instant_tuning()).await.unwrap();
        assert_eq!(feed.scroll_count(), 5);
        assert_eq!(stubs.len(), 6);
    }

    #[tokio::test]
    async fn test_missing_container_exhausts_immediately() {
        let mut feed = ScriptedFeed::new(vec![0]);
        feed.present = false;
        let stubs = discover_listings(&feed, 10, &instant_tuning()).await.unwrap();
        assert_eq!(feed.scroll_count(), 0);
        assert!(stubs.is_empty());
    }

    #[tokio::test]
    async fn test_terminates_at_iteration_ceiling() {
        // Alternating counts never stall twice in a row and never converge
        let counts: Vec<usize> = (0..100).map(|i| i + 1).collect();
        let feed = ScriptedFeed::new(counts);
        let tuning = ScrollTuning { max_scrolls: 7, ..instant_tuning() };
        let stubs = discover_listings(&feed, 1000, &tuning).await.unwrap();
        assert_eq!(feed.scroll_count(), 7);
        assert_eq!(stubs.len(), 7);
    }

    #[tokio::test]
    async fn test_empty_labels_are_kept() {
        struct UnlabeledFeed;
        impl ResultFeed for UnlabeledFeed {
            fn container_present(&self) -> bool {
                true
            }
            fn scroll_feed(&self) -> Result<()> {
                Ok(())
            }
            fn anchor_count(&self) -> Result<usize> {
                Ok(2)
            }
            fn read_stubs(&self) -> Result<Vec<ListingStub>> {
                Ok(vec![
                    ListingStub { name: String::new(), link: "https://a".into() },
                    ListingStub { name: "B".into(), link: "https://b".into() },
                ])
            }
        }
        let stubs = discover_listings(&UnlabeledFeed, 2, &instant_tuning()).await.unwrap();
        assert_eq!(stubs.len(), 2);
        assert_eq!(stubs[0].name, "");
    }
}
