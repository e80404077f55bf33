//! Price feed seam and last-known-price cache.
//!
//! The engine never fetches prices. Callers poll a [`PriceFeed`] on a fixed
//! interval and keep the result in a [`LastKnownPrice`]. A failed fetch
//! leaves the previous price in place; the UI can show a stale indicator via
//! [`LastKnownPrice::is_stale`].
//!
//! ```
//! use qr_rewards::feed::{LastKnownPrice, StaticPriceFeed, RefreshOutcome};
//! use rust_decimal::Decimal;
//! use std::time::Duration;
//!
//! let mut cache = LastKnownPrice::new(Duration::from_secs(60));
//! let mut feed = StaticPriceFeed::new(Decimal::from(50_000));
//!
//! assert!(cache.is_stale());
//! assert_eq!(cache.refresh(&mut feed), RefreshOutcome::Updated(Decimal::from(50_000)));
//! assert_eq!(cache.sats_per_usd().unwrap(), Some(Decimal::from(2_000)));
//! ```

use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::PriceFeedConfig;
use crate::error::{FeedError, Result};
use crate::types::currency::sats_per_usd;

/// A source of the current fiat price of one bitcoin.
pub trait PriceFeed {
    /// Fetch the current USD price of one BTC.
    fn fetch_usd_per_btc(&mut self) -> std::result::Result<Decimal, FeedError>;
}

/// A feed that always returns the same price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticPriceFeed {
    usd_per_btc: Decimal,
}

impl StaticPriceFeed {
    pub fn new(usd_per_btc: Decimal) -> Self {
        Self { usd_per_btc }
    }
}

impl PriceFeed for StaticPriceFeed {
    fn fetch_usd_per_btc(&mut self) -> std::result::Result<Decimal, FeedError> {
        Ok(self.usd_per_btc)
    }
}

/// Result of one refresh attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A fresh price was stored.
    Updated(Decimal),
    /// The fetch failed; the previous price (if any) is kept.
    KeptPrevious {
        /// Price still in use.
        price: Option<Decimal>,
        /// Why the fetch failed.
        error: FeedError,
    },
}

/// The last successfully fetched price and when it was fetched.
#[derive(Debug, Clone)]
pub struct LastKnownPrice {
    usd_per_btc: Option<Decimal>,
    last_updated: Option<Instant>,
    ttl: Duration,
}

impl LastKnownPrice {
    /// Empty cache with the given freshness window.
    pub fn new(ttl: Duration) -> Self {
        Self {
            usd_per_btc: None,
            last_updated: None,
            ttl,
        }
    }

    /// Cache seeded from configuration. The fallback price counts as stale
    /// until the first real fetch succeeds.
    pub fn from_config(config: &PriceFeedConfig) -> Self {
        Self {
            usd_per_btc: config.fallback_usd_per_btc,
            last_updated: None,
            ttl: config.refresh_interval(),
        }
    }

    /// Poll `feed` once. Failures and non-positive prices keep the previous
    /// value.
    pub fn refresh<F: PriceFeed + ?Sized>(&mut self, feed: &mut F) -> RefreshOutcome {
        let fetched = feed.fetch_usd_per_btc().and_then(|p| {
            if p <= Decimal::ZERO {
                Err(FeedError::NonPositivePrice(p))
            } else {
                Ok(p)
            }
        });

        match fetched {
            Ok(price) => {
                self.usd_per_btc = Some(price);
                self.last_updated = Some(Instant::now());
                debug!(usd_per_btc = %price, "price updated");
                RefreshOutcome::Updated(price)
            }
            Err(error) => {
                warn!(%error, kept = ?self.usd_per_btc, "price refresh failed, keeping last known price");
                RefreshOutcome::KeptPrevious {
                    price: self.usd_per_btc,
                    error,
                }
            }
        }
    }

    /// Last known price, fresh or not.
    pub fn usd_per_btc(&self) -> Option<Decimal> {
        self.usd_per_btc
    }

    /// `true` if no fetch has succeeded yet or the last one is older than the
    /// freshness window.
    pub fn is_stale(&self) -> bool {
        match self.last_updated {
            Some(at) => at.elapsed() >= self.ttl,
            None => true,
        }
    }

    /// Conversion rate derived from the last known price.
    pub fn sats_per_usd(&self) -> Result<Option<Decimal>> {
        self.usd_per_btc.map(sats_per_usd).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays a scripted sequence of fetch results.
    struct ScriptedFeed {
        script: Vec<std::result::Result<Decimal, FeedError>>,
    }

    impl PriceFeed for ScriptedFeed {
        fn fetch_usd_per_btc(&mut self) -> std::result::Result<Decimal, FeedError> {
            if self.script.is_empty() {
                return Err(FeedError::Unavailable("script exhausted".into()));
            }
            self.script.remove(0)
        }
    }

    #[test]
    fn test_failure_keeps_previous_price() {
        let mut feed = ScriptedFeed {
            script: vec![
                Ok(Decimal::from(60_000)),
                Err(FeedError::Unavailable("timeout".into())),
                Ok(Decimal::ZERO),
                Ok(Decimal::from(61_000)),
            ],
        };
        let mut cache = LastKnownPrice::new(Duration::from_secs(3_600));

        assert_eq!(cache.refresh(&mut feed), RefreshOutcome::Updated(Decimal::from(60_000)));
        assert!(!cache.is_stale());

        assert_eq!(
            cache.refresh(&mut feed),
            RefreshOutcome::KeptPrevious {
                price: Some(Decimal::from(60_000)),
                error: FeedError::Unavailable("timeout".into()),
            }
        );
        assert_eq!(cache.usd_per_btc(), Some(Decimal::from(60_000)));

        assert_eq!(
            cache.refresh(&mut feed),
            RefreshOutcome::KeptPrevious {
                price: Some(Decimal::from(60_000)),
                error: FeedError::NonPositivePrice(Decimal::ZERO),
            }
        );

        assert_eq!(cache.refresh(&mut feed), RefreshOutcome::Updated(Decimal::from(61_000)));
    }

    #[test]
    fn test_failure_before_first_fetch() {
        let mut feed = ScriptedFeed { script: vec![] };
        let mut cache = LastKnownPrice::new(Duration::from_secs(60));

        assert!(matches!(
            cache.refresh(&mut feed),
            RefreshOutcome::KeptPrevious { price: None, .. }
        ));
        assert!(cache.is_stale());
        assert_eq!(cache.sats_per_usd().unwrap(), None);
    }

    #[test]
    fn test_fallback_price_is_stale() {
        let config = PriceFeedConfig {
            refresh_interval_secs: 60,
            fallback_usd_per_btc: Some(Decimal::from(100_000)),
        };
        let cache = LastKnownPrice::from_config(&config);

        assert!(cache.is_stale());
        assert_eq!(cache.sats_per_usd().unwrap(), Some(Decimal::from(1_000)));
    }

    #[test]
    fn test_zero_ttl_is_always_stale() {
        let mut cache = LastKnownPrice::new(Duration::ZERO);
        cache.refresh(&mut StaticPriceFeed::new(Decimal::ONE));
        assert!(cache.is_stale());
    }
}
