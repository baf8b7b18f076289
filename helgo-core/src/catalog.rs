//! Catalog access with tiered degrade.
//!
//! A catalog is loaded from one of several [`SourceTier`]s. Callers usually
//! wrap their sources in a [`TieredCatalog`], which tries each in order and
//! only fails when every tier did.

use std::fmt;

use thiserror::Error;
use time::OffsetDateTime;

use crate::Place;

/// Where a catalog snapshot came from, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceTier {
    /// Freshly fetched from the network.
    Network,
    /// A previously cached download.
    Cache,
    /// The dataset bundled with the application.
    Fallback,
}

impl SourceTier {
    /// Return the tier as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Cache => "cache",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for SourceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A loaded catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSnapshot {
    /// Every place in the catalog.
    pub places: Vec<Place>,
    /// When the catalog content last changed.
    pub freshness: OffsetDateTime,
    /// Tier that produced the snapshot.
    pub tier: SourceTier,
}

/// Errors raised while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The source could not be reached.
    #[error("{tier} catalog unavailable: {reason}")]
    Unavailable {
        /// Tier that failed.
        tier: SourceTier,
        /// Human-readable cause.
        reason: String,
    },
    /// The source returned no places.
    #[error("{tier} catalog is empty")]
    Empty {
        /// Tier that returned nothing.
        tier: SourceTier,
    },
    /// The source returned data that could not be decoded.
    #[error("{tier} catalog could not be decoded")]
    Decode {
        /// Tier that failed.
        tier: SourceTier,
        /// Underlying decode or I/O error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Every tier failed.
    #[error("all {attempted} catalog tiers failed")]
    Exhausted {
        /// Number of tiers tried.
        attempted: usize,
        /// Error from the last tier tried.
        #[source]
        last: Option<Box<CatalogError>>,
    },
}

/// Supplies catalog snapshots.
///
/// Implementations must be thread-safe so an engine can refresh from any
/// thread.
pub trait CatalogSource: Send + Sync {
    /// Tier this source represents.
    fn tier(&self) -> SourceTier;

    /// Load the current snapshot.
    ///
    /// # Errors
    /// Returns [`CatalogError`] when the source cannot produce a snapshot.
    fn load(&self) -> Result<CatalogSnapshot, CatalogError>;
}

/// A source serving a snapshot held in memory.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    snapshot: CatalogSnapshot,
}

impl StaticCatalog {
    /// Serve `places` as a catalog of the given tier and freshness.
    #[must_use]
    pub const fn new(places: Vec<Place>, freshness: OffsetDateTime, tier: SourceTier) -> Self {
        Self {
            snapshot: CatalogSnapshot {
                places,
                freshness,
                tier,
            },
        }
    }
}

impl CatalogSource for StaticCatalog {
    fn tier(&self) -> SourceTier {
        self.snapshot.tier
    }

    fn load(&self) -> Result<CatalogSnapshot, CatalogError> {
        if self.snapshot.places.is_empty() {
            return Err(CatalogError::Empty {
                tier: self.snapshot.tier,
            });
        }
        Ok(self.snapshot.clone())
    }
}

/// Tries each source in order and returns the first successful snapshot.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use helgo_core::{
///     CatalogSource, Category, Place, SourceTier, StaticCatalog, TieredCatalog,
/// };
/// use time::OffsetDateTime;
///
/// let place = Place::new("p", "Park", Category::Park, Coord { x: 8.5, y: 47.4 })?;
/// let catalog = TieredCatalog::new(vec![
///     Box::new(StaticCatalog::new(Vec::new(), OffsetDateTime::UNIX_EPOCH, SourceTier::Network)),
///     Box::new(StaticCatalog::new(vec![place], OffsetDateTime::UNIX_EPOCH, SourceTier::Fallback)),
/// ]);
/// let snapshot = catalog.load().expect("fallback tier serves places");
/// assert_eq!(snapshot.tier, SourceTier::Fallback);
/// # Ok::<(), helgo_core::PlaceError>(())
/// ```
pub struct TieredCatalog {
    sources: Vec<Box<dyn CatalogSource>>,
}

impl TieredCatalog {
    /// Wrap `sources`, which are tried in the given order.
    #[must_use]
    pub fn new(sources: Vec<Box<dyn CatalogSource>>) -> Self {
        Self { sources }
    }

    /// Number of wrapped sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Report whether no sources are wrapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl fmt::Debug for TieredCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tiers: Vec<_> = self.sources.iter().map(|source| source.tier()).collect();
        f.debug_struct("TieredCatalog").field("tiers", &tiers).finish()
    }
}

impl CatalogSource for TieredCatalog {
    fn tier(&self) -> SourceTier {
        self.sources
            .first()
            .map_or(SourceTier::Fallback, |source| source.tier())
    }

    fn load(&self) -> Result<CatalogSnapshot, CatalogError> {
        let mut last = None;
        for source in &self.sources {
            match source.load() {
                Ok(snapshot) => return Ok(snapshot),
                Err(err) => {
                    log::warn!("degrading from {} catalog: {err}", source.tier());
                    last = Some(Box::new(err));
                }
            }
        }
        Err(CatalogError::Exhausted {
            attempted: self.sources.len(),
            last,
        })
    }
}
