//! JSON catalog sources: a file on disk and the dataset bundled with the
//! binary.
//!
//! A catalog file is either a bare array of places or a document of the form
//! `{"updatedAt": "<RFC 3339>", "places": [...]}`. Without `updatedAt` the
//! snapshot is dated at the Unix epoch, so any dated catalog supersedes it.

use std::io::BufReader;

use camino::{Utf8Path, Utf8PathBuf};
use helgo_core::{CatalogError, CatalogSnapshot, CatalogSource, Place, SourceTier};
use log::debug;
use serde::Deserialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::fs::open_utf8_file;

const BUNDLED_CATALOG: &str = include_str!("../data/fallback_catalog.json");

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Document(CatalogDocument),
    Places(Vec<Place>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogDocument {
    #[serde(default)]
    updated_at: Option<String>,
    places: Vec<Place>,
}

impl CatalogFile {
    fn into_snapshot(self, tier: SourceTier) -> Result<CatalogSnapshot, CatalogError> {
        let (places, updated_at) = match self {
            Self::Document(document) => (document.places, document.updated_at),
            Self::Places(places) => (places, None),
        };
        if places.is_empty() {
            return Err(CatalogError::Empty { tier });
        }
        let freshness = match updated_at {
            Some(raw) => OffsetDateTime::parse(&raw, &Rfc3339).map_err(|source| {
                CatalogError::Decode {
                    tier,
                    source: Box::new(source),
                }
            })?,
            None => OffsetDateTime::UNIX_EPOCH,
        };
        Ok(CatalogSnapshot {
            places,
            freshness,
            tier,
        })
    }
}

/// A catalog read from a JSON file each time it is loaded.
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    path: Utf8PathBuf,
    tier: SourceTier,
}

impl JsonCatalog {
    /// Serve the catalog at `path` as the given tier.
    #[must_use]
    pub const fn new(path: Utf8PathBuf, tier: SourceTier) -> Self {
        Self { path, tier }
    }

    /// Path of the catalog file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl CatalogSource for JsonCatalog {
    fn tier(&self) -> SourceTier {
        self.tier
    }

    fn load(&self) -> Result<CatalogSnapshot, CatalogError> {
        let file = open_utf8_file(&self.path).map_err(|err| CatalogError::Unavailable {
            tier: self.tier,
            reason: format!("{}: {err}", self.path),
        })?;
        let parsed: CatalogFile = serde_json::from_reader(BufReader::new(file)).map_err(
            |source| CatalogError::Decode {
                tier: self.tier,
                source: Box::new(source),
            },
        )?;
        let snapshot = parsed.into_snapshot(self.tier)?;
        debug!(
            "loaded {} places from {} ({} tier)",
            snapshot.places.len(),
            self.path,
            self.tier
        );
        Ok(snapshot)
    }
}

/// The small Zurich dataset compiled into the binary, served as
/// [`SourceTier::Fallback`].
#[derive(Debug, Default, Clone, Copy)]
pub struct BundledCatalog;

impl CatalogSource for BundledCatalog {
    fn tier(&self) -> SourceTier {
        SourceTier::Fallback
    }

    fn load(&self) -> Result<CatalogSnapshot, CatalogError> {
        let parsed: CatalogFile =
            serde_json::from_str(BUNDLED_CATALOG).map_err(|source| CatalogError::Decode {
                tier: SourceTier::Fallback,
                source: Box::new(source),
            })?;
        parsed.into_snapshot(SourceTier::Fallback)
    }
}
