//! Last observed price per product, persisted as a flat JSON object.
//!
//! The whole file is loaded into memory at startup, mutated in place while the
//! run progresses, and rewritten wholesale by [`PriceCache::save`].

use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

use crate::utils::error::Result;
use crate::utils::json_file;

#[derive(Debug, Clone)]
pub struct PriceCache {
    path: PathBuf,
    prices: BTreeMap<String, f64>,
}

impl PriceCache {
    /// An empty cache that will be written to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            prices: BTreeMap::new(),
        }
    }

    /// Loads the cache at `path`. A missing file is an empty cache; a file that
    /// is not a JSON object of numbers is an error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let prices = match json_file::read_optional::<BTreeMap<String, f64>>(&path)? {
            Some(prices) => {
                debug!("Loaded {} cached prices from {}", prices.len(), path.display());
                prices
            }
            None => BTreeMap::new(),
        };
        Ok(Self { path, prices })
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.prices.get(key).copied()
    }

    pub fn set(&mut self, key: &str, price: f64) {
        self.prices.insert(key.to_string(), price);
    }

    pub fn save(&self) -> Result<()> {
        json_file::write(&self.path, &self.prices)?;
        debug!("Saved {} prices to {}", self.prices.len(), self.path.display());
        Ok(())
    }

    pub fn prices(&self) -> &BTreeMap<String, f64> {
        &self.prices
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}
