use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::utils::error::Result;
use crate::utils::json_file;

/// The declarative list of sites to check, read from `product-list.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductCatalog {
    #[serde(default)]
    pub sites: Vec<Site>,
}

/// A scrape target: one extraction pattern and header set shared by its products.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Site {
    #[serde(rename = "user-agent", default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub regex: String,
    #[serde(default)]
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub name: String,
    pub url: String,
}

impl ProductCatalog {
    /// Loads the catalog; a missing file yields an empty catalog.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(json_file::read_optional(path)?.unwrap_or_default())
    }

    pub fn product_count(&self) -> usize {
        self.sites.iter().map(|site| site.products.len()).sum()
    }
}

impl Site {
    pub fn pattern(&self) -> Result<Regex> {
        Ok(Regex::new(&self.regex)?)
    }

    pub fn headers(&self) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        if let Some(user_agent) = &self.user_agent {
            headers.insert("User-Agent".to_string(), user_agent.clone());
        }
        headers
    }
}

impl Product {
    /// Key under which this product's last price is cached.
    pub fn cache_key(&self) -> &str {
        &self.url
    }
}
