//! Catalog entries and browse queries.
//!
//! The catalog is read-only from the cart's point of view: browsing code picks
//! an entry and hands a fully-formed [`NewLineItem`] to the cart.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cart::NewLineItem;
use crate::types::ItemId;

/// A purchasable entry: a gallery artwork or a shop product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: ItemId,
    pub title: String,
    pub unit_price: f64,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Shown first under [`SortKey::Relevance`].
    #[serde(default)]
    pub featured: bool,
    /// Shown first under [`SortKey::Newest`].
    #[serde(default)]
    pub new: bool,
}

impl CatalogEntry {
    /// The add-to-cart payload for this entry.
    #[must_use]
    pub fn to_line_item(&self) -> NewLineItem {
        NewLineItem::new(self.id.clone(), self.title.clone(), self.unit_price)
            .with_image(self.image_url.clone())
    }

    /// Case-insensitive tag membership.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Shop category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Pins,
    Keychains,
    Necklaces,
    Pendants,
    Mugs,
    Blankets,
    Posters,
    Stickers,
    /// Original pieces shown in the gallery.
    Artwork,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Self; 9] = [
        Self::Pins,
        Self::Keychains,
        Self::Necklaces,
        Self::Pendants,
        Self::Mugs,
        Self::Blankets,
        Self::Posters,
        Self::Stickers,
        Self::Artwork,
    ];

    /// URL/query form of the category.
    #[must_use]
    pub const fn slug(&self) -> &'static str {
        match self {
            Self::Pins => "pins",
            Self::Keychains => "keychains",
            Self::Necklaces => "necklaces",
            Self::Pendants => "pendants",
            Self::Mugs => "mugs",
            Self::Blankets => "blankets",
            Self::Posters => "posters",
            Self::Stickers => "stickers",
            Self::Artwork => "artwork",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Error parsing a [`Category`] or [`SortKey`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseKeyError {
    kind: &'static str,
    value: String,
}

impl FromStr for Category {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.slug().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseKeyError {
                kind: "category",
                value: s.to_string(),
            })
    }
}

/// Ordering of browse results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Featured entries first, catalog order otherwise.
    #[default]
    Relevance,
    PriceAsc,
    PriceDesc,
    /// New entries first, catalog order otherwise.
    Newest,
}

impl FromStr for SortKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relevance" => Ok(Self::Relevance),
            "price-asc" => Ok(Self::PriceAsc),
            "price-desc" => Ok(Self::PriceDesc),
            "newest" => Ok(Self::Newest),
            _ => Err(ParseKeyError {
                kind: "sort key",
                value: s.to_string(),
            }),
        }
    }
}

/// A browse query over the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogQuery {
    #[serde(default)]
    pub category: Option<Category>,
    /// Case-insensitive substring of the title. Blank means no filter.
    #[serde(default, rename = "q")]
    pub search: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub sort: SortKey,
}

impl CatalogQuery {
    /// Filter and order `entries`.
    ///
    /// Sorting is stable, so ties keep catalog order.
    #[must_use]
    pub fn apply(&self, entries: &[CatalogEntry]) -> Vec<CatalogEntry> {
        let needle = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut list: Vec<CatalogEntry> = entries
            .iter()
            .filter(|e| self.category.is_none_or(|c| e.category == Some(c)))
            .filter(|e| {
                needle
                    .as_deref()
                    .is_none_or(|n| e.title.to_lowercase().contains(n))
            })
            .filter(|e| self.tag.as_deref().is_none_or(|t| e.has_tag(t)))
            .cloned()
            .collect();

        match self.sort {
            SortKey::PriceAsc => list.sort_by(|a, b| a.unit_price.total_cmp(&b.unit_price)),
            SortKey::PriceDesc => list.sort_by(|a, b| b.unit_price.total_cmp(&a.unit_price)),
            SortKey::Newest => list.sort_by_key(|e| !e.new),
            SortKey::Relevance => list.sort_by_key(|e| !e.featured),
        }

        list
    }
}
