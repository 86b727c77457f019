use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::item::{Item, ItemId};
use crate::errors::CatalogError;

/// Identity of one catalog snapshot. Rankings cached against a version are
/// only reused while the catalog keeps that version.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogVersion(pub String);

impl fmt::Display for CatalogVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An already-fetched, validated candidate list with a stable identity.
#[derive(Clone, Debug)]
pub struct Catalog {
    version: CatalogVersion,
    items: Vec<Item>,
    index: HashMap<ItemId, usize>,
}

impl Catalog {
    /// Validates the items and fingerprints every field scoring can observe.
    pub fn try_new(items: Vec<Item>) -> Result<Self, CatalogError> {
        let version = fingerprint(&items);
        Self::with_version(items, version)
    }

    /// Same validation as [`Catalog::try_new`] but keeps a caller-issued version token.
    pub fn with_version(items: Vec<Item>, version: CatalogVersion) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(items.len());

        for (position, item) in items.iter().enumerate() {
            validate_prices(item)?;
            if index.insert(item.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateItemId(item.id.clone()));
            }
        }

        Ok(Self { version, items, index })
    }

    pub fn version(&self) -> &CatalogVersion {
        &self.version
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.index.get(id).map(|position| &self.items[*position])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn validate_prices(item: &Item) -> Result<(), CatalogError> {
    for (field, value) in [("price", item.price), ("promoPrice", item.promo_price)] {
        if let Some(value) = value {
            if !value.is_finite() || value < 0.0 {
                return Err(CatalogError::InvalidPrice { id: item.id.clone(), field, value });
            }
        }
    }

    if let (Some(price), Some(promo)) = (item.price, item.promo_price) {
        if promo > price {
            return Err(CatalogError::PromoAbovePrice { id: item.id.clone(), price, promo });
        }
    }

    Ok(())
}

fn fingerprint(items: &[Item]) -> CatalogVersion {
    let mut hasher = blake3::Hasher::new();

    for item in items {
        hasher.update(item.id.as_str().as_bytes());
        for text in [
            Some(item.title.as_str()),
            Some(item.description.as_str()),
            item.category.as_deref(),
            item.subcategory.as_deref(),
            item.supplier_name.as_deref(),
            item.city.as_deref(),
        ] {
            hash_optional_text(&mut hasher, text);
        }
        for number in [item.price, item.promo_price] {
            match number {
                Some(value) => hasher.update(&value.to_le_bytes()),
                None => hasher.update(&[0xff]),
            };
        }
        match item.stock {
            Some(stock) => hasher.update(&stock.to_le_bytes()),
            None => hasher.update(&[0xff]),
        };
        hasher.update(&[u8::from(item.flags.is_featured), u8::from(item.flags.is_flash_offer)]);
        hasher.update(&[0x1e]);
    }

    CatalogVersion(hasher.finalize().to_hex()[..16].to_string())
}

fn hash_optional_text(hasher: &mut blake3::Hasher, text: Option<&str>) {
    match text {
        Some(text) => {
            hasher.update(&(text.len() as u64).to_le_bytes());
            hasher.update(text.as_bytes());
        }
        None => {
            hasher.update(&[0xff]);
        }
    }
}
