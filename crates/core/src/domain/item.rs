use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Merchandising markers that boost cross-sell placement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFlags {
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_flash_offer: bool,
}

/// A catalog listing as supplied by the catalog collaborator.
///
/// Every field other than `id` and `title` may be absent; scoring rules that
/// depend on an absent field contribute nothing rather than excluding the item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub promo_price: Option<f64>,
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub supplier_name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub flags: ItemFlags,
}

impl Item {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: ItemId(id.into()),
            title: title.into(),
            description: String::new(),
            category: None,
            subcategory: None,
            price: None,
            promo_price: None,
            stock: None,
            supplier_name: None,
            city: None,
            flags: ItemFlags::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_promo_price(mut self, promo_price: f64) -> Self {
        self.promo_price = Some(promo_price);
        self
    }

    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = Some(stock);
        self
    }

    pub fn with_supplier(mut self, supplier_name: impl Into<String>) -> Self {
        self.supplier_name = Some(supplier_name.into());
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn featured(mut self) -> Self {
        self.flags.is_featured = true;
        self
    }

    pub fn flash_offer(mut self) -> Self {
        self.flags.is_flash_offer = true;
        self
    }

    /// Price the shopper actually pays: the promotion when one is running.
    pub fn effective_price(&self) -> Option<f64> {
        self.promo_price.or(self.price)
    }

    pub fn category(&self) -> Option<&str> {
        non_empty(self.category.as_deref())
    }

    pub fn subcategory(&self) -> Option<&str> {
        non_empty(self.subcategory.as_deref())
    }

    pub fn supplier_name(&self) -> Option<&str> {
        non_empty(self.supplier_name.as_deref())
    }

    pub fn city(&self) -> Option<&str> {
        non_empty(self.city.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Case-insensitive equality of two optional labels; absent or blank never matches.
pub fn same_label(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.to_lowercase() == b.to_lowercase(),
        _ => false,
    }
}
