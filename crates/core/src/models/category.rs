use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::CoreError;

/// Identifier of one of the fixed expense categories.
///
/// The set is closed: once a `CategoryId` exists it always resolves to a
/// registry entry, so an expense can never point at an unknown category.
/// Serialized as the lowercase id string (`"food"`, `"bills"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryId {
    Food,
    Transportation,
    Entertainment,
    Shopping,
    Bills,
    Other,
}

impl CategoryId {
    /// All category ids in registry order.
    pub const ALL: [CategoryId; 6] = [
        CategoryId::Food,
        CategoryId::Transportation,
        CategoryId::Entertainment,
        CategoryId::Shopping,
        CategoryId::Bills,
        CategoryId::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryId::Food => "food",
            CategoryId::Transportation => "transportation",
            CategoryId::Entertainment => "entertainment",
            CategoryId::Shopping => "shopping",
            CategoryId::Bills => "bills",
            CategoryId::Other => "other",
        }
    }

    /// The full registry entry for this id.
    pub fn category(&self) -> Category {
        let (name, color, icon, description) = match self {
            CategoryId::Food => (
                "Food",
                "#ef4444",
                "utensils",
                "Restaurants, groceries, and dining out",
            ),
            CategoryId::Transportation => (
                "Transportation",
                "#3b82f6",
                "car",
                "Gas, public transit, and vehicle maintenance",
            ),
            CategoryId::Entertainment => (
                "Entertainment",
                "#8b5cf6",
                "film",
                "Movies, games, and leisure activities",
            ),
            CategoryId::Shopping => (
                "Shopping",
                "#f59e0b",
                "shopping-bag",
                "Clothing, electronics, and retail purchases",
            ),
            CategoryId::Bills => (
                "Bills",
                "#10b981",
                "file-text",
                "Utilities, rent, and recurring payments",
            ),
            CategoryId::Other => ("Other", "#6b7280", "more-horizontal", "Miscellaneous expenses"),
        };
        Category {
            id: *self,
            name: name.to_string(),
            color: color.to_string(),
            icon: icon.to_string(),
            description: Some(description.to_string()),
        }
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryId {
    type Err = CoreError;

    /// Resolve a category id string (case-insensitive, surrounding whitespace ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        CategoryId::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| CoreError::InvalidCategory(s.to_string()))
    }
}

/// A classification bucket for expenses.
///
/// Categories are static configuration: the registry is defined at startup
/// and never edited at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,

    /// Display name (e.g., "Food")
    pub name: String,

    /// CSS color used for visual encoding (e.g., "#ef4444")
    pub color: String,

    /// Icon reference (e.g., "utensils")
    pub icon: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The full category registry, in registry order.
pub fn registry() -> Vec<Category> {
    CategoryId::ALL.iter().map(CategoryId::category).collect()
}

/// Look up a registry category by its id string.
pub fn find_category(id: &str) -> Result<Category, CoreError> {
    id.parse::<CategoryId>().map(|id| id.category())
}
