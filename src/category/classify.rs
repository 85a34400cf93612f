//! Commodity name → category lookup.

use crate::domain::Category;

const VEGETABLES: &[&str] = &["onion", "potato", "tomato"];
const PULSES: &[&str] = &["gram dal", "tur/arhar dal", "urad dal", "moong dal", "masoor dal"];
const OILS: &[&str] = &[
    "groundnut oil",
    "mustard oil",
    "vanaspati",
    "soya oil",
    "sunflower oil",
    "palm oil",
];
const CEREALS: &[&str] = &["rice", "wheat"];
const OTHERS: &[&str] = &["sugar", "gur", "tea loose", "milk", "salt pack (iodised)"];

static LISTS: [(Category, &[&str]); 5] = [
    (Category::Vegetables, VEGETABLES),
    (Category::Pulses, PULSES),
    (Category::Oils, OILS),
    (Category::Cereals, CEREALS),
    (Category::Others, OTHERS),
];

/// Category of a commodity. Names outside the explicit lists fall back to `Others`.
pub fn classify(commodity: &str) -> Category {
    known_category(commodity).unwrap_or(Category::Others)
}

/// Category of a commodity that appears in one of the five lists.
pub fn known_category(commodity: &str) -> Option<Category> {
    let name = commodity.to_lowercase();
    LISTS
        .iter()
        .find(|(_, items)| items.contains(&name.as_str()))
        .map(|(category, _)| *category)
}

/// Every listed commodity name with its category.
pub fn listed_commodities() -> impl Iterator<Item = (Category, &'static str)> {
    LISTS
        .iter()
        .flat_map(|(category, items)| items.iter().map(move |name| (*category, *name)))
}
