//! Keyword-based product categorization.
//!
//! Shopify products carry no category taxonomy the app can use directly, so
//! each product is classified into a category/subcategory pair from its
//! title and `productType`. Rules are ordered and first-match-wins; rule
//! order is part of the observable behavior and must not be reordered.

use std::sync::LazyLock;

use regex::Regex;

/// A category/subcategory pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: &'static str,
    pub subcategory: &'static str,
}

/// Title keywords marking a physical tool.
const EQUIPMENT_KEYWORDS: &[&str] = &[
    "mop",
    "bucket",
    "broom",
    "brush",
    "squeegee",
    "glove",
    "cloth",
    "wiper",
    "sponge",
    "scrubber",
    "duster",
    "picker",
    "trolley",
    "handle",
    "stick",
    "pole",
    "holder",
    "dispenser",
    "bin",
    "dustbin",
    "microfiber",
    "towel",
    "dustpan",
    "scoop",
    "mat",
    "cart",
    "caddy",
    "dryer",
    "hand dryer",
    "tissue",
    "roll",
    "basket",
    "janitor",
    "scraper",
    "spray bottle",
    "container",
    "window cleaning",
    "viper",
    "grinding",
    "grinder",
    "machine",
    "polisher",
    "vacuum",
    "sweeper",
    "rubber strip",
    "strip",
    "pad",
    "refill",
    "head",
    "attachment",
    "hose",
    "nozzle",
    "connector",
    "wheel",
    "caster",
    "frame",
];

/// Title keywords marking a liquid or chemical product.
const CHEMICAL_INDICATORS: &[&str] = &[
    "liter",
    "litre",
    "ml",
    "gallon",
    "acid",
    "liquid",
    "gel",
    "solution",
    "cleaner",
    "detergent",
    "soap",
    "wash",
];

/// Matches a volume measurement like "500ml" or "5 Liter".
static VOLUME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // pattern is a compile-time constant
    Regex::new(r"(?i)\d+\s*(ml|liter|litre|gallon)").unwrap()
});

/// Classify a product from its title and `productType`.
#[must_use]
pub fn classify(title: &str, product_type: &str) -> Classification {
    let title_lower = title.to_lowercase();
    let product_type_lower = product_type.to_lowercase();

    // Priority 1: productType from Shopify (most reliable)
    if product_type_lower.contains("equipment") || product_type_lower.contains("tool") {
        return classify_equipment(&title_lower);
    }
    if product_type_lower.contains("chemical")
        || product_type_lower.contains("cleaner")
        || product_type_lower.contains("detergent")
    {
        return classify_chemical(&title_lower);
    }

    // Priority 2: chemical indicators in the title
    let is_chemical = CHEMICAL_INDICATORS.iter().any(|kw| title_lower.contains(kw));

    // Priority 3: equipment keywords in the title
    let is_equipment = EQUIPMENT_KEYWORDS.iter().any(|kw| title_lower.contains(kw));

    match (is_chemical, is_equipment) {
        (true, false) => classify_chemical(&title_lower),
        (false, true) => classify_equipment(&title_lower),
        // Both match: a volume measurement tips it to chemical
        (true, true) => {
            if VOLUME_RE.is_match(title) {
                classify_chemical(&title_lower)
            } else {
                classify_equipment(&title_lower)
            }
        }
        (false, false) => classify_chemical(&title_lower),
    }
}

fn classify_equipment(title_lower: &str) -> Classification {
    let subcategory = if contains_any(title_lower, &["mop", "bucket", "trolley"]) {
        "mop-bucket-trolley"
    } else if contains_any(title_lower, &["broom", "brush", "scrubber"]) {
        "brooms-brushes"
    } else if contains_any(title_lower, &["window", "squeegee", "viper"]) {
        "window-cleaning"
    } else if contains_any(title_lower, &["vacuum", "sweeper", "machine"]) {
        "machines"
    } else if contains_any(title_lower, &["garbage", "bin", "waste", "picker"]) {
        "waste-management"
    } else {
        "cleaning-tools"
    };

    Classification {
        category: "cleaning-equipment",
        subcategory,
    }
}

fn classify_chemical(title_lower: &str) -> Classification {
    if contains_any(title_lower, &["bathroom", "toilet", "wc"]) {
        return Classification {
            category: "bathroom-cleaning",
            subcategory: "bathroom-cleaner",
        };
    }
    if contains_any(title_lower, &["car", "vehicle", "automotive"]) {
        return Classification {
            category: "car-washing",
            subcategory: "car-shampoo",
        };
    }
    if contains_any(title_lower, &["dish", "kitchen", "utensil"]) {
        return Classification {
            category: "dishwashing",
            subcategory: "dish-wash",
        };
    }
    if contains_any(title_lower, &["fabric", "softener", "laundry", "cloth"]) {
        return Classification {
            category: "fabric-cleaning",
            subcategory: "fabric-washing",
        };
    }
    if contains_any(title_lower, &["floor", "tile", "marble"]) {
        return Classification {
            category: "cleaning-chemicals",
            subcategory: "floor-cleaner",
        };
    }
    if contains_any(title_lower, &["glass", "mirror", "window cleaner"]) {
        return Classification {
            category: "cleaning-chemicals",
            subcategory: "glass-cleaner",
        };
    }
    Classification {
        category: "cleaning-chemicals",
        subcategory: "multi-purpose",
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_type_wins_over_title() {
        // "Cleaner" in the title would normally mark a chemical
        let c = classify("Vacuum Cleaner 2000W", "Equipment");
        assert_eq!(c.category, "cleaning-equipment");
        assert_eq!(c.subcategory, "machines");
    }

    #[test]
    fn chemical_product_type_routes_by_title() {
        let c = classify("Toilet Bowl Gel", "Chemical");
        assert_eq!(c.category, "bathroom-cleaning");
        assert_eq!(c.subcategory, "bathroom-cleaner");
    }

    #[test]
    fn chemical_only_title() {
        let c = classify("Dish Wash Liquid", "");
        assert_eq!(c.category, "dishwashing");
        assert_eq!(c.subcategory, "dish-wash");
    }

    #[test]
    fn equipment_only_title() {
        let c = classify("Steel Garbage Picker", "");
        assert_eq!(c.category, "cleaning-equipment");
        assert_eq!(c.subcategory, "waste-management");
    }

    #[test]
    fn volume_tie_break_prefers_chemical() {
        // "cleaner" (chemical) and "spray bottle" (equipment) both match,
        // and the volume measurement resolves the tie
        let c = classify("Glass Cleaner Spray Bottle 500ml", "");
        assert_eq!(c.category, "cleaning-chemicals");
        assert_eq!(c.subcategory, "glass-cleaner");
    }

    #[test]
    fn tie_without_volume_prefers_equipment() {
        let c = classify("Soap Dispenser", "");
        assert_eq!(c.category, "cleaning-equipment");
        assert_eq!(c.subcategory, "cleaning-tools");
    }

    #[test]
    fn floor_cleaner_with_volume_is_chemical() {
        let c = classify("Floor Cleaner Chemical 1 Liter", "");
        assert_eq!(c.category, "cleaning-chemicals");
        assert_eq!(c.subcategory, "floor-cleaner");
    }

    #[test]
    fn unknown_defaults_to_multi_purpose_chemical() {
        let c = classify("Mystery Product", "");
        assert_eq!(c.category, "cleaning-chemicals");
        assert_eq!(c.subcategory, "multi-purpose");
    }

    #[test]
    fn equipment_rule_order_is_first_match() {
        // "mop" and "brush" both appear; the mop rule comes first
        let c = classify("Mop and Brush Combo Set", "Tool");
        assert_eq!(c.subcategory, "mop-bucket-trolley");
    }

    #[test]
    fn volume_regex_allows_spacing_and_case() {
        assert!(VOLUME_RE.is_match("5 LITER pack"));
        assert!(VOLUME_RE.is_match("500ml"));
        assert!(!VOLUME_RE.is_match("liter of paint"));
    }
}
