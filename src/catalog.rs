// src/catalog.rs
//
// Data-driven variety catalog. A single table keyed by subject type replaces
// the per-category lists the UI used to duplicate; lookup never branches on
// the subject type at call sites.

use crate::models::SubjectType;

pub struct BackgroundOption {
    pub label: &'static str,
    pub prompt: &'static str,
}

const CATALOG: &[(SubjectType, &[&str])] = &[
    (
        SubjectType::Fruit,
        &[
            "Florida Orange",
            "Granny Smith Apple",
            "Red Delicious Apple",
            "Cavendish Banana",
            "Alphonso Mango",
            "Bing Cherry",
            "Crimson Seedless Grape",
            "Anjou Pear",
            "Meyer Lemon",
            "Hass Avocado",
            "Dragon Fruit",
            "Golden Kiwi",
        ],
    ),
    (
        SubjectType::Vegetable,
        &[
            "Heirloom Tomato",
            "Persian Cucumber",
            "Red Bell Pepper",
            "Purple Eggplant",
            "Rainbow Carrot",
            "Romanesco Broccoli",
            "Butternut Squash",
            "Red Onion",
            "Baby Spinach",
            "Portobello Mushroom",
        ],
    ),
    (
        SubjectType::Sandwich,
        &[
            "Club Sandwich",
            "Grilled Cheese",
            "Caprese Panini",
            "Falafel Wrap",
            "Smoked Turkey Baguette",
            "Shawarma Roll",
            "BLT",
        ],
    ),
    (
        SubjectType::Juice,
        &[
            "Fresh Orange Juice",
            "Green Detox Juice",
            "Carrot Ginger Juice",
            "Watermelon Juice",
            "Pomegranate Juice",
            "Mango Smoothie",
        ],
    ),
    (
        SubjectType::Pie,
        &[
            "Apple Pie",
            "Cherry Pie",
            "Pumpkin Pie",
            "Lemon Meringue Pie",
            "Pecan Pie",
            "Key Lime Pie",
        ],
    ),
    (
        SubjectType::BakedGoods,
        &[
            "Croissant",
            "Sourdough Loaf",
            "Cinnamon Roll",
            "Blueberry Muffin",
            "Chocolate Chip Cookie",
            "Baklava",
            "Pita Bread",
        ],
    ),
];

/// Curated background prompts offered alongside the free-form description box.
pub const BACKGROUND_OPTIONS: &[BackgroundOption] = &[
    BackgroundOption {
        label: "Clean white",
        prompt: "a clean, professional white background",
    },
    BackgroundOption {
        label: "Marble countertop",
        prompt: "on a marble countertop",
    },
    BackgroundOption {
        label: "Rustic wood",
        prompt: "on a rustic weathered wooden table",
    },
    BackgroundOption {
        label: "Dark slate",
        prompt: "on a muted dark slate surface",
    },
    BackgroundOption {
        label: "Linen cloth",
        prompt: "on a softly draped natural linen cloth",
    },
    BackgroundOption {
        label: "Garden morning",
        prompt: "in a sunlit garden with soft bokeh greenery",
    },
];

/// All known varieties for a subject type.
pub fn varieties(subject: SubjectType) -> &'static [&'static str] {
    CATALOG
        .iter()
        .find(|(kind, _)| *kind == subject)
        .map(|(_, list)| *list)
        .unwrap_or(&[])
}

/// Resolve the noun phrase inserted into prompts. An empty or unrecognized
/// variety falls back to a generic phrase so a prompt never carries an empty
/// placeholder.
pub fn resolve_variety(subject: SubjectType, variety: &str) -> String {
    let trimmed = variety.trim();
    if !trimmed.is_empty()
        && varieties(subject)
            .iter()
            .any(|known| known.eq_ignore_ascii_case(trimmed))
    {
        trimmed.to_string()
    } else {
        format!("high-quality {subject}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_subject_type_has_varieties() {
        use SubjectType::*;
        for subject in [Fruit, Vegetable, Sandwich, Juice, Pie, BakedGoods] {
            assert!(!varieties(subject).is_empty());
        }
    }

    #[test]
    fn known_variety_resolves_verbatim() {
        assert_eq!(
            resolve_variety(SubjectType::Fruit, "Florida Orange"),
            "Florida Orange"
        );
        assert_eq!(
            resolve_variety(SubjectType::Fruit, "florida orange"),
            "florida orange"
        );
    }

    #[test]
    fn empty_variety_falls_back_to_generic_phrase() {
        let phrase = resolve_variety(SubjectType::Pie, "");
        assert_eq!(phrase, "high-quality pie");
    }

    #[test]
    fn unknown_variety_falls_back() {
        let phrase = resolve_variety(SubjectType::Vegetable, "Moon Potato");
        assert_eq!(phrase, "high-quality vegetable");
    }
}
