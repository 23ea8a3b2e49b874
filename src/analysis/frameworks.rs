//! Templated framework sections and the framework catalog

use serde::{Deserialize, Serialize};

use crate::models::{DishCandidate, EconomicProfile};

/// Frameworks covered by generated analysis, in presentation order
pub const FRAMEWORK_CATALOG: [&str; 20] = [
    "SWOT",
    "4P Marketing Mix",
    "PEST",
    "Porter's Five Forces",
    "BCG Growth-Share Matrix",
    "Ansoff Matrix",
    "Value Chain",
    "McKinsey 7S",
    "Blue Ocean Strategy",
    "Business Model Canvas",
    "STP (Segmentation, Targeting, Positioning)",
    "Customer Journey Map",
    "AARRR Funnel",
    "Kano Model",
    "Jobs to Be Done",
    "3C (Company, Customers, Competitors)",
    "GE-McKinsey Nine-Box Matrix",
    "Balanced Scorecard",
    "Lean Canvas",
    "Product Life Cycle",
];

/// Titles of the templated sections, in presentation order
pub const TEMPLATED_SECTIONS: [&str; 3] = ["SWOT", "4P", "PEST"];

/// One titled block of label/text pairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkSection {
    pub title: String,
    pub entries: Vec<SectionEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionEntry {
    pub label: String,
    pub text: String,
}

impl FrameworkSection {
    fn new(title: &str, entries: [(&str, String); 4]) -> Self {
        Self {
            title: title.to_string(),
            entries: entries
                .into_iter()
                .map(|(label, text)| SectionEntry {
                    label: label.to_string(),
                    text,
                })
                .collect(),
        }
    }
}

#[must_use]
pub fn swot(dish: &DishCandidate, economy: &EconomicProfile) -> FrameworkSection {
    FrameworkSection::new(
        TEMPLATED_SECTIONS[0],
        [
            (
                "Strengths",
                format!(
                    "Review sentiment {:.2}, search interest {:.1}",
                    dish.sentiment, dish.trend
                ),
            ),
            ("Weaknesses", "Supply chain stability still needs assessment".to_string()),
            (
                "Opportunities",
                format!(
                    "Regional income of {} per household supports spending",
                    economy.income
                ),
            ),
            ("Threats", "Competitors may copy the dish quickly".to_string()),
        ],
    )
}

#[must_use]
pub fn four_p(dish: &DishCandidate) -> FrameworkSection {
    FrameworkSection::new(
        TEMPLATED_SECTIONS[1],
        [
            (
                "Product",
                format!("{} made fresh in-store, adapted to local taste", dish.name),
            ),
            ("Price", "Mid-range pricing with delivery bundle discounts".to_string()),
            ("Place", "Dine-in and delivery channels".to_string()),
            ("Promotion", "Social media and local influencer campaigns".to_string()),
        ],
    )
}

#[must_use]
pub fn pest() -> FrameworkSection {
    FrameworkSection::new(
        TEMPLATED_SECTIONS[2],
        [
            ("Politics", "Strict food safety regulation".to_string()),
            ("Economy", "Consumer spending is recovering".to_string()),
            ("Social", "Growing interest in light, cooling dishes".to_string()),
            ("Technology", "Delivery platforms and smart kitchens are spreading".to_string()),
        ],
    )
}

/// The three templated sections for a dish
#[must_use]
pub fn templated_sections(dish: &DishCandidate, economy: &EconomicProfile) -> Vec<FrameworkSection> {
    vec![swot(dish, economy), four_p(dish), pest()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dish() -> DishCandidate {
        DishCandidate {
            name: "Malatang".to_string(),
            score: 12.3,
            sentiment: 0.42,
            trend: 37.25,
        }
    }

    #[test]
    fn test_swot_interpolates_signals() {
        let section = swot(&dish(), &EconomicProfile::for_location("Seattle"));
        assert_eq!(section.title, "SWOT");
        assert_eq!(section.entries[0].label, "Strengths");
        assert!(section.entries[0].text.contains("0.42"));
        assert!(section.entries[0].text.contains("37.2") || section.entries[0].text.contains("37.3"));
        assert!(section.entries[2].text.contains("80000"));
    }

    #[test]
    fn test_four_p_names_the_dish() {
        let section = four_p(&dish());
        assert!(section.entries[0].text.starts_with("Malatang"));
        let labels: Vec<_> = section.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Product", "Price", "Place", "Promotion"]);
    }

    #[test]
    fn test_templated_sections_order() {
        let sections = templated_sections(&dish(), &EconomicProfile::for_location("x"));
        let titles: Vec<_> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, TEMPLATED_SECTIONS.to_vec());
        assert_eq!(titles, vec!["SWOT", "4P", "PEST"]);
    }

    #[test]
    fn test_catalog_has_twenty_unique_names() {
        let mut names = FRAMEWORK_CATALOG.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 20);
    }
}
