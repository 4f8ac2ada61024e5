use crate::domain::Card;
use crate::time::Quarter;
use serde::{Deserialize, Serialize};

/// `(issuer_pattern, quarter) -> categories` for cards with rotating bonus categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterlyRow {
    /// Case-insensitive substring of `"{issuer} {card name}"`.
    pub issuer_pattern: String,
    pub quarter: Quarter,
    pub categories: Vec<String>,
}

// Published rotating calendars; refreshed by editing data, not code.
const BUILTIN_CALENDAR: &[(&str, u8, &[&str])] = &[
    ("discover it", 1, &["grocery", "drugstores"]),
    ("discover it", 2, &["gas", "home_improvement"]),
    ("discover it", 3, &["dining", "online_retail"]),
    ("discover it", 4, &["amazon", "target", "walmart"]),
    ("chase freedom", 1, &["grocery", "gas"]),
    ("chase freedom", 2, &["online_retail", "transit"]),
    ("chase freedom", 3, &["dining", "streaming"]),
    ("chase freedom", 4, &["walmart", "amazon", "paypal"]),
    ("citi dividend", 1, &["fitness", "drugstores"]),
    ("citi dividend", 2, &["home_improvement", "utilities"]),
    ("citi dividend", 3, &["airlines", "car_rentals"]),
    ("citi dividend", 4, &["department_stores", "amazon"]),
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuarterlyCalendar {
    rows: Vec<QuarterlyRow>,
}

impl QuarterlyCalendar {
    pub fn new(rows: Vec<QuarterlyRow>) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| QuarterlyRow {
                issuer_pattern: row.issuer_pattern.trim().to_lowercase(),
                quarter: row.quarter,
                categories: row
                    .categories
                    .iter()
                    .map(|c| c.trim().to_lowercase())
                    .filter(|c| !c.is_empty())
                    .collect(),
            })
            .filter(|row| !row.issuer_pattern.is_empty())
            .collect();
        Self { rows }
    }

    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_CALENDAR
                .iter()
                .filter_map(|(pattern, quarter, categories)| {
                    Some(QuarterlyRow {
                        issuer_pattern: pattern.to_string(),
                        quarter: Quarter::new(*quarter)?,
                        categories: categories.iter().map(|c| c.to_string()).collect(),
                    })
                })
                .collect(),
        )
    }

    pub fn rows(&self) -> &[QuarterlyRow] {
        &self.rows
    }

    /// Bonus categories of `card` in `quarter`, across every matching row.
    pub fn categories_for(&self, card: &Card, quarter: Quarter) -> Vec<&str> {
        let haystack = format!("{} {}", card.issuer, card.name).to_lowercase();
        let mut out: Vec<&str> = Vec::new();
        for row in self
            .rows
            .iter()
            .filter(|row| row.quarter == quarter && haystack.contains(&row.issuer_pattern))
        {
            for category in &row.categories {
                if !out.contains(&category.as_str()) {
                    out.push(category);
                }
            }
        }
        out
    }
}
