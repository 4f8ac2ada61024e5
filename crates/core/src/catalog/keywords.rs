use serde::{Deserialize, Serialize};

/// One category and the keywords that suggest it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRow {
    pub category: String,
    pub keywords: Vec<String>,
    /// The row names one merchant or a narrow group of them (`amazon`, `airlines`). Such rows
    /// also refine domain matches, whose retailer otherwise carries a single category.
    #[serde(default)]
    pub merchant_specific: bool,
}

// Built-in table used when a catalog document does not ship its own `keywords` section.
// Substring matching: keep entries long enough not to fire inside unrelated words.
const BUILTIN_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "grocery",
        &[
            "grocery", "groceries", "supermarket", "grocer", "kroger", "safeway", "publix",
            "trader joe", "whole foods", "wegmans", "aldi", "instacart",
        ],
    ),
    (
        "dining",
        &[
            "restaurant", "pizza", "sushi", "burger", "cafe", "coffee", "doordash", "grubhub",
            "ubereats", "uber eats", "mcdonalds", "starbucks", "chipotle",
        ],
    ),
    (
        "travel",
        &[
            "hotel", "flight", "airline", "vacation", "cruise", "expedia", "booking.com",
            "airbnb", "vrbo", "marriott", "hilton", "delta", "united airlines", "southwest",
            "american airlines",
        ],
    ),
    (
        "gas",
        &[
            "gas station", "gasoline", "fuel", "shell", "exxon", "chevron", "mobil", "speedway",
        ],
    ),
    ("rideshare", &["uber", "lyft", "taxi"]),
    ("transit", &["metro", "subway", "amtrak", "transit", "train ticket"]),
    (
        "streaming",
        &[
            "netflix", "hulu", "disney+", "spotify", "apple music", "hbo", "youtube premium",
        ],
    ),
    ("entertainment", &["movie", "theater", "theatre", "cinema", "concert"]),
    ("online_retail", &["amazon", "ebay", "etsy", "newegg", "online shop"]),
    (
        "electronics",
        &["electronics", "best buy", "bestbuy", "laptop", "computer", "apple store"],
    ),
    (
        "home_improvement",
        &["home depot", "homedepot", "lowe's", "lowes", "ace hardware", "menards", "hardware"],
    ),
    ("drugstores", &["pharmacy", "cvs", "walgreens", "rite aid", "duane reade"]),
    ("wholesale_clubs", &["costco", "sam's club", "bj's"]),
    ("department_stores", &["macy's", "nordstrom", "jcpenney", "kohl's"]),
    ("phone", &["verizon", "at&t", "t-mobile"]),
    ("insurance", &["insurance", "geico", "state farm", "progressive", "allstate"]),
    ("utilities", &["electric bill", "water bill", "internet bill", "utility"]),
];

// Categories named after merchants, as used by rotating bonus calendars.
const BUILTIN_MERCHANT_KEYWORDS: &[(&str, &[&str])] = &[
    ("amazon", &["amazon", "primevideo"]),
    ("walmart", &["walmart"]),
    ("target", &["target"]),
    ("costco", &["costco"]),
    ("paypal", &["paypal"]),
    ("apple", &["apple store", "apple.com", "itunes"]),
    (
        "airlines",
        &[
            "airline", "delta", "united airlines", "southwest", "american airlines", "jetblue",
            "alaska air",
        ],
    ),
    ("hotels", &["hotel", "marriott", "hilton", "hyatt", "motel"]),
    (
        "car_rentals",
        &["car rental", "rental car", "hertz", "avis", "enterprise rent", "budget rent"],
    ),
    ("fitness", &["gym", "fitness", "peloton", "yoga studio"]),
];

/// Ordered category -> keywords table. Row order decides category order in a classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeywordTable {
    rows: Vec<KeywordRow>,
}

impl KeywordTable {
    pub fn new(rows: Vec<KeywordRow>) -> Self {
        let rows = rows
            .into_iter()
            .filter_map(|row| {
                let category = row.category.trim().to_lowercase();
                let keywords: Vec<String> = row
                    .keywords
                    .iter()
                    .map(|k| k.trim().to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect();
                (!category.is_empty() && !keywords.is_empty()).then_some(KeywordRow {
                    category,
                    keywords,
                    merchant_specific: row.merchant_specific,
                })
            })
            .collect();
        Self { rows }
    }

    pub fn builtin() -> Self {
        let general = BUILTIN_KEYWORDS.iter().map(|row| (row, false));
        let merchant = BUILTIN_MERCHANT_KEYWORDS.iter().map(|row| (row, true));
        Self::new(
            general
                .chain(merchant)
                .map(|((category, keywords), merchant_specific)| KeywordRow {
                    category: category.to_string(),
                    keywords: keywords.iter().map(|k| k.to_string()).collect(),
                    merchant_specific,
                })
                .collect(),
        )
    }

    pub fn rows(&self) -> &[KeywordRow] {
        &self.rows
    }

    /// Every category with at least one keyword present in any haystack, deduplicated.
    /// Haystacks are expected to be lowercased already.
    pub fn match_categories(&self, haystacks: &[&str]) -> Vec<String> {
        self.matching(haystacks, |_| true)
    }

    /// Like [`Self::match_categories`], restricted to merchant-specific rows.
    pub fn match_merchant_categories(&self, haystacks: &[&str]) -> Vec<String> {
        self.matching(haystacks, |row| row.merchant_specific)
    }

    fn matching(&self, haystacks: &[&str], include: impl Fn(&KeywordRow) -> bool) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for row in self.rows.iter().filter(|row| include(row)) {
            if out.contains(&row.category) {
                continue;
            }
            let hit = row
                .keywords
                .iter()
                .any(|k| haystacks.iter().any(|h| h.contains(k.as_str())));
            if hit {
                out.push(row.category.clone());
            }
        }
        out
    }
}
