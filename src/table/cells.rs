//! Cell role classification.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::ops::RangeInclusive;

/// Semantic role of a table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CellRole {
    /// A fiscal year inside the accepted window
    Year,
    /// Currency code or symbol with an optional unit marker
    CurrencyUnit,
    /// Grouped integer or dash placeholder
    Amount,
    /// Label starting with "total"
    Total,
    /// None of the above
    Unclassified,
}

impl CellRole {
    const CLASSIFIED: [CellRole; 4] = [
        CellRole::Year,
        CellRole::CurrencyUnit,
        CellRole::Amount,
        CellRole::Total,
    ];

    fn bit(self) -> u8 {
        match self {
            CellRole::Year => 1,
            CellRole::CurrencyUnit => 1 << 1,
            CellRole::Amount => 1 << 2,
            CellRole::Total => 1 << 3,
            CellRole::Unclassified => 0,
        }
    }
}

/// The set of roles carried by one cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CellRoles(u8);

impl CellRoles {
    /// Add a role.
    pub fn insert(&mut self, role: CellRole) {
        self.0 |= role.bit();
    }

    /// Check for a role. `Unclassified` holds exactly for the empty set.
    pub fn contains(&self, role: CellRole) -> bool {
        match role {
            CellRole::Unclassified => self.is_empty(),
            _ => self.0 & role.bit() != 0,
        }
    }

    /// No role at all.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Roles in declaration order; `[Unclassified]` for the empty set.
    pub fn iter(&self) -> impl Iterator<Item = CellRole> + '_ {
        let unclassified = self.is_empty().then_some(CellRole::Unclassified);
        CellRole::CLASSIFIED
            .into_iter()
            .filter(|role| self.contains(*role))
            .chain(unclassified)
    }
}

impl FromIterator<CellRole> for CellRoles {
    fn from_iter<I: IntoIterator<Item = CellRole>>(iter: I) -> Self {
        let mut roles = CellRoles::default();
        for role in iter {
            roles.insert(role);
        }
        roles
    }
}

impl fmt::Display for CellRoles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.iter().map(|r| format!("{:?}", r)).collect();
        write!(f, "{}", names.join("|"))
    }
}

/// Currency and unit captured from a currency-unit cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyUnit {
    /// Currency code or symbol, e.g. "HKD" or "HK$"
    pub currency: String,
    /// Unit marker as written, e.g. "'000" (may be empty)
    pub unit: String,
}

/// Pure regex-based cell classifier.
#[derive(Debug, Clone)]
pub struct CellClassifier {
    years: RangeInclusive<i32>,
    currency_regex: Regex,
    amount_regex: Regex,
    total_regex: Regex,
}

impl CellClassifier {
    /// Create a classifier accepting years in `years`.
    pub fn new(years: RangeInclusive<i32>) -> Self {
        Self {
            years,
            currency_regex: Regex::new(
                r"^\(?(?P<currency>HK\$|US\$|S\$|HKD|USD|RMB|CNY|RM|\$|¥)\s?(?P<unit>(?:\W?0{3})*|\W?mil(?:lion)?)\)*$",
            )
            .unwrap(),
            amount_regex: Regex::new(r"^-?\d{1,3}(?:\W\d{3})*$|^[-–—]+$").unwrap(),
            total_regex: Regex::new(r"(?i)^total\b").unwrap(),
        }
    }

    /// Accepted year window.
    pub fn years(&self) -> &RangeInclusive<i32> {
        &self.years
    }

    /// All roles of a cell.
    pub fn classify(&self, cell: &str) -> CellRoles {
        let mut roles = CellRoles::default();
        if self.is_year(cell) {
            roles.insert(CellRole::Year);
        }
        if self.is_currency_unit(cell) {
            roles.insert(CellRole::CurrencyUnit);
        }
        if self.is_amount(cell) {
            roles.insert(CellRole::Amount);
        }
        if self.is_total(cell) {
            roles.insert(CellRole::Total);
        }
        roles
    }

    /// The most specific role of a cell.
    pub fn role(&self, cell: &str) -> CellRole {
        self.classify(cell)
            .iter()
            .next()
            .unwrap_or(CellRole::Unclassified)
    }

    /// The trimmed cell is a year inside the window.
    pub fn is_year(&self, cell: &str) -> bool {
        let cell = cell.trim();
        cell.len() == 4 && cell.parse::<i32>().is_ok_and(|y| self.years.contains(&y))
    }

    /// Currency code or symbol, optionally followed by a unit marker.
    pub fn is_currency_unit(&self, cell: &str) -> bool {
        self.currency_regex.is_match(cell.trim())
    }

    /// Grouped integer or dash placeholder.
    pub fn is_amount(&self, cell: &str) -> bool {
        self.amount_regex.is_match(cell.trim())
    }

    /// Label starting with the word "total".
    pub fn is_total(&self, cell: &str) -> bool {
        self.total_regex.is_match(cell.trim())
    }

    /// Currency and unit of a currency-unit cell.
    pub fn currency_unit(&self, cell: &str) -> Option<CurrencyUnit> {
        let caps = self.currency_regex.captures(cell.trim())?;
        Some(CurrencyUnit {
            currency: caps.name("currency")?.as_str().to_string(),
            unit: caps.name("unit").map_or("", |m| m.as_str()).to_string(),
        })
    }

    /// Value of an amount cell; dash placeholders count as zero.
    pub fn amount(&self, cell: &str) -> Option<i64> {
        let cell = cell.trim();
        if !self.amount_regex.is_match(cell) {
            return None;
        }
        let digits: String = cell.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return Some(0);
        }
        let value: i64 = digits.parse().ok()?;
        Some(if cell.starts_with('-') { -value } else { value })
    }
}
