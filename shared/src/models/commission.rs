//! Category commission defaults (the service type table)

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Rate applied when neither the business nor its category has one
pub const FALLBACK_COMMISSION_RATE: Decimal = Decimal::TEN;

/// Built-in category rates, used until the `service_types` table says otherwise
const BUILTIN_RATES: &[(&str, i64, u32)] = &[
    ("Beauty & Wellness", 85, 1),
    ("Home Services", 10, 0),
    ("Health & Fitness", 75, 1),
    ("Automotive", 12, 0),
    ("Education & Tutoring", 6, 0),
    ("Events & Entertainment", 15, 0),
    ("Pet Care", 9, 0),
    ("Professional Services", 11, 0),
];

/// Mapping of category name to default commission percentage
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct CommissionDefaults {
    rates: HashMap<String, Decimal>,
}

impl CommissionDefaults {
    pub fn new(rates: HashMap<String, Decimal>) -> Self {
        Self { rates }
    }

    /// The platform's built-in category table
    pub fn builtin() -> Self {
        let rates = BUILTIN_RATES
            .iter()
            .map(|(name, num, scale)| (name.to_string(), Decimal::new(*num, *scale)))
            .collect();
        Self { rates }
    }

    /// Category lookup is case-insensitive on the trimmed name
    pub fn rate_for(&self, category: &str) -> Option<Decimal> {
        let wanted = category.trim();
        self.rates
            .iter()
            .find(|(name, _)| name.trim().eq_ignore_ascii_case(wanted))
            .map(|(_, rate)| *rate)
    }

    /// Replaces any entry whose name differs only in case
    pub fn insert(&mut self, category: impl Into<String>, rate: Decimal) {
        let category = category.into();
        let wanted = category.trim().to_string();
        self.rates.retain(|name, _| !name.trim().eq_ignore_ascii_case(&wanted));
        self.rates.insert(category, rate);
    }

    /// Entries in `other` win over entries already present
    pub fn merge(mut self, other: CommissionDefaults) -> Self {
        for (category, rate) in other.rates {
            self.insert(category, rate);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Later entries replace earlier ones that differ only in case
impl FromIterator<(String, Decimal)> for CommissionDefaults {
    fn from_iter<I: IntoIterator<Item = (String, Decimal)>>(iter: I) -> Self {
        let mut defaults = Self::default();
        for (category, rate) in iter {
            defaults.insert(category, rate);
        }
        defaults
    }
}
