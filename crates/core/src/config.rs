//! Static configuration of the engine.
//!
//! Candidate header labels, the address-type code table, the target metric
//! and the site-to-code map are plain data. They are built once, checked with
//! [`EngineConfig::validate`] and then borrowed by every component, so tests
//! can swap in any alternative configuration.

use crate::error::{EngineError, EngineResult};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Delivery-point category assigned from an address-type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Automated parcel locker
    Postomat,
    /// Staffed pickup/drop-off office
    PickupPoint,
    /// Courier-handled delivery
    CourierDelivery,
    /// Outstanding order/request entry
    PendingOrder,
}

impl Category {
    /// Every category, in report order.
    pub const ALL: [Category; 4] = [
        Category::Postomat,
        Category::PickupPoint,
        Category::CourierDelivery,
        Category::PendingOrder,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Postomat => "postomat",
            Category::PickupPoint => "pickup_point",
            Category::CourierDelivery => "courier_delivery",
            Category::PendingOrder => "pending_order",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the address-type code table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub code: String,
    pub category: Category,
}

impl CategoryRule {
    pub fn new(code: impl Into<String>, category: Category) -> Self {
        Self {
            code: code.into(),
            category,
        }
    }
}

/// The metric looked up per site in last-mile workbooks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricSpec {
    /// Human-readable metric header as it usually appears
    pub label: String,
    /// Word stems whose presence marks a header as the metric
    pub keywords: Vec<String>,
    /// Minimum number of keywords a header must contain
    pub min_keyword_hits: usize,
}

impl Default for MetricSpec {
    fn default() -> Self {
        Self {
            label: "Доля доставок последней мили в срок".to_string(),
            keywords: ["доля", "доставк", "последн", "мил", "срок"]
                .into_iter()
                .map(String::from)
                .collect(),
            min_keyword_hits: 3,
        }
    }
}

/// Ordered mapping from site name to its canonical site code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteCodeMap(IndexMap<String, String>);

impl SiteCodeMap {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            entries
                .into_iter()
                .map(|(site, code)| (site.into(), code.into()))
                .collect(),
        )
    }

    /// Iterate `(site, code)` pairs in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(site, code)| (site.as_str(), code.as_str()))
    }

    /// Site codes in configuration order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.0.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for SiteCodeMap {
    fn default() -> Self {
        Self::new([
            ("Люберцы", "MSK650"),
            ("Мытищи", "MSK963"),
            ("Подольск", "MSK1125"),
            ("Химки", "MSK2469"),
        ])
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Acceptable labels for the task-status column, in priority order
    pub status_candidates: Vec<String>,
    /// Acceptable labels for the address-type column, in priority order
    pub type_candidates: Vec<String>,
    /// Status value that marks a task as completed
    pub completed_token: String,
    /// Address-type code table
    pub categories: Vec<CategoryRule>,
    pub metric: MetricSpec,
    pub sites: SiteCodeMap,
    /// Shape of a site code, used when no column contains a configured code
    pub code_pattern: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            status_candidates: ["статус задания", "статус", "статус_задания"]
                .into_iter()
                .map(String::from)
                .collect(),
            type_candidates: ["тип адреса", "тип_адреса", "тип точки", "тип_точки", "тип"]
                .into_iter()
                .map(String::from)
                .collect(),
            completed_token: "выполнено".to_string(),
            categories: vec![
                CategoryRule::new("П", Category::Postomat),
                CategoryRule::new("ПВЗ", Category::PickupPoint),
                CategoryRule::new("Д", Category::CourierDelivery),
                CategoryRule::new("З", Category::PendingOrder),
            ],
            metric: MetricSpec::default(),
            sites: SiteCodeMap::default(),
            code_pattern: r"^[A-Z]{2,5}\d{2,6}$".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load a configuration file; YAML for `.yaml`/`.yml`, JSON otherwise.
    ///
    /// Keys missing from the file keep their default values.
    pub fn from_path<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("cannot read {}: {e}", path.display())))?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        let config: Self = if is_yaml {
            serde_yaml::from_str(&text)
                .map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))?
        } else {
            serde_json::from_str(&text)
                .map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Check the contracts every component relies on.
    pub fn validate(&self) -> EngineResult<()> {
        if self.status_candidates.is_empty() {
            return Err(EngineError::invalid_config("status candidate list is empty"));
        }
        if self.type_candidates.is_empty() {
            return Err(EngineError::invalid_config("type candidate list is empty"));
        }
        for (field, candidates) in [
            ("status", &self.status_candidates),
            ("type", &self.type_candidates),
        ] {
            if candidates
                .iter()
                .any(|c| crate::normalize::normalize_label(c).is_empty())
            {
                return Err(EngineError::invalid_config(format!(
                    "{field} candidate list contains a blank entry"
                )));
            }
        }
        if self.completed_token.trim().is_empty() {
            return Err(EngineError::invalid_config("completed token is empty"));
        }
        if self.categories.is_empty() {
            return Err(EngineError::invalid_config("category table is empty"));
        }

        let mut seen = HashSet::new();
        for rule in &self.categories {
            let code = crate::normalize::normalize_code(&rule.code);
            if code.is_empty() {
                return Err(EngineError::invalid_config("category code is empty"));
            }
            if !seen.insert(code.clone()) {
                return Err(EngineError::invalid_config(format!(
                    "duplicate category code '{code}'"
                )));
            }
        }

        if self.metric.label.trim().is_empty() {
            return Err(EngineError::invalid_config("metric label is empty"));
        }
        if self
            .metric
            .keywords
            .iter()
            .any(|k| crate::normalize::compact_label(k).is_empty())
        {
            return Err(EngineError::invalid_config("metric keyword is blank"));
        }
        if self.metric.min_keyword_hits == 0 {
            return Err(EngineError::invalid_config(
                "metric keyword threshold must be at least 1",
            ));
        }
        if self.sites.is_empty() {
            return Err(EngineError::invalid_config("site code map is empty"));
        }
        self.code_regex()?;

        Ok(())
    }

    /// Compile [`EngineConfig::code_pattern`].
    pub fn code_regex(&self) -> EngineResult<Regex> {
        Regex::new(&self.code_pattern).map_err(|e| {
            EngineError::invalid_config(format!("invalid code pattern '{}': {e}", self.code_pattern))
        })
    }
}
