//! Row classification into completion status and delivery-point category.

use crate::config::{Category, EngineConfig};
use crate::error::EngineResult;
use crate::normalize::{normalize_code, normalize_value};
use crate::resolve::HeaderResolver;
use delivtab_sheet::{CellValue, Sheet};
use serde::Serialize;
use std::collections::HashMap;
use std::iter::Sum;
use std::ops::AddAssign;

/// Completed-task counters for one file (or a sum over files).
///
/// Every completed row lands in exactly one of the four named counters or in
/// `uncategorized`, so the five always add up to `total_completed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub total_completed: u64,
    pub postomat: u64,
    pub pickup_point: u64,
    pub courier_delivery: u64,
    pub pending_order: u64,
    /// Completed rows whose type code is not in the category table
    pub uncategorized: u64,
}

impl CategoryCounts {
    /// Counter for one category.
    pub fn get(&self, category: Category) -> u64 {
        match category {
            Category::Postomat => self.postomat,
            Category::PickupPoint => self.pickup_point,
            Category::CourierDelivery => self.courier_delivery,
            Category::PendingOrder => self.pending_order,
        }
    }

    fn record(&mut self, category: Option<Category>) {
        self.total_completed += 1;
        let counter = match category {
            Some(Category::Postomat) => &mut self.postomat,
            Some(Category::PickupPoint) => &mut self.pickup_point,
            Some(Category::CourierDelivery) => &mut self.courier_delivery,
            Some(Category::PendingOrder) => &mut self.pending_order,
            None => &mut self.uncategorized,
        };
        *counter += 1;
    }
}

impl AddAssign for CategoryCounts {
    fn add_assign(&mut self, other: Self) {
        self.total_completed += other.total_completed;
        self.postomat += other.postomat;
        self.pickup_point += other.pickup_point;
        self.courier_delivery += other.courier_delivery;
        self.pending_order += other.pending_order;
        self.uncategorized += other.uncategorized;
    }
}

impl Sum for CategoryCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |mut acc, counts| {
            acc += counts;
            acc
        })
    }
}

impl<'a> Sum<&'a CategoryCounts> for CategoryCounts {
    fn sum<I: Iterator<Item = &'a CategoryCounts>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Counts completed rows per delivery-point category.
#[derive(Debug, Clone)]
pub struct RowCategorizer<'a> {
    config: &'a EngineConfig,
    completed: String,
    codes: HashMap<String, Category>,
}

impl<'a> RowCategorizer<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        let codes = config
            .categories
            .iter()
            .map(|rule| (normalize_code(&rule.code), rule.category))
            .collect();
        Self {
            config,
            completed: normalize_value(&config.completed_token),
            codes,
        }
    }

    /// Category for a raw address-type value.
    pub fn classify(&self, raw_type: &str) -> Option<Category> {
        self.codes.get(&normalize_code(raw_type)).copied()
    }

    /// True when a raw status value marks the task as completed.
    pub fn is_completed(&self, raw_status: &str) -> bool {
        normalize_value(raw_status) == self.completed
    }

    /// Count a sheet whose headers were normalized by [`HeaderResolver::normalize`].
    ///
    /// Fails when the status or type column cannot be resolved.
    pub fn count(&self, normalized: &Sheet) -> EngineResult<CategoryCounts> {
        let status_column =
            HeaderResolver::resolve(normalized, "status", &self.config.status_candidates)?;
        let type_column = HeaderResolver::resolve(normalized, "type", &self.config.type_candidates)?;

        let status_idx = normalized.column_index(&status_column)?;
        let type_idx = normalized.column_index(&type_column)?;

        let mut counts = CategoryCounts::default();
        for row in normalized.rows() {
            let status = row.get(status_idx).map(CellValue::as_str).unwrap_or_default();
            if !self.is_completed(&status) {
                continue;
            }
            let kind = row.get(type_idx).map(CellValue::as_str).unwrap_or_default();
            counts.record(self.classify(&kind));
        }

        tracing::debug!(
            status = %status_column,
            kind = %type_column,
            completed = counts.total_completed,
            "categorized rows"
        );
        Ok(counts)
    }
}
