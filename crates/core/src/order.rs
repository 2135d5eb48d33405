use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::money::Money;

/// Sentinel used when the report has no client column.
pub const UNKNOWN_CLIENT: &str = "Desconhecido";
/// Sentinel used when the report has no status column.
pub const UNDEFINED_STATUS: &str = "Indefinido";
/// Sentinel used when the report has no acquisition-channel column.
pub const UNINFORMED_ORIGIN: &str = "Não Informado";

/// "All" options shown first in every filter selector.
pub const ALL_STATUSES: &str = "Todos";
pub const ALL_BRANDS: &str = "Todas";
pub const ALL_ORIGINS: &str = "Todas";

/// One service order, as normalized from one data line of the report.
/// Every record stands on its own; cell-level problems degrade to the
/// defaults above instead of failing the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceOrder {
    /// Positional line index within one parse. Stable per file, not a
    /// durable identifier.
    pub id: usize,
    pub client: String,
    pub total_value: Money,
    pub cost_value: Money,
    pub status: String,
    /// Date text exactly as found in the source, possibly empty.
    pub raw_date: String,
    pub parsed_date: Option<NaiveDate>,
    /// Canonical `YYYY-MM-DD`, or empty when the date is unparseable.
    pub iso_date: String,
    pub equipment: String,
    pub brand: String,
    pub origin: String,
}

/// User-selected constraints. `None` means unconstrained; date bounds
/// are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub brand: Option<String>,
    pub origin: Option<String>,
}

impl FilterCriteria {
    pub fn matches(&self, order: &ServiceOrder) -> bool {
        // A set start bound excludes dateless records; a set end bound
        // alone keeps them. This mirrors lexical comparison against the
        // empty ISO string in the source report tooling.
        if let Some(start) = self.start_date {
            match order.parsed_date {
                Some(d) if d >= start => {}
                _ => return false,
            }
        }
        if let Some(end) = self.end_date {
            if let Some(d) = order.parsed_date {
                if d > end {
                    return false;
                }
            }
        }
        if let Some(ref status) = self.status {
            if order.status != *status {
                return false;
            }
        }
        if let Some(ref brand) = self.brand {
            if order.brand != *brand {
                return false;
            }
        }
        if let Some(ref origin) = self.origin {
            if order.origin != *origin {
                return false;
            }
        }
        true
    }
}

/// Distinct observed values for each filter selector, "all" sentinel
/// first, remainder sorted ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub statuses: Vec<String>,
    pub brands: Vec<String>,
    pub origins: Vec<String>,
}

impl FilterOptions {
    pub fn from_orders(orders: &[ServiceOrder]) -> Self {
        let mut statuses = BTreeSet::new();
        let mut brands = BTreeSet::new();
        let mut origins = BTreeSet::new();

        for order in orders {
            if !order.status.is_empty() {
                statuses.insert(order.status.clone());
            }
            if !order.brand.is_empty() {
                brands.insert(order.brand.clone());
            }
            if !order.origin.is_empty() {
                origins.insert(order.origin.clone());
            }
        }

        let with_sentinel = |sentinel: &str, set: BTreeSet<String>| {
            let mut values = vec![sentinel.to_string()];
            values.extend(set);
            values
        };

        FilterOptions {
            statuses: with_sentinel(ALL_STATUSES, statuses),
            brands: with_sentinel(ALL_BRANDS, brands),
            origins: with_sentinel(ALL_ORIGINS, origins),
        }
    }
}
