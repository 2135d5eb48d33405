use chrono::{Datelike, NaiveDate};
use osdash_core::{order, FilterCriteria, Money, ServiceOrder};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Status substrings (matched against the upper-cased status) that count
/// an order as completed.
const COMPLETED_MARKERS: [&str; 3] = ["CONCRETIZADA", "ENTREGUE", "FINALIZADA"];

/// How many brands the brand breakdown keeps. Lower-ranked brands stay
/// in the totals, only the breakdown is truncated.
const BRAND_BREAKDOWN_LIMIT: usize = 10;

const MONTH_ABBR_PT: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub iso_date: String,
    /// Date as it appeared in the source, for axis labels.
    pub display_date: String,
    pub revenue: Money,
    pub count: u64,
    pub avg_ticket: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    /// `YYYY-MM` bucket key.
    pub key: String,
    /// Short pt-BR label, e.g. `mar/24`.
    pub label: String,
    pub revenue: Money,
    pub count: u64,
    pub avg_ticket: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub label: String,
    pub count: u64,
}

/// Everything the presentation layer needs, derived in one pass.
/// Recreated whole on every call; never patched incrementally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Records passing the filter, in file order. Includes non-entry
    /// rows the aggregates skip, so row display stays faithful.
    pub filtered: Vec<ServiceOrder>,
    pub total_revenue: Money,
    pub total_cost: Money,
    pub net_profit: Money,
    pub count: u64,
    pub completed_count: u64,
    pub avg_ticket: Money,
    pub margin_percent: Decimal,
    pub daily: Vec<DailyPoint>,
    pub monthly: Vec<MonthlyPoint>,
    pub by_status: Vec<BreakdownEntry>,
    pub by_brand: Vec<BreakdownEntry>,
    pub by_origin: Vec<BreakdownEntry>,
}

struct DayBucket {
    display_date: String,
    revenue: Money,
    count: u64,
}

struct MonthBucket {
    sample_date: Option<NaiveDate>,
    revenue: Money,
    count: u64,
}

/// Filters `orders` by `criteria` and folds the qualifying records into
/// a [`Summary`]. Pure function over immutable input; calling it twice
/// with the same arguments yields identical output.
pub fn aggregate(orders: &[ServiceOrder], criteria: &FilterCriteria) -> Summary {
    let filtered: Vec<ServiceOrder> = orders
        .iter()
        .filter(|o| criteria.matches(o))
        .cloned()
        .collect();

    let mut total_revenue = Money::zero();
    let mut total_cost = Money::zero();
    let mut count = 0u64;
    let mut completed_count = 0u64;

    let mut status_count: BTreeMap<String, u64> = BTreeMap::new();
    let mut brand_count: BTreeMap<String, u64> = BTreeMap::new();
    let mut origin_count: BTreeMap<String, u64> = BTreeMap::new();
    let mut days: BTreeMap<String, DayBucket> = BTreeMap::new();
    let mut months: BTreeMap<String, MonthBucket> = BTreeMap::new();

    for o in &filtered {
        if is_non_entry(o) {
            continue;
        }

        total_revenue += o.total_value;
        total_cost += o.cost_value;
        count += 1;

        let upper_status = o.status.to_uppercase();
        if COMPLETED_MARKERS.iter().any(|m| upper_status.contains(m)) {
            completed_count += 1;
        }

        *status_count.entry(o.status.clone()).or_default() += 1;
        *brand_count.entry(o.brand.clone()).or_default() += 1;
        *origin_count.entry(o.origin.clone()).or_default() += 1;

        if !o.iso_date.is_empty() {
            let day = days.entry(o.iso_date.clone()).or_insert_with(|| DayBucket {
                display_date: o.raw_date.clone(),
                revenue: Money::zero(),
                count: 0,
            });
            day.revenue += o.total_value;
            day.count += 1;

            let month_key = o.iso_date[..7].to_string();
            let month = months.entry(month_key).or_insert_with(|| MonthBucket {
                sample_date: o.parsed_date,
                revenue: Money::zero(),
                count: 0,
            });
            month.revenue += o.total_value;
            month.count += 1;
        }
    }

    let net_profit = total_revenue - total_cost;
    let avg_ticket = per_unit(total_revenue, count);
    let margin_percent = if total_revenue.is_zero() {
        Decimal::ZERO
    } else {
        (net_profit.amount() / total_revenue.amount() * Decimal::from(100)).round_dp(2)
    };

    // BTreeMap iteration is already ascending by key.
    let daily = days
        .into_iter()
        .map(|(iso_date, b)| DailyPoint {
            avg_ticket: per_unit(b.revenue, b.count),
            iso_date,
            display_date: b.display_date,
            revenue: b.revenue,
            count: b.count,
        })
        .collect();

    let monthly = months
        .into_iter()
        .map(|(key, b)| MonthlyPoint {
            label: b.sample_date.map(month_label).unwrap_or_else(|| key.clone()),
            avg_ticket: per_unit(b.revenue, b.count),
            key,
            revenue: b.revenue,
            count: b.count,
        })
        .collect();

    let by_brand = {
        let mut entries = breakdown(brand_count);
        entries.truncate(BRAND_BREAKDOWN_LIMIT);
        entries
    };

    Summary {
        filtered,
        total_revenue,
        total_cost,
        net_profit,
        count,
        completed_count,
        avg_ticket,
        margin_percent,
        daily,
        monthly,
        by_status: breakdown(status_count),
        by_brand,
        by_origin: breakdown(origin_count),
    }
}

/// Residual export rows (no value, no status, no date) are shown in the
/// record list but kept out of every sum and count.
fn is_non_entry(o: &ServiceOrder) -> bool {
    o.total_value.is_zero() && o.status == order::UNDEFINED_STATUS && o.raw_date.is_empty()
}

fn per_unit(revenue: Money, count: u64) -> Money {
    if count == 0 {
        Money::zero()
    } else {
        Money::from_decimal(revenue.amount() / Decimal::from(count))
    }
}

fn month_label(date: NaiveDate) -> String {
    format!(
        "{}/{:02}",
        MONTH_ABBR_PT[date.month0() as usize],
        date.year().rem_euclid(100)
    )
}

/// Descending by count; ties keep the alphabetical order the map gave,
/// so output is deterministic.
fn breakdown(counts: BTreeMap<String, u64>) -> Vec<BreakdownEntry> {
    let mut entries: Vec<BreakdownEntry> = counts
        .into_iter()
        .map(|(label, count)| BreakdownEntry { label, count })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use osdash_core::classify_brand;

    fn mk(
        id: usize,
        date: &str,
        total: &str,
        cost: &str,
        status: &str,
        equipment: &str,
        origin: &str,
    ) -> ServiceOrder {
        let parsed_date = (!date.is_empty()).then(|| {
            let parts: Vec<&str> = date.split('/').collect();
            NaiveDate::from_ymd_opt(
                parts[2].parse().unwrap(),
                parts[1].parse().unwrap(),
                parts[0].parse().unwrap(),
            )
            .unwrap()
        });
        ServiceOrder {
            id,
            client: format!("Cliente {id}"),
            total_value: Money::parse_lossy(total),
            cost_value: Money::parse_lossy(cost),
            status: status.to_string(),
            raw_date: date.to_string(),
            parsed_date,
            iso_date: parsed_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            equipment: equipment.to_string(),
            brand: classify_brand(equipment),
            origin: origin.to_string(),
        }
    }

    fn sample() -> Vec<ServiceOrder> {
        vec![
            mk(1, "05/03/2024", "1.500,00", "500,00", "Concretizada", "Iphone 11", "Instagram"),
            mk(2, "05/03/2024", "300,00", "100,00", "Aberta", "Redmi Note 9", "Indicação"),
            mk(3, "10/04/2024", "700,00", "200,00", "Entregue", "Notebook Dell", "Instagram"),
            mk(4, "", "200,00", "50,00", "Orçamento", "Moto G8", "Balcão"),
        ]
    }

    fn money(s: &str) -> Money {
        Money::parse_lossy(s)
    }

    #[test]
    fn totals_and_derived_metrics() {
        let s = aggregate(&sample(), &FilterCriteria::default());
        assert_eq!(s.total_revenue, money("2.700,00"));
        assert_eq!(s.total_cost, money("850,00"));
        assert_eq!(s.net_profit, money("1.850,00"));
        assert_eq!(s.count, 4);
        assert_eq!(s.completed_count, 2); // Concretizada + Entregue
        assert_eq!(s.avg_ticket, money("675,00"));
        // 1850 / 2700 * 100 = 68.5185... rounded to 2dp
        assert_eq!(s.margin_percent, Decimal::new(6852, 2));
    }

    #[test]
    fn daily_buckets_sum_to_total_revenue() {
        let s = aggregate(&sample(), &FilterCriteria::default());
        assert_eq!(s.daily.len(), 2);
        assert_eq!(s.daily[0].iso_date, "2024-03-05");
        assert_eq!(s.daily[0].revenue, money("1.800,00"));
        assert_eq!(s.daily[0].count, 2);
        assert_eq!(s.daily[0].avg_ticket, money("900,00"));
        assert_eq!(s.daily[0].display_date, "05/03/2024");
        assert_eq!(s.daily[1].iso_date, "2024-04-10");
        // The dateless record contributes to totals but to no bucket.
        let bucket_sum = s.daily.iter().fold(Money::zero(), |acc, d| acc + d.revenue);
        assert_eq!(bucket_sum + money("200,00"), s.total_revenue);
    }

    #[test]
    fn monthly_buckets_are_sorted_and_labeled() {
        let s = aggregate(&sample(), &FilterCriteria::default());
        assert_eq!(s.monthly.len(), 2);
        assert_eq!(s.monthly[0].key, "2024-03");
        assert_eq!(s.monthly[0].label, "mar/24");
        assert_eq!(s.monthly[0].revenue, money("1.800,00"));
        assert_eq!(s.monthly[1].key, "2024-04");
        assert_eq!(s.monthly[1].label, "abr/24");
    }

    #[test]
    fn breakdowns_sort_descending_by_count() {
        let s = aggregate(&sample(), &FilterCriteria::default());
        assert_eq!(s.by_origin[0].label, "Instagram");
        assert_eq!(s.by_origin[0].count, 2);
        assert_eq!(s.by_origin.len(), 3);
        assert_eq!(s.by_status.len(), 4);
        assert!(s.by_status.iter().all(|e| e.count == 1));
    }

    #[test]
    fn absent_status_filter_yields_zeroes_not_nan() {
        let criteria = FilterCriteria {
            status: Some("Inexistente".to_string()),
            ..Default::default()
        };
        let s = aggregate(&sample(), &criteria);
        assert_eq!(s.count, 0);
        assert!(s.total_revenue.is_zero());
        assert!(s.avg_ticket.is_zero());
        assert_eq!(s.margin_percent, Decimal::ZERO);
        assert!(s.by_status.is_empty());
        assert!(s.by_brand.is_empty());
        assert!(s.by_origin.is_empty());
        assert!(s.daily.is_empty());
        assert!(s.monthly.is_empty());
        assert!(s.filtered.is_empty());
    }

    #[test]
    fn date_filter_restricts_aggregates() {
        let criteria = FilterCriteria {
            start_date: NaiveDate::from_ymd_opt(2024, 4, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 4, 30),
            ..Default::default()
        };
        let s = aggregate(&sample(), &criteria);
        assert_eq!(s.count, 1);
        assert_eq!(s.total_revenue, money("700,00"));
        assert_eq!(s.filtered.len(), 1);
    }

    #[test]
    fn non_entry_rows_display_but_do_not_count() {
        let mut orders = sample();
        orders.push(mk(9, "", "", "", order::UNDEFINED_STATUS, "", "Balcão"));
        let s = aggregate(&orders, &FilterCriteria::default());
        assert_eq!(s.filtered.len(), 5);
        assert_eq!(s.count, 4);
        assert_eq!(s.total_revenue, money("2.700,00"));
        assert!(s.by_status.iter().all(|e| e.label != order::UNDEFINED_STATUS));
    }

    #[test]
    fn brand_breakdown_truncates_to_top_ten() {
        let mut orders = Vec::new();
        for (i, brand) in [
            "Samsung", "Apple", "Xiaomi", "Motorola", "Lg", "Asus", "Dell", "Hp", "Lenovo",
            "Acer", "Sony", "Positivo",
        ]
        .iter()
        .enumerate()
        {
            let mut o = mk(i, "05/03/2024", "100,00", "10,00", "Aberta", "", "Balcão");
            o.brand = brand.to_string();
            orders.push(o);
        }
        let s = aggregate(&orders, &FilterCriteria::default());
        assert_eq!(s.by_brand.len(), 10);
        // Truncated brands still count toward totals.
        assert_eq!(s.count, 12);
        assert_eq!(s.total_revenue, money("1.200,00"));
    }

    #[test]
    fn aggregation_is_idempotent() {
        let orders = sample();
        let criteria = FilterCriteria {
            origin: Some("Instagram".to_string()),
            ..Default::default()
        };
        assert_eq!(aggregate(&orders, &criteria), aggregate(&orders, &criteria));
    }

    #[test]
    fn source_records_are_not_mutated() {
        let orders = sample();
        let before = orders.clone();
        let _ = aggregate(&orders, &FilterCriteria::default());
        assert_eq!(orders, before);
    }
}
