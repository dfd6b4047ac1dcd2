//! Aggregation engine: (records, year filter) -> chart-ready summary tables.
//!
//! Every function here is pure. The filter is an explicit argument, the
//! record slice is only borrowed, and each panel builds its own maps, so two
//! panels computed for the same event never share intermediate state.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::domain::{
    ChartKind, DatePoint, Dimension, GroupSum, Measure, SalesRecord, ScatterPoint, Share, SummaryTable, View,
    YearFilter,
};

pub mod panel;

pub use panel::*;

/// Records matching `filter`, in source order.
pub fn filter_records(records: &[SalesRecord], filter: YearFilter) -> impl Iterator<Item = &SalesRecord> {
    records.iter().filter(move |r| filter.matches(r.year))
}

/// Sum `measure` per distinct date, ascending by date.
pub fn series_by_date(records: &[SalesRecord], filter: YearFilter, measure: Measure) -> Vec<DatePoint> {
    let mut sums: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for r in filter_records(records, filter) {
        *sums.entry(r.date).or_insert(0.0) += r.measure(measure);
    }
    sums.into_iter()
        .map(|(date, value)| DatePoint { date, value })
        .collect()
}

/// Sum `measure` per distinct category/brand.
///
/// Output is sorted by key so repeated calls render identically; callers may
/// re-sort for presentation.
pub fn sums_by_dimension(
    records: &[SalesRecord],
    filter: YearFilter,
    dimension: Dimension,
    measure: Measure,
) -> Vec<GroupSum> {
    let mut sums: HashMap<&str, f64> = HashMap::new();
    for r in filter_records(records, filter) {
        *sums.entry(r.dimension(dimension)).or_insert(0.0) += r.measure(measure);
    }

    let mut out: Vec<GroupSum> = sums
        .into_iter()
        .map(|(key, value)| GroupSum {
            key: key.to_string(),
            value,
        })
        .collect();
    out.sort_by(|a, b| a.key.cmp(&b.key));
    out
}

/// Per-key sums plus each key's fraction of the total.
///
/// When the total is zero every fraction is zero.
pub fn distribution_by_dimension(
    records: &[SalesRecord],
    filter: YearFilter,
    dimension: Dimension,
    measure: Measure,
) -> Vec<Share> {
    let sums = sums_by_dimension(records, filter, dimension, measure);
    let total: f64 = sums.iter().map(|g| g.value).sum();

    sums.into_iter()
        .map(|g| Share {
            fraction: if total != 0.0 { g.value / total } else { 0.0 },
            key: g.key,
            value: g.value,
        })
        .collect()
}

/// One (price, units_sold, category) point per filtered record.
pub fn scatter_points(records: &[SalesRecord], filter: YearFilter) -> Vec<ScatterPoint> {
    filter_records(records, filter)
        .map(|r| ScatterPoint {
            price: r.price,
            units_sold: r.units_sold,
            category: r.category.clone(),
        })
        .collect()
}

/// All tables of the overview view for one filter value.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardTables {
    pub filter: YearFilter,
    pub sales_trend: Vec<DatePoint>,
    pub category_sales: Vec<GroupSum>,
    pub price_demand: Vec<ScatterPoint>,
    pub stock_levels: Vec<DatePoint>,
    pub revenue_trend: Vec<DatePoint>,
}

/// All tables of the shares view for one filter value.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareTables {
    pub filter: YearFilter,
    pub by_category: Vec<Share>,
    pub by_brand: Vec<Share>,
}

/// Compute every overview table with the same filter value.
///
/// Library-level entry point returning typed tables. The dashboard and the
/// report go through [`compute_view`] instead; both must yield the same
/// tables for the same filter (see `bundles_match_view_panels`).
pub fn aggregate(records: &[SalesRecord], filter: YearFilter) -> DashboardTables {
    DashboardTables {
        filter,
        sales_trend: series_by_date(records, filter, Measure::UnitsSold),
        category_sales: sums_by_dimension(records, filter, Dimension::Category, Measure::UnitsSold),
        price_demand: scatter_points(records, filter),
        stock_levels: series_by_date(records, filter, Measure::StockLevels),
        revenue_trend: series_by_date(records, filter, Measure::Revenue),
    }
}

/// Compute both share tables with the same filter value.
///
/// Typed counterpart of `compute_view(View::Shares, ..)`.
pub fn aggregate_shares(records: &[SalesRecord], filter: YearFilter) -> ShareTables {
    ShareTables {
        filter,
        by_category: distribution_by_dimension(records, filter, Dimension::Category, Measure::UnitsSold),
        by_brand: distribution_by_dimension(records, filter, Dimension::Brand, Measure::UnitsSold),
    }
}

/// A computed panel: what to draw, and the table to draw it from.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelOutput {
    pub panel: Panel,
    pub kind: ChartKind,
    pub title: String,
    pub table: SummaryTable,
}

/// Compute one panel's table. Independent of every other panel.
pub fn compute_panel(panel: Panel, records: &[SalesRecord], filter: YearFilter) -> PanelOutput {
    let table = match panel.source() {
        PanelSource::DateSeries(measure) => SummaryTable::Series(series_by_date(records, filter, measure)),
        PanelSource::GroupSums(dimension, measure) => {
            SummaryTable::Groups(sums_by_dimension(records, filter, dimension, measure))
        }
        PanelSource::Distribution(dimension, measure) => {
            SummaryTable::Shares(distribution_by_dimension(records, filter, dimension, measure))
        }
        PanelSource::PriceDemand => SummaryTable::Scatter(scatter_points(records, filter)),
    };

    PanelOutput {
        panel,
        kind: panel.kind(),
        title: panel.title(filter),
        table,
    }
}

/// Compute every panel of `view` with the same filter value.
pub fn compute_view(view: View, records: &[SalesRecord], filter: YearFilter) -> Vec<PanelOutput> {
    Panel::for_view(view)
        .iter()
        .map(|&panel| compute_panel(panel, records, filter))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Datelike;

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn rec(date: NaiveDate, category: &str, brand: &str, units: f64) -> SalesRecord {
        SalesRecord::new(date, category, brand, 10.0, units, units * 3.0, units * 10.0)
    }

    fn scenario() -> Vec<SalesRecord> {
        vec![
            rec(d(2023, 1, 1), "Dress", "Zara", 10.0),
            rec(d(2023, 1, 1), "Shirt", "H&M", 5.0),
            rec(d(2024, 1, 1), "Dress", "Zara", 7.0),
        ]
    }

    fn as_map(groups: &[GroupSum]) -> BTreeMap<String, f64> {
        groups.iter().map(|g| (g.key.clone(), g.value)).collect()
    }

    #[test]
    fn category_sums_respect_year_filter() {
        let records = scenario();

        let y2023 = sums_by_dimension(&records, YearFilter::Year(2023), Dimension::Category, Measure::UnitsSold);
        assert_eq!(
            as_map(&y2023),
            BTreeMap::from([("Dress".to_string(), 10.0), ("Shirt".to_string(), 5.0)])
        );

        let all = sums_by_dimension(&records, YearFilter::All, Dimension::Category, Measure::UnitsSold);
        assert_eq!(
            as_map(&all),
            BTreeMap::from([("Dress".to_string(), 17.0), ("Shirt".to_string(), 5.0)])
        );
    }

    #[test]
    fn filtered_tables_only_contain_matching_year() {
        let records = scenario();
        let tables = aggregate(&records, YearFilter::Year(2024));
        assert!(tables.sales_trend.iter().all(|p| p.date.year() == 2024));
        assert_eq!(tables.price_demand.len(), 1);
    }

    #[test]
    fn all_filter_covers_every_record_once() {
        let records = scenario();
        let tables = aggregate(&records, YearFilter::All);
        assert_eq!(tables.price_demand.len(), records.len());
        let total: f64 = tables.category_sales.iter().map(|g| g.value).sum();
        assert_eq!(total, 22.0);
    }

    #[test]
    fn date_series_merges_same_day_and_preserves_total() {
        let records = vec![
            rec(d(2023, 1, 3), "Dress", "Zara", 4.0),
            rec(d(2023, 1, 1), "Dress", "Zara", 1.0),
            rec(d(2023, 1, 1), "Shirt", "H&M", 2.0),
            rec(d(2023, 1, 2), "Shirt", "H&M", 3.0),
        ];
        let series = series_by_date(&records, YearFilter::All, Measure::UnitsSold);
        let dates: Vec<NaiveDate> = series.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d(2023, 1, 1), d(2023, 1, 2), d(2023, 1, 3)]);
        assert_eq!(series[0].value, 3.0);

        let partial: f64 = series.iter().map(|p| p.value).sum();
        let whole: f64 = records.iter().map(|r| r.units_sold).sum();
        assert_eq!(partial, whole);
    }

    #[test]
    fn empty_filter_result_gives_empty_tables() {
        let records = scenario();
        let tables = aggregate(&records, YearFilter::Year(1999));
        assert!(tables.sales_trend.is_empty());
        assert!(tables.category_sales.is_empty());
        assert!(tables.price_demand.is_empty());

        let shares = aggregate_shares(&records, YearFilter::Year(1999));
        assert!(shares.by_brand.is_empty());
    }

    #[test]
    fn aggregate_is_idempotent() {
        let records = scenario();
        let before = records.clone();
        let a = aggregate(&records, YearFilter::Year(2023));
        let b = aggregate(&records, YearFilter::Year(2023));
        assert_eq!(a, b);
        assert_eq!(records, before);
    }

    #[test]
    fn shares_sum_to_one() {
        let records = scenario();
        let shares = distribution_by_dimension(&records, YearFilter::All, Dimension::Brand, Measure::UnitsSold);
        let total: f64 = shares.iter().map(|s| s.fraction).sum();
        assert!((total - 1.0).abs() < 1e-12);
        let zara = shares.iter().find(|s| s.key == "Zara").unwrap();
        assert!((zara.fraction - 17.0 / 22.0).abs() < 1e-12);
    }

    #[test]
    fn zero_total_gives_zero_fractions() {
        let records = vec![rec(d(2023, 1, 1), "Dress", "Zara", 0.0)];
        let shares = distribution_by_dimension(&records, YearFilter::All, Dimension::Category, Measure::UnitsSold);
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].fraction, 0.0);
    }

    #[test]
    fn compute_view_builds_every_panel_with_one_filter() {
        let records = scenario();
        let panels = compute_view(View::Overview, &records, YearFilter::Year(2023));
        assert_eq!(panels.len(), 5);
        assert!(panels.iter().all(|p| p.title.ends_with("(2023)")));

        let shares = compute_view(View::Shares, &records, YearFilter::All);
        assert_eq!(shares.len(), 2);
        assert!(shares.iter().all(|p| p.kind == ChartKind::Pie));
    }

    #[test]
    fn bundles_match_view_panels() {
        let records = scenario();
        for filter in [YearFilter::All, YearFilter::Year(2023), YearFilter::Year(2024), YearFilter::Year(1999)] {
            let tables = aggregate(&records, filter);
            let overview: Vec<SummaryTable> = compute_view(View::Overview, &records, filter)
                .into_iter()
                .map(|p| p.table)
                .collect();
            assert_eq!(
                overview,
                vec![
                    SummaryTable::Series(tables.sales_trend),
                    SummaryTable::Groups(tables.category_sales),
                    SummaryTable::Scatter(tables.price_demand),
                    SummaryTable::Series(tables.stock_levels),
                    SummaryTable::Series(tables.revenue_trend),
                ]
            );

            let shares = aggregate_shares(&records, filter);
            let view: Vec<SummaryTable> = compute_view(View::Shares, &records, filter)
                .into_iter()
                .map(|p| p.table)
                .collect();
            assert_eq!(
                view,
                vec![SummaryTable::Shares(shares.by_category), SummaryTable::Shares(shares.by_brand)]
            );
        }
    }
}
