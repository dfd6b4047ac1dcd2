//! Dashboard panel catalogue.

use crate::domain::{ChartKind, Dimension, Measure, View, YearFilter};

/// Every chart the dashboard can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    SalesTrend,
    CategorySales,
    PriceDemand,
    StockLevels,
    RevenueTrend,
    CategoryShare,
    BrandShare,
}

/// Which aggregation feeds a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelSource {
    DateSeries(Measure),
    GroupSums(Dimension, Measure),
    Distribution(Dimension, Measure),
    PriceDemand,
}

const OVERVIEW: [Panel; 5] = [
    Panel::SalesTrend,
    Panel::CategorySales,
    Panel::PriceDemand,
    Panel::StockLevels,
    Panel::RevenueTrend,
];

const SHARES: [Panel; 2] = [Panel::CategoryShare, Panel::BrandShare];

impl Panel {
    pub fn for_view(view: View) -> &'static [Panel] {
        match view {
            View::Overview => &OVERVIEW,
            View::Shares => &SHARES,
        }
    }

    pub fn source(self) -> PanelSource {
        match self {
            Panel::SalesTrend => PanelSource::DateSeries(Measure::UnitsSold),
            Panel::CategorySales => PanelSource::GroupSums(Dimension::Category, Measure::UnitsSold),
            Panel::PriceDemand => PanelSource::PriceDemand,
            Panel::StockLevels => PanelSource::DateSeries(Measure::StockLevels),
            Panel::RevenueTrend => PanelSource::DateSeries(Measure::Revenue),
            Panel::CategoryShare => PanelSource::Distribution(Dimension::Category, Measure::UnitsSold),
            Panel::BrandShare => PanelSource::Distribution(Dimension::Brand, Measure::UnitsSold),
        }
    }

    pub fn kind(self) -> ChartKind {
        match self.source() {
            PanelSource::DateSeries(_) => ChartKind::Line,
            PanelSource::GroupSums(..) => ChartKind::Bar,
            PanelSource::Distribution(..) => ChartKind::Pie,
            PanelSource::PriceDemand => ChartKind::Scatter,
        }
    }

    /// Short machine-friendly name (used in exports).
    pub fn id(self) -> &'static str {
        match self {
            Panel::SalesTrend => "sales-trend",
            Panel::CategorySales => "category-sales",
            Panel::PriceDemand => "price-demand",
            Panel::StockLevels => "stock-levels",
            Panel::RevenueTrend => "revenue-trend",
            Panel::CategoryShare => "category-share",
            Panel::BrandShare => "brand-share",
        }
    }

    fn heading(self) -> &'static str {
        match self {
            Panel::SalesTrend => "Sales Trend Over Time",
            Panel::CategorySales => "Sales by Category",
            Panel::PriceDemand => "Price vs Units Sold",
            Panel::StockLevels => "Stock Levels Over Time",
            Panel::RevenueTrend => "Revenue Trend Over Time",
            Panel::CategoryShare => "Sales Distribution by Category",
            Panel::BrandShare => "Sales Distribution by Brand",
        }
    }

    pub fn title(self, filter: YearFilter) -> String {
        format!("{} ({})", self.heading(), filter.label())
    }

    /// Label of the value axis / column.
    pub fn value_label(self) -> &'static str {
        match self.source() {
            PanelSource::DateSeries(m) | PanelSource::GroupSums(_, m) | PanelSource::Distribution(_, m) => m.label(),
            PanelSource::PriceDemand => Measure::UnitsSold.label(),
        }
    }
}
