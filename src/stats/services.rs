use tracing::debug;

use super::dto::{CategoryCount, CombinedData, PriceRangeCount, Statistics};
use super::month::Month;
use super::repo;
use crate::db::Store;

/// Histogram bucket. `max: None` is unbounded above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    pub min: u32,
    pub max: Option<u32>,
}

pub const PRICE_RANGES: [PriceRange; 10] = [
    PriceRange { min: 0, max: Some(100) },
    PriceRange { min: 101, max: Some(200) },
    PriceRange { min: 201, max: Some(300) },
    PriceRange { min: 301, max: Some(400) },
    PriceRange { min: 401, max: Some(500) },
    PriceRange { min: 501, max: Some(600) },
    PriceRange { min: 601, max: Some(700) },
    PriceRange { min: 701, max: Some(800) },
    PriceRange { min: 801, max: Some(900) },
    PriceRange { min: 901, max: None },
];

impl PriceRange {
    /// Bounds are inclusive for whole prices. A fractional price between two
    /// buckets (e.g. 100.5) falls into the lower one, so the buckets cover
    /// every non-negative price exactly once.
    pub fn contains(&self, price: f64) -> bool {
        let lower = price >= f64::from(self.min);
        let upper = match self.max {
            Some(max) => price < f64::from(max + 1),
            None => true,
        };
        lower && upper
    }

    pub fn label(&self) -> String {
        match self.max {
            Some(max) => format!("{} - {}", self.min, max),
            None => format!("{} - Infinity", self.min),
        }
    }
}

/// Counts `prices` per bucket, emitting all ten buckets in fixed order.
pub fn bucket_prices(prices: &[f64]) -> Vec<PriceRangeCount> {
    PRICE_RANGES
        .iter()
        .map(|range| PriceRangeCount {
            price_range: range.label(),
            count: prices.iter().filter(|p| range.contains(**p)).count() as i64,
        })
        .collect()
}

pub async fn totals_for_month(store: &Store, month: Month) -> anyhow::Result<Statistics> {
    let stats = repo::statistics_for_month(store.pool(), month).await?;
    debug!(%month, ?stats, "month totals");
    Ok(stats)
}

pub async fn histogram_for_month(
    store: &Store,
    month: Month,
) -> anyhow::Result<Vec<PriceRangeCount>> {
    let prices = repo::prices_for_month(store.pool(), month).await?;
    debug!(%month, matched = prices.len(), "month histogram");
    Ok(bucket_prices(&prices))
}

pub async fn category_breakdown_for_month(
    store: &Store,
    month: Month,
) -> anyhow::Result<Vec<CategoryCount>> {
    let rows = repo::categories_for_month(store.pool(), month).await?;
    debug!(%month, categories = rows.len(), "month categories");
    Ok(rows)
}

/// Runs the three aggregations concurrently; any failure fails the whole.
pub async fn combined_for_month(store: &Store, month: Month) -> anyhow::Result<CombinedData> {
    let (statistics, bar_chart_data, pie_chart_data) = tokio::try_join!(
        totals_for_month(store, month),
        histogram_for_month(store, month),
        category_breakdown_for_month(store, month),
    )?;
    Ok(CombinedData {
        statistics,
        bar_chart_data,
        pie_chart_data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products::{seed::sample_records, TransactionRecord};

    fn month(n: u8) -> Month {
        Month::new(n).unwrap()
    }

    async fn seeded_store() -> Store {
        let store = Store::in_memory().await.unwrap();
        store.seed(&sample_records()).await.unwrap();
        store
    }

    fn record(id: i64, price: f64, category: &str, sold: bool, date: &str) -> TransactionRecord {
        TransactionRecord {
            id,
            title: format!("item {id}"),
            price,
            description: String::new(),
            category: category.into(),
            image: String::new(),
            sold,
            date_of_sale: date.into(),
        }
    }

    #[test]
    fn labels_follow_bucket_order() {
        let labels: Vec<String> = PRICE_RANGES.iter().map(PriceRange::label).collect();
        assert_eq!(labels[0], "0 - 100");
        assert_eq!(labels[3], "301 - 400");
        assert_eq!(labels[9], "901 - Infinity");
    }

    #[test]
    fn bucket_edges_are_inclusive() {
        let counts = bucket_prices(&[0.0, 100.0, 101.0, 200.0, 900.0, 901.0, 50_000.0]);
        let by_label: Vec<(&str, i64)> = counts
            .iter()
            .map(|c| (c.price_range.as_str(), c.count))
            .collect();
        assert_eq!(by_label[0], ("0 - 100", 2));
        assert_eq!(by_label[1], ("101 - 200", 2));
        assert_eq!(by_label[8], ("801 - 900", 1));
        assert_eq!(by_label[9], ("901 - Infinity", 2));
    }

    #[test]
    fn fractional_prices_between_buckets_are_counted_once() {
        let prices = [100.5, 200.99, 900.01];
        let counts = bucket_prices(&prices);
        let total: i64 = counts.iter().map(|c| c.count).sum();
        assert_eq!(total, prices.len() as i64);
        assert_eq!(counts[0].count, 1);
        assert_eq!(counts[1].count, 1);
        assert_eq!(counts[8].count, 1);
    }

    #[test]
    fn empty_input_yields_ten_zero_buckets() {
        let counts = bucket_prices(&[]);
        assert_eq!(counts.len(), 10);
        assert!(counts.iter().all(|c| c.count == 0));
    }

    #[tokio::test]
    async fn november_totals_match_sample() {
        let store = seeded_store().await;
        let stats = totals_for_month(&store, month(11)).await.unwrap();
        assert_eq!(
            stats,
            Statistics {
                total_sale_amount: 329.85,
                total_sold_items: 0,
                total_not_sold_items: 1,
            }
        );
    }

    #[tokio::test]
    async fn november_histogram_has_single_hit() {
        let store = seeded_store().await;
        let bars = histogram_for_month(&store, month(11)).await.unwrap();
        assert_eq!(bars.len(), 10);
        for bar in &bars {
            let expected = if bar.price_range == "301 - 400" { 1 } else { 0 };
            assert_eq!(bar.count, expected, "bucket {}", bar.price_range);
        }
    }

    #[tokio::test]
    async fn july_categories_match_sample() {
        let store = seeded_store().await;
        let pie = category_breakdown_for_month(&store, month(7)).await.unwrap();
        assert_eq!(
            pie,
            vec![CategoryCount {
                category: "men's clothing".into(),
                count: 1
            }]
        );
    }

    #[tokio::test]
    async fn empty_month_yields_zeroes() {
        let store = seeded_store().await;
        let combined = combined_for_month(&store, month(1)).await.unwrap();
        assert_eq!(combined.statistics.total_sale_amount, 0.0);
        assert_eq!(combined.statistics.total_sold_items, 0);
        assert_eq!(combined.statistics.total_not_sold_items, 0);
        assert_eq!(combined.bar_chart_data.len(), 10);
        assert!(combined.bar_chart_data.iter().all(|b| b.count == 0));
        assert!(combined.pie_chart_data.is_empty());
    }

    #[tokio::test]
    async fn sale_amount_includes_unsold_and_counts_add_up() {
        let store = Store::in_memory().await.unwrap();
        store
            .seed(&[
                record(1, 10.0, "books", true, "2023-03-01T08:00:00+00:00"),
                record(2, 150.25, "books", false, "2023-03-15T08:00:00-04:00"),
                record(3, 999.0, "toys", true, "2023-03-31T23:59:59+05:30"),
                record(4, 20.0, "toys", false, "2023-04-01T00:00:00+00:00"),
            ])
            .await
            .unwrap();

        let combined = combined_for_month(&store, month(3)).await.unwrap();
        let stats = &combined.statistics;
        assert!((stats.total_sale_amount - 1159.25).abs() < 1e-9);
        assert_eq!(stats.total_sold_items, 2);
        assert_eq!(stats.total_not_sold_items, 1);

        let matched = stats.total_sold_items + stats.total_not_sold_items;
        let bucketed: i64 = combined.bar_chart_data.iter().map(|b| b.count).sum();
        let categorized: i64 = combined.pie_chart_data.iter().map(|c| c.count).sum();
        assert_eq!(bucketed, matched);
        assert_eq!(categorized, matched);
        assert_eq!(
            combined.pie_chart_data,
            vec![
                CategoryCount { category: "books".into(), count: 2 },
                CategoryCount { category: "toys".into(), count: 1 },
            ]
        );
    }

    #[tokio::test]
    async fn month_follows_the_recorded_offset_not_utc() {
        let store = Store::in_memory().await.unwrap();
        store
            .seed(&[
                // 2021-10-31T20:30Z in UTC
                record(1, 10.0, "books", true, "2021-11-01T02:00:00+05:30"),
                // 2021-12-01T03:00Z in UTC
                record(2, 20.0, "toys", false, "2021-11-30T22:00:00-05:00"),
            ])
            .await
            .unwrap();

        let november = totals_for_month(&store, month(11)).await.unwrap();
        assert!((november.total_sale_amount - 30.0).abs() < 1e-9);
        assert_eq!(november.total_sold_items, 1);
        assert_eq!(november.total_not_sold_items, 1);

        for other in [10, 12] {
            let stats = totals_for_month(&store, month(other)).await.unwrap();
            assert_eq!(stats.total_sold_items + stats.total_not_sold_items, 0, "month {other}");
            assert!(histogram_for_month(&store, month(other))
                .await
                .unwrap()
                .iter()
                .all(|b| b.count == 0));
            assert!(category_breakdown_for_month(&store, month(other))
                .await
                .unwrap()
                .is_empty());
        }
    }

    #[tokio::test]
    async fn combined_matches_individual_aggregations() {
        let store = seeded_store().await;
        for n in 1..=12 {
            let m = month(n);
            let combined = combined_for_month(&store, m).await.unwrap();
            assert_eq!(combined.statistics, totals_for_month(&store, m).await.unwrap());
            assert_eq!(combined.bar_chart_data, histogram_for_month(&store, m).await.unwrap());
            assert_eq!(
                combined.pie_chart_data,
                category_breakdown_for_month(&store, m).await.unwrap()
            );
        }
    }

    #[tokio::test]
    async fn closed_store_surfaces_errors() {
        let store = seeded_store().await;
        store.pool().close().await;
        assert!(totals_for_month(&store, month(11)).await.is_err());
        assert!(combined_for_month(&store, month(11)).await.is_err());
    }
}
