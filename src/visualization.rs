//! Chart Selector
//!
//! Picks a chart from the shape of the result and the wording of the question.
//! The rules are checked in order and the first match wins:
//!
//! 1. empty result -> no chart
//! 2. `date` column + "trend" / "over time" / "daily" -> line chart over `date`
//! 3. item column + "compare" / "top" / "vs" -> bar chart over the item column
//! 4. anything else -> no chart
//!
//! The y axis is the first numeric column. If there is none the rule yields no
//! chart.

use crate::execution::ResultSet;
use serde::Serialize;
use tracing::debug;

const TREND_KEYWORDS: &[&str] = &["trend", "over time", "daily"];
const COMPARISON_KEYWORDS: &[&str] = &["compare", "top", "vs"];
const DATE_COLUMN: &str = "date";
const ITEM_COLUMNS: &[&str] = &["item_id", "product_id"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Line,
    Bar,
}

/// Chart type plus axis bindings. Rendering is left to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chart {
    pub chart_type: ChartType,
    pub title: String,
    pub x: String,
    pub y: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChartSelector;

impl ChartSelector {
    pub fn new() -> Self {
        Self
    }

    pub fn select(&self, results: &ResultSet, question: &str) -> Option<Chart> {
        if results.is_empty() {
            return None;
        }

        let q = question.to_lowercase();
        let chart = if results.has_column(DATE_COLUMN) && mentions_any(&q, TREND_KEYWORDS) {
            axis_chart(results, ChartType::Line, "Trend", DATE_COLUMN)
        } else if let Some(item) = ITEM_COLUMNS.iter().find(|c| results.has_column(c)) {
            if mentions_any(&q, COMPARISON_KEYWORDS) {
                axis_chart(results, ChartType::Bar, "Comparison", item)
            } else {
                None
            }
        } else {
            None
        };

        debug!("Chart decision: {:?}", chart.as_ref().map(|c| c.chart_type));
        chart
    }
}

fn mentions_any(question: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| question.contains(k))
}

fn axis_chart(results: &ResultSet, chart_type: ChartType, title: &str, x: &str) -> Option<Chart> {
    let y = results.first_numeric_column()?;
    Some(Chart {
        chart_type,
        title: title.to_string(),
        x: x.to_string(),
        y: y.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::SqlValue;

    fn daily_sales() -> ResultSet {
        ResultSet::new(
            vec!["date".into(), "ad_sales".into(), "clicks".into()],
            vec![
                vec![SqlValue::Text("2025-06-01".into()), SqlValue::Real(10.0), SqlValue::Integer(4)],
                vec![SqlValue::Text("2025-06-02".into()), SqlValue::Real(12.0), SqlValue::Integer(6)],
            ],
        )
    }

    fn per_item() -> ResultSet {
        ResultSet::new(
            vec!["item_id".into(), "total_sales".into()],
            vec![
                vec![SqlValue::Integer(5), SqlValue::Real(200.5)],
                vec![SqlValue::Integer(7), SqlValue::Real(40.0)],
            ],
        )
    }

    #[test]
    fn empty_result_never_charts() {
        let empty = ResultSet::new(vec!["date".into(), "ad_sales".into()], vec![]);
        let selector = ChartSelector::new();
        assert_eq!(selector.select(&empty, "show the daily trend"), None);
        assert_eq!(selector.select(&empty, "compare top items"), None);
    }

    #[test]
    fn trend_question_with_date_gives_line_chart() {
        let chart = ChartSelector::new().select(&daily_sales(), "Show the ad sales trend").unwrap();
        assert_eq!(chart.chart_type, ChartType::Line);
        assert_eq!(chart.title, "Trend");
        assert_eq!(chart.x, "date");
        assert_eq!(chart.y, "ad_sales");
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        let chart = ChartSelector::new().select(&daily_sales(), "Clicks OVER TIME please");
        assert_eq!(chart.map(|c| c.chart_type), Some(ChartType::Line));
    }

    #[test]
    fn compare_question_with_item_id_gives_bar_chart() {
        let chart = ChartSelector::new().select(&per_item(), "Compare total sales of items").unwrap();
        assert_eq!(chart.chart_type, ChartType::Bar);
        assert_eq!(chart.title, "Comparison");
        assert_eq!(chart.x, "item_id");
        assert_eq!(chart.y, "item_id");
    }

    #[test]
    fn product_id_counts_as_item_column() {
        let rs = ResultSet::new(
            vec!["product_id".into(), "units".into()],
            vec![vec![SqlValue::Text("A-1".into()), SqlValue::Integer(3)]],
        );
        let chart = ChartSelector::new().select(&rs, "top products").unwrap();
        assert_eq!(chart.x, "product_id");
        assert_eq!(chart.y, "units");
    }

    #[test]
    fn trend_rule_wins_over_comparison_rule() {
        let rs = ResultSet::new(
            vec!["date".into(), "item_id".into(), "ad_spend".into()],
            vec![vec![SqlValue::Text("2025-06-01".into()), SqlValue::Integer(5), SqlValue::Real(3.5)]],
        );
        let chart = ChartSelector::new().select(&rs, "compare the daily spend").unwrap();
        assert_eq!(chart.chart_type, ChartType::Line);
    }

    #[test]
    fn no_keyword_means_no_chart() {
        assert_eq!(ChartSelector::new().select(&per_item(), "What is the total sales for item 5?"), None);
        assert_eq!(ChartSelector::new().select(&daily_sales(), "list sales by date"), None);
    }

    #[test]
    fn no_numeric_column_falls_through_to_no_chart() {
        let rs = ResultSet::new(
            vec!["date".into(), "message".into()],
            vec![vec![SqlValue::Text("2025-06-01".into()), SqlValue::Text("ok".into())]],
        );
        assert_eq!(ChartSelector::new().select(&rs, "eligibility trend"), None);
    }

    #[test]
    fn chart_serializes_with_lowercase_type() {
        let chart = ChartSelector::new().select(&daily_sales(), "daily sales").unwrap();
        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["chart_type"], "line");
        assert_eq!(json["x"], "date");
    }
}
