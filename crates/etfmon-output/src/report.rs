//! Response payload for a successful analysis.

use etfmon_calc::{Holding, IndexPricePoint, LatestPrice};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status value carried by every successful report.
pub const STATUS_SUCCESS: &str = "success";

/// Everything computed for one uploaded constituent file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtfReport {
    /// Always [`STATUS_SUCCESS`].
    pub status: String,

    /// Latest price per constituent, in upload order.
    pub table_data: Vec<LatestPrice>,

    /// Index level per price-table date, oldest first.
    pub time_series: Vec<IndexPricePoint>,

    /// Largest holdings by value.
    pub top_holdings: Vec<Holding>,
}

impl EtfReport {
    /// Build a successful report.
    pub fn success(
        table_data: Vec<LatestPrice>,
        time_series: Vec<IndexPricePoint>,
        top_holdings: Vec<Holding>,
    ) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            table_data,
            time_series,
            top_holdings,
        }
    }

    /// Most recent index level.
    pub fn latest_level(&self) -> Option<&IndexPricePoint> {
        self.time_series.last()
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Format as ASCII tables for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "\nETF Analysis: {} constituents\n",
            self.table_data.len()
        ));
        if let (Some(first), Some(last)) = (self.time_series.first(), self.time_series.last()) {
            output.push_str(&format!(
                "Period: {} to {} ({} points)\n",
                first.date,
                last.date,
                self.time_series.len()
            ));
            output.push_str(&format!(
                "Index level: {:.4} -> {:.4}\n",
                first.price, last.price
            ));
        }
        output.push_str(&"=".repeat(64));
        output.push('\n');

        output.push_str("\nConstituents:\n");
        output.push_str(&"-".repeat(64));
        output.push('\n');
        output.push_str(&format!(
            "{:<20} {:>12} {:>14}\n",
            "Symbol", "Weight", "Latest Price"
        ));
        output.push_str(&"-".repeat(64));
        output.push('\n');
        for row in &self.table_data {
            output.push_str(&format!(
                "{:<20} {:>11.2}% {:>14.4}\n",
                row.symbol,
                row.weight * 100.0,
                row.latest_price
            ));
        }

        if !self.top_holdings.is_empty() {
            output.push_str("\nTop Holdings:\n");
            output.push_str(&"-".repeat(64));
            output.push('\n');
            output.push_str(&format!(
                "{:<20} {:>12} {:>14} {:>14}\n",
                "Symbol", "Weight", "Latest Price", "Value"
            ));
            output.push_str(&"-".repeat(64));
            output.push('\n');
            for holding in &self.top_holdings {
                output.push_str(&format!(
                    "{:<20} {:>11.2}% {:>14.4} {:>14.4}\n",
                    holding.symbol,
                    holding.weight * 100.0,
                    holding.latest_price,
                    holding.holding_value
                ));
            }
        }

        output.push_str(&"=".repeat(64));
        output.push('\n');

        output
    }
}

impl fmt::Display for EtfReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "ETF report: {} constituents, {} index points",
            self.table_data.len(),
            self.time_series.len()
        )?;
        if let Some(latest) = self.latest_level() {
            writeln!(f, "  Latest level: {:.4} on {}", latest.price, latest.date)?;
        }
        for holding in &self.top_holdings {
            writeln!(f, "  {}: {:.4}", holding.symbol, holding.holding_value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::{fixture, rstest};

    #[fixture]
    fn report() -> EtfReport {
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        EtfReport::success(
            vec![
                LatestPrice {
                    symbol: "A".to_string(),
                    weight: 0.3,
                    latest_price: 104.0,
                },
                LatestPrice {
                    symbol: "E".to_string(),
                    weight: 0.7,
                    latest_price: 154.0,
                },
            ],
            vec![
                IndexPricePoint {
                    date: day(1),
                    price: 135.0,
                },
                IndexPricePoint {
                    date: day(2),
                    price: 136.0,
                },
            ],
            vec![Holding {
                symbol: "E".to_string(),
                weight: 0.7,
                latest_price: 154.0,
                holding_value: 107.8,
            }],
        )
    }

    #[rstest]
    fn test_json_shape(report: EtfReport) {
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["status"], "success");
        assert_eq!(value["table_data"][0]["symbol"], "A");
        assert_eq!(value["table_data"][0]["latest_price"], 104.0);
        assert_eq!(value["time_series"][1]["date"], "2024-01-02");
        assert_eq!(value["top_holdings"][0]["holding_value"], 107.8);
        assert_eq!(value.as_object().unwrap().len(), 4);
    }

    #[rstest]
    fn test_ascii_table(report: EtfReport) {
        let table = report.to_ascii_table();

        assert!(table.contains("ETF Analysis: 2 constituents"));
        assert!(table.contains("Period: 2024-01-01 to 2024-01-02 (2 points)"));
        assert!(table.contains("Top Holdings:"));
        assert!(table.contains("70.00%"));
        assert!(table.contains("107.8000"));
    }

    #[test]
    fn test_ascii_table_without_series() {
        let table = EtfReport::success(vec![], vec![], vec![]).to_ascii_table();

        assert!(!table.contains("Period:"));
        assert!(!table.contains("Top Holdings:"));
    }

    #[rstest]
    fn test_display(report: EtfReport) {
        let display = report.to_string();
        assert!(display.contains("2 constituents, 2 index points"));
        assert!(display.contains("Latest level: 136.0000 on 2024-01-02"));
        assert!(display.contains("E: 107.8000"));
    }
}
