//! Forecasting models for daily price series
//!
//! A [`ForecastModel`] is fitted on the two-column `(ds, y)` table produced
//! by [`crate::data::project`] and yields a [`TrainedForecastModel`] that
//! extends the history by a number of calendar days.

use crate::data::{ToDataFrame, DS, Y};
use crate::error::{ForecastError, Result};
use chrono::{Days, NaiveDate};
use polars::prelude::*;
use std::fmt::Debug;

pub mod additive;

/// Observed `(ds, y)` pairs a model was fitted on
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl History {
    /// Create a history from strictly ascending dates and their values
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::ValidationError(format!(
                "Dates length ({}) doesn't match values length ({})",
                dates.len(),
                values.len()
            )));
        }
        if !dates.windows(2).all(|w| w[0] < w[1]) {
            return Err(ForecastError::DataError(
                "History dates must be strictly increasing".to_string(),
            ));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::DataError(
                "History values must be finite".to_string(),
            ));
        }

        Ok(Self { dates, values })
    }

    /// Read the `ds` (date) and `y` (numeric) columns of a table
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let ds = df
            .column(DS)
            .map_err(|_| ForecastError::DataError(format!("missing '{}' column", DS)))?;
        let y = df
            .column(Y)
            .map_err(|_| ForecastError::DataError(format!("missing '{}' column", Y)))?;

        let dates = ds
            .as_materialized_series()
            .date()
            .map_err(|_| ForecastError::DataError(format!("column '{}' must hold dates", DS)))?
            .as_date_iter()
            .map(|d| {
                d.ok_or_else(|| ForecastError::DataError(format!("null in '{}' column", DS)))
            })
            .collect::<Result<Vec<_>>>()?;

        let y = y.as_materialized_series().cast(&DataType::Float64)?;
        let values = y
            .f64()?
            .into_iter()
            .map(|v| v.ok_or_else(|| ForecastError::DataError(format!("null in '{}' column", Y))))
            .collect::<Result<Vec<_>>>()?;

        Self::new(dates, values)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}

/// One calendar day of model output
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRow {
    pub ds: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
    pub trend: f64,
    pub trend_lower: f64,
    pub trend_upper: f64,
    /// Seasonal contributions, in the table's component order
    pub seasonal: Vec<f64>,
}

/// Model output over the history and the forecast horizon
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastTable {
    rows: Vec<ForecastRow>,
    components: Vec<String>,
    history_end: NaiveDate,
}

impl ForecastTable {
    /// Create a table, checking that rows are contiguous calendar days
    pub fn new(
        rows: Vec<ForecastRow>,
        components: Vec<String>,
        history_end: NaiveDate,
    ) -> Result<Self> {
        let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
            return Err(ForecastError::DataError(
                "Forecast table has no rows".to_string(),
            ));
        };
        if !rows
            .windows(2)
            .all(|w| w[0].ds.checked_add_days(Days::new(1)) == Some(w[1].ds))
        {
            return Err(ForecastError::DataError(
                "Forecast dates must be contiguous calendar days".to_string(),
            ));
        }
        if history_end < first.ds || history_end > last.ds {
            return Err(ForecastError::ValidationError(format!(
                "History end {} lies outside the table ({} to {})",
                history_end, first.ds, last.ds
            )));
        }
        if rows.iter().any(|r| r.seasonal.len() != components.len()) {
            return Err(ForecastError::ValidationError(format!(
                "Every row must carry {} seasonal values",
                components.len()
            )));
        }

        Ok(Self {
            rows,
            components,
            history_end,
        })
    }

    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Names of the seasonal components, e.g. `weekly`, `yearly`
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Last observed date; rows after it are the forecast
    pub fn history_end(&self) -> NaiveDate {
        self.history_end
    }

    /// Number of rows past the last observed date
    pub fn horizon_days(&self) -> usize {
        self.rows.iter().filter(|r| r.ds > self.history_end).count()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.ds)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.ds)
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.ds).collect()
    }

    pub fn yhat(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.yhat).collect()
    }

    pub fn yhat_lower(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.yhat_lower).collect()
    }

    pub fn yhat_upper(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.yhat_upper).collect()
    }

    pub fn trend(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.trend).collect()
    }

    /// Values of one seasonal component per row
    pub fn component(&self, name: &str) -> Option<Vec<f64>> {
        let index = self.components.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|r| r.seasonal[index]).collect())
    }

    /// The last `n` rows
    pub fn tail(&self, n: usize) -> &[ForecastRow] {
        &self.rows[self.rows.len().saturating_sub(n)..]
    }

    /// The first `n` rows
    pub fn head(&self, n: usize) -> &[ForecastRow] {
        &self.rows[..n.min(self.rows.len())]
    }
}

impl ToDataFrame for ForecastTable {
    fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns = vec![
            Column::new(DS.into(), self.dates()),
            Column::new("trend".into(), self.trend()),
            Column::new(
                "trend_lower".into(),
                self.rows.iter().map(|r| r.trend_lower).collect::<Vec<f64>>(),
            ),
            Column::new(
                "trend_upper".into(),
                self.rows.iter().map(|r| r.trend_upper).collect::<Vec<f64>>(),
            ),
        ];
        for (i, name) in self.components.iter().enumerate() {
            columns.push(Column::new(
                name.as_str().into(),
                self.rows.iter().map(|r| r.seasonal[i]).collect::<Vec<f64>>(),
            ));
        }
        columns.push(Column::new("yhat_lower".into(), self.yhat_lower()));
        columns.push(Column::new("yhat_upper".into(), self.yhat_upper()));
        columns.push(Column::new("yhat".into(), self.yhat()));

        Ok(DataFrame::new(columns)?)
    }
}

/// Shape of one seasonal component over a single period
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalProfile {
    pub name: String,
    pub period_days: f64,
    /// Position labels, e.g. weekday names or calendar days
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Model output for every calendar day from the first observation
    /// through `periods` days past the last one
    fn predict(&self, periods: usize) -> Result<ForecastTable>;

    /// Observations the model was fitted on
    fn history(&self) -> &History;

    /// Names of the seasonal components the model uses
    fn seasonalities(&self) -> Vec<String>;

    /// One period of a seasonal component, if the model has it
    fn seasonal_profile(&self, name: &str) -> Option<SeasonalProfile>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be fitted on a `(ds, y)` table
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Fit the model on a table with a date column `ds` and values `y`
    fn fit(&self, history: &DataFrame) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn row(d: u32, yhat: f64) -> ForecastRow {
        ForecastRow {
            ds: day(d),
            yhat,
            yhat_lower: yhat - 1.0,
            yhat_upper: yhat + 1.0,
            trend: yhat,
            trend_lower: yhat,
            trend_upper: yhat,
            seasonal: vec![0.0],
        }
    }

    #[test]
    fn test_history_from_dataframe() {
        let df = df!(
            DS => vec![day(2), day(3), day(4)],
            Y => vec![1.0, 2.0, 3.0],
        )
        .unwrap();

        let history = History::from_dataframe(&df).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history.last_date(), Some(day(4)));
        assert_eq!(history.values(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_history_accepts_integer_values() {
        let df = df!(
            DS => vec![day(2), day(3)],
            Y => vec![1i64, 2],
        )
        .unwrap();

        assert_eq!(History::from_dataframe(&df).unwrap().values(), &[1.0, 2.0]);
    }

    #[test]
    fn test_history_requires_columns() {
        let df = df!("Date" => vec![day(2)], "Close" => vec![1.0]).unwrap();
        assert!(matches!(
            History::from_dataframe(&df),
            Err(ForecastError::DataError(_))
        ));
    }

    #[test]
    fn test_history_rejects_unsorted_dates() {
        assert!(History::new(vec![day(3), day(2)], vec![1.0, 2.0]).is_err());
    }

    #[test]
    fn test_table_requires_contiguous_days() {
        let components = vec!["weekly".to_string()];
        assert!(ForecastTable::new(vec![row(1, 1.0), row(3, 2.0)], components.clone(), day(1)).is_err());
        assert!(ForecastTable::new(Vec::new(), components, day(1)).is_err());
    }

    #[test]
    fn test_table_horizon_and_previews() {
        let rows = (1..=10).map(|d| row(d, d as f64)).collect();
        let table = ForecastTable::new(rows, vec!["weekly".to_string()], day(7)).unwrap();

        assert_eq!(table.horizon_days(), 3);
        assert_eq!(table.tail(2)[0].ds, day(9));
        assert_eq!(table.head(20).len(), 10);
        assert_eq!(table.component("weekly").map(|c| c.len()), Some(10));
        assert!(table.component("yearly").is_none());

        let df = table.to_dataframe().unwrap();
        assert_eq!(df.height(), 10);
        let names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "ds",
                "trend",
                "trend_lower",
                "trend_upper",
                "weekly",
                "yhat_lower",
                "yhat_upper",
                "yhat"
            ]
        );
    }
}
