//! Additive trend + seasonality model
//!
//! `y(t) = g(t) + Σ s_k(t) + ε`, where `g` is a piecewise-linear trend with
//! slope changes at fixed changepoints and each `s_k` is a Fourier series.
//! All coefficients are estimated jointly by ridge least squares on the
//! scaled series. The ridge weights play the role of the priors: a small
//! `changepoint_prior_scale` keeps the trend stiff, a large
//! `seasonality_prior_scale` leaves the seasonal terms nearly free.
//!
//! Forecast uncertainty combines observation noise at the residual level
//! with simulated trend changes in the future: new changepoints arrive at
//! the rate seen in the history, with Laplace-distributed slope changes
//! scaled like the fitted ones.

use crate::error::{ForecastError, Result};
use crate::models::{
    ForecastModel, ForecastRow, ForecastTable, History, SeasonalProfile, TrainedForecastModel,
};
use chrono::{Datelike, Days, NaiveDate};
use polars::prelude::DataFrame;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal as NoiseDistribution, Poisson};
use serde::{Deserialize, Serialize};
use series_math::fourier::fourier_features;
use series_math::stats::{max_abs, mean_abs, quantile, std_dev};
use series_math::{ridge_least_squares, Matrix};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, info};

/// Days from 0001-01-01 to 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Smallest noise variance used when weighting the priors
const MIN_NOISE_VARIANCE: f64 = 1e-6;

const YEARLY_PERIOD: f64 = 365.25;
const WEEKLY_PERIOD: f64 = 7.0;

/// Minimum number of observations to fit
pub const MIN_OBSERVATIONS: usize = 2;

fn default_changepoints() -> usize {
    25
}

fn default_changepoint_range() -> f64 {
    0.8
}

fn default_changepoint_prior_scale() -> f64 {
    0.05
}

fn default_seasonality_prior_scale() -> f64 {
    10.0
}

fn default_yearly_order() -> usize {
    10
}

fn default_weekly_order() -> usize {
    3
}

fn default_interval_width() -> f64 {
    0.8
}

fn default_uncertainty_samples() -> usize {
    1000
}

fn default_seed() -> u64 {
    42
}

/// Settings of [`AdditiveModel`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdditiveConfig {
    /// Number of potential changepoints
    #[serde(default = "default_changepoints")]
    pub changepoints: usize,
    /// Share of the history in which changepoints are placed
    #[serde(default = "default_changepoint_range")]
    pub changepoint_range: f64,
    #[serde(default = "default_changepoint_prior_scale")]
    pub changepoint_prior_scale: f64,
    #[serde(default = "default_seasonality_prior_scale")]
    pub seasonality_prior_scale: f64,
    /// Force yearly seasonality on or off; unset decides from the history span
    pub yearly_seasonality: Option<bool>,
    /// Force weekly seasonality on or off; unset decides from the history span
    pub weekly_seasonality: Option<bool>,
    #[serde(default = "default_yearly_order")]
    pub yearly_order: usize,
    #[serde(default = "default_weekly_order")]
    pub weekly_order: usize,
    /// Probability mass inside the `yhat_lower..yhat_upper` band
    #[serde(default = "default_interval_width")]
    pub interval_width: f64,
    /// Simulated trend paths per forecast; 0 keeps only the noise band
    #[serde(default = "default_uncertainty_samples")]
    pub uncertainty_samples: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for AdditiveConfig {
    fn default() -> Self {
        Self {
            changepoints: default_changepoints(),
            changepoint_range: default_changepoint_range(),
            changepoint_prior_scale: default_changepoint_prior_scale(),
            seasonality_prior_scale: default_seasonality_prior_scale(),
            yearly_seasonality: None,
            weekly_seasonality: None,
            yearly_order: default_yearly_order(),
            weekly_order: default_weekly_order(),
            interval_width: default_interval_width(),
            uncertainty_samples: default_uncertainty_samples(),
            seed: default_seed(),
        }
    }
}

impl AdditiveConfig {
    fn validate(&self) -> Result<()> {
        if !(self.changepoint_range > 0.0 && self.changepoint_range <= 1.0) {
            return Err(ForecastError::InvalidParameter(
                "Changepoint range must be in (0, 1]".to_string(),
            ));
        }
        if !(self.changepoint_prior_scale > 0.0 && self.changepoint_prior_scale.is_finite()) {
            return Err(ForecastError::InvalidParameter(
                "Changepoint prior scale must be positive".to_string(),
            ));
        }
        if !(self.seasonality_prior_scale > 0.0 && self.seasonality_prior_scale.is_finite()) {
            return Err(ForecastError::InvalidParameter(
                "Seasonality prior scale must be positive".to_string(),
            ));
        }
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(ForecastError::InvalidParameter(
                "Interval width must be in (0, 1)".to_string(),
            ));
        }
        if self.yearly_order == 0 || self.weekly_order == 0 {
            return Err(ForecastError::InvalidParameter(
                "Fourier order must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Additive trend + seasonality forecaster
#[derive(Debug, Clone, Default)]
pub struct AdditiveModel {
    config: AdditiveConfig,
}

impl AdditiveModel {
    /// Create a model, validating the settings
    pub fn new(config: AdditiveConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AdditiveConfig {
        &self.config
    }
}

/// A fitted Fourier seasonality
#[derive(Debug, Clone)]
struct SeasonalTerm {
    name: &'static str,
    period: f64,
    order: usize,
    /// Column offset in the design matrix
    offset: usize,
    coefficients: Vec<f64>,
}

impl SeasonalTerm {
    /// Scaled contribution at an absolute day number
    fn value_at(&self, day: f64) -> Result<f64> {
        let features = fourier_features(&[day], self.period, self.order)?;
        Ok(features
            .row(0)
            .iter()
            .zip(&self.coefficients)
            .map(|(x, b)| x * b)
            .sum())
    }
}

fn day_number(date: NaiveDate) -> f64 {
    (date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE) as f64
}

/// Changepoint locations on the scaled time axis
///
/// Evenly spaced over the first `range` share of the observations, never
/// more than there are observations to separate them.
fn place_changepoints(t: &[f64], count: usize, range: f64) -> Vec<f64> {
    let hist_size = (t.len() as f64 * range).floor() as usize;
    let count = count.min(hist_size.saturating_sub(1));
    if count == 0 {
        return Vec::new();
    }

    let last = (hist_size - 1) as f64;
    (1..=count)
        .map(|k| {
            let index = (k as f64 * last / count as f64).round() as usize;
            t[index]
        })
        .collect()
}

fn variance(values: &[f64]) -> Result<f64> {
    Ok(std_dev(values)?.powi(2))
}

impl ForecastModel for AdditiveModel {
    type Trained = TrainedAdditiveModel;

    fn fit(&self, history: &DataFrame) -> Result<Self::Trained> {
        let history = History::from_dataframe(history)?;
        let n = history.len();
        if n < MIN_OBSERVATIONS {
            return Err(ForecastError::InsufficientHistory {
                required: MIN_OBSERVATIONS,
                actual: n,
            });
        }

        let days: Vec<f64> = history.dates().iter().map(|d| day_number(*d)).collect();
        let start = days[0];
        let span = days[n - 1] - start;
        let t: Vec<f64> = days.iter().map(|d| (d - start) / span).collect();

        let y_scale = match max_abs(history.values()) {
            s if s > 0.0 => s,
            _ => 1.0,
        };
        let y: Vec<f64> = history.values().iter().map(|v| v / y_scale).collect();

        let changepoints = place_changepoints(&t, self.config.changepoints, self.config.changepoint_range);

        let wants = |forced: Option<bool>, min_span: f64| forced.unwrap_or(span >= min_span);
        let mut seasonal: Vec<(&'static str, f64, usize)> = Vec::new();
        if wants(self.config.yearly_seasonality, 2.0 * 365.0) {
            seasonal.push(("yearly", YEARLY_PERIOD, self.config.yearly_order));
        }
        if wants(self.config.weekly_seasonality, 14.0) {
            seasonal.push(("weekly", WEEKLY_PERIOD, self.config.weekly_order));
        }

        // Columns: intercept, slope, one hinge per changepoint, Fourier terms
        let trend_cols = 2 + changepoints.len();
        let mut design = Matrix::zeros(n, trend_cols);
        for (row, &ti) in t.iter().enumerate() {
            design.set(row, 0, 1.0);
            design.set(row, 1, ti);
            for (j, &s) in changepoints.iter().enumerate() {
                design.set(row, 2 + j, (ti - s).max(0.0));
            }
        }
        let mut terms = Vec::with_capacity(seasonal.len());
        for (name, period, order) in seasonal {
            let offset = design.cols();
            design = design.hstack(&fourier_features(&days, period, order)?)?;
            terms.push(SeasonalTerm {
                name,
                period,
                order,
                offset,
                coefficients: Vec::new(),
            });
        }

        let penalties = |noise_variance: f64| -> Vec<f64> {
            let delta = noise_variance / self.config.changepoint_prior_scale.powi(2);
            let beta = noise_variance / self.config.seasonality_prior_scale.powi(2);
            (0..design.cols())
                .map(|col| match col {
                    0 | 1 => 0.0,
                    c if c < trend_cols => delta,
                    _ => beta,
                })
                .collect()
        };

        // First pass weights the priors by the spread of the data itself,
        // the second by the residual noise of the first fit
        let initial_variance = variance(&y)?.max(MIN_NOISE_VARIANCE);
        let coefficients = ridge_least_squares(&design, &y, &penalties(initial_variance))?;
        let residuals: Vec<f64> = design
            .mul_vec(&coefficients)?
            .iter()
            .zip(&y)
            .map(|(fit, obs)| obs - fit)
            .collect();
        let noise_variance = variance(&residuals)?.max(MIN_NOISE_VARIANCE);
        let coefficients = ridge_least_squares(&design, &y, &penalties(noise_variance))?;

        let residuals: Vec<f64> = design
            .mul_vec(&coefficients)?
            .iter()
            .zip(&y)
            .map(|(fit, obs)| obs - fit)
            .collect();
        let sigma = std_dev(&residuals)?;

        for term in &mut terms {
            term.coefficients = coefficients[term.offset..term.offset + 2 * term.order].to_vec();
        }

        info!(
            observations = n,
            changepoints = changepoints.len(),
            seasonalities = ?terms.iter().map(|t| t.name).collect::<Vec<_>>(),
            sigma = sigma * y_scale,
            "fitted additive model"
        );

        Ok(TrainedAdditiveModel {
            config: self.config.clone(),
            history,
            start,
            span,
            y_scale,
            changepoints,
            trend: coefficients[..trend_cols].to_vec(),
            terms,
            sigma,
        })
    }

    fn name(&self) -> &str {
        "Additive"
    }
}

/// A fitted [`AdditiveModel`]
#[derive(Debug, Clone)]
pub struct TrainedAdditiveModel {
    config: AdditiveConfig,
    history: History,
    /// Day number of the first observation
    start: f64,
    /// Days between first and last observation
    span: f64,
    y_scale: f64,
    /// Changepoints on the scaled time axis
    changepoints: Vec<f64>,
    /// Intercept, base slope, slope change per changepoint
    trend: Vec<f64>,
    terms: Vec<SeasonalTerm>,
    /// Residual standard deviation of the scaled series
    sigma: f64,
}

impl TrainedAdditiveModel {
    fn scaled_time(&self, date: NaiveDate) -> f64 {
        (day_number(date) - self.start) / self.span
    }

    /// Scaled trend on the scaled time axis
    fn trend_at(&self, t: f64) -> f64 {
        let base = self.trend[0] + self.trend[1] * t;
        self.changepoints
            .iter()
            .zip(&self.trend[2..])
            .fold(base, |acc, (s, delta)| acc + delta * (t - s).max(0.0))
    }

    /// Rate of changepoints per unit of scaled time and their mean |slope change|
    fn changepoint_process(&self) -> Result<Option<(f64, f64)>> {
        if self.changepoints.is_empty() {
            return Ok(None);
        }
        let scale = mean_abs(&self.trend[2..])?;
        if scale <= 0.0 {
            return Ok(None);
        }
        Ok(Some((self.changepoints.len() as f64, scale)))
    }

    /// Simulated scaled trend paths over future scaled times, one Vec per sample
    fn sample_trend_paths(&self, future_t: &[f64], rng: &mut StdRng) -> Result<Vec<Vec<f64>>> {
        let base: Vec<f64> = future_t.iter().map(|&t| self.trend_at(t)).collect();
        let horizon = future_t.last().copied().unwrap_or(1.0) - 1.0;

        let process = match self.changepoint_process()? {
            Some((rate, scale)) if horizon > 0.0 => Some((rate * horizon, scale)),
            _ => None,
        };
        let poisson = match process {
            Some((expected, _)) => Some(
                Poisson::new(expected)
                    .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?,
            ),
            None => None,
        };

        let mut paths = Vec::with_capacity(self.config.uncertainty_samples);
        for _ in 0..self.config.uncertainty_samples {
            let mut path = base.clone();
            if let (Some(poisson), Some((_, scale))) = (&poisson, process) {
                let draws: f64 = poisson.sample(rng);
                for _ in 0..draws as usize {
                    let at = 1.0 + rng.gen::<f64>() * horizon;
                    // Laplace(0, scale) by inverse transform
                    let u: f64 = rng.gen_range(-0.5..0.5);
                    let delta = -scale * u.signum() * (1.0 - 2.0 * u.abs()).ln();
                    for (value, &t) in path.iter_mut().zip(future_t) {
                        *value += delta * (t - at).max(0.0);
                    }
                }
            }
            paths.push(path);
        }

        Ok(paths)
    }
}

impl TrainedForecastModel for TrainedAdditiveModel {
    fn predict(&self, periods: usize) -> Result<ForecastTable> {
        let (Some(first), Some(last)) = (self.history.first_date(), self.history.last_date())
        else {
            return Err(ForecastError::InsufficientHistory {
                required: MIN_OBSERVATIONS,
                actual: 0,
            });
        };
        let end = last
            .checked_add_days(Days::new(periods as u64))
            .ok_or_else(|| {
                ForecastError::InvalidParameter(format!("{} periods overflow the calendar", periods))
            })?;

        let dates: Vec<NaiveDate> = first.iter_days().take_while(|d| *d <= end).collect();
        let future_t: Vec<f64> = dates
            .iter()
            .filter(|d| **d > last)
            .map(|d| self.scaled_time(*d))
            .collect();
        debug!(
            rows = dates.len(),
            future = future_t.len(),
            "predicting additive model"
        );

        let standard = Normal::new(0.0, 1.0)
            .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;
        let z = standard.inverse_cdf(0.5 + self.config.interval_width / 2.0);
        let lower_q = (1.0 - self.config.interval_width) / 2.0;
        let upper_q = 1.0 - lower_q;

        // Future bands from simulated trend paths plus observation noise
        let mut future_bands: Vec<((f64, f64), (f64, f64))> = Vec::with_capacity(future_t.len());
        if self.config.uncertainty_samples > 0 && !future_t.is_empty() {
            let mut rng = StdRng::seed_from_u64(self.config.seed);
            let noise = NoiseDistribution::new(0.0, self.sigma)
                .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;
            let paths = self.sample_trend_paths(&future_t, &mut rng)?;

            for f in 0..future_t.len() {
                let mut trend_draws: Vec<f64> = paths.iter().map(|p| p[f]).collect();
                let mut noisy_draws: Vec<f64> = trend_draws
                    .iter()
                    .map(|v| v + noise.sample(&mut rng))
                    .collect();
                let base = self.trend_at(future_t[f]);
                future_bands.push((
                    (
                        quantile(&mut trend_draws, lower_q)? - base,
                        quantile(&mut trend_draws, upper_q)? - base,
                    ),
                    (
                        quantile(&mut noisy_draws, lower_q)? - base,
                        quantile(&mut noisy_draws, upper_q)? - base,
                    ),
                ));
            }
        }

        let mut rows = Vec::with_capacity(dates.len());
        let mut future_index = 0;
        for ds in dates {
            let trend = self.trend_at(self.scaled_time(ds));
            let seasonal = self
                .terms
                .iter()
                .map(|term| term.value_at(day_number(ds)))
                .collect::<Result<Vec<f64>>>()?;
            let yhat = trend + seasonal.iter().sum::<f64>();

            let ((trend_lo, trend_hi), (y_lo, y_hi)) = if ds > last {
                let band = future_bands
                    .get(future_index)
                    .copied()
                    .unwrap_or(((0.0, 0.0), (-z * self.sigma, z * self.sigma)));
                future_index += 1;
                band
            } else {
                ((0.0, 0.0), (-z * self.sigma, z * self.sigma))
            };

            rows.push(ForecastRow {
                ds,
                yhat: yhat * self.y_scale,
                yhat_lower: (yhat + y_lo) * self.y_scale,
                yhat_upper: (yhat + y_hi) * self.y_scale,
                trend: trend * self.y_scale,
                trend_lower: (trend + trend_lo) * self.y_scale,
                trend_upper: (trend + trend_hi) * self.y_scale,
                seasonal: seasonal.iter().map(|s| s * self.y_scale).collect(),
            });
        }

        ForecastTable::new(rows, self.seasonalities(), last)
    }

    fn history(&self) -> &History {
        &self.history
    }

    fn seasonalities(&self) -> Vec<String> {
        self.terms.iter().map(|t| t.name.to_string()).collect()
    }

    fn seasonal_profile(&self, name: &str) -> Option<SeasonalProfile> {
        let term = self.terms.iter().find(|t| t.name == name)?;

        // 2017 starts on a Sunday and is not a leap year
        let origin = NaiveDate::from_ymd_opt(2017, 1, 1)?;
        let (length, format) = if term.period <= WEEKLY_PERIOD {
            (7, "%A")
        } else {
            (365, "%Y-%m-%d")
        };

        let mut labels = Vec::with_capacity(length);
        let mut values = Vec::with_capacity(length);
        for date in origin.iter_days().take(length) {
            labels.push(date.format(format).to_string());
            values.push(term.value_at(day_number(date)).ok()? * self.y_scale);
        }

        Some(SeasonalProfile {
            name: term.name.to_string(),
            period_days: term.period,
            labels,
            values,
        })
    }

    fn name(&self) -> &str {
        "Additive"
    }
}
