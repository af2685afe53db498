//! Forecast lifecycle as a typestate: untrained → trained → evaluated.
//!
//! Each transition consumes the previous state. Forecasting is only
//! reachable from [`EvaluatedModel`], and retraining means starting over from
//! a fresh [`ForecastModel`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    evaluate, fit, forecast, prepare, split, Anchor, Dataset, Evaluation, ForecastError,
    ForecastPoint, RegressionModel, Result,
};
use crate::domain::PriceSeries;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Share of rows held out for scoring, in `(0, 1)`.
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

impl ForecastConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        Ok(())
    }
}

/// Untrained model.
#[derive(Debug, Clone, Default)]
pub struct ForecastModel {
    config: ForecastConfig,
}

impl ForecastModel {
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Prepare, split and fit.
    pub fn train(self, series: &PriceSeries) -> Result<TrainedModel> {
        self.config.validate()?;
        let dataset = prepare(series)?;
        let (train, test) = split(&dataset, self.config.test_fraction, self.config.seed)?;
        let model = fit(&train)?;
        debug!(
            symbol = series.symbol(),
            train = train.len(),
            test = test.len(),
            slope = model.slope,
            "fitted linear trend"
        );
        Ok(TrainedModel {
            last_observed: series.last_date(),
            model,
            test,
        })
    }
}

/// Fitted model holding its held-out rows.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    model: RegressionModel,
    test: Dataset,
    last_observed: Option<NaiveDate>,
}

impl TrainedModel {
    pub fn model(&self) -> &RegressionModel {
        &self.model
    }

    pub fn held_out(&self) -> &Dataset {
        &self.test
    }

    /// Score on the held-out rows.
    pub fn evaluate(self) -> Result<EvaluatedModel> {
        let evaluation = evaluate(&self.model, &self.test)?;
        Ok(EvaluatedModel {
            model: self.model,
            evaluation,
            last_observed: self.last_observed,
        })
    }
}

/// Terminal state: scored and ready to forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedModel {
    model: RegressionModel,
    evaluation: Evaluation,
    last_observed: Option<NaiveDate>,
}

impl EvaluatedModel {
    pub fn model(&self) -> &RegressionModel {
        &self.model
    }

    pub fn evaluation(&self) -> &Evaluation {
        &self.evaluation
    }

    pub fn last_observed(&self) -> Option<NaiveDate> {
        self.last_observed
    }

    /// Forecast `horizon_days` points from the date `anchor` resolves to.
    pub fn forecast(
        &self,
        horizon_days: usize,
        anchor: Anchor,
        today: NaiveDate,
    ) -> Result<Vec<ForecastPoint>> {
        let start = anchor.resolve(self.last_observed, today);
        forecast(&self.model, horizon_days, start)
    }
}
