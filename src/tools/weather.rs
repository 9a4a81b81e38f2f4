//! Weather tool adapter.
//!
//! Executes the one registered capability: resolving a coordinate pair to
//! a forecast through the National Weather Service API. Two sequential,
//! dependent calls:
//!
//! 1. `GET {points_base}/points/{lat},{lon}` resolves the coordinates to
//!    a gridpoint carrying a forecast URL. A 404 means the location is
//!    outside the provider's coverage (US only) and is reported as data,
//!    not as a failure.
//! 2. `GET <forecast URL>` fetches the forecast document; the first
//!    three periods in document order are returned.
//!
//! No caching and no retries; each request carries an explicit timeout
//! since the two calls sit on the chat request's critical path.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::Tool;
use crate::error::{ChatError, ForecastError};

/// Forecast periods returned to the model, truncated in document order.
const MAX_PERIODS: usize = 3;

/// Per-call timeout; two dependent lookups must not stall a chat request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// One forecast period as the model sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPeriod {
    pub name: String,
    #[serde(rename = "detailedForecast")]
    pub detailed_forecast: String,
}

// --- Forecast provider wire types ---

#[derive(Deserialize)]
struct PointResponse {
    properties: PointProperties,
}

#[derive(Deserialize)]
struct PointProperties {
    forecast: Option<String>,
}

#[derive(Deserialize)]
struct ForecastResponse {
    properties: ForecastProperties,
}

#[derive(Deserialize)]
struct ForecastProperties {
    periods: Vec<ForecastPeriod>,
}

/// Tool that fetches a short forecast for a coordinate pair.
pub struct WeatherTool {
    client: reqwest::Client,
    points_base: String,
}

impl WeatherTool {
    pub fn new(points_base: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client for the forecast service")?;

        Ok(Self {
            client,
            points_base,
        })
    }

    /// Stage 1: resolve the coordinate pair to a forecast URL.
    async fn lookup_forecast_url(&self, latitude: f64, longitude: f64) -> Result<String, ForecastError> {
        let url = format!(
            "{}/points/{},{}",
            self.points_base.trim_end_matches('/'),
            latitude,
            longitude
        );
        let response = self
            .client
            .get(&url)
            .header("accept", "application/geo+json")
            .send()
            .await
            .map_err(|e| ForecastError::Upstream(format!("point lookup failed: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ForecastError::LocationUnsupported);
        }
        if !response.status().is_success() {
            return Err(ForecastError::Upstream(format!(
                "point lookup returned status {}",
                response.status()
            )));
        }

        let point: PointResponse = response
            .json()
            .await
            .map_err(|e| ForecastError::Upstream(format!("invalid point lookup body: {e}")))?;

        point
            .properties
            .forecast
            .ok_or_else(|| ForecastError::Upstream("no forecast URL in point lookup".to_string()))
    }

    /// Stage 2: fetch the forecast document and keep the leading periods.
    async fn fetch_periods(&self, forecast_url: &str) -> Result<Vec<ForecastPeriod>, ForecastError> {
        let response = self
            .client
            .get(forecast_url)
            .header("accept", "application/geo+json")
            .send()
            .await
            .map_err(|e| ForecastError::Upstream(format!("forecast fetch failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ForecastError::Upstream(format!(
                "forecast fetch returned status {}",
                response.status()
            )));
        }

        let forecast: ForecastResponse = response
            .json()
            .await
            .map_err(|e| ForecastError::Upstream(format!("invalid forecast body: {e}")))?;

        let mut periods = forecast.properties.periods;
        periods.truncate(MAX_PERIODS);
        Ok(periods)
    }

    /// Run the two-stage pipeline for a coordinate pair.
    pub async fn fetch_forecast(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<ForecastPeriod>, ForecastError> {
        let forecast_url = self.lookup_forecast_url(latitude, longitude).await?;
        self.fetch_periods(&forecast_url).await
    }
}

fn required_number(args: &serde_json::Value, field: &str) -> Result<f64, ChatError> {
    args.get(field)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| ChatError::validation(format!("missing numeric tool argument: {field}")))
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Get the forecast for a specific location using latitude and longitude. \
         NOTE: This API only supports locations within the United States."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "latitude": {
                    "type": "number",
                    "description": "The latitude of the location."
                },
                "longitude": {
                    "type": "number",
                    "description": "The longitude of the location."
                }
            },
            "required": ["latitude", "longitude"]
        })
    }

    async fn execute(&self, args: &serde_json::Value) -> Result<serde_json::Value, ChatError> {
        let latitude = required_number(args, "latitude")?;
        let longitude = required_number(args, "longitude")?;

        // Forecast failures become payload data so the model can explain
        // them in the final answer; only bad arguments abort the request.
        match self.fetch_forecast(latitude, longitude).await {
            Ok(periods) => Ok(serde_json::to_value(periods)
                .context("Failed to serialize forecast periods")
                .map_err(ChatError::Internal)?),
            Err(e) => {
                tracing::warn!(error = %e, "forecast lookup failed");
                Ok(json!({ "error": e.to_string() }))
            }
        }
    }
}
