//! Satellite data API client
//!
//! Talks to the NASA data proxy that serves soil moisture, NDVI, precipitation
//! and land surface temperature for a point. Any failure degrades to a
//! simulated reading so the UI never blocks on a provider outage.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use shared::{
    normalize_fraction, normalize_ndvi, DataOrigin, DateRange, FieldTrends, GpsCoordinates,
    SatelliteReading, Trend,
};

use crate::cache::{cache_key, ResponseCache};
use crate::error::ProviderError;
use crate::external::FallbackGenerator;

/// Cache namespace for satellite readings
pub const SATELLITE_CACHE_NAMESPACE: &str = "satellite";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

/// Satellite data API client
#[derive(Clone)]
pub struct SatelliteClient {
    client: Client,
    api_key: String,
    base_url: String,
    cache: Arc<ResponseCache>,
    fallback: FallbackGenerator,
    timeout: Duration,
}

/// Raw response of `GET /agricultural-data`
#[derive(Debug, Deserialize)]
struct ApiAgriculturalResponse {
    soil_moisture: Option<ApiMeasurement>,
    ndvi: Option<ApiMeasurement>,
    precipitation: Option<ApiMeasurement>,
    temperature: Option<ApiMeasurement>,
    timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ApiMeasurement {
    value: Option<f64>,
    trend: Option<String>,
}

impl ApiMeasurement {
    fn trend(&self) -> Trend {
        self.trend.as_deref().map(Trend::from_label).unwrap_or_default()
    }
}

impl SatelliteClient {
    /// Create a new SatelliteClient sharing the given cache
    pub fn new(base_url: String, api_key: String, cache: Arc<ResponseCache>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache,
            fallback: FallbackGenerator::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_fallback(mut self, fallback: FallbackGenerator) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch a satellite reading, consulting the cache first.
    ///
    /// Never fails: provider errors are logged and replaced by a simulated
    /// reading, which is not cached so the next call retries the provider.
    pub async fn fetch_satellite_reading(
        &self,
        location: GpsCoordinates,
        date_range: Option<DateRange>,
    ) -> SatelliteReading {
        let key = cache_key(SATELLITE_CACHE_NAMESPACE, location, date_range.as_ref());

        if let Some(cached) = self.cache.get_json::<SatelliteReading>(&key).await {
            tracing::debug!(%key, "Satellite cache hit");
            return cached;
        }

        match self.try_fetch(location, date_range).await {
            Ok(reading) => {
                self.cache.set_json(key, &reading).await;
                reading
            }
            Err(e) => {
                tracing::warn!(
                    longitude = location.longitude,
                    latitude = location.latitude,
                    error = %e,
                    "Satellite provider failed, using simulated reading"
                );
                self.fallback.satellite_reading(location)
            }
        }
    }

    async fn try_fetch(
        &self,
        location: GpsCoordinates,
        date_range: Option<DateRange>,
    ) -> Result<SatelliteReading, ProviderError> {
        tokio::time::timeout(self.timeout, self.request(location, date_range))
            .await
            .map_err(|_| ProviderError::Timeout(self.timeout.as_secs()))?
    }

    async fn request(
        &self,
        location: GpsCoordinates,
        date_range: Option<DateRange>,
    ) -> Result<SatelliteReading, ProviderError> {
        let url = format!("{}/agricultural-data", self.base_url);
        let mut query = vec![
            ("lat", location.latitude.to_string()),
            ("lon", location.longitude.to_string()),
            ("api_key", self.api_key.clone()),
        ];
        if let Some(range) = date_range {
            query.push(("start", range.start.to_string()));
            query.push(("end", range.end.to_string()));
        }

        let response = self.client.get(&url).query(&query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        let body = response.text().await?;
        let data: ApiAgriculturalResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::Malformed(format!("satellite response: {}", e)))?;

        convert_response(data)
    }
}

/// Normalize the provider payload into a `SatelliteReading`
fn convert_response(data: ApiAgriculturalResponse) -> Result<SatelliteReading, ProviderError> {
    let value = |m: &Option<ApiMeasurement>| m.as_ref().and_then(|m| m.value);
    let trend = |m: &Option<ApiMeasurement>| m.as_ref().map(ApiMeasurement::trend).unwrap_or_default();

    let reading = SatelliteReading {
        ndvi: value(&data.ndvi).and_then(normalize_ndvi),
        soil_moisture: value(&data.soil_moisture).and_then(normalize_fraction),
        precipitation_mm: value(&data.precipitation)
            .filter(|v| v.is_finite())
            .map(|v| v.max(0.0)),
        temperature_celsius: value(&data.temperature).filter(|v| v.is_finite()),
        trends: FieldTrends {
            ndvi: trend(&data.ndvi),
            soil_moisture: trend(&data.soil_moisture),
            precipitation: trend(&data.precipitation),
            temperature: trend(&data.temperature),
        },
        origin: DataOrigin::Observed,
        observed_at: data.timestamp.unwrap_or_else(Utc::now),
    };

    if reading.available_fields() == 0 {
        return Err(ProviderError::Malformed(
            "satellite response carried no measurements".to_string(),
        ));
    }

    Ok(reading)
}
