//! BLS public time-series API integration for food CPI series.
//!
//! Without a key the v1 endpoint is used (10 years per request); with
//! `BLS_API_KEY` set (environment or `.env`) requests go to v2, which allows
//! 20 years per request. Longer ranges are split into several requests.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{parse_bls_period, Category, CpiObservation, YearMonth};
use crate::error::AppError;

const V1_URL: &str = "https://api.bls.gov/publicAPI/v1/timeseries/data/";
const V2_URL: &str = "https://api.bls.gov/publicAPI/v2/timeseries/data/";
const V1_MAX_YEARS: i32 = 10;
const V2_MAX_YEARS: i32 = 20;
const STATUS_OK: &str = "REQUEST_SUCCEEDED";

/// One data point as returned by BLS, before any interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCpiRecord {
    pub series_id: String,
    pub year: i32,
    /// `M01`..`M12`, or `M13` for the annual average.
    pub period: String,
    pub value: f64,
}

pub struct BlsClient {
    client: Client,
    api_key: Option<String>,
}

impl BlsClient {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("BLS_API_KEY").ok().filter(|k| !k.trim().is_empty());
        Self {
            client: Client::new(),
            api_key,
        }
    }

    fn endpoint(&self) -> (&'static str, i32) {
        match self.api_key {
            Some(_) => (V2_URL, V2_MAX_YEARS),
            None => (V1_URL, V1_MAX_YEARS),
        }
    }

    /// Fetch every category's series for `start_year..=end_year`.
    pub fn fetch(&self, categories: &[Category], start_year: i32, end_year: i32) -> Result<Vec<RawCpiRecord>, AppError> {
        if start_year > end_year {
            return Err(AppError::input(format!(
                "Invalid year range: start {start_year} is after end {end_year}."
            )));
        }
        let (url, max_years) = self.endpoint();
        let series_ids: Vec<String> = categories.iter().map(|c| c.series_id().to_string()).collect();

        let mut out = Vec::new();
        for (start, end) in year_windows(start_year, end_year, max_years) {
            debug!(url, start, end, "requesting BLS window");
            let request = BlsRequest {
                seriesid: series_ids.clone(),
                startyear: start.to_string(),
                endyear: end.to_string(),
                registrationkey: self.api_key.clone(),
            };
            let resp = self
                .client
                .post(url)
                .json(&request)
                .send()
                .map_err(|e| AppError::runtime(format!("BLS request failed: {e}")))?;

            if !resp.status().is_success() {
                return Err(AppError::runtime(format!(
                    "BLS request failed with status {}.",
                    resp.status()
                )));
            }

            let body: BlsResponse = resp
                .json()
                .map_err(|e| AppError::runtime(format!("Failed to parse BLS response: {e}")))?;
            out.extend(body.into_records()?);
        }
        info!(records = out.len(), "fetched BLS CPI data");
        Ok(out)
    }
}

/// Split `start..=end` into consecutive windows of at most `max_years` years.
pub fn year_windows(start: i32, end: i32, max_years: i32) -> Vec<(i32, i32)> {
    let step = max_years.max(1);
    let mut out = Vec::new();
    let mut lo = start;
    while lo <= end {
        let hi = (lo + step - 1).min(end);
        out.push((lo, hi));
        lo = hi + 1;
    }
    out
}

#[derive(Debug, Serialize)]
struct BlsRequest {
    seriesid: Vec<String>,
    startyear: String,
    endyear: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    registrationkey: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BlsResponse {
    status: String,
    #[serde(default)]
    message: Vec<String>,
    #[serde(rename = "Results")]
    results: Option<BlsResults>,
}

#[derive(Debug, Deserialize)]
struct BlsResults {
    series: Vec<BlsSeries>,
}

#[derive(Debug, Deserialize)]
struct BlsSeries {
    #[serde(rename = "seriesID")]
    series_id: String,
    data: Vec<BlsDataPoint>,
}

#[derive(Debug, Deserialize)]
struct BlsDataPoint {
    year: String,
    period: String,
    value: String,
}

impl BlsResponse {
    fn into_records(self) -> Result<Vec<RawCpiRecord>, AppError> {
        if self.status != STATUS_OK {
            return Err(AppError::runtime(format!(
                "BLS API request failed ({}): {}",
                self.status,
                self.message.join("; ")
            )));
        }
        let results = self
            .results
            .ok_or_else(|| AppError::runtime("BLS response has no Results section."))?;

        let mut out = Vec::new();
        for series in results.series {
            for point in series.data {
                let (Ok(year), Some(value)) = (point.year.trim().parse::<i32>(), parse_value(&point.value)) else {
                    continue;
                };
                out.push(RawCpiRecord {
                    series_id: series.series_id.clone(),
                    year,
                    period: point.period,
                    value,
                });
            }
        }
        Ok(out)
    }
}

fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "-" || trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Map raw BLS records onto CPI observations.
///
/// Unknown series ids and non-monthly periods (`M13`) are dropped; the number
/// of dropped records is returned alongside.
pub fn to_observations(raw: &[RawCpiRecord]) -> (Vec<CpiObservation>, usize) {
    let mut dropped = 0;
    let observations = raw
        .iter()
        .filter_map(|r| {
            let obs = Category::from_series_id(&r.series_id).and_then(|category| {
                let period = YearMonth::new(r.year, parse_bls_period(&r.period)?)?;
                Some(CpiObservation {
                    category,
                    period,
                    cpi: r.value,
                })
            });
            if obs.is_none() {
                dropped += 1;
            }
            obs
        })
        .collect();
    (observations, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "status": "REQUEST_SUCCEEDED",
        "responseTime": 120,
        "message": [],
        "Results": {
            "series": [
                {
                    "seriesID": "CUUR0000SAF11",
                    "data": [
                        {"year": "2024", "period": "M13", "periodName": "Annual", "value": "305.1"},
                        {"year": "2024", "period": "M02", "periodName": "February", "value": "306.2"},
                        {"year": "2024", "period": "M01", "periodName": "January", "value": "305.9", "footnotes": [{}]}
                    ]
                },
                {
                    "seriesID": "CUUR0000XYZ",
                    "data": [{"year": "2024", "period": "M01", "value": "1.0"}]
                }
            ]
        }
    }"#;

    #[test]
    fn response_is_mapped_to_observations() {
        let body: BlsResponse = serde_json::from_str(BODY).unwrap();
        let raw = body.into_records().unwrap();
        assert_eq!(raw.len(), 4);

        let (obs, dropped) = to_observations(&raw);
        assert_eq!(dropped, 2);
        assert_eq!(obs.len(), 2);
        assert!(obs.iter().all(|o| o.category == Category::FoodAtHome));
        assert_eq!(obs[0].period.label(), "February 2024");
        assert!((obs[1].cpi - 305.9).abs() < 1e-12);
    }

    #[test]
    fn failed_status_is_an_error() {
        let body: BlsResponse = serde_json::from_str(
            r#"{"status": "REQUEST_NOT_PROCESSED", "message": ["daily threshold reached"]}"#,
        )
        .unwrap();
        let err = body.into_records().unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("daily threshold"));
    }

    #[test]
    fn year_windows_respect_limit() {
        assert_eq!(year_windows(2014, 2026, 10), vec![(2014, 2023), (2024, 2026)]);
        assert_eq!(year_windows(2014, 2014, 10), vec![(2014, 2014)]);
        assert!(year_windows(2015, 2014, 10).is_empty());
    }

    #[test]
    fn request_omits_missing_key() {
        let req = BlsRequest {
            seriesid: vec!["CUUR0000SAF".into()],
            startyear: "2014".into(),
            endyear: "2023".into(),
            registrationkey: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("registrationkey"));
    }
}
