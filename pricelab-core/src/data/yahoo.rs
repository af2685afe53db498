//! Yahoo Finance data provider.
//!
//! Fetches daily OHLCV bars from Yahoo's v8 chart API. Handles rate limiting,
//! retries with exponential backoff, response parsing, and the circuit breaker.
//!
//! Yahoo Finance has no official API and is subject to unannounced format changes.
//! The synthetic provider is the offline fallback.

use super::circuit_breaker::CircuitBreaker;
use super::provider::{DataError, DataProvider, DataSource, RawBar};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    base_url: String,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooProvider {
    pub fn new(circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| {
                DataError::NetworkUnreachable(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            circuit_breaker,
            base_url: DEFAULT_BASE_URL.to_string(),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    /// Point the provider at a different host (mirrors, local stubs).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build the chart API URL for a symbol and inclusive date range.
    fn chart_url(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        // Last second of the end date, so `end` itself is included.
        let end_ts = end.and_time(NaiveTime::MIN).and_utc().timestamp() + 86_399;
        format!(
            "{}/v8/finance/chart/{symbol}?period1={start_ts}&period2={end_ts}&interval=1d",
            self.base_url
        )
    }

    /// Parse the chart API response into RawBars.
    ///
    /// A result with no timestamps is a valid empty range, not an error.
    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<Vec<RawBar>, DataError> {
        let result = resp.chart.result.ok_or_else(|| {
            if let Some(err) = resp.chart.error {
                if err.code == "Not Found" {
                    DataError::SymbolNotFound {
                        symbol: symbol.to_string(),
                    }
                } else {
                    DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
                }
            } else {
                DataError::ResponseFormatChanged("empty result with no error".into())
            }
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        let Some(timestamps) = data.timestamp else {
            return Ok(Vec::new());
        };

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let mut bars = Vec::with_capacity(timestamps.len());

        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();

            // Skip rows where everything is missing (holidays, half-built today bar)
            if open.is_none()
                && high.is_none()
                && low.is_none()
                && close.is_none()
                && volume.is_none()
            {
                continue;
            }

            bars.push(RawBar {
                date,
                open: open.unwrap_or(f64::NAN),
                high: high.unwrap_or(f64::NAN),
                low: low.unwrap_or(f64::NAN),
                close: close.unwrap_or(f64::NAN),
                volume: volume.unwrap_or(f64::NAN),
            });
        }

        Ok(bars)
    }

    /// GET the chart, retrying transient failures with exponential backoff.
    ///
    /// The breaker is consulted before every attempt and hears the outcome of
    /// each one. A 403 trips it outright.
    fn fetch_with_retry(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError> {
        let url = self.chart_url(symbol, start, end);
        let mut last_error = DataError::CircuitBreakerTripped;

        for attempt in 0..=self.max_retries {
            if !self.circuit_breaker.is_allowed() {
                return Err(DataError::CircuitBreakerTripped);
            }
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                tracing::debug!(
                    symbol,
                    attempt,
                    ?delay,
                    error = %last_error,
                    "retrying Yahoo request"
                );
                std::thread::sleep(delay);
            }

            let resp = match self.client.get(&url).send() {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    self.circuit_breaker.record_failure();
                    last_error = DataError::NetworkUnreachable(e.to_string());
                    continue;
                }
                Err(e) => {
                    self.circuit_breaker.record_failure();
                    return Err(DataError::NetworkUnreachable(e.to_string()));
                }
            };

            match classify_status(symbol, resp.status(), retry_after_secs(&resp)) {
                StatusOutcome::Parse => {}
                StatusOutcome::Retry(e) => {
                    self.circuit_breaker.record_failure();
                    last_error = e;
                    continue;
                }
                StatusOutcome::Fail(DataError::CircuitBreakerTripped) => {
                    self.circuit_breaker.trip();
                    return Err(DataError::CircuitBreakerTripped);
                }
                StatusOutcome::Fail(e) => {
                    // the provider answered; only the symbol is bad
                    self.circuit_breaker.record_success();
                    return Err(e);
                }
            }

            let parsed = resp
                .json::<ChartResponse>()
                .map_err(|e| {
                    DataError::ResponseFormatChanged(format!(
                        "failed to parse response for {symbol}: {e}"
                    ))
                })
                .and_then(|chart| Self::parse_response(symbol, chart));
            match &parsed {
                Ok(_) | Err(DataError::SymbolNotFound { .. }) => {
                    self.circuit_breaker.record_success()
                }
                Err(_) => self.circuit_breaker.record_failure(),
            }
            return parsed;
        }

        Err(last_error)
    }
}

/// What to do with a response, decided from its status line alone.
#[derive(Debug, PartialEq)]
enum StatusOutcome {
    /// Success: read the body.
    Parse,
    /// Transient: back off and try again.
    Retry(DataError),
    /// Final for this request.
    Fail(DataError),
}

fn classify_status(
    symbol: &str,
    status: reqwest::StatusCode,
    retry_after: Option<u64>,
) -> StatusOutcome {
    use reqwest::StatusCode;

    match status {
        s if s.is_success() => StatusOutcome::Parse,
        StatusCode::FORBIDDEN => StatusOutcome::Fail(DataError::CircuitBreakerTripped),
        StatusCode::NOT_FOUND => StatusOutcome::Fail(DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        }),
        StatusCode::TOO_MANY_REQUESTS => StatusOutcome::Retry(DataError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(60),
        }),
        s => StatusOutcome::Retry(DataError::Other(format!("HTTP {s} for {symbol}"))),
    }
}

fn retry_after_secs(resp: &reqwest::blocking::Response) -> Option<u64> {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn source(&self) -> DataSource {
        DataSource::YahooFinance
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError> {
        self.fetch_with_retry(symbol, start, end)
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Vec<RawBar>, DataError> {
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        YahooProvider::parse_response("BTC-USD", resp)
    }

    #[test]
    fn parses_quotes_and_skips_empty_rows() {
        // 2024-01-01, 2024-01-02, 2024-01-03 at 00:00 UTC
        let json = r#"{"chart":{"result":[{
            "timestamp":[1704067200,1704153600,1704240000],
            "indicators":{"quote":[{
                "open":[100.0,null,102.0],
                "high":[105.0,null,106.0],
                "low":[99.0,null,101.0],
                "close":[104.0,null,null],
                "volume":[1000.0,null,3000.0]
            }]}
        }],"error":null}}"#;

        let bars = parse(json).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(bars[0].close, 104.0);
        assert_eq!(bars[1].date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert!(bars[1].close.is_nan());
        assert_eq!(bars[1].volume, 3000.0);
    }

    #[test]
    fn missing_timestamps_is_an_empty_range() {
        let json = r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(parse(json).unwrap().is_empty());
    }

    #[test]
    fn not_found_maps_to_symbol_not_found() {
        let json = r#"{"chart":{"result":null,"error":{
            "code":"Not Found",
            "description":"No data found, symbol may be delisted"
        }}}"#;
        assert!(matches!(parse(json), Err(DataError::SymbolNotFound { .. })));
    }

    #[test]
    fn chart_url_covers_whole_end_day() {
        let provider = YahooProvider::new(Arc::new(CircuitBreaker::default_provider()))
            .unwrap()
            .with_base_url("http://localhost:9");
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let url = provider.chart_url("BTC-USD", day, day);
        assert!(url.starts_with("http://localhost:9/v8/finance/chart/BTC-USD?"));
        assert!(url.contains("period1=1704067200&period2=1704153599"));
        assert!(url.ends_with("&interval=1d"));
    }

    #[test]
    fn status_classification() {
        use reqwest::StatusCode;

        assert_eq!(classify_status("X", StatusCode::OK, None), StatusOutcome::Parse);
        assert_eq!(
            classify_status("X", StatusCode::NOT_FOUND, None),
            StatusOutcome::Fail(DataError::SymbolNotFound { symbol: "X".into() })
        );
        assert_eq!(
            classify_status("X", StatusCode::FORBIDDEN, None),
            StatusOutcome::Fail(DataError::CircuitBreakerTripped)
        );
        assert_eq!(
            classify_status("X", StatusCode::TOO_MANY_REQUESTS, Some(5)),
            StatusOutcome::Retry(DataError::RateLimited { retry_after_secs: 5 })
        );
        assert_eq!(
            classify_status("X", StatusCode::TOO_MANY_REQUESTS, None),
            StatusOutcome::Retry(DataError::RateLimited { retry_after_secs: 60 })
        );
        // 401 and 5xx are transport noise, not a distinct failure kind
        assert!(matches!(
            classify_status("X", StatusCode::UNAUTHORIZED, None),
            StatusOutcome::Retry(DataError::Other(_))
        ));
        assert!(matches!(
            classify_status("X", StatusCode::BAD_GATEWAY, None),
            StatusOutcome::Retry(DataError::Other(_))
        ));
    }
}
