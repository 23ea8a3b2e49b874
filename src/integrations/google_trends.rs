//! Google Trends interest-over-time client
//!
//! The trends web API is a two-step exchange: `explore` returns a set of
//! widgets, and the `TIMESERIES` widget's request/token pair is replayed
//! against `widgetdata/multiline` to get the series. Both responses start
//! with an anti-JSON-hijacking prefix that must be stripped before parsing.
//! The service answers `explore` with 429 unless the request carries the
//! `NID` cookie set by its home page, so each client visits it once first.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

use super::TrendSource;
use crate::config::TrendsConfig;
use crate::http::{build_client_with, ensure_success};
use crate::{DishcastError, Result};

const SERVICE: &str = "google trends";
const TIMESERIES_WIDGET: &str = "TIMESERIES";

/// Google Trends client bound to one region and timeframe
pub struct GoogleTrendsClient {
    client: Client,
    base_url: String,
    home_url: String,
    session: OnceCell<()>,
    region: String,
    timeframe: String,
    language: String,
    timezone_offset: String,
}

#[derive(Debug, Deserialize)]
struct ExploreResponse {
    #[serde(default)]
    widgets: Vec<Widget>,
}

#[derive(Debug, Deserialize)]
struct Widget {
    id: String,
    token: Option<String>,
    request: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct MultilineResponse {
    default: MultilineData,
}

#[derive(Debug, Deserialize)]
struct MultilineData {
    #[serde(rename = "timelineData", default)]
    timeline_data: Vec<TimelinePoint>,
}

#[derive(Debug, Deserialize)]
struct TimelinePoint {
    #[serde(default)]
    value: Vec<f64>,
}

/// Drop everything before the first JSON object
fn strip_json_prefix(body: &str) -> Result<&str> {
    body.find('{')
        .map(|start| &body[start..])
        .ok_or_else(|| DishcastError::parse(SERVICE, "response contained no JSON object"))
}

fn parse_prefixed<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(strip_json_prefix(body)?)
        .map_err(|e| DishcastError::parse(SERVICE, e.to_string()))
}

/// First value of every point; one keyword is requested so there is one column
fn series_values(response: MultilineResponse) -> Vec<f64> {
    response
        .default
        .timeline_data
        .into_iter()
        .filter_map(|point| point.value.first().copied())
        .collect()
}

impl GoogleTrendsClient {
    /// Create a new client
    pub fn new(config: &TrendsConfig) -> Result<Self> {
        Ok(Self {
            client: build_client_with(config.timeout_seconds, |builder| {
                builder.cookie_store(true)
            })?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            home_url: config.home_url.clone(),
            session: OnceCell::new(),
            region: config.region.clone(),
            timeframe: config.timeframe.clone(),
            language: config.language.clone(),
            timezone_offset: config.timezone_offset.to_string(),
        })
    }

    fn explore_request(&self, term: &str) -> Value {
        json!({
            "comparisonItem": [{
                "keyword": term,
                "time": self.timeframe,
                "geo": self.region,
            }],
            "category": 0,
            "property": "",
        })
    }

    /// Visit the home page once so the cookie store holds a session cookie
    async fn ensure_session(&self) -> Result<()> {
        self.session
            .get_or_try_init(|| async {
                let response = self
                    .client
                    .get(&self.home_url)
                    .query(&[("geo", self.region.as_str())])
                    .send()
                    .await?;
                ensure_success(SERVICE, response).await?;
                debug!("Trends session established");
                Ok::<_, DishcastError>(())
            })
            .await?;
        Ok(())
    }

    /// Request/token pair of the timeseries widget for `term`
    async fn timeseries_widget(&self, term: &str) -> Result<(Value, String)> {
        self.ensure_session().await?;

        let url = format!("{}/explore", self.base_url);
        let req = self.explore_request(term).to_string();

        let response = self
            .client
            .post(&url)
            .query(&[
                ("hl", self.language.as_str()),
                ("tz", self.timezone_offset.as_str()),
                ("req", req.as_str()),
            ])
            .send()
            .await?;
        let body = ensure_success(SERVICE, response).await?.text().await?;
        let explore: ExploreResponse = parse_prefixed(&body)?;

        explore
            .widgets
            .into_iter()
            .find(|widget| widget.id == TIMESERIES_WIDGET)
            .and_then(|widget| Some((widget.request?, widget.token?)))
            .ok_or_else(|| DishcastError::parse(SERVICE, "no timeseries widget in explore response"))
    }
}

#[async_trait]
impl TrendSource for GoogleTrendsClient {
    #[instrument(name = "trends_interest", skip(self), fields(region = %self.region))]
    async fn interest_over_time(&self, term: &str) -> Result<Vec<f64>> {
        let (request, token) = self.timeseries_widget(term).await?;

        let url = format!("{}/widgetdata/multiline", self.base_url);
        let req = request.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("hl", self.language.as_str()),
                ("tz", self.timezone_offset.as_str()),
                ("req", req.as_str()),
                ("token", token.as_str()),
            ])
            .send()
            .await?;
        let body = ensure_success(SERVICE, response).await?.text().await?;

        let values = series_values(parse_prefixed(&body)?);
        debug!("Trend series for '{}' has {} points", term, values.len());
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::http::{StatusCode, header};
    use axum::routing::{get, post};

    use super::*;
    use crate::testing::{RequestLog, serve};

    const EXPLORE_BODY: &str = r#")]}'
{"widgets":[{"id":"TIMESERIES","token":"APP6_token","request":{"resolution":"WEEK"}}]}"#;
    const MULTILINE_BODY: &str = r#")]}',
{"default":{"timelineData":[{"value":[40]},{"value":[60]}]}}"#;

    fn trends_router() -> Router {
        Router::new()
            .route(
                "/",
                get(|| async { ([(header::SET_COOKIE, "NID=session-1; Path=/")], "home") }),
            )
            .route("/trends/api/explore", post(|| async { EXPLORE_BODY }))
            .route("/trends/api/widgetdata/multiline", get(|| async { MULTILINE_BODY }))
    }

    fn local_client(base: &str) -> GoogleTrendsClient {
        GoogleTrendsClient::new(&TrendsConfig {
            base_url: format!("{base}/trends/api"),
            home_url: format!("{base}/"),
            ..TrendsConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_strip_json_prefix() {
        assert_eq!(strip_json_prefix(")]}'\n{\"a\":1}").unwrap(), "{\"a\":1}");
        assert_eq!(strip_json_prefix(")]}',\n{\"a\":1}").unwrap(), "{\"a\":1}");
        assert!(strip_json_prefix(")]}'").is_err());
    }

    #[test]
    fn test_explore_widget_parsing() {
        let body = r#")]}'
{"widgets":[
  {"id":"GEO_MAP","token":"geo","request":{}},
  {"id":"TIMESERIES","token":"APP6_token","request":{"time":"2025-10-17 2026-10-17","resolution":"WEEK"}}
]}"#;
        let explore: ExploreResponse = parse_prefixed(body).unwrap();
        let widget = explore
            .widgets
            .into_iter()
            .find(|w| w.id == TIMESERIES_WIDGET)
            .unwrap();
        assert_eq!(widget.token.as_deref(), Some("APP6_token"));
        assert_eq!(widget.request.unwrap()["resolution"], "WEEK");
    }

    #[test]
    fn test_multiline_series_values() {
        let body = r#")]}',
{"default":{"timelineData":[
  {"time":"1","formattedTime":"Oct 2025","value":[40],"hasData":[true]},
  {"time":"2","formattedTime":"Nov 2025","value":[60],"hasData":[true]},
  {"time":"3","formattedTime":"Dec 2025","value":[],"hasData":[false]}
],"averages":[]}}"#;
        let values = series_values(parse_prefixed(body).unwrap());
        assert_eq!(values, vec![40.0, 60.0]);
    }

    #[test]
    fn test_explore_request_shape() {
        let client = GoogleTrendsClient::new(&TrendsConfig::default()).unwrap();
        let request = client.explore_request("麻辣烫");
        assert_eq!(request["comparisonItem"][0]["keyword"], "麻辣烫");
        assert_eq!(request["comparisonItem"][0]["geo"], "US");
        assert_eq!(request["comparisonItem"][0]["time"], "today 12-m");
    }

    #[tokio::test]
    async fn test_interest_over_time_exchange() {
        let log = RequestLog::default();
        let base = serve(log.attach(trends_router())).await;
        let client = local_client(&base);

        assert_eq!(client.interest_over_time("malatang").await.unwrap(), vec![40.0, 60.0]);
        assert_eq!(client.interest_over_time("ice jelly").await.unwrap(), vec![40.0, 60.0]);

        // Home page is visited once per client
        assert_eq!(
            log.paths(),
            vec![
                "/",
                "/trends/api/explore",
                "/trends/api/widgetdata/multiline",
                "/trends/api/explore",
                "/trends/api/widgetdata/multiline",
            ]
        );

        let seen = log.requests();
        assert_eq!(seen[0].query["geo"], "US");

        let explore = &seen[1];
        assert_eq!(explore.method, "POST");
        assert!(explore.header("cookie").unwrap().contains("NID=session-1"));
        assert_eq!(explore.query["hl"], "en-US");
        assert_eq!(explore.query["tz"], "360");
        let req: Value = serde_json::from_str(&explore.query["req"]).unwrap();
        assert_eq!(req["comparisonItem"][0]["keyword"], "malatang");

        let multiline = &seen[2];
        assert_eq!(multiline.query["token"], "APP6_token");
        let req: Value = serde_json::from_str(&multiline.query["req"]).unwrap();
        assert_eq!(req["resolution"], "WEEK");

        assert!(seen[3].header("cookie").unwrap().contains("NID=session-1"));
    }

    #[tokio::test]
    async fn test_rate_limited_explore() {
        let router = Router::new()
            .route("/", get(|| async { "home" }))
            .route(
                "/trends/api/explore",
                post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
            );
        let base = serve(router).await;

        let err = local_client(&base).interest_over_time("malatang").await.unwrap_err();
        assert_eq!(err.to_string(), "API error (google trends): rate limit exceeded");
    }

    #[tokio::test]
    async fn test_missing_timeseries_widget() {
        let router = Router::new()
            .route("/", get(|| async { "home" }))
            .route(
                "/trends/api/explore",
                post(|| async { ")]}'\n{\"widgets\":[{\"id\":\"GEO_MAP\"}]}" }),
            );
        let base = serve(router).await;

        let err = local_client(&base).interest_over_time("malatang").await.unwrap_err();
        assert!(matches!(err, DishcastError::Parse { .. }));
    }
}
