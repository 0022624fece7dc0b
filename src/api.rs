//! HTTP client for the GeniusMind recommendation backend.
//!
//! The `Backend` trait is the seam between the runtime and the network so the
//! event loop can be driven by an in-memory fake in tests.

use crate::config::ServerConfig;
use crate::error::{ApiError, ApiResult};
use crate::models::{Dashboard, DetailMode, DetailPayload, RecommendationItem, StockProfile};
use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Client, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Placeholder substituted with the ticker in detail paths.
const SYMBOL_PLACEHOLDER: &str = "{symbol}";

const USER_AGENT: &str = concat!("geniusmind/", env!("CARGO_PKG_VERSION"));

/// Operations the client needs from the backend.
pub trait Backend: Send + Sync + 'static {
    /// Ask for recommendations matching a free-text query.
    fn recommend(
        &self,
        query: &str,
    ) -> impl Future<Output = ApiResult<Vec<RecommendationItem>>> + Send;

    /// Fetch the company profile used by the simple detail view.
    fn stock_details(&self, symbol: &str) -> impl Future<Output = ApiResult<StockProfile>> + Send;

    /// Fetch the combined quote, fundamentals and technicals record.
    fn stock_dashboard(&self, symbol: &str) -> impl Future<Output = ApiResult<Dashboard>> + Send;

    /// Fetch whichever detail record the given mode displays.
    fn fetch_detail(
        &self,
        symbol: &str,
        mode: DetailMode,
    ) -> impl Future<Output = ApiResult<DetailPayload>> + Send {
        async move {
            match mode {
                DetailMode::Simple => self.stock_details(symbol).await.map(DetailPayload::Profile),
                DetailMode::Dashboard => self
                    .stock_dashboard(symbol)
                    .await
                    .map(|d| DetailPayload::Dashboard(Box::new(d))),
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct QueryBody<'a> {
    query: &'a str,
}

/// reqwest-backed implementation of [`Backend`].
pub struct GeniusMindClient {
    client: Client,
    base_url: Url,
    recommend_path: String,
    details_path: String,
    dashboard_path: String,
}

impl GeniusMindClient {
    /// Create a client for the configured server.
    pub fn new(server: &ServerConfig) -> ApiResult<Self> {
        let base_url = Url::parse(server.base_url.trim_end_matches('/'))
            .map_err(|_| ApiError::InvalidUrl(server.base_url.clone()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(server.base_url.clone()));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(server.timeout))
            .build()
            .map_err(ApiError::Transport)?;

        Ok(Self {
            client,
            base_url,
            recommend_path: server.recommend_path.clone(),
            details_path: server.details_path.clone(),
            dashboard_path: server.dashboard_path.clone(),
        })
    }

    /// Resolve an endpoint path against the base URL.
    fn endpoint(&self, path: &str, symbol: Option<&str>) -> ApiResult<Url> {
        let path = match symbol {
            Some(symbol) => path.replace(SYMBOL_PLACEHOLDER, &urlencoding::encode(symbol.trim())),
            None => path.to_string(),
        };
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|_| ApiError::InvalidUrl(joined))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        debug!(%url, "GET");
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await
            .map_err(ApiError::Transport)?;
        decode(url, response).await
    }
}

/// Reject non-2xx responses regardless of body, then decode JSON.
async fn decode<T: DeserializeOwned>(url: Url, response: Response) -> ApiResult<T> {
    let status = response.status();
    if !status.is_success() {
        warn!(%url, %status, "backend returned an error status");
        return Err(ApiError::Status {
            status,
            url: url.to_string(),
        });
    }

    response.json::<T>().await.map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}

impl Backend for GeniusMindClient {
    async fn recommend(&self, query: &str) -> ApiResult<Vec<RecommendationItem>> {
        let url = self.endpoint(&self.recommend_path, None)?;
        debug!(%url, query, "POST");

        let response = self
            .client
            .post(url.clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .json(&QueryBody { query })
            .send()
            .await
            .map_err(ApiError::Transport)?;

        // A JSON null is treated like an empty list
        let items: Option<Vec<RecommendationItem>> = decode(url, response).await?;
        Ok(items.unwrap_or_default())
    }

    async fn stock_details(&self, symbol: &str) -> ApiResult<StockProfile> {
        let url = self.endpoint(&self.details_path, Some(symbol))?;
        self.get_json(url).await
    }

    async fn stock_dashboard(&self, symbol: &str) -> ApiResult<Dashboard> {
        let url = self.endpoint(&self.dashboard_path, Some(symbol))?;
        self.get_json(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client_for(base_url: String) -> GeniusMindClient {
        let server = ServerConfig {
            base_url,
            timeout: 5,
            ..ServerConfig::default()
        };
        GeniusMindClient::new(&server).unwrap()
    }

    fn test_router() -> Router {
        Router::new()
            .route(
                "/api/get_stock_recommendation",
                post(|Json(body): Json<Value>| async move {
                    let query = body["query"].as_str().unwrap_or_default().to_string();
                    if query == "nothing" {
                        return Json(json!([{
                            "ticker": "SYSTEM",
                            "company_name": "No Stocks Found",
                            "reason": "Please try a broader request."
                        }]));
                    }
                    Json(json!([
                        {"ticker": "AAPL", "company_name": "Apple Inc.", "reason": query},
                        {"ticker": "MSFT", "company_name": "Microsoft", "reason": "Cloud growth"}
                    ]))
                }),
            )
            .route(
                "/api/get_stock_details/{symbol}",
                get(|Path(symbol): Path<String>| async move {
                    if symbol == "ZZZZ" {
                        return (
                            StatusCode::NOT_FOUND,
                            Json(json!({"error": "Could not retrieve FMP data."})),
                        );
                    }
                    (
                        StatusCode::OK,
                        Json(json!({"symbol": symbol, "companyName": "Apple Inc.", "mktCap": 3.0e12})),
                    )
                }),
            )
            .route(
                "/api/get_stock_dashboard/{symbol}",
                get(|Path(symbol): Path<String>| async move {
                    Json(json!({
                        "profile": {"symbol": symbol, "companyName": "Apple Inc."},
                        "liveQuote": {"price": 190.5, "change": 1.5, "changesPercentage": 0.79},
                        "fundamentals": {"peRatio": 29.1, "returnOnEquity": 1.47},
                        "technicals": {"rsi": 61.2, "sma": 185.0}
                    }))
                }),
            )
            .route(
                "/api/broken",
                post(|| async { "definitely not json" }),
            )
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let server = ServerConfig {
            base_url: "not a url".to_string(),
            ..ServerConfig::default()
        };
        assert!(matches!(
            GeniusMindClient::new(&server),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_endpoint_encodes_symbol() {
        let client = client_for("http://localhost:5000/".to_string());
        let url = client
            .endpoint("/api/get_stock_details/{symbol}", Some("BRK B"))
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/get_stock_details/BRK%20B");
    }

    #[tokio::test]
    async fn test_recommend_posts_query() {
        let client = client_for(serve(test_router()).await);
        let items = client.recommend("cheap growth stocks").await.unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].ticker, "AAPL");
        assert_eq!(items[0].reason.as_deref(), Some("cheap growth stocks"));
    }

    #[tokio::test]
    async fn test_recommend_returns_system_sentinel() {
        let client = client_for(serve(test_router()).await);
        let items = client.recommend("nothing").await.unwrap();

        assert_eq!(items.len(), 1);
        assert!(items[0].is_system());
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let client = client_for(serve(test_router()).await);
        let err = client.stock_details("ZZZZ").await.unwrap_err();

        match err {
            ApiError::Status { status, .. } => assert_eq!(status, StatusCode::NOT_FOUND),
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let base = serve(test_router()).await;
        let server = ServerConfig {
            base_url: base,
            recommend_path: "/api/broken".to_string(),
            ..ServerConfig::default()
        };
        let client = GeniusMindClient::new(&server).unwrap();

        assert!(matches!(
            client.recommend("anything").await,
            Err(ApiError::Decode { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_detail_by_mode() {
        let client = client_for(serve(test_router()).await);

        match client.fetch_detail("AAPL", DetailMode::Simple).await.unwrap() {
            DetailPayload::Profile(profile) => {
                assert_eq!(profile.market_cap, Some(3.0e12));
            }
            other => panic!("expected profile, got {other:?}"),
        }

        match client.fetch_detail("AAPL", DetailMode::Dashboard).await.unwrap() {
            DetailPayload::Dashboard(dashboard) => {
                assert_eq!(dashboard.live_quote.price, Some(190.5));
                assert_eq!(dashboard.technicals.unwrap().rsi, Some(61.2));
            }
            other => panic!("expected dashboard, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        // Bind then drop to get a port with nothing listening
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(format!("http://{}", addr));
        assert!(matches!(
            client.recommend("anything").await,
            Err(ApiError::Transport(_))
        ));
    }
}
