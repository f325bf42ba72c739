use super::dto::{HoldingDto, IntradayDto, StockDetailDto, UserDto, decode, decode_ack, error_from_body};
use super::endpoints::Endpoints;
use crate::domain::errors::{FetchError, FetchResult};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::portfolio::{
    ApiFuture, Holding, HoldingDraft, HoldingId, Identity, IntradaySeries, PortfolioApi, StockDetail, Symbol, UserId,
};
use futures::FutureExt;
use gloo_net::http::{Request, RequestBuilder, Response};
use serde::Serialize;
use std::future::Future;

/// REST client for the portfolio backend built on `gloo-net`.
#[derive(Clone)]
pub struct GlooPortfolioApi {
    endpoints: Endpoints,
}

impl GlooPortfolioApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { endpoints: Endpoints::new(base_url) }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }
}

fn json_request(builder: RequestBuilder) -> RequestBuilder {
    builder.header("Content-Type", "application/json").header("Accept", "application/json")
}

fn with_body<T: Serialize>(builder: RequestBuilder, body: &T) -> FetchResult<Request> {
    json_request(builder)
        .json(body)
        .map_err(|e| FetchError::Transport(format!("Could not encode request: {e}")))
}

/// Awaits the response and returns `(status, body)` for 2xx, the body's
/// message as an application error otherwise.
async fn execute(
    url: String,
    response: impl Future<Output = Result<Response, gloo_net::Error>>,
) -> FetchResult<(u16, String)> {
    get_logger().debug(LogComponent::Infrastructure("HTTP"), &format!("🌐 {url}"));

    let response = response.await.map_err(|e| {
        get_logger().error(LogComponent::Infrastructure("HTTP"), &format!("Request to {url} failed: {e}"));
        FetchError::Transport(e.to_string())
    })?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| FetchError::Transport(format!("Could not read response body: {e}")))?;

    if !response.ok() {
        let error = error_from_body(status, &body);
        get_logger().warn(
            LogComponent::Infrastructure("HTTP"),
            &format!("{url} answered {status}: {}", error.message()),
        );
        return Err(error);
    }
    Ok((status, body))
}

impl PortfolioApi for GlooPortfolioApi {
    fn fetch_user_by_username(&self, username: String) -> ApiFuture<Identity> {
        let url = self.endpoints.user_by_username(&username);
        async move {
            let request = json_request(Request::get(&url)).send();
            let (status, body) = execute(url, request).await?;
            decode::<UserDto>(status, &body).map(Identity::from)
        }
        .boxed_local()
    }

    fn create_user(&self, username: String) -> ApiFuture<Identity> {
        let url = self.endpoints.users();
        async move {
            let request = with_body(Request::post(&url), &serde_json::json!({ "username": username }))?;
            let (status, body) = execute(url, request.send()).await?;
            decode::<UserDto>(status, &body).map(Identity::from)
        }
        .boxed_local()
    }

    fn initialize_portfolio(&self, username: String) -> ApiFuture<()> {
        let url = self.endpoints.initialize_portfolio(&username);
        async move {
            let request = json_request(Request::post(&url)).send();
            let (status, body) = execute(url, request).await?;
            decode_ack(status, &body)
        }
        .boxed_local()
    }

    fn fetch_portfolio_value(&self, user_id: UserId) -> ApiFuture<f64> {
        let url = self.endpoints.portfolio_value(user_id);
        async move {
            let request = json_request(Request::get(&url)).send();
            let (status, body) = execute(url, request).await?;
            decode::<f64>(status, &body)
        }
        .boxed_local()
    }

    fn fetch_stock_detail(&self, symbol: Symbol) -> ApiFuture<StockDetail> {
        let url = self.endpoints.stock_detail(&symbol);
        async move {
            let request = json_request(Request::get(&url)).send();
            let (status, body) = execute(url, request).await?;
            decode::<StockDetailDto>(status, &body).map(Into::into)
        }
        .boxed_local()
    }

    fn fetch_holding(&self, user_id: UserId, symbol: Symbol) -> ApiFuture<Holding> {
        let url = self.endpoints.holding(user_id, &symbol);
        async move {
            let request = json_request(Request::get(&url)).send();
            let (status, body) = execute(url, request).await?;
            decode::<HoldingDto>(status, &body).map(Into::into)
        }
        .boxed_local()
    }

    fn fetch_holdings(&self, user_id: UserId) -> ApiFuture<Vec<Holding>> {
        let url = self.endpoints.holdings(user_id);
        async move {
            let request = json_request(Request::get(&url)).send();
            let (status, body) = execute(url, request).await?;
            let holdings = decode::<Vec<HoldingDto>>(status, &body)?;
            Ok(holdings.into_iter().map(Into::into).collect())
        }
        .boxed_local()
    }

    fn fetch_intraday(&self, symbol: Symbol) -> ApiFuture<IntradaySeries> {
        let url = self.endpoints.intraday(&symbol);
        async move {
            let request = json_request(Request::get(&url)).send();
            let (status, body) = execute(url, request).await?;
            let series = decode::<IntradayDto>(status, &body)?.into_series(symbol, status)?;
            get_logger().info(
                LogComponent::Infrastructure("HTTP"),
                &format!("📈 Loaded {} intraday points for {}", series.len(), series.symbol),
            );
            Ok(series)
        }
        .boxed_local()
    }

    fn add_holding(&self, user_id: UserId, draft: HoldingDraft) -> ApiFuture<Holding> {
        let url = self.endpoints.add_holding(user_id);
        async move {
            let request = with_body(Request::post(&url), &draft)?;
            let (status, body) = execute(url, request.send()).await?;
            decode::<HoldingDto>(status, &body).map(Into::into)
        }
        .boxed_local()
    }

    fn update_holding(&self, id: HoldingId, draft: HoldingDraft) -> ApiFuture<Holding> {
        let url = self.endpoints.holding_by_id(id);
        async move {
            let request = with_body(Request::put(&url), &draft)?;
            let (status, body) = execute(url, request.send()).await?;
            decode::<HoldingDto>(status, &body).map(Into::into)
        }
        .boxed_local()
    }

    fn delete_holding(&self, id: HoldingId) -> ApiFuture<()> {
        let url = self.endpoints.holding_by_id(id);
        async move {
            let request = json_request(Request::delete(&url)).send();
            let (status, body) = execute(url, request).await?;
            decode_ack(status, &body)
        }
        .boxed_local()
    }
}
