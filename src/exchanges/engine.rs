use async_trait::async_trait;
use futures_util::future::try_join;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::{post_json, OrderBookSource};
use crate::error::{PipelineError, Result};
use crate::models::{Book, MarketOrder, OrderBooks};
use crate::paging::{fetch_all_pages, PageSource, PAGE_SIZE};
use crate::symbols::wrapped_symbol_pattern;

const MARKET_CONTRACT: &str = "market";

#[derive(Debug, Serialize)]
struct FindRequest<'a> {
    jsonrpc: &'static str,
    id: u32,
    method: &'static str,
    params: FindParams<'a>,
}

#[derive(Debug, Serialize)]
struct FindParams<'a> {
    contract: &'a str,
    table: &'a str,
    query: &'a Value,
    offset: usize,
    limit: usize,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

impl RpcResponse {
    fn into_result<T: serde::de::DeserializeOwned>(self) -> Result<Vec<T>> {
        if let Some(err) = self.error.filter(|e| !e.is_null()) {
            let msg = match err {
                Value::String(s) => s,
                other => other.to_string(),
            };
            return Err(PipelineError::Rpc(msg));
        }
        match self.result {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(v) => Ok(serde_json::from_value(v)?),
        }
    }
}

/// Hive Engine sidechain node (`/contracts` JSON-RPC).
pub struct EngineNode {
    client: Client,
    contracts_url: String,
}

impl EngineNode {
    pub fn new(client: Client, node: &str) -> Self {
        Self {
            client,
            contracts_url: format!("{}/contracts", node.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl OrderBookSource for EngineNode {
    async fn find_orders(
        &self,
        table: &str,
        query: &Value,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<MarketOrder>> {
        let req = FindRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "find",
            params: FindParams {
                contract: MARKET_CONTRACT,
                table,
                query,
                offset,
                limit,
            },
        };
        let resp: RpcResponse = post_json(&self.client, &self.contracts_url, &req).await?;
        resp.into_result()
    }
}

/// One order-book table seen as a page source.
struct BookPages<'a> {
    source: &'a dyn OrderBookSource,
    table: &'static str,
    query: Value,
}

#[async_trait]
impl<'a> PageSource for BookPages<'a> {
    type Item = MarketOrder;

    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<MarketOrder>> {
        self.source
            .find_orders(self.table, &self.query, offset, limit)
            .await
    }
}

/// Every order of one side for all wrapped symbols.
pub async fn fetch_book(source: &dyn OrderBookSource, book: Book) -> Result<Vec<MarketOrder>> {
    let pages = BookPages {
        source,
        table: book.table(),
        query: json!({ "symbol": { "$regex": wrapped_symbol_pattern() } }),
    };
    let orders = fetch_all_pages(&pages, PAGE_SIZE).await?;
    info!("engine {} holds {} wrapped orders", book.table(), orders.len());
    Ok(orders)
}

/// Both sides, fetched concurrently. Either failing fails both.
pub async fn fetch_order_books(source: &dyn OrderBookSource) -> Result<OrderBooks> {
    let (sell, buy) = try_join(fetch_book(source, Book::Sell), fetch_book(source, Book::Buy)).await?;
    Ok(OrderBooks { sell, buy })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    struct FakeMarket {
        sell_pages: Vec<usize>,
        buy_pages: Vec<usize>,
        fail_table: Option<&'static str>,
        queries: Mutex<Vec<(String, Value, usize, usize)>>,
    }

    #[async_trait]
    impl OrderBookSource for FakeMarket {
        async fn find_orders(
            &self,
            table: &str,
            query: &Value,
            offset: usize,
            limit: usize,
        ) -> Result<Vec<MarketOrder>> {
            let call = {
                let mut q = self.queries.lock().unwrap();
                q.push((table.to_string(), query.clone(), offset, limit));
                q.iter().filter(|(t, ..)| t == table).count() - 1
            };
            if self.fail_table == Some(table) && call > 0 {
                return Err(PipelineError::Rpc("timeout".into()));
            }
            let pages = if table == "sellBook" { &self.sell_pages } else { &self.buy_pages };
            let n = pages.get(call).copied().unwrap_or(0);
            Ok((0..n)
                .map(|i| MarketOrder {
                    symbol: "SWAP.BTC".into(),
                    price: dec!(1),
                    id: (offset + i) as i64,
                    ..Default::default()
                })
                .collect())
        }
    }

    fn market(sell: &[usize], buy: &[usize]) -> FakeMarket {
        FakeMarket {
            sell_pages: sell.to_vec(),
            buy_pages: buy.to_vec(),
            fail_table: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    #[tokio::test]
    async fn fetches_both_books_fully() {
        let m = market(&[1000, 1000, 400], &[12]);
        let books = fetch_order_books(&m).await.unwrap();
        assert_eq!(books.sell.len(), 2400);
        assert_eq!(books.buy.len(), 12);

        let queries = m.queries.lock().unwrap();
        assert_eq!(queries.len(), 4);
        let (_, query, _, limit) = &queries[0];
        assert_eq!(query["symbol"]["$regex"], r"^SWAP\.");
        assert_eq!(*limit, PAGE_SIZE);
    }

    #[tokio::test]
    async fn any_failed_page_aborts() {
        let mut m = market(&[1000, 1000], &[5]);
        m.fail_table = Some("sellBook");
        assert!(fetch_order_books(&m).await.is_err());
    }

    #[test]
    fn rpc_error_member_is_surfaced() {
        let resp: RpcResponse =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"error":"bad query"}"#).unwrap();
        match resp.into_result::<MarketOrder>() {
            Err(PipelineError::Rpc(msg)) => assert_eq!(msg, "bad query"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn null_result_is_empty() {
        let resp: RpcResponse = serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":null}"#).unwrap();
        assert!(resp.into_result::<MarketOrder>().unwrap().is_empty());
    }

    #[test]
    fn find_request_shape() {
        let query = json!({ "symbol": { "$regex": wrapped_symbol_pattern() } });
        let req = FindRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "find",
            params: FindParams {
                contract: MARKET_CONTRACT,
                table: "buyBook",
                query: &query,
                offset: 2000,
                limit: PAGE_SIZE,
            },
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["method"], "find");
        assert_eq!(v["params"]["contract"], "market");
        assert_eq!(v["params"]["table"], "buyBook");
        assert_eq!(v["params"]["offset"], 2000);
        assert_eq!(v["params"]["limit"], 1000);
    }
}
