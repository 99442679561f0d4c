use crate::utils::error::{EtlError, Result};
use futures::future::try_join_all;
use reqwest::Client;
use std::future::Future;
use tokio::sync::Semaphore;
use url::Url;

/// 同時最多執行 `limit` 個 future，結果依輸入順序回傳。
/// 任一個失敗即放棄其餘請求並回傳該錯誤。
pub async fn bounded_try_join<I, F, Fut, T>(items: I, limit: usize, f: F) -> Result<Vec<T>>
where
    I: IntoIterator,
    F: Fn(I::Item) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let semaphore = Semaphore::new(limit.max(1));

    let tasks = items.into_iter().map(|item| {
        let permit = semaphore.acquire();
        let task = f(item);
        async move {
            let _permit = permit
                .await
                .map_err(|e| EtlError::processing(format!("fetch limiter closed: {}", e)))?;
            task.await
        }
    });

    try_join_all(tasks).await
}

/// 單一 pipeline 專用的 HTTP client，drop 時釋放連線池
pub struct HttpFetcher {
    client: Client,
    concurrency: usize,
}

impl HttpFetcher {
    pub fn new(concurrency: usize) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            concurrency,
        })
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// 併發抓取多個網址的文字內容
    pub async fn fetch_texts(&self, urls: &[Url]) -> Result<Vec<String>> {
        bounded_try_join(urls, self.concurrency, |url| self.fetch_text(url)).await
    }

    pub async fn fetch_text(&self, url: &Url) -> Result<String> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url.clone()).send().await?;

        tracing::debug!("Response status from {}: {}", url, response.status());
        let body = response.error_for_status()?.text().await?;
        Ok(body)
    }

    pub async fn fetch_json(&self, url: &Url) -> Result<serde_json::Value> {
        let body = self.fetch_text(url).await?;
        Ok(serde_json::from_str(&body)?)
    }
}
