use std::time::Duration;

use async_trait::async_trait;

use minha_core::{errors::Error, ports::PageFetcher, Result};

/// Plain `GET` fetcher for the monitored page.
#[derive(Clone, Debug)]
pub struct HttpPageFetcher {
    http: reqwest::Client,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::External(format!("http client build error: {e}")))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Fetch(format!("request error: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Fetch(format!("{url} returned {status}")));
        }

        resp.text()
            .await
            .map_err(|e| Error::Fetch(format!("body read error: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    /// One-shot HTTP server answering every connection with `response`.
    async fn serve_raw(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut sock, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = sock.read(&mut buf).await;
                let _ = sock.write_all(response.as_bytes()).await;
                let _ = sock.shutdown().await;
            }
        });
        format!("http://{addr}/pre_inscription")
    }

    #[tokio::test]
    async fn returns_body_on_success() {
        let url = serve_raw(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 11\r\nConnection: close\r\n\r\n<p>open</p>",
        )
        .await;
        let fetcher = HttpPageFetcher::new(Duration::from_secs(5)).unwrap();
        assert_eq!(fetcher.fetch(&url).await.unwrap(), "<p>open</p>");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let url = serve_raw(
            "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 4\r\nConnection: close\r\n\r\ndown",
        )
        .await;
        let fetcher = HttpPageFetcher::new(Duration::from_secs(5)).unwrap();
        let err = fetcher.fetch(&url).await.unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
    }

    #[tokio::test]
    async fn connection_refused_is_an_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = HttpPageFetcher::new(Duration::from_secs(2)).unwrap();
        assert!(fetcher.fetch(&format!("http://{addr}/")).await.is_err());
    }
}
