use async_trait::async_trait;
use reqwest::Client;
use tokio::net::TcpStream;

use crate::config::{
    CONNECTIVITY_PROBE_ADDR, CONNECTIVITY_PROBE_TIMEOUT, REMOTE_FETCH_TIMEOUT, REMOTE_QUOTES_URL,
};

/// A source of `%`-delimited quote text reached over the network.
#[async_trait]
pub trait QuoteFetcher: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch(&self) -> anyhow::Result<String>;
}

/// Fetches the official quote list over HTTPS.
///
/// A TCP connect to a well-known resolver runs first so an offline machine
/// fails within the probe timeout instead of waiting on DNS.
pub struct RemoteQuotes {
    client: Client,
    url: String,
    probe_addr: String,
}

impl RemoteQuotes {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_endpoints(REMOTE_QUOTES_URL, CONNECTIVITY_PROBE_ADDR)
    }

    pub fn with_endpoints(url: &str, probe_addr: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("data-scrubber/", env!("CARGO_PKG_VERSION")))
            .timeout(REMOTE_FETCH_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
            probe_addr: probe_addr.to_string(),
        })
    }

    async fn probe(&self) -> anyhow::Result<()> {
        match tokio::time::timeout(
            CONNECTIVITY_PROBE_TIMEOUT,
            TcpStream::connect(&self.probe_addr),
        )
        .await
        {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => anyhow::bail!("connectivity probe to {} failed: {e}", self.probe_addr),
            Err(_) => anyhow::bail!("connectivity probe to {} timed out", self.probe_addr),
        }
    }
}

#[async_trait]
impl QuoteFetcher for RemoteQuotes {
    fn name(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> anyhow::Result<String> {
        self.probe().await?;

        let resp = self.client.get(&self.url).send().await?;
        if !resp.status().is_success() {
            anyhow::bail!("quote fetch returned HTTP {}", resp.status());
        }
        Ok(resp.text().await?)
    }
}
