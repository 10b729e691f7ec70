use bytes::Bytes;
use reqwest::Client;

use crate::error::AdapterError;

pub async fn fetch_feed(client: &Client, url: &str) -> Result<Bytes, AdapterError> {
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(AdapterError::Fetch(format!("HTTP {} from {}", status, url)));
    }
    Ok(resp.bytes().await?)
}

pub async fn fetch_article(client: &Client, url: &str) -> Result<String, AdapterError> {
    let resp = client.get(url).send().await?.error_for_status()?;
    Ok(resp.text().await?)
}
