use reqwest::blocking::{Client, Response};
use serde_json::json;

use crate::models::{InvokeRequest, PromiseInfo};

pub struct HTTPClient {
    pub base_url: String,
    client: Client,
}

impl HTTPClient {
    pub fn new(base_url: &str) -> Result<Self, String> {
        // research fans out to child invocations, so allow a long wait
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(600))
            .build()
            .map_err(|err| err.to_string())?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn research(&self, topic: &str, depth: u32, id: Option<String>) -> Result<PromiseInfo, String> {
        let req = InvokeRequest {
            id,
            func: "research".to_string(),
            args: json!({"topic": topic, "depth": depth}),
        };
        let resp = self
            .client
            .post(format!("{}/invoke", self.base_url))
            .json(&req)
            .send()
            .map_err(|err| err.to_string())?;
        read_json(resp)
    }

    pub fn promise(&self, id: &str) -> Result<PromiseInfo, String> {
        let resp = self
            .client
            .get(format!("{}/promises/{}", self.base_url, id))
            .send()
            .map_err(|err| err.to_string())?;
        read_json(resp)
    }

    pub fn list(&self, limit: usize) -> Result<Vec<PromiseInfo>, String> {
        let resp = self
            .client
            .get(format!("{}/promises?limit={}", self.base_url, limit))
            .send()
            .map_err(|err| err.to_string())?;
        let value: serde_json::Value = read_json(resp)?;
        let promises = value
            .get("promises")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        Ok(promises
            .into_iter()
            .filter_map(|item| serde_json::from_value::<PromiseInfo>(item).ok())
            .collect())
    }
}

fn read_json<T: serde::de::DeserializeOwned>(resp: Response) -> Result<T, String> {
    if resp.status().is_success() {
        resp.json::<T>().map_err(|err| err.to_string())
    } else {
        let status = resp.status();
        let body = resp.text().unwrap_or_default();
        Err(format!("http {}: {}", status.as_u16(), body))
    }
}
