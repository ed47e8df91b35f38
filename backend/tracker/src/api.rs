use anyhow::{Context, Result, bail};
use records::{
    ComplaintRecord, Status,
    payloads::{
        Acknowledged, Failure, ListResponse, LoginRequest, LoginResponse, StatsResponse,
        SubmitRequest, SubmitResponse, TrackResponse, UpdateStatusRequest,
    },
};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

pub const DEFAULT_SERVER: &str = "http://localhost:3000";

pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{path}", self.base_url)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self.http.post(self.url("login")).json(&request).send().await?;

        Ok(read::<LoginResponse>(response).await?.message)
    }

    pub async fn submit(&self, request: &SubmitRequest) -> Result<String> {
        let response = self
            .http
            .post(self.url("complaints"))
            .json(request)
            .send()
            .await?;

        Ok(read::<SubmitResponse>(response).await?.ref_id)
    }

    /// `None` when the server does not know `ref_id`.
    pub async fn track(&self, ref_id: &str) -> Result<Option<TrackResponse>> {
        let response = self
            .http
            .get(self.url(&format!("complaints/{ref_id}")))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        read(response).await.map(Some)
    }

    pub async fn stats(&self) -> Result<StatsResponse> {
        let response = self.http.get(self.url("stats")).send().await?;

        read(response).await
    }

    pub async fn list(&self, status: Option<Status>) -> Result<Vec<ComplaintRecord>> {
        let mut request = self.http.get(self.url("all-complaints"));
        if let Some(status) = status {
            request = request.query(&[("status", status.as_str())]);
        }

        Ok(read::<ListResponse>(request.send().await?).await?.complaints)
    }

    /// `false` when the server does not know `ref_id`.
    pub async fn update_status(&self, ref_id: &str, new_status: Status) -> Result<bool> {
        let request = UpdateStatusRequest {
            ref_id: ref_id.to_string(),
            new_status: new_status.to_string(),
        };
        let response = self
            .http
            .post(self.url("update-status"))
            .json(&request)
            .send()
            .await?;

        acknowledged(response).await
    }

    /// `false` when the server does not know `ref_id`.
    pub async fn delete(&self, ref_id: &str) -> Result<bool> {
        let response = self
            .http
            .delete(self.url(&format!("delete-complaint/{ref_id}")))
            .send()
            .await?;

        acknowledged(response).await
    }
}

async fn acknowledged(response: Response) -> Result<bool> {
    if response.status() == StatusCode::NOT_FOUND {
        return Ok(false);
    }

    Ok(read::<Acknowledged>(response).await?.success)
}

async fn read<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        return serde_json::from_str(&body).context("Unexpected response body");
    }

    match serde_json::from_str::<Failure>(&body) {
        Ok(failure) => bail!("{status}: {}", failure.reason()),
        Err(_) => bail!("{status}"),
    }
}
