//! HTTP client for the segment database service.

use chrono::NaiveDate;
use mirror_core::MirrorData;
use reqwest::{Client, Response, StatusCode};
use segment_runtime::{
    format_wire_date, JiraSegmentData, Position, SegmentToM1Pos, SegmentToM1Positions, WireDate,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::sse::ProgressParser;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:9192";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} answered {status}")]
    Status { endpoint: String, status: StatusCode },
    #[error("malformed answer from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to read snapshot {path}: {source}")]
    SnapshotRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse snapshot: {0}")]
    SnapshotParse(#[from] serde_json::Error),
    #[error("the offline snapshot cannot be edited")]
    ReadOnly,
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send(
        &self,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<Response, BackendError> {
        let response = request.send().await.map_err(|source| BackendError::Transport {
            endpoint: path.to_string(),
            source,
        })?;
        if response.status() != StatusCode::OK {
            return Err(BackendError::Status {
                endpoint: path.to_string(),
                status: response.status(),
            });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(
        path: &str,
        response: Response,
    ) -> Result<T, BackendError> {
        response.json().await.map_err(|source| BackendError::Decode {
            endpoint: path.to_string(),
            source,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let response = self.send(path, self.http.get(self.url(path))).await?;
        Self::decode(path, response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, BackendError> {
        let response = self
            .send(path, self.http.post(self.url(path)).json(body))
            .await?;
        Self::decode(path, response).await
    }

    async fn post_date<T: DeserializeOwned>(
        &self,
        path: &str,
        date: NaiveDate,
    ) -> Result<T, BackendError> {
        self.post_json(path, &format_wire_date(date)).await
    }

    pub async fn positions_on_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<SegmentToM1Pos>, BackendError> {
        self.post_date("segmentPositionsOnDate", date).await
    }

    pub async fn most_recent_change(
        &self,
        date: NaiveDate,
    ) -> Result<Option<NaiveDate>, BackendError> {
        let answer: Option<WireDate> = self.post_date("mostRecentChange", date).await?;
        Ok(answer.map(|date| date.0))
    }

    pub async fn next_change(&self, date: NaiveDate) -> Result<Option<NaiveDate>, BackendError> {
        let answer: Option<WireDate> = self.post_date("nextChange", date).await?;
        Ok(answer.map(|date| date.0))
    }

    pub async fn prev_change(&self, date: NaiveDate) -> Result<Option<NaiveDate>, BackendError> {
        let answer: Option<WireDate> = self.post_date("prevChange", date).await?;
        Ok(answer.map(|date| date.0))
    }

    pub async fn position_history(
        &self,
        position: Position,
    ) -> Result<Vec<SegmentToM1Pos>, BackendError> {
        self.get_json(&format!("allSegmentIds/{position}")).await
    }

    pub async fn available_segment_ids(
        &self,
        position: Position,
    ) -> Result<Vec<String>, BackendError> {
        self.get_json(&format!("availableSegmentIdsForPos/{position}")).await
    }

    pub async fn current_segment_at(
        &self,
        position: Position,
    ) -> Result<Option<SegmentToM1Pos>, BackendError> {
        self.get_json(&format!("currentSegmentAtPosition/{position}")).await
    }

    pub async fn set_position(&self, record: &SegmentToM1Pos) -> Result<(), BackendError> {
        self.send("setPosition", self.http.post(self.url("setPosition")).json(record))
            .await
            .map(drop)
    }

    pub async fn set_positions(
        &self,
        positions: &SegmentToM1Positions,
    ) -> Result<(), BackendError> {
        self.send("setPositions", self.http.post(self.url("setPositions")).json(positions))
            .await
            .map(drop)
    }

    pub async fn segment_data(&self) -> Result<Vec<JiraSegmentData>, BackendError> {
        self.get_json("segmentData").await
    }

    pub async fn auth_enabled(&self) -> Result<bool, BackendError> {
        self.get_json("authEnabled").await
    }

    /// Occupancy, tracker data and flags for one reference date, fetched concurrently.
    pub async fn load(&self, date: NaiveDate) -> Result<MirrorData, BackendError> {
        let (records, segments, most_recent_change, auth_enabled) = tokio::join!(
            self.positions_on_date(date),
            self.segment_data(),
            self.most_recent_change(date),
            self.auth_enabled(),
        );
        let auth_enabled = auth_enabled.unwrap_or_else(|err| {
            tracing::warn!(
                target: "segment_map::backend",
                error = %err,
                "backend.auth_flag_unavailable"
            );
            false
        });
        Ok(MirrorData::new(records?, segments?, most_recent_change?)
            .with_auth_enabled(auth_enabled))
    }

    /// Starts a JIRA sync and reports progress until the stream ends.
    pub async fn sync_with_jira(&self, mut progress: impl FnMut(u8)) -> Result<(), BackendError> {
        const PATH: &str = "syncWithJira";
        let mut response = self.send(PATH, self.http.get(self.url(PATH))).await?;
        let mut parser = ProgressParser::new();
        while let Some(chunk) = response.chunk().await.map_err(|source| BackendError::Transport {
            endpoint: PATH.to_string(),
            source,
        })? {
            parser.feed(&chunk).into_iter().for_each(&mut progress);
        }
        if let Some(last) = parser.finish() {
            progress(last);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client = BackendClient::new("http://localhost:9192/");
        assert_eq!(client.base_url(), DEFAULT_BACKEND_URL);
        assert_eq!(
            client.url("allSegmentIds/A1"),
            "http://localhost:9192/allSegmentIds/A1"
        );
    }

    #[test]
    fn status_errors_name_the_endpoint() {
        let err = BackendError::Status {
            endpoint: "setPosition".to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        };
        assert_eq!(err.to_string(), "setPosition answered 500 Internal Server Error");
    }
}
