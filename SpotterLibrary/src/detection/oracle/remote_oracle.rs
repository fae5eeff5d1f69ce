use std::io::Cursor;
use std::time::Duration;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, RgbImage};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use crate::utils::logging::*;
use crate::utils::log_entry::oracle::OracleEntry;
use crate::detection::grid_partitioner::GridSpec;
use crate::detection::oracle::vision_oracle::VisionOracle;
use crate::detection::utils::cell_selection::CellSelection;

#[derive(Serialize)]
struct OracleRequest<'a> {
    image: String,
    description: &'a str,
    grid: &'a GridSpec,
}

#[derive(Deserialize)]
struct OracleResponse {
    selections: Vec<CellSelection>,
}

/// HTTP client for the vision model serving endpoint. The grid image goes up
/// as base64 PNG alongside the target description and cell layout.
pub struct RemoteOracle {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteOracle {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, LogEntry> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| error_entry!(OracleEntry::TransportError(err)))?;
        Ok(Self {
            client,
            endpoint,
        })
    }

    fn encode_png(image: &RgbImage) -> Result<String, LogEntry> {
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Png)
            .map_err(|err| error_entry!(OracleEntry::EncodeError(err)))?;
        Ok(STANDARD.encode(buffer.into_inner()))
    }
}

impl VisionOracle for RemoteOracle {
    fn query<'a>(&'a self, grid_image: &'a RgbImage, description: &'a str, grid: &'a GridSpec) -> BoxFuture<'a, Result<Vec<CellSelection>, LogEntry>> {
        Box::pin(async move {
            let image = Self::encode_png(grid_image)?;
            let request = OracleRequest {
                image,
                description,
                grid,
            };
            let response = self.client.post(&self.endpoint)
                .json(&request)
                .send()
                .await
                .map_err(|err| {
                    if err.is_timeout() {
                        error_entry!(OracleEntry::QueryTimeout)
                    } else {
                        error_entry!(OracleEntry::TransportError(err))
                    }
                })?;
            let status = response.status();
            if !status.is_success() {
                return Err(error_entry!(OracleEntry::BadStatus(status)));
            }
            let parsed = response.json::<OracleResponse>()
                .await
                .map_err(|err| error_entry!(OracleEntry::MalformedResponse(err.to_string())))?;
            Ok(parsed.selections)
        })
    }
}
