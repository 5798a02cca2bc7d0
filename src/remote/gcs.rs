//! Google Cloud Storage over the JSON API.
//!
//! Listing uses `GET /storage/v1/b/{bucket}/o?prefix=..` with page tokens;
//! downloads use `alt=media` on the object resource. Authentication is a
//! caller-supplied bearer token; public buckets work without one.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use super::{ObjectStore, RemoteObject};
use crate::error::Yolo2CocoError;

pub const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";

pub struct GcsStore {
    agent: ureq::Agent,
    endpoint: String,
    token: Option<String>,
}

impl GcsStore {
    pub fn new(token: Option<String>) -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT, token)
    }

    pub fn with_endpoint(endpoint: impl Into<String>, token: Option<String>) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_connect(Some(Duration::from_secs(30)))
            .build();
        Self {
            agent: config.into(),
            endpoint: endpoint.into(),
            token,
        }
    }

    fn get(&self, url: &url::Url) -> Result<ureq::http::Response<ureq::Body>, String> {
        let mut request = self.agent.get(url.as_str());
        if let Some(token) = self.token.as_deref() {
            request = request.header("Authorization", &format!("Bearer {token}"));
        }
        request.call().map_err(|source| source.to_string())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPage {
    #[serde(default)]
    items: Vec<ListItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListItem {
    name: String,
    // int64 values are strings in the JSON API.
    size: Option<String>,
}

fn parse_list_page(body: &str) -> Result<(Vec<RemoteObject>, Option<String>), serde_json::Error> {
    let page: ListPage = serde_json::from_str(body)?;
    let objects = page
        .items
        .into_iter()
        .map(|item| RemoteObject {
            size: item.size.and_then(|s| s.parse().ok()),
            key: item.name,
        })
        .collect();
    Ok((objects, page.next_page_token))
}

/// `{endpoint}/storage/v1/b/{bucket}/o?prefix=..[&pageToken=..]`
pub fn object_list_url(
    endpoint: &str,
    bucket: &str,
    prefix: &str,
    page_token: Option<&str>,
) -> Result<url::Url, url::ParseError> {
    let mut url = url::Url::parse(endpoint)?;
    url.path_segments_mut()
        .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(["storage", "v1", "b", bucket, "o"]);
    if !prefix.is_empty() {
        url.query_pairs_mut().append_pair("prefix", prefix);
    }
    if let Some(token) = page_token {
        url.query_pairs_mut().append_pair("pageToken", token);
    }
    Ok(url)
}

/// `{endpoint}/storage/v1/b/{bucket}/o/{key}?alt=media`, with `/` in the
/// key percent-encoded.
pub fn object_media_url(endpoint: &str, bucket: &str, key: &str) -> Result<url::Url, url::ParseError> {
    let mut url = url::Url::parse(endpoint)?;
    url.path_segments_mut()
        .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(["storage", "v1", "b", bucket, "o", key]);
    url.query_pairs_mut().append_pair("alt", "media");
    Ok(url)
}

impl ObjectStore for GcsStore {
    fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<RemoteObject>, Yolo2CocoError> {
        let listing_error = |message: String| Yolo2CocoError::Download {
            key: format!("gs://{bucket}/{prefix}"),
            message,
        };

        let mut objects = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let url = object_list_url(&self.endpoint, bucket, prefix, page_token.as_deref())
                .map_err(|source| listing_error(source.to_string()))?;
            let mut response = self.get(&url).map_err(listing_error)?;
            let body = response
                .body_mut()
                .read_to_string()
                .map_err(|source| listing_error(source.to_string()))?;
            let (page, next) =
                parse_list_page(&body).map_err(|source| listing_error(source.to_string()))?;
            objects.extend(page);

            match next {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(objects)
    }

    fn download(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), Yolo2CocoError> {
        let download_error = |message: String| Yolo2CocoError::Download {
            key: key.to_string(),
            message,
        };

        let url = object_media_url(&self.endpoint, bucket, key)
            .map_err(|source| download_error(source.to_string()))?;
        let mut response = self.get(&url).map_err(download_error)?;

        // `dest` only appears once the whole body is on disk.
        let partial = partial_path(dest);
        let written = File::create(&partial)
            .and_then(|file| {
                let mut writer = BufWriter::new(file);
                io::copy(&mut response.body_mut().as_reader(), &mut writer)?;
                writer.flush()
            })
            .and_then(|()| fs::rename(&partial, dest));

        written.map_err(|source| {
            let _ = fs::remove_file(&partial);
            download_error(source.to_string())
        })
    }
}

/// `<dest>.part`, next to `dest`.
fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}
