//! Aliyun SLS `PutLogs` over HTTP.

use std::net::IpAddr;
use std::time::Duration;

use chrono::Utc;
use prost::Message as _;
use serde::Deserialize;
use ureq::Agent;

use super::proto::LogGroup;
use super::signature::{content_md5, http_date, sign, string_to_sign};
use super::{BackendError, LogBackend};
use crate::http::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT, body_text, build_agent};
use crate::record::LogBatch;

/// REST API version sent in `x-log-apiversion`.
pub const API_VERSION: &str = "0.6.0";
const SIGNATURE_METHOD: &str = "hmac-sha1";
const CONTENT_TYPE: &str = "application/x-protobuf";

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    error_code: String,
    #[serde(default)]
    error_message: String,
}

/// Backend appending batches to an SLS logstore through the load-balanced
/// shard route.
pub struct SlsBackend {
    agent: Agent,
    scheme: String,
    host: String,
    access_key_id: String,
    access_key_secret: String,
    source: Option<String>,
}

impl SlsBackend {
    /// Build a backend with default timeouts.
    ///
    /// `endpoint` may carry an `http://` or `https://` prefix; plain HTTP is
    /// used when it does not.
    pub fn new(
        endpoint: &str,
        access_key_id: impl Into<String>,
        access_key_secret: impl Into<String>,
    ) -> Result<Self, native_tls::Error> {
        Self::with_timeouts(
            endpoint,
            access_key_id,
            access_key_secret,
            DEFAULT_CONNECT_TIMEOUT,
            DEFAULT_REQUEST_TIMEOUT,
        )
    }

    /// Build a backend with explicit timeouts.
    pub fn with_timeouts(
        endpoint: &str,
        access_key_id: impl Into<String>,
        access_key_secret: impl Into<String>,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, native_tls::Error> {
        let agent = build_agent(connect_timeout, request_timeout)?;
        Ok(Self::with_agent(
            agent,
            endpoint,
            access_key_id,
            access_key_secret,
        ))
    }

    /// Build a backend around an existing agent.
    pub fn with_agent(
        agent: Agent,
        endpoint: &str,
        access_key_id: impl Into<String>,
        access_key_secret: impl Into<String>,
    ) -> Self {
        let (scheme, host) = split_endpoint(endpoint);
        Self {
            agent,
            scheme: scheme.to_owned(),
            host: host.to_owned(),
            access_key_id: access_key_id.into(),
            access_key_secret: access_key_secret.into(),
            source: None,
        }
    }

    /// Set the `Source` field attached to every log group.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Project hosts are virtual-hosted (`project.endpoint`) unless the
    /// endpoint is an IP literal.
    fn url(&self, project: &str, resource: &str) -> String {
        if host_is_ip(&self.host) {
            format!("{}://{}{resource}", self.scheme, self.host)
        } else {
            format!("{}://{project}.{}{resource}", self.scheme, self.host)
        }
    }
}

impl LogBackend for SlsBackend {
    fn put_logs(&self, project: &str, logstore: &str, batch: &LogBatch) -> Result<(), BackendError> {
        let body = LogGroup::from_batch(batch, self.source.as_deref()).encode_to_vec();
        let resource = format!("/logstores/{logstore}/shards/lb");
        let md5 = content_md5(&body);
        let date = http_date(Utc::now());
        let log_headers = [
            ("x-log-apiversion", API_VERSION.to_owned()),
            ("x-log-bodyrawsize", body.len().to_string()),
            ("x-log-signaturemethod", SIGNATURE_METHOD.to_owned()),
        ];
        let signature = sign(
            &self.access_key_secret,
            &string_to_sign("POST", &md5, CONTENT_TYPE, &date, &log_headers, &resource),
        )?;

        let mut request = self
            .agent
            .post(&self.url(project, &resource))
            .set("Content-Type", CONTENT_TYPE)
            .set("Content-MD5", &md5)
            .set("Date", &date)
            .set(
                "Authorization",
                &format!("LOG {}:{signature}", self.access_key_id),
            );
        for (name, value) in &log_headers {
            request = request.set(name, value);
        }

        match request.send_bytes(&body) {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(status, response)) => Err(rejection(status, response)),
            Err(ureq::Error::Transport(err)) => Err(BackendError::Transport(err.to_string())),
        }
    }
}

fn rejection(status: u16, response: ureq::Response) -> BackendError {
    let request_id = response.header("x-log-requestid").map(str::to_owned);
    let text = body_text(response);
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_else(|_| ErrorBody {
        error_message: text,
        ..ErrorBody::default()
    });
    BackendError::Rejected {
        status,
        code: body.error_code,
        message: body.error_message,
        request_id,
    }
}

fn split_endpoint(endpoint: &str) -> (&str, &str) {
    let endpoint = endpoint.trim().trim_end_matches('/');
    if let Some(host) = endpoint.strip_prefix("https://") {
        ("https", host)
    } else if let Some(host) = endpoint.strip_prefix("http://") {
        ("http", host)
    } else {
        ("http", endpoint)
    }
}

fn host_is_ip(host: &str) -> bool {
    if host.parse::<IpAddr>().is_ok() {
        return true;
    }
    host.rsplit_once(':')
        .is_some_and(|(addr, port)| port.parse::<u16>().is_ok() && addr.parse::<IpAddr>().is_ok())
}
