//! DingTalk custom robot webhook.
//!
//! Messages are posted as `text` messages. When a signing secret is
//! configured, each request carries a millisecond timestamp and an
//! HMAC-SHA256 signature in the query string.

use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64_STANDARD};
use chrono::Utc;
use hmac::{Hmac, Mac};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use ureq::Agent;

use super::{Notifier, NotifyError};
use crate::http::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT, body_text, build_agent};

/// Public robot endpoint.
pub const DINGTALK_WEBHOOK_URL: &str = "https://oapi.dingtalk.com/robot/send";

type HmacSha256 = Hmac<Sha256>;

#[derive(Serialize)]
struct TextMessage<'a> {
    msgtype: &'static str,
    text: TextBody<'a>,
}

#[derive(Serialize)]
struct TextBody<'a> {
    content: &'a str,
}

#[derive(Deserialize)]
struct Reply {
    #[serde(default)]
    errcode: i64,
    #[serde(default)]
    errmsg: String,
}

/// Notifier posting to a DingTalk robot.
pub struct DingTalkNotifier {
    agent: Agent,
    base_url: String,
    access_token: String,
    secret: String,
}

impl DingTalkNotifier {
    /// Build a notifier for the public endpoint with default timeouts.
    pub fn new(
        access_token: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self, native_tls::Error> {
        let agent = build_agent(DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT)?;
        Ok(Self::with_agent(agent, DINGTALK_WEBHOOK_URL, access_token, secret))
    }

    /// Build a notifier with explicit timeouts.
    pub fn with_timeouts(
        access_token: impl Into<String>,
        secret: impl Into<String>,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, native_tls::Error> {
        let agent = build_agent(connect_timeout, request_timeout)?;
        Ok(Self::with_agent(agent, DINGTALK_WEBHOOK_URL, access_token, secret))
    }

    /// Build a notifier posting to `base_url` through an existing agent.
    pub fn with_agent(
        agent: Agent,
        base_url: impl Into<String>,
        access_token: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            agent,
            base_url: base_url.into(),
            access_token: access_token.into(),
            secret: secret.into(),
        }
    }

    fn request_url(&self, timestamp_ms: i64) -> Result<String, NotifyError> {
        let mut url = format!(
            "{}?access_token={}",
            self.base_url,
            utf8_percent_encode(&self.access_token, NON_ALPHANUMERIC)
        );
        if !self.secret.is_empty() {
            let signature = sign(&self.secret, timestamp_ms)?;
            url.push_str(&format!(
                "&timestamp={timestamp_ms}&sign={}",
                utf8_percent_encode(&signature, NON_ALPHANUMERIC)
            ));
        }
        Ok(url)
    }
}

impl Notifier for DingTalkNotifier {
    fn send_text(&self, text: &str) -> Result<(), NotifyError> {
        let body = serde_json::to_string(&TextMessage {
            msgtype: "text",
            text: TextBody { content: text },
        })?;
        let url = self.request_url(Utc::now().timestamp_millis())?;
        let response = self
            .agent
            .post(&url)
            .set("Content-Type", "application/json")
            .send_string(&body);
        match response {
            Ok(response) => check_reply(&body_text(response)),
            Err(ureq::Error::Status(code, response)) => Err(NotifyError::Rejected {
                code: i64::from(code),
                message: body_text(response),
            }),
            Err(ureq::Error::Transport(err)) => Err(NotifyError::Transport(err.to_string())),
        }
    }
}

/// Base64 HMAC-SHA256 of `"{timestamp_ms}\n{secret}"` keyed by `secret`.
fn sign(secret: &str, timestamp_ms: i64) -> Result<String, NotifyError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|err| NotifyError::Signing(err.to_string()))?;
    mac.update(format!("{timestamp_ms}\n{secret}").as_bytes());
    Ok(BASE64_STANDARD.encode(mac.finalize().into_bytes()))
}

fn check_reply(body: &str) -> Result<(), NotifyError> {
    if body.trim().is_empty() {
        return Ok(());
    }
    let reply: Reply = serde_json::from_str(body)?;
    if reply.errcode == 0 {
        Ok(())
    } else {
        Err(NotifyError::Rejected {
            code: reply.errcode,
            message: reply.errmsg,
        })
    }
}
