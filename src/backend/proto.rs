//! Protobuf wire types of the SLS `PutLogs` body.
//!
//! Field numbers follow the service's `LogGroup` schema (proto2).

use prost::Message;

use crate::record::{LogBatch, LogRecord};

#[derive(Clone, PartialEq, Message)]
pub struct LogContent {
    #[prost(string, required, tag = "1")]
    pub key: String,
    #[prost(string, required, tag = "2")]
    pub value: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct Log {
    #[prost(uint32, required, tag = "1")]
    pub time: u32,
    #[prost(message, repeated, tag = "2")]
    pub contents: Vec<LogContent>,
}

#[derive(Clone, PartialEq, Message)]
pub struct LogGroup {
    #[prost(message, repeated, tag = "1")]
    pub logs: Vec<Log>,
    #[prost(string, optional, tag = "2")]
    pub category: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub topic: Option<String>,
    #[prost(string, optional, tag = "4")]
    pub source: Option<String>,
}

impl From<&LogRecord> for Log {
    fn from(record: &LogRecord) -> Self {
        Self {
            time: record.time(),
            contents: record
                .contents()
                .iter()
                .map(|pair| LogContent {
                    key: pair.key.clone(),
                    value: pair.value.clone(),
                })
                .collect(),
        }
    }
}

impl LogGroup {
    /// Wire form of `batch`; topic and category are always present.
    pub fn from_batch(batch: &LogBatch, source: Option<&str>) -> Self {
        Self {
            logs: batch.records().iter().map(Log::from).collect(),
            category: Some(batch.category().to_owned()),
            topic: Some(batch.topic().to_owned()),
            source: source.map(str::to_owned),
        }
    }
}
