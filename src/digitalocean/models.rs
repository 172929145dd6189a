use crate::common::{DesiredRecord, Error, RecordData, RemoteRecord, ZoneName};

#[derive(serde::Deserialize)]
pub(super) struct APIError {
    pub id: String,
    pub message: String,
}

#[derive(serde::Deserialize)]
pub(super) struct PaginatedResponse<T> {
    #[serde(alias = "domains", alias = "domain_records")]
    pub result: Vec<T>,
    #[serde(default)]
    pub links: Links,
}

#[derive(Default, serde::Deserialize)]
pub(super) struct Links {
    #[serde(default)]
    pub pages: Pages,
}

#[derive(Default, serde::Deserialize)]
pub(super) struct Pages {
    pub next: Option<String>,
}

#[derive(serde::Deserialize)]
pub(super) struct DomainResponse {
    pub domain: Domain,
}

#[derive(serde::Deserialize)]
pub(super) struct RecordResponse {
    pub domain_record: DNSRecord,
}

#[derive(serde::Deserialize)]
pub(super) struct Domain {
    pub name: String,
    pub ttl: Option<u32>,
    pub zone_file: Option<String>,
}

#[derive(serde::Serialize)]
pub(super) struct CreateDomainRequest {
    pub name: String,
}

#[derive(Clone, serde::Deserialize)]
pub(super) struct DNSRecord {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub data: String,
    pub priority: Option<u16>,
    pub port: Option<u16>,
    pub weight: Option<u16>,
    pub ttl: Option<u32>,
}

impl TryFrom<DNSRecord> for RemoteRecord {
    type Error = Error;

    fn try_from(value: DNSRecord) -> crate::common::Result<Self> {
        let data = RecordData::from_parts(
            &value.kind,
            &value.name,
            &value.data,
            value.priority,
            value.port,
            value.weight,
        )?;
        Ok(RemoteRecord {
            id: value.id,
            name: value.name,
            data,
            ttl: value.ttl,
            matched: false,
        })
    }
}

#[derive(Debug, PartialEq, serde::Serialize)]
pub(super) struct RecordRequest {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: String,
    pub data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}

impl RecordRequest {
    pub fn new(zone: &ZoneName, record: &DesiredRecord) -> Self {
        Self {
            kind: record.kind().as_str(),
            name: zone.relative(&record.name),
            data: record.data.content(),
            priority: record.data.priority(),
            port: record.data.port(),
            weight: record.data.weight(),
            ttl: record.ttl,
        }
    }
}
