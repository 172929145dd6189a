use std::time::Duration;

use serde::de::DeserializeOwned;
use snafu::prelude::*;

use crate::common::{
    key_file_or_string, ConfigSnafu, DesiredRecord, Error, RemoteRecord, RemoteStore,
    RequestSnafu, ResponseSnafu, Result, StoreSnafu, ZoneInfo, ZoneName,
};

use super::models::{
    APIError, CreateDomainRequest, DNSRecord, Domain, DomainResponse, PaginatedResponse,
    RecordRequest, RecordResponse,
};

pub const STORE_NAME: &str = "DigitalOcean";

pub struct DigitalOcean {
    agent: ureq::Agent,
    access_token: String,
    api_url: url::Url,
    per_page: usize,
    debug_http: bool,
}

impl DigitalOcean {
    fn endpoint(&self, segments: &[&str]) -> url::Url {
        let mut url = self.api_url.clone();
        // Base URLs are checked when the store is built.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn with_headers(&self, req: ureq::Request) -> ureq::Request {
        req.set("Authorization", &format!("Bearer {}", self.access_token))
            .set("Content-Type", "application/json; charset=utf8")
    }

    fn call(&self, req: ureq::Request, body: Option<serde_json::Value>) -> Result<String> {
        let method = req.method().to_string();
        let url = req.url().to_string();

        if self.debug_http {
            tracing::info!(
                store = STORE_NAME,
                method,
                url,
                body = body.as_ref().map(|b| b.to_string()).unwrap_or_default(),
                "HTTP request"
            );
        } else {
            tracing::debug!(store = STORE_NAME, method, url, "Sending request");
        }

        let result = match body {
            Some(body) => req.send_json(body),
            None => req.call(),
        };

        let resp = match result {
            Ok(resp) => resp,
            Err(ureq::Error::Status(code, resp)) => {
                let details = match resp.into_json::<APIError>() {
                    Ok(err) => format!("{} ({})", err.message, err.id),
                    Err(_) => "no error details".to_string(),
                };
                return ResponseSnafu {
                    message: format!("{method} {url} returned {code}: {details}"),
                }
                .fail();
            }
            Err(err) => return Err(Box::new(err)).context(RequestSnafu { url, method }),
        };

        let status = resp.status();
        let text = resp.into_string().boxed_local().context(StoreSnafu {
            store: STORE_NAME,
            message: "Failed to read response",
        })?;

        if self.debug_http {
            tracing::info!(store = STORE_NAME, status, body = text, "HTTP response");
        }

        Ok(text)
    }

    fn parse<T: DeserializeOwned>(text: &str) -> Result<T> {
        serde_json::from_str(text).boxed_local().context(StoreSnafu {
            store: STORE_NAME,
            message: "Failed to deserialize response",
        })
    }

    fn api_get_paginated<T: DeserializeOwned>(&self, url: &url::Url) -> Result<Vec<T>> {
        let mut page = 1;
        let mut items: Vec<T> = Vec::new();
        loop {
            let req = self
                .with_headers(self.agent.get(url.as_str()))
                .query("page", &page.to_string())
                .query("per_page", &self.per_page.to_string());
            let mut resp: PaginatedResponse<T> = Self::parse(&self.call(req, None)?)?;

            let received = resp.result.len();
            items.append(&mut resp.result);

            if resp.links.pages.next.is_some() && received > 0 {
                page += 1;
                continue;
            }

            return Ok(items);
        }
    }

    fn api_write<T: DeserializeOwned>(
        &self,
        req: ureq::Request,
        body: impl serde::Serialize,
    ) -> Result<T> {
        let body = serde_json::to_value(body).boxed_local().context(StoreSnafu {
            store: STORE_NAME,
            message: "Failed to serialize request",
        })?;
        Self::parse(&self.call(self.with_headers(req), Some(body))?)
    }
}

impl RemoteStore for DigitalOcean {
    fn get_name(&self) -> &str {
        STORE_NAME
    }

    fn find_zone(&mut self, zone: &ZoneName) -> Result<Option<ZoneInfo>> {
        let domains: Vec<Domain> = self.api_get_paginated(&self.endpoint(&["domains"]))?;

        Ok(domains
            .into_iter()
            .find(|domain| ZoneName::new(&domain.name) == *zone)
            .map(|domain| ZoneInfo {
                name: ZoneName::new(&domain.name),
                ttl: domain.ttl,
                zone_file: domain.zone_file.filter(|text| !text.trim().is_empty()),
            }))
    }

    fn create_zone(&mut self, zone: &ZoneName) -> Result<()> {
        tracing::info!(store = STORE_NAME, zone = zone.as_str(), "Creating zone");

        let url = self.endpoint(&["domains"]);
        let resp: DomainResponse = self.api_write(
            self.agent.post(url.as_str()),
            CreateDomainRequest {
                name: zone.join("@"),
            },
        )?;

        tracing::debug!(store = STORE_NAME, zone = resp.domain.name, "Created zone");
        Ok(())
    }

    fn list_records(&mut self, zone: &ZoneName) -> Result<Vec<RemoteRecord>> {
        let url = self.endpoint(&["domains", zone.as_str(), "records"]);
        let records: Vec<DNSRecord> = self.api_get_paginated(&url)?;

        let mut converted = Vec::with_capacity(records.len());
        for record in records {
            let (id, kind, name) = (record.id, record.kind.clone(), record.name.clone());
            match RemoteRecord::try_from(record) {
                Ok(rec) => converted.push(rec),
                Err(err) => tracing::warn!(
                    store = STORE_NAME,
                    record_id = id,
                    kind,
                    name,
                    error = %err,
                    "Ignoring record",
                ),
            }
        }

        tracing::info!(
            store = STORE_NAME,
            zone = zone.as_str(),
            records = converted.len(),
            "Read completed",
        );
        Ok(converted)
    }

    fn create_record(&mut self, zone: &ZoneName, record: &DesiredRecord) -> Result<RemoteRecord> {
        let url = self.endpoint(&["domains", zone.as_str(), "records"]);
        let resp: RecordResponse =
            self.api_write(self.agent.post(url.as_str()), RecordRequest::new(zone, record))?;
        RemoteRecord::try_from(resp.domain_record)
    }

    fn update_record(
        &mut self,
        zone: &ZoneName,
        id: u64,
        record: &DesiredRecord,
    ) -> Result<RemoteRecord> {
        let url = self.endpoint(&["domains", zone.as_str(), "records", &id.to_string()]);
        let resp: RecordResponse =
            self.api_write(self.agent.put(url.as_str()), RecordRequest::new(zone, record))?;
        RemoteRecord::try_from(resp.domain_record)
    }

    fn delete_record(&mut self, zone: &ZoneName, id: u64) -> Result<()> {
        let url = self.endpoint(&["domains", zone.as_str(), "records", &id.to_string()]);
        self.call(self.with_headers(self.agent.delete(url.as_str())), None)?;
        Ok(())
    }
}

impl TryFrom<super::Config> for DigitalOcean {
    type Error = Error;

    fn try_from(value: super::Config) -> Result<Self> {
        let access_token = key_file_or_string(value.access_token, "digitalocean.access_token")?;
        ensure!(
            !access_token.is_empty(),
            ConfigSnafu {
                message: "Please set the environment variable DIGITALOCEAN_ACCESS_TOKEN",
                prefix: "digitalocean.access_token",
            }
        );
        ensure!(
            !value.api_url.cannot_be_a_base(),
            ConfigSnafu {
                message: format!("{} is not a HTTP URL", value.api_url),
                prefix: "digitalocean.api_url",
            }
        );

        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(value.timeout_secs))
            .user_agent(concat!("dozone-rs/", env!("CARGO_PKG_VERSION")))
            .build();

        Ok(Self {
            agent,
            access_token,
            api_url: value.api_url,
            per_page: value.per_page,
            debug_http: value.debug_http,
        })
    }
}
