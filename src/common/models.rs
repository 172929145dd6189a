use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use super::{RecordSnafu, Result, ZoneName};

pub const RECORD_KIND_A: &str = "A";
pub const RECORD_KIND_AAAA: &str = "AAAA";
pub const RECORD_KIND_CNAME: &str = "CNAME";
pub const RECORD_KIND_NS: &str = "NS";
pub const RECORD_KIND_MX: &str = "MX";
pub const RECORD_KIND_SRV: &str = "SRV";
pub const RECORD_KIND_TXT: &str = "TXT";

/// The record types that can be synchronised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    A,
    Aaaa,
    Cname,
    Ns,
    Mx,
    Srv,
    Txt,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::A => RECORD_KIND_A,
            RecordKind::Aaaa => RECORD_KIND_AAAA,
            RecordKind::Cname => RECORD_KIND_CNAME,
            RecordKind::Ns => RECORD_KIND_NS,
            RecordKind::Mx => RECORD_KIND_MX,
            RecordKind::Srv => RECORD_KIND_SRV,
            RecordKind::Txt => RECORD_KIND_TXT,
        }
    }
}

impl FromStr for RecordKind {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.to_ascii_uppercase().as_str() {
            RECORD_KIND_A => RecordKind::A,
            RECORD_KIND_AAAA => RecordKind::Aaaa,
            RECORD_KIND_CNAME => RecordKind::Cname,
            RECORD_KIND_NS => RecordKind::Ns,
            RECORD_KIND_MX => RecordKind::Mx,
            RECORD_KIND_SRV => RecordKind::Srv,
            RECORD_KIND_TXT => RecordKind::Txt,
            _ => return Err(()),
        })
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed record data, one variant per supported record type.
///
/// Host names are kept exactly as their source wrote them. Zone-file data
/// is fully qualified with a trailing dot, provider data is whatever the
/// provider reported.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordData {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Cname(String),
    Ns(String),
    Mx {
        priority: u16,
        exchange: String,
    },
    Srv {
        priority: u16,
        weight: u16,
        port: u16,
        target: String,
    },
    Txt(String),
}

impl RecordData {
    pub fn kind(&self) -> RecordKind {
        match self {
            RecordData::A(_) => RecordKind::A,
            RecordData::Aaaa(_) => RecordKind::Aaaa,
            RecordData::Cname(_) => RecordKind::Cname,
            RecordData::Ns(_) => RecordKind::Ns,
            RecordData::Mx { .. } => RecordKind::Mx,
            RecordData::Srv { .. } => RecordKind::Srv,
            RecordData::Txt(_) => RecordKind::Txt,
        }
    }

    /// The data field as the provider API expects it, without priority,
    /// weight or port.
    pub fn content(&self) -> String {
        match self {
            RecordData::A(addr) => addr.to_string(),
            RecordData::Aaaa(addr) => addr.to_string(),
            RecordData::Cname(host) | RecordData::Ns(host) | RecordData::Txt(host) => host.clone(),
            RecordData::Mx { exchange, .. } => exchange.clone(),
            RecordData::Srv { target, .. } => target.clone(),
        }
    }

    pub fn priority(&self) -> Option<u16> {
        match self {
            RecordData::Mx { priority, .. } | RecordData::Srv { priority, .. } => Some(*priority),
            _ => None,
        }
    }

    pub fn port(&self) -> Option<u16> {
        match self {
            RecordData::Srv { port, .. } => Some(*port),
            _ => None,
        }
    }

    pub fn weight(&self) -> Option<u16> {
        match self {
            RecordData::Srv { weight, .. } => Some(*weight),
            _ => None,
        }
    }

    /// Builds typed data from the loose string form a provider reports.
    pub fn from_parts(
        kind: &str,
        name: &str,
        data: &str,
        priority: Option<u16>,
        port: Option<u16>,
        weight: Option<u16>,
    ) -> Result<Self> {
        let invalid = || {
            RecordSnafu {
                kind,
                name,
                data,
            }
            .build()
        };

        let kind = RecordKind::from_str(kind).map_err(|_| invalid())?;
        Ok(match kind {
            RecordKind::A => RecordData::A(parse_ipv4(data).ok_or_else(invalid)?),
            RecordKind::Aaaa => {
                RecordData::Aaaa(Ipv6Addr::from_str(data.trim()).map_err(|_| invalid())?)
            }
            RecordKind::Cname => RecordData::Cname(data.to_string()),
            RecordKind::Ns => RecordData::Ns(data.to_string()),
            RecordKind::Mx => RecordData::Mx {
                priority: priority.unwrap_or_default(),
                exchange: data.to_string(),
            },
            RecordKind::Srv => RecordData::Srv {
                priority: priority.unwrap_or_default(),
                weight: weight.unwrap_or_default(),
                port: port.unwrap_or_default(),
                target: data.to_string(),
            },
            RecordKind::Txt => RecordData::Txt(data.to_string()),
        })
    }
}

impl fmt::Display for RecordData {
    /// Zone-file presentation of the data.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordData::Mx { priority, exchange } => write!(f, "{priority} {exchange}"),
            RecordData::Srv {
                priority,
                weight,
                port,
                target,
            } => write!(f, "{priority} {weight} {port} {target}"),
            RecordData::Txt(text) => {
                let escaped = text.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "\"{escaped}\"")
            }
            other => f.write_str(&other.content()),
        }
    }
}

/// Parses an IPv4 literal, tolerating zero-padded octets such as
/// `010.001.000.001`.
pub fn parse_ipv4(raw: &str) -> Option<Ipv4Addr> {
    let raw = raw.trim();
    if let Ok(addr) = Ipv4Addr::from_str(raw) {
        return Some(addr);
    }

    let mut octets = [0u8; 4];
    let mut parts = raw.split('.');
    for octet in octets.iter_mut() {
        let part = parts.next()?;
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *octet = part.parse().ok()?;
    }
    match parts.next() {
        Some(_) => None,
        None => Some(Ipv4Addr::from(octets)),
    }
}

/// A record taken from the desired zone file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredRecord {
    /// Fully qualified owner name, with trailing dot.
    pub name: String,
    pub data: RecordData,
    pub ttl: Option<u32>,
    pub matched: bool,
}

impl DesiredRecord {
    pub fn new(name: impl Into<String>, data: RecordData) -> Self {
        Self {
            name: name.into(),
            data,
            ttl: None,
            matched: false,
        }
    }

    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn kind(&self) -> RecordKind {
        self.data.kind()
    }

    pub(crate) fn sort_key(&self) -> (&str, RecordKind, String) {
        (&self.name, self.kind(), self.data.to_string())
    }
}

impl fmt::Display for DesiredRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ttl {
            Some(ttl) => write!(f, "{} {} IN {} {}", self.name, ttl, self.kind(), self.data),
            None => write!(f, "{} IN {} {}", self.name, self.kind(), self.data),
        }
    }
}

/// A record reported by the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRecord {
    /// Provider assigned identity, used for updates and deletions.
    pub id: u64,
    /// Owner name relative to the zone, `@` for the apex.
    pub name: String,
    pub data: RecordData,
    pub ttl: Option<u32>,
    pub matched: bool,
}

impl RemoteRecord {
    pub fn new(id: u64, name: impl Into<String>, data: RecordData) -> Self {
        Self {
            id,
            name: name.into(),
            data,
            ttl: None,
            matched: false,
        }
    }

    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn kind(&self) -> RecordKind {
        self.data.kind()
    }

    pub(crate) fn sort_key(&self) -> (&str, RecordKind, String) {
        (&self.name, self.kind(), self.data.to_string())
    }
}

impl fmt::Display for RemoteRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ttl {
            Some(ttl) => write!(
                f,
                "#{} {} {} IN {} {}",
                self.id,
                self.name,
                ttl,
                self.kind(),
                self.data
            ),
            None => write!(f, "#{} {} IN {} {}", self.id, self.name, self.kind(), self.data),
        }
    }
}

/// A zone as known to the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneInfo {
    pub name: ZoneName,
    pub ttl: Option<u32>,
    /// Zone-file text rendered by the provider, if it offers one.
    pub zone_file: Option<String>,
}

/// A DNS hosting provider holding the current state of zones.
pub trait RemoteStore {
    fn get_name(&self) -> &str;
    fn find_zone(&mut self, zone: &ZoneName) -> super::Result<Option<ZoneInfo>>;
    fn create_zone(&mut self, zone: &ZoneName) -> super::Result<()>;
    /// Returns every record of the zone, following pagination.
    fn list_records(&mut self, zone: &ZoneName) -> super::Result<Vec<RemoteRecord>>;
    fn create_record(
        &mut self,
        zone: &ZoneName,
        record: &DesiredRecord,
    ) -> super::Result<RemoteRecord>;
    fn update_record(
        &mut self,
        zone: &ZoneName,
        id: u64,
        record: &DesiredRecord,
    ) -> super::Result<RemoteRecord>;
    fn delete_record(&mut self, zone: &ZoneName, id: u64) -> super::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_ipv4_is_parsed_by_value() {
        assert_eq!(parse_ipv4("001.002.003.004"), Some(Ipv4Addr::new(1, 2, 3, 4)));
        assert_eq!(parse_ipv4("1.2.3.4"), Some(Ipv4Addr::new(1, 2, 3, 4)));
        assert_eq!(parse_ipv4("1.2.3"), None);
        assert_eq!(parse_ipv4("1.2.3.4.5"), None);
        assert_eq!(parse_ipv4("256.0.0.1"), None);
        assert_eq!(parse_ipv4("+1.2.3.4"), None);
    }

    #[test]
    fn record_kind_is_case_insensitive() {
        assert_eq!(RecordKind::from_str("aaaa"), Ok(RecordKind::Aaaa));
        assert_eq!(RecordKind::from_str("SOA"), Err(()));
    }

    #[test]
    fn from_parts_builds_typed_data() {
        let srv = RecordData::from_parts("SRV", "_sip._tcp", "sip.example.com", Some(10), Some(5060), Some(5))
            .unwrap();
        assert_eq!(
            srv,
            RecordData::Srv {
                priority: 10,
                weight: 5,
                port: 5060,
                target: "sip.example.com".into()
            }
        );
        assert_eq!(srv.priority(), Some(10));
        assert_eq!(srv.port(), Some(5060));
    }

    #[test]
    fn from_parts_rejects_unsupported_and_invalid() {
        assert!(RecordData::from_parts("CAA", "@", "0 issue \"x\"", None, None, None).is_err());
        assert!(RecordData::from_parts("A", "www", "not-an-ip", None, None, None).is_err());
    }

    #[test]
    fn txt_presentation_is_quoted() {
        let txt = RecordData::Txt("say \"hi\"".into());
        assert_eq!(txt.to_string(), "\"say \\\"hi\\\"\"");
        assert_eq!(txt.content(), "say \"hi\"");
    }
}
