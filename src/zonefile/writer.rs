use std::fmt::Write;

use crate::common::{RecordData, RemoteRecord, ZoneName};

const DEFAULT_TTL: u32 = 1800;

/// Renders remote records as zone-file text that [`super::read_zone`]
/// accepts again.
///
/// Provider hosts without a trailing dot are qualified the same way the
/// reconciler reads them: CNAME targets relative to the zone, every other
/// target as an absolute name.
pub fn render_zone(zone: &ZoneName, ttl: Option<u32>, records: &[RemoteRecord]) -> String {
    let ttl = ttl.unwrap_or(DEFAULT_TTL);
    let apex = zone.fqdn("");

    let mut records: Vec<&RemoteRecord> = records.iter().collect();
    records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    let primary = records
        .iter()
        .find_map(|rec| match (&rec.data, rec.name.as_str()) {
            (RecordData::Ns(host), "@") => Some(qualify(zone, host, false)),
            _ => None,
        })
        .unwrap_or_else(|| zone.fqdn("ns1"));

    let mut out = String::new();
    // Infallible for String.
    let _ = writeln!(out, "$ORIGIN {apex}");
    let _ = writeln!(out, "$TTL {ttl}");
    let _ = writeln!(
        out,
        "@\t{ttl}\tIN\tSOA\t{primary} hostmaster.{apex} 1 10800 3600 604800 {ttl}"
    );

    for rec in records {
        let data = match &rec.data {
            RecordData::Cname(host) => RecordData::Cname(qualify(zone, host, true)),
            RecordData::Ns(host) => RecordData::Ns(qualify(zone, host, false)),
            RecordData::Mx { priority, exchange } => RecordData::Mx {
                priority: *priority,
                exchange: qualify(zone, exchange, false),
            },
            RecordData::Srv {
                priority,
                weight,
                port,
                target,
            } => RecordData::Srv {
                priority: *priority,
                weight: *weight,
                port: *port,
                target: qualify(zone, target, false),
            },
            other => other.clone(),
        };
        let _ = writeln!(
            out,
            "{}\t{}\tIN\t{}\t{}",
            rec.name,
            rec.ttl.unwrap_or(ttl),
            data.kind(),
            data
        );
    }

    out
}

fn qualify(zone: &ZoneName, host: &str, in_zone: bool) -> String {
    if host.ends_with('.') {
        host.to_string()
    } else if in_zone || host == "@" {
        zone.fqdn(host)
    } else {
        format!("{host}.")
    }
}
