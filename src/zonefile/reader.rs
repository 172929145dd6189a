use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use bytes::Bytes;
use domain::base::name::{Name, ToLabelIter};
use domain::rdata::ZoneRecordData;
use domain::zonefile::inplace::{Entry, ScannedRecord, Zonefile};
use snafu::ResultExt;

use crate::common::{
    DesiredRecord, RecordData, Result, SyncSnafu, ZoneFileSnafu, ZoneName,
};

use super::READER_NAME;

/// The records of a zone file, ready to be reconciled.
#[derive(Debug, Clone)]
pub struct DesiredZone {
    /// Taken from the owner of the SOA record.
    pub name: ZoneName,
    pub records: Vec<DesiredRecord>,
    /// Number of entries that could not be used.
    pub skipped: usize,
}

enum Token {
    Apex(String),
    Record(DesiredRecord),
    Unsupported,
}

/// Reads a zone file from disk. See [`read_zone`].
pub fn read_zone_file(path: &Path, origin: Option<&ZoneName>) -> Result<DesiredZone> {
    let file = File::open(path).boxed_local().context(ZoneFileSnafu {
        message: format!("Failed to open zone file {}", path.display()),
    })?;
    read_zone(&mut BufReader::new(file), origin)
}

/// Parses zone-file text into desired records.
///
/// Malformed entries, `$INCLUDE` directives and unsupported record types
/// are logged and skipped.
/// Exactly one zone apex must be declared through an SOA record, otherwise
/// the zone is rejected.
pub fn read_zone(source: &mut impl Read, origin: Option<&ZoneName>) -> Result<DesiredZone> {
    let mut zonefile = Zonefile::load(source).boxed_local().context(ZoneFileSnafu {
        message: "Failed to read zone file",
    })?;

    if let Some(origin) = origin {
        let origin = Name::<Bytes>::from_str(&origin.fqdn(""))
            .boxed_local()
            .context(ZoneFileSnafu {
                message: format!("Invalid origin {origin}"),
            })?;
        zonefile.set_origin(origin);
    }

    let mut apex: Option<String> = None;
    let mut records = Vec::new();
    let mut skipped = 0;
    let mut last_error: Option<String> = None;

    for entry in zonefile {
        let record = match entry {
            Ok(Entry::Record(record)) => record,
            Ok(other) => {
                tracing::warn!(reader = READER_NAME, entry = ?other, "Ignoring directive");
                skipped += 1;
                continue;
            }
            Err(err) => {
                let message = err.to_string();
                // The scanner did not advance, there is nothing more to read.
                if last_error.as_deref() == Some(message.as_str()) {
                    break;
                }
                tracing::warn!(reader = READER_NAME, error = message, "Skipping malformed entry");
                skipped += 1;
                last_error = Some(message);
                continue;
            }
        };
        last_error = None;

        match convert_record(&record) {
            Token::Apex(owner) => {
                if owner.trim_matches('.').is_empty() {
                    continue;
                }
                match &apex {
                    Some(existing) if existing != &owner => {
                        return SyncSnafu {
                            message: format!(
                                "Zone file declares more than one zone: {existing} and {owner}"
                            ),
                        }
                        .fail();
                    }
                    _ => apex = Some(owner),
                }
            }
            Token::Record(desired) => records.push(desired),
            Token::Unsupported => {
                tracing::warn!(
                    reader = READER_NAME,
                    kind = %record.rtype(),
                    name = absolute_name(record.owner()),
                    "Record type not supported, skipping"
                );
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        tracing::warn!(
            reader = READER_NAME,
            skipped,
            "Skipped entries do not protect matching remote records from deletion",
        );
    }

    let Some(apex) = apex else {
        return SyncSnafu {
            message: "Could not derive zone name from zone file",
        }
        .fail();
    };

    tracing::info!(
        reader = READER_NAME,
        zone = apex,
        records = records.len(),
        skipped,
        "Read completed",
    );

    Ok(DesiredZone {
        name: ZoneName::new(&apex),
        records,
        skipped,
    })
}

fn convert_record(record: &ScannedRecord) -> Token {
    let data = match record.data() {
        ZoneRecordData::Soa(_) => return Token::Apex(absolute_name(record.owner())),
        ZoneRecordData::A(a) => RecordData::A(a.addr()),
        ZoneRecordData::Aaaa(aaaa) => RecordData::Aaaa(aaaa.addr()),
        ZoneRecordData::Cname(cname) => RecordData::Cname(absolute_name(cname.cname())),
        ZoneRecordData::Ns(ns) => RecordData::Ns(absolute_name(ns.nsdname())),
        ZoneRecordData::Mx(mx) => RecordData::Mx {
            priority: mx.preference(),
            exchange: absolute_name(mx.exchange()),
        },
        ZoneRecordData::Srv(srv) => RecordData::Srv {
            priority: srv.priority(),
            weight: srv.weight(),
            port: srv.port(),
            target: absolute_name(srv.target()),
        },
        ZoneRecordData::Txt(txt) => RecordData::Txt(
            txt.iter()
                .map(|segment| String::from_utf8_lossy(segment).into_owned())
                .collect::<Vec<_>>()
                .join(" "),
        ),
        _ => return Token::Unsupported,
    };

    Token::Record(
        DesiredRecord::new(absolute_name(record.owner()), data).with_ttl(record.ttl().as_secs()),
    )
}

/// Presentation form of a name with a trailing dot.
fn absolute_name(name: &impl ToLabelIter) -> String {
    let mut out = String::new();
    for label in name.iter_labels() {
        if label.is_root() {
            break;
        }
        out.push_str(&label.to_string());
        out.push('.');
    }
    if out.is_empty() {
        out.push('.');
    }
    out
}
