use super::{DesiredRecord, RecordData, RemoteRecord, ZoneName};

/// How CNAME records are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CnamePolicy {
    /// Compare the expanded remote target with the desired target.
    #[default]
    Compare,
    /// Never treat CNAMEs as equal, so every CNAME is rewritten on each run.
    /// Use this for providers that report CNAME targets unreliably.
    AlwaysReplace,
}

/// An existing record to be rewritten in place.
///
/// The replacement is matched on owner name only, so it may carry a
/// different record type than the record it replaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub from: RemoteRecord,
    pub to: DesiredRecord,
}

/// The operations needed to bring the remote zone in line with the desired
/// one. Every remote record is either unchanged, deleted or the source of an
/// edit; every desired record is either unchanged, created or the target of
/// an edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub delete: Vec<RemoteRecord>,
    pub create: Vec<DesiredRecord>,
    pub update: Vec<Edit>,
    pub unchanged: usize,
}

impl Plan {
    /// Number of remote calls needed to apply the plan.
    pub fn len(&self) -> usize {
        self.create.len() + self.update.len() + self.delete.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct Reconciler<'a> {
    zone: &'a ZoneName,
    cname_policy: CnamePolicy,
}

impl<'a> Reconciler<'a> {
    pub fn new(zone: &'a ZoneName, cname_policy: CnamePolicy) -> Self {
        Self { zone, cname_policy }
    }

    /// Whether both records describe the same DNS fact, ignoring identity
    /// and TTL.
    pub fn equivalent(&self, remote: &RemoteRecord, desired: &DesiredRecord) -> bool {
        if self.zone.fqdn(&remote.name) != desired.name {
            return false;
        }

        match (&remote.data, &desired.data) {
            (RecordData::A(have), RecordData::A(want)) => have == want,
            (RecordData::Aaaa(have), RecordData::Aaaa(want)) => have == want,
            (RecordData::Cname(have), RecordData::Cname(want)) => match self.cname_policy {
                CnamePolicy::Compare => &self.zone.fqdn(have) == want,
                CnamePolicy::AlwaysReplace => false,
            },
            (RecordData::Ns(have), RecordData::Ns(want)) => dotted(have) == *want,
            (
                RecordData::Mx {
                    priority: have_priority,
                    exchange: have,
                },
                RecordData::Mx {
                    priority: want_priority,
                    exchange: want,
                },
            ) => have_priority == want_priority && dotted(have) == *want,
            (
                RecordData::Srv {
                    priority: have_priority,
                    port: have_port,
                    target: have,
                    ..
                },
                RecordData::Srv {
                    priority: want_priority,
                    port: want_port,
                    target: want,
                    ..
                },
            ) => have_priority == want_priority && have_port == want_port && dotted(have) == *want,
            (RecordData::Txt(have), RecordData::Txt(want)) => have == want,
            _ => false,
        }
    }

    /// Pairs remote and desired records and derives the plan.
    ///
    /// Both sides are sorted by (name, type, data) first so that the
    /// first-fit pairing and the edit inference are reproducible.
    pub fn reconcile(
        &self,
        mut remote: Vec<RemoteRecord>,
        mut desired: Vec<DesiredRecord>,
    ) -> Plan {
        remote.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        desired.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        // Greedy first fit; each record is paired at most once.
        let mut unchanged = 0;
        for rec in remote.iter_mut() {
            if rec.matched {
                continue;
            }
            if let Some(want) = desired
                .iter_mut()
                .find(|want| !want.matched && self.equivalent(rec, want))
            {
                rec.matched = true;
                want.matched = true;
                unchanged += 1;
            }
        }

        let unmatched_remote = remote.into_iter().filter(|rec| !rec.matched);
        let mut create: Vec<DesiredRecord> =
            desired.into_iter().filter(|rec| !rec.matched).collect();

        // Turn a delete and a create at the same owner name into one update.
        let mut delete = Vec::new();
        let mut update = Vec::new();
        for rec in unmatched_remote {
            let fqdn = self.zone.fqdn(&rec.name);
            match create.iter().position(|want| want.name == fqdn) {
                Some(idx) => update.push(Edit {
                    from: rec,
                    to: create.remove(idx),
                }),
                None => delete.push(rec),
            }
        }

        tracing::debug!(
            zone = self.zone.as_str(),
            unchanged,
            create = create.len(),
            update = update.len(),
            delete = delete.len(),
            "Reconciled zone"
        );

        Plan {
            delete,
            create,
            update,
            unchanged,
        }
    }
}

fn dotted(host: &str) -> String {
    format!("{host}.")
}
