use std::cell::RefCell;
use std::net::Ipv4Addr;
use std::rc::Rc;

use dozone_rs::common::{
    DesiredRecord, Edit, Plan, RecordData, RemoteRecord, RemoteStore, Result, ResponseSnafu,
    ZoneInfo, ZoneName,
};
use dozone_rs::service::{Config, ZoneSync};
use dozone_rs::zonefile::{read_zone, render_zone};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    CreateZone(String),
    Create(String, RecordData),
    Update(u64, RecordData),
    Delete(u64),
}

#[derive(Default)]
struct State {
    zones: Vec<ZoneInfo>,
    records: Vec<RemoteRecord>,
    calls: Vec<Call>,
    next_id: u64,
    fail_on_call: Option<usize>,
}

#[derive(Clone, Default)]
struct MemoryStore(Rc<RefCell<State>>);

/// Stores data the way the provider reports it back: hosts without the
/// trailing dot, CNAME targets relative to the zone.
fn stored(zone: &ZoneName, data: &RecordData) -> RecordData {
    let strip = |host: &str| host.trim_end_matches('.').to_string();
    match data {
        RecordData::Cname(target) => RecordData::Cname(zone.relative(target)),
        RecordData::Ns(host) => RecordData::Ns(strip(host)),
        RecordData::Mx { priority, exchange } => RecordData::Mx {
            priority: *priority,
            exchange: strip(exchange),
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
            target: strip(target),
        },
        other => other.clone(),
    }
}

impl MemoryStore {
    fn with_zone(zone: &str, records: Vec<RemoteRecord>) -> Self {
        let store = Self::default();
        {
            let mut state = store.0.borrow_mut();
            state.zones.push(ZoneInfo {
                name: ZoneName::new(zone),
                ttl: Some(1800),
                zone_file: None,
            });
            state.next_id = 1000;
            state.records = records;
        }
        store
    }

    fn calls(&self) -> Vec<Call> {
        self.0.borrow().calls.clone()
    }

    fn record(&self, call: Call) -> Result<()> {
        let mut state = self.0.borrow_mut();
        if state.fail_on_call == Some(state.calls.len()) {
            return ResponseSnafu {
                message: "injected failure",
            }
            .fail();
        }
        state.calls.push(call);
        Ok(())
    }
}

impl RemoteStore for MemoryStore {
    fn get_name(&self) -> &str {
        "Memory"
    }

    fn find_zone(&mut self, zone: &ZoneName) -> Result<Option<ZoneInfo>> {
        Ok(self.0.borrow().zones.iter().find(|z| &z.name == zone).cloned())
    }

    fn create_zone(&mut self, zone: &ZoneName) -> Result<()> {
        self.record(Call::CreateZone(zone.to_string()))?;
        self.0.borrow_mut().zones.push(ZoneInfo {
            name: zone.clone(),
            ttl: None,
            zone_file: None,
        });
        Ok(())
    }

    fn list_records(&mut self, _zone: &ZoneName) -> Result<Vec<RemoteRecord>> {
        Ok(self.0.borrow().records.clone())
    }

    fn create_record(&mut self, zone: &ZoneName, record: &DesiredRecord) -> Result<RemoteRecord> {
        self.record(Call::Create(record.name.clone(), record.data.clone()))?;
        let mut state = self.0.borrow_mut();
        state.next_id += 1;
        let created = RemoteRecord::new(state.next_id, zone.relative(&record.name), stored(zone, &record.data));
        state.records.push(created.clone());
        Ok(created)
    }

    fn update_record(&mut self, zone: &ZoneName, id: u64, record: &DesiredRecord) -> Result<RemoteRecord> {
        self.record(Call::Update(id, record.data.clone()))?;
        let mut state = self.0.borrow_mut();
        let Some(existing) = state.records.iter_mut().find(|r| r.id == id) else {
            return ResponseSnafu {
                message: format!("record {id} not found"),
            }
            .fail();
        };
        existing.name = zone.relative(&record.name);
        existing.data = stored(zone, &record.data);
        Ok(existing.clone())
    }

    fn delete_record(&mut self, _zone: &ZoneName, id: u64) -> Result<()> {
        self.record(Call::Delete(id))?;
        self.0.borrow_mut().records.retain(|r| r.id != id);
        Ok(())
    }
}

const ZONE: &str = "$ORIGIN example.com.
$TTL 3600
@    IN SOA ns1.example.com. hostmaster.example.com. 1 7200 3600 1209600 3600
api  IN NS  ns1.example.com.
api  IN TXT \"hello\"
www  IN CNAME web
";

fn remote() -> Vec<RemoteRecord> {
    vec![
        RemoteRecord::new(1, "api", RecordData::Ns("ns1.example.com".into())),
        RemoteRecord::new(2, "www", RecordData::A(Ipv4Addr::new(1, 1, 1, 1))),
        RemoteRecord::new(3, "old", RecordData::A(Ipv4Addr::new(2, 2, 2, 2))),
    ]
}

fn sync(store: &MemoryStore) -> ZoneSync {
    ZoneSync::new(Config::default(), Box::new(store.clone()))
}

#[test]
fn applies_minimal_changes() {
    let store = MemoryStore::with_zone("example.com", remote());
    let mut service = sync(&store);
    let desired = read_zone(&mut ZONE.as_bytes(), None).unwrap();
    let zone = desired.name.clone();

    let plan = service.plan(desired, false).unwrap();
    assert_eq!(plan.unchanged, 1);
    assert_eq!(plan.len(), 3);

    service.apply(&zone, plan).unwrap();
    assert_eq!(
        store.calls(),
        vec![
            Call::Delete(3),
            Call::Create("api.example.com.".into(), RecordData::Txt("hello".into())),
            Call::Update(2, RecordData::Cname("web.example.com.".into())),
        ]
    );
}

#[test]
fn second_run_is_a_no_op() {
    let store = MemoryStore::with_zone("example.com", remote());
    let desired = read_zone(&mut ZONE.as_bytes(), None).unwrap();
    let zone = desired.name.clone();

    let mut first = sync(&store);
    let plan = first.plan(desired.clone(), false).unwrap();
    first.apply(&zone, plan).unwrap();

    let mut second = sync(&store);
    let plan = second.plan(desired, false).unwrap();
    assert!(plan.is_empty(), "{plan:?}");
    assert_eq!(plan.unchanged, 3);
}

#[test]
fn missing_zone_is_created_before_listing() {
    let store = MemoryStore::default();
    let mut service = sync(&store);
    let desired = read_zone(&mut ZONE.as_bytes(), None).unwrap();

    let plan = service.plan(desired, false).unwrap();
    assert_eq!(plan.create.len(), 3);
    assert_eq!(store.calls(), vec![Call::CreateZone("example.com".into())]);
}

#[test]
fn dry_run_makes_no_calls() {
    let store = MemoryStore::default();
    let mut service = sync(&store);
    let desired = read_zone(&mut ZONE.as_bytes(), None).unwrap();

    let plan = service.plan(desired, true).unwrap();
    assert_eq!(plan.create.len(), 3);
    assert!(store.calls().is_empty());
}

#[test]
fn first_failure_aborts_the_rest() {
    let store = MemoryStore::with_zone("example.com", remote());
    store.0.borrow_mut().fail_on_call = Some(1);
    let mut service = sync(&store);
    let desired = read_zone(&mut ZONE.as_bytes(), None).unwrap();
    let zone = desired.name.clone();

    let plan = service.plan(desired, false).unwrap();
    let err = service.apply(&zone, plan).unwrap_err();

    assert_eq!(err.to_string(), "injected failure");
    assert_eq!(store.calls(), vec![Call::Delete(3)]);
}

#[test]
fn update_of_vanished_record_fails() {
    let store = MemoryStore::with_zone("example.com", Vec::new());
    let mut service = sync(&store);
    let plan = Plan {
        update: vec![Edit {
            from: RemoteRecord::new(9, "www", RecordData::A(Ipv4Addr::new(1, 1, 1, 1))),
            to: DesiredRecord::new("www.example.com.", RecordData::A(Ipv4Addr::new(2, 2, 2, 2))),
        }],
        ..Plan::default()
    };

    let err = service.apply(&ZoneName::new("example.com"), plan).unwrap_err();
    assert_eq!(err.to_string(), "record 9 not found");
}

#[test]
fn replace_cnames_policy_rewrites_matching_cnames() {
    const CNAME_ZONE: &str = "$TTL 60
example.com. IN SOA ns1.example.com. h.example.com. 1 2 3 4 5
www.example.com. IN CNAME web.example.com.
";
    let plan_with = |config: Config| {
        let store = MemoryStore::with_zone(
            "example.com",
            vec![RemoteRecord::new(5, "www", RecordData::Cname("web".into()))],
        );
        let desired = read_zone(&mut CNAME_ZONE.as_bytes(), None).unwrap();
        let mut service = ZoneSync::new(config, Box::new(store));
        service.plan(desired, false).unwrap()
    };

    let plan = plan_with(Config::default());
    assert_eq!(plan.unchanged, 1);
    assert!(plan.is_empty());

    let plan = plan_with(Config {
        replace_cnames: true,
    });
    assert_eq!(plan.unchanged, 0);
    assert_eq!(plan.update.len(), 1);
    assert_eq!(plan.update[0].from.id, 5);
    assert_eq!(
        plan.update[0].to.data,
        RecordData::Cname("web.example.com.".into())
    );
}

#[test]
fn download_renders_listed_records_when_provider_has_no_zone_file() {
    let records = vec![
        RemoteRecord::new(1, "@", RecordData::Ns("ns1.digitalocean.com".into())),
        RemoteRecord::new(2, "www", RecordData::A(Ipv4Addr::new(1, 2, 3, 4))),
        RemoteRecord::new(3, "ftp", RecordData::Cname("www".into())),
    ];
    let store = MemoryStore::with_zone("example.com", records.clone());
    let mut service = sync(&store);
    let zone = ZoneName::new("example.com");

    let text = service.download(&zone).unwrap();
    assert_eq!(text, render_zone(&zone, Some(1800), &records));

    // Feeding the download back in yields no changes.
    let desired = read_zone(&mut text.as_bytes(), None).unwrap();
    let plan = service.plan(desired, true).unwrap();
    assert!(plan.is_empty(), "{plan:?}");
    assert_eq!(plan.unchanged, 3);
}

#[test]
fn download_prefers_provider_zone_file() {
    let store = MemoryStore::with_zone("example.com", remote());
    store.0.borrow_mut().zones[0].zone_file = Some("; provider rendering\n".into());
    let mut service = sync(&store);

    let text = service.download(&ZoneName::new("example.com")).unwrap();
    assert_eq!(text, "; provider rendering\n");
}

#[test]
fn download_of_unknown_zone_fails() {
    let store = MemoryStore::default();
    let mut service = sync(&store);
    let err = service.download(&ZoneName::new("example.org")).unwrap_err();
    assert_eq!(err.to_string(), "Zone example.org not found");
}
