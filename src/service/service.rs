use snafu::OptionExt;
use uuid::Uuid;

use crate::common::{Plan, Reconciler, RemoteStore, Result, ZoneNotFoundSnafu, ZoneName};
use crate::zonefile::{render_zone, DesiredZone};

/// One synchronisation run of a zone against a remote store.
pub struct ZoneSync {
    config: super::Config,
    store: Box<dyn RemoteStore>,
    run_id: Uuid,
}

impl ZoneSync {
    pub fn new(config: super::Config, store: Box<dyn RemoteStore>) -> Self {
        Self {
            config,
            store,
            run_id: Uuid::new_v4(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Fetches the current state of the zone and works out what has to
    /// change. The zone is created at the provider if it does not exist,
    /// except on a dry run where it is treated as empty.
    pub fn plan(&mut self, desired: DesiredZone, dry_run: bool) -> Result<Plan> {
        let zone = &desired.name;
        let store = self.store.get_name().to_string();

        let remote = match self.store.find_zone(zone)? {
            Some(_) => self.store.list_records(zone)?,
            None if dry_run => {
                tracing::info!(
                    run = %self.run_id,
                    store,
                    zone = zone.as_str(),
                    "Zone does not exist and would be created",
                );
                Vec::new()
            }
            None => {
                self.store.create_zone(zone)?;
                self.store.list_records(zone)?
            }
        };

        let plan = Reconciler::new(zone, self.config.cname_policy())
            .reconcile(remote, desired.records);

        tracing::info!(
            run = %self.run_id,
            store,
            zone = zone.as_str(),
            unchanged = plan.unchanged,
            create = plan.create.len(),
            update = plan.update.len(),
            delete = plan.delete.len(),
            "Plan computed",
        );

        Ok(plan)
    }

    /// Applies the plan: deletions first, then creations, then updates.
    /// The first failing call aborts the run and leaves the zone partially
    /// synchronised.
    pub fn apply(&mut self, zone: &ZoneName, plan: Plan) -> Result<()> {
        if plan.is_empty() {
            tracing::info!(run = %self.run_id, zone = zone.as_str(), "No changes detected");
            return Ok(());
        }

        let store = self.store.get_name().to_string();

        tracing::info!(
            run = %self.run_id,
            store,
            create = plan.create.len(),
            update = plan.update.len(),
            delete = plan.delete.len(),
            "Applying changes",
        );

        for record in plan.delete {
            tracing::info!(
                run = %self.run_id,
                store,
                kind = %record.kind(),
                name = record.name,
                record_id = record.id,
                "Deleting record",
            );
            self.store.delete_record(zone, record.id)?;
        }

        for record in plan.create {
            tracing::info!(
                run = %self.run_id,
                store,
                kind = %record.kind(),
                name = record.name,
                content = %record.data,
                "Creating record",
            );
            let created = self.store.create_record(zone, &record)?;
            tracing::debug!(store, record_id = created.id, "Created record");
        }

        for edit in plan.update {
            tracing::info!(
                run = %self.run_id,
                store,
                from = %edit.from,
                to = %edit.to,
                record_id = edit.from.id,
                "Updating record",
            );
            if edit.from.kind() != edit.to.kind() {
                tracing::warn!(
                    store,
                    record_id = edit.from.id,
                    from = %edit.from.kind(),
                    to = %edit.to.kind(),
                    "Update changes the record type",
                );
            }
            let updated = self.store.update_record(zone, edit.from.id, &edit.to)?;
            tracing::debug!(store, record_id = updated.id, "Updated record");
        }

        tracing::info!(run = %self.run_id, zone = zone.as_str(), "Zone synced");
        Ok(())
    }

    /// Zone-file text for the remote zone. The provider's own rendering is
    /// preferred when it has one.
    pub fn download(&mut self, zone: &ZoneName) -> Result<String> {
        let info = self
            .store
            .find_zone(zone)?
            .context(ZoneNotFoundSnafu {
                zone: zone.as_str(),
            })?;

        if let Some(text) = info.zone_file {
            return Ok(text);
        }

        let records = self.store.list_records(zone)?;
        Ok(render_zone(zone, info.ttl, &records))
    }
}
