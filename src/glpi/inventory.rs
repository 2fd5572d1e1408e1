use crate::error::Result;
use crate::glpi::session::Session;
use crate::glpi::types::{
    find_link, rel, Computer, DeviceGraphicCard, Disk, LinkedItem, MemoryItem, NetworkCardModel,
    ProcessorItem, Reservation, ReservationItem, ReservationRecord,
};
use crate::glpi::urls;
use std::collections::HashMap;

/// Read access to the asset inventory the filter runs against.
///
/// Collections are fetched once per run; hardware sub-records are fetched
/// per computer as the eligibility checks need them. A computer without the
/// corresponding link simply has no sub-records.
pub trait Inventory {
    fn list_computers(&self) -> Result<Vec<Computer>>;

    /// All disks, ascending by size.
    fn list_disks(&self) -> Result<Vec<Disk>>;

    fn list_reservations(&self) -> Result<Vec<Reservation>>;

    /// True if the computer has an active reservation item.
    fn is_reservable(&self, computer: &Computer) -> Result<bool>;

    fn processors(&self, computer: &Computer) -> Result<Vec<ProcessorItem>>;

    fn memory_modules(&self, computer: &Computer) -> Result<Vec<MemoryItem>>;

    /// Designations of the attached graphic cards.
    fn graphic_card_models(&self, computer: &Computer) -> Result<Vec<String>>;

    /// Model names of the attached network cards.
    fn network_card_models(&self, computer: &Computer) -> Result<Vec<String>>;
}

/// Pairs each reservation with the item it reserves. Reservations whose item
/// is gone are logged and dropped.
pub fn join_reservations(
    records: Vec<ReservationRecord>,
    items: Vec<ReservationItem>,
) -> Vec<Reservation> {
    let items: HashMap<u64, ReservationItem> =
        items.into_iter().map(|item| (item.id, item)).collect();

    let mut reservations = Vec::with_capacity(records.len());
    for record in records {
        match items.get(&record.reservationitems_id) {
            Some(item) => reservations.push(Reservation::join(record, item)),
            None => log::warn!(
                "Reservation {} points at missing reservation item {}",
                record.id,
                record.reservationitems_id
            ),
        }
    }
    reservations
}

impl Session {
    fn sub_records<T: serde::de::DeserializeOwned>(
        &self,
        computer: &Computer,
        relation: &str,
    ) -> Result<Vec<T>> {
        match computer.link(relation) {
            Some(link) => self.follow(&link.href),
            None => Ok(Vec::new()),
        }
    }
}

impl Inventory for Session {
    fn list_computers(&self) -> Result<Vec<Computer>> {
        self.list_all(&self.urls().endpoint(urls::COMPUTER))
    }

    fn list_disks(&self) -> Result<Vec<Disk>> {
        let mut disks: Vec<Disk> = self.list_all(&self.urls().endpoint(urls::DISK_ITEM))?;
        disks.sort_by_key(|disk| disk.totalsize);
        Ok(disks)
    }

    fn list_reservations(&self) -> Result<Vec<Reservation>> {
        let records: Vec<ReservationRecord> =
            self.list_all(&self.urls().endpoint(urls::RESERVATION))?;
        let items: Vec<ReservationItem> =
            self.list_all(&self.urls().endpoint(urls::RESERVATION_ITEM))?;
        Ok(join_reservations(records, items))
    }

    fn is_reservable(&self, computer: &Computer) -> Result<bool> {
        let items: Vec<ReservationItem> = self.sub_records(computer, rel::RESERVATION_ITEM)?;
        Ok(items.iter().any(|item| item.is_active))
    }

    fn processors(&self, computer: &Computer) -> Result<Vec<ProcessorItem>> {
        self.sub_records(computer, rel::PROCESSORS)
    }

    fn memory_modules(&self, computer: &Computer) -> Result<Vec<MemoryItem>> {
        self.sub_records(computer, rel::MEMORY)
    }

    fn graphic_card_models(&self, computer: &Computer) -> Result<Vec<String>> {
        let items: Vec<LinkedItem> = self.sub_records(computer, rel::GRAPHIC_CARDS)?;
        let mut models = Vec::new();
        for item in &items {
            if let Some(link) = find_link(&item.links, rel::GRAPHIC_CARD) {
                let card: DeviceGraphicCard = self.follow(&link.href)?;
                models.push(card.designation);
            }
        }
        Ok(models)
    }

    fn network_card_models(&self, computer: &Computer) -> Result<Vec<String>> {
        let items: Vec<LinkedItem> = self.sub_records(computer, rel::NETWORK_CARDS)?;
        let mut models = Vec::new();
        for item in &items {
            let Some(card_link) = find_link(&item.links, rel::NETWORK_CARD) else {
                continue;
            };
            let card: LinkedItem = self.follow(&card_link.href)?;
            if let Some(model_link) = find_link(&card.links, rel::NETWORK_CARD_MODEL) {
                let model: NetworkCardModel = self.follow(&model_link.href)?;
                if !model.name.is_empty() {
                    models.push(model.name);
                }
            }
        }
        Ok(models)
    }
}
