use crate::glpi::de;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Link relations GLPI attaches to a computer record.
pub mod rel {
    pub const RESERVATION_ITEM: &str = "ReservationItem";
    pub const PROCESSORS: &str = "Item_DeviceProcessor";
    pub const MEMORY: &str = "Item_DeviceMemory";
    pub const GRAPHIC_CARDS: &str = "Item_DeviceGraphicCard";
    pub const NETWORK_CARDS: &str = "Item_DeviceNetworkCard";
    pub const GRAPHIC_CARD: &str = "DeviceGraphicCard";
    pub const NETWORK_CARD: &str = "DeviceNetworkCard";
    pub const NETWORK_CARD_MODEL: &str = "DeviceNetworkCardModel";
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

pub fn find_link<'a>(links: &'a [Link], rel: &str) -> Option<&'a Link> {
    links.iter().find(|link| link.rel == rel)
}

#[derive(Debug, Clone, Deserialize)]
pub struct Computer {
    #[serde(deserialize_with = "de::u64_lenient")]
    pub id: u64,
    #[serde(default, deserialize_with = "de::string_or_empty")]
    pub name: String,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Computer {
    pub fn link(&self, rel: &str) -> Option<&Link> {
        find_link(&self.links, rel)
    }
}

/// A row of `Item_DeviceProcessor`: one socket of a computer.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessorItem {
    #[serde(deserialize_with = "de::u64_lenient")]
    pub nbcores: u64,
}

/// A row of `Item_DeviceMemory`; `size` is in MB.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryItem {
    #[serde(deserialize_with = "de::u64_lenient")]
    pub size: u64,
}

/// Any record whose only interesting part is its links.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkedItem {
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceGraphicCard {
    #[serde(default, deserialize_with = "de::string_or_empty")]
    pub designation: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkCardModel {
    #[serde(default, deserialize_with = "de::string_or_empty")]
    pub name: String,
}

/// A row of `Item_Disk`; `totalsize` is in MB.
#[derive(Debug, Clone, Deserialize)]
pub struct Disk {
    #[serde(deserialize_with = "de::u64_lenient")]
    pub id: u64,
    #[serde(default, deserialize_with = "de::string_or_empty")]
    pub itemtype: String,
    #[serde(deserialize_with = "de::u64_lenient")]
    pub items_id: u64,
    #[serde(default, deserialize_with = "de::string_or_empty")]
    pub name: String,
    #[serde(deserialize_with = "de::u64_lenient")]
    pub totalsize: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReservationItem {
    #[serde(deserialize_with = "de::u64_lenient")]
    pub id: u64,
    #[serde(default, deserialize_with = "de::string_or_empty")]
    pub itemtype: String,
    #[serde(deserialize_with = "de::u64_lenient")]
    pub items_id: u64,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_active: bool,
}

/// A `Reservation` row as GLPI returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct ReservationRecord {
    #[serde(deserialize_with = "de::u64_lenient")]
    pub id: u64,
    #[serde(deserialize_with = "de::u64_lenient")]
    pub reservationitems_id: u64,
    #[serde(deserialize_with = "de::u64_lenient")]
    pub users_id: u64,
    #[serde(deserialize_with = "de::datetime")]
    pub begin: NaiveDateTime,
    #[serde(deserialize_with = "de::datetime")]
    pub end: NaiveDateTime,
    #[serde(default, deserialize_with = "de::string_or_empty")]
    pub comment: String,
}

/// A reservation joined with the item it reserves.
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    pub id: u64,
    pub item_type: String,
    pub item_id: u64,
    pub user_id: u64,
    pub begin: NaiveDateTime,
    pub end: NaiveDateTime,
    pub comment: String,
}

impl Reservation {
    pub fn join(record: ReservationRecord, item: &ReservationItem) -> Self {
        Reservation {
            id: record.id,
            item_type: item.itemtype.clone(),
            item_id: item.items_id,
            user_id: record.users_id,
            begin: record.begin,
            end: record.end,
            comment: record.comment,
        }
    }

    pub fn is_for(&self, item_type: &str, item_id: u64) -> bool {
        self.item_type == item_type && self.item_id == item_id
    }
}

/// Anything addressed by id and name: users, computers, network equipment.
#[derive(Debug, Clone, Deserialize)]
pub struct NamedItem {
    #[serde(deserialize_with = "de::u64_lenient")]
    pub id: u64,
    #[serde(default, deserialize_with = "de::string_or_empty")]
    pub name: String,
}

/// A reservation with the user and item names resolved, as listed by the
/// `reservations` and `project` commands.
#[derive(Debug, Clone, Serialize)]
pub struct ReservationDetail {
    pub id: u64,
    pub user_id: u64,
    pub user_name: String,
    pub item_type: String,
    pub item_id: u64,
    pub item_name: String,
    pub begins: String,
    pub ends: String,
    pub comment: Option<String>,
}

/// Body of a reservation POST.
#[derive(Debug, Serialize)]
pub struct NewReservation {
    pub reservationitems_id: u64,
    pub begin: String,
    pub end: String,
    pub users_id: u64,
    pub comment: String,
}
