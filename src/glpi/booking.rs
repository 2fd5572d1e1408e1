use crate::error::{Error, Result};
use crate::glpi::de::DATETIME_FORMAT;
use crate::glpi::inventory::Inventory;
use crate::glpi::session::Session;
use crate::glpi::types::{NamedItem, NewReservation, ReservationDetail, ReservationItem};
use crate::glpi::urls;
use crate::reservations::ReservationRequest;
use std::collections::HashMap;

/// Narrows a reservation listing.
#[derive(Debug, Default)]
pub struct ReservationFilter<'a> {
    /// Exact name of the reserved item.
    pub identifier: Option<&'a str>,
    /// Case-insensitive substring of the user name.
    pub user: Option<&'a str>,
}

impl Session {
    /// Every reservation with user and item names resolved. Names are
    /// fetched once per distinct user and item.
    pub fn reservation_details(&self, filter: &ReservationFilter) -> Result<Vec<ReservationDetail>> {
        let mut users: HashMap<u64, String> = HashMap::new();
        let mut items: HashMap<(String, u64), String> = HashMap::new();
        let mut details = Vec::new();

        for reservation in self.list_reservations()? {
            let user_name = match users.get(&reservation.user_id) {
                Some(name) => name.clone(),
                None => {
                    let user: NamedItem = self.get(&self.urls().item(urls::USER, reservation.user_id))?;
                    users.insert(reservation.user_id, user.name.clone());
                    user.name
                }
            };
            if let Some(wanted) = filter.user {
                if !user_name.to_lowercase().contains(&wanted.to_lowercase()) {
                    continue;
                }
            }

            let key = (reservation.item_type.clone(), reservation.item_id);
            let item_name = match items.get(&key) {
                Some(name) => name.clone(),
                None => {
                    let item: NamedItem = self.get(&self.urls().item(&key.0, key.1))?;
                    items.insert(key, item.name.clone());
                    item.name
                }
            };
            if let Some(wanted) = filter.identifier {
                if wanted != item_name {
                    continue;
                }
            }

            details.push(ReservationDetail {
                id: reservation.id,
                user_id: reservation.user_id,
                user_name,
                item_type: reservation.item_type,
                item_id: reservation.item_id,
                item_name,
                begins: reservation.begin.format(DATETIME_FORMAT).to_string(),
                ends: reservation.end.format(DATETIME_FORMAT).to_string(),
                comment: Some(reservation.comment).filter(|comment| !comment.is_empty()),
            });
        }
        Ok(details)
    }

    pub fn find_id_by_name(&self, itemtype: &str, name: &str) -> Result<Option<u64>> {
        let records: Vec<NamedItem> = self.list_all(&self.urls().endpoint(itemtype))?;
        Ok(records.into_iter().find(|record| record.name == name).map(|record| record.id))
    }

    pub fn reservation_item_for(&self, itemtype: &str, item_id: u64) -> Result<Option<u64>> {
        let items: Vec<ReservationItem> = self.list_all(&self.urls().endpoint(urls::RESERVATION_ITEM))?;
        Ok(items
            .into_iter()
            .find(|item| item.itemtype == itemtype && item.items_id == item_id)
            .map(|item| item.id))
    }

    /// Resolves the user, computer and reservation item for a request and
    /// creates the reservation. Returns the new reservation id.
    pub fn reserve(&self, request: &ReservationRequest) -> Result<u64> {
        let user_id = self
            .find_id_by_name(urls::USER, &request.username)?
            .ok_or_else(|| Error::NotFound {
                kind: "User",
                name: request.username.clone(),
            })?;
        let computer_id = self
            .find_id_by_name(urls::COMPUTER, &request.server)?
            .ok_or_else(|| Error::NotFound {
                kind: "Computer",
                name: request.server.clone(),
            })?;
        let reservation_item_id = self
            .reservation_item_for(urls::COMPUTER, computer_id)?
            .ok_or_else(|| Error::NotFound {
                kind: "Reservation item for computer",
                name: request.server.clone(),
            })?;

        let body = NewReservation {
            reservationitems_id: reservation_item_id,
            begin: request.begin.format(DATETIME_FORMAT).to_string(),
            end: request.end.format(DATETIME_FORMAT).to_string(),
            users_id: user_id,
            comment: request.comment.clone(),
        };
        self.create(urls::RESERVATION, &body)
    }
}
