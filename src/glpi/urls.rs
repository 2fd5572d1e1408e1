/// GLPI item types addressed by this tool.
pub const COMPUTER: &str = "Computer";
pub const NETWORK_EQUIPMENT: &str = "NetworkEquipment";
pub const DISK_ITEM: &str = "Item_Disk";
pub const RESERVATION: &str = "Reservation";
pub const RESERVATION_ITEM: &str = "ReservationItem";
pub const USER: &str = "User";

const API_PATH: &str = "apirest.php/";

#[derive(Debug, Clone, PartialEq)]
pub struct Urls {
    pub home: String,
    pub base: String,
}

impl Urls {
    pub fn new(home: &str) -> Self {
        let home = home.trim_end_matches('/').to_string();
        let base = format!("{}/{}", home, API_PATH);
        Urls { home, base }
    }

    pub fn init_session(&self) -> String {
        format!("{}initSession", self.base)
    }

    pub fn kill_session(&self) -> String {
        format!("{}killSession", self.base)
    }

    pub fn endpoint(&self, itemtype: &str) -> String {
        format!("{}{}/", self.base, itemtype)
    }

    pub fn item(&self, itemtype: &str, id: u64) -> String {
        format!("{}{}/{}", self.base, itemtype, id)
    }

    /// Web UI page of a computer.
    pub fn computer_link(&self, id: u64) -> String {
        format!("{}/front/computer.form.php?id={}", self.home, id)
    }

    /// Rebases a link href from a GLPI response onto this instance's API
    /// root. GLPI builds hrefs from its own idea of the server path, which
    /// is wrong behind proxies.
    pub fn resolve_link(&self, href: &str) -> String {
        if let Some(pos) = href.find(API_PATH) {
            return format!("{}{}", self.base, &href[pos + API_PATH.len()..]);
        }
        if href.starts_with("http://") || href.starts_with("https://") {
            return href.to_string();
        }
        format!("{}{}", self.base, href.trim_start_matches('/'))
    }
}

/// Candidate home URLs for a user-supplied instance address, in the order
/// they should be tried. Bare hosts are tried over https first.
pub fn candidate_homes(instance: &str) -> Vec<String> {
    let instance = instance.trim().trim_end_matches('/');
    if instance.starts_with("http://") || instance.starts_with("https://") {
        vec![instance.to_string()]
    } else {
        vec![format!("https://{}", instance), format!("http://{}", instance)]
    }
}

/// GLPI range query for one page, e.g. `?range=0-49`.
pub fn with_range(url: &str, start: usize, page_size: usize) -> String {
    format!("{}?range={}-{}", url, start, start + page_size - 1)
}
