// GLPI REST API client
pub mod booking;
pub mod de;
pub mod inventory;
pub mod session;
pub mod types;
pub mod urls;

pub use booking::ReservationFilter;
pub use inventory::Inventory;
pub use session::Session;
pub use urls::Urls;
