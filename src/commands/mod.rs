pub mod computers;
pub mod filter;
pub mod reservations;
pub mod reserve;

pub use computers::handle_computers_command;
pub use filter::handle_filter_command;
pub use reservations::{handle_project_command, handle_reservations_command};
pub use reserve::handle_reserve_command;
