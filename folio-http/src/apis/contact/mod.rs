pub mod handler;

pub use handler::{handle_contact, ContactResponse};
