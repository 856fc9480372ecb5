pub mod health;
pub mod create;
pub mod list;

pub use health::health_handler;
pub use create::create_handler;
pub use list::list_handler;
