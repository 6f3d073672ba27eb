mod error;
mod model;
mod telegram;
pub mod traits;
mod transfer;

pub use error::*;
pub use model::*;
pub use telegram::TelegramTransport;
pub use traits::ChatTransport;
