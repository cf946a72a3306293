pub mod config;
pub mod convert;
pub mod currency;
pub mod error;
pub mod favorites;
pub mod form;
pub mod history;
pub mod log;
pub mod storage;

pub use currency::{CurrencyCode, RateProvider, RateTable};
pub use error::Error;
pub use favorites::{FavoritePair, Favorites};
pub use form::{ConverterForm, RateRequest, RateStatus, RateUpdate};
pub use history::{History, HistoryEntry};
pub use storage::KeyValueStorage;
