pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::{FirestoreSettings, FirestoreStore, MemoryStore};
pub use config::{AppConfig, StoreKind};
pub use crate::core::{
    schedule::LocalConvention,
    service::{Collections, ReservationService},
    sweeper::{SharedState, SweepReport, Sweeper, SweeperHandle},
};
pub use domain::model::{AppState, Notice, NoticeLevel, Reservation, ReservationRequest};
pub use domain::ports::{ConfigProvider, DocumentStore};
pub use utils::error::{BookingError, Result, ValidationError};
