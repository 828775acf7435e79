pub mod schedule;
pub mod search;
pub mod service;
pub mod sweeper;
pub mod validator;

pub use crate::domain::model::{AppState, Document, Reservation, ReservationRequest};
pub use crate::domain::ports::{ConfigProvider, DocumentStore};
pub use crate::utils::error::Result;
