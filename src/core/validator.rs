use chrono::{DateTime, Utc};

use crate::domain::model::{Reservation, ReservationRequest};
use crate::utils::error::ValidationError;

pub fn is_expired(reservation: &Reservation, now: DateTime<Utc>) -> bool {
    reservation.reservation_time < now
}

/// 只做字串完全比對；過期但尚未清除的預約仍然佔用房間
pub fn room_is_available(reservations: &[Reservation], room: &str, date: &str, time: &str) -> bool {
    !reservations
        .iter()
        .any(|r| r.room == room && r.date == date && r.time == time)
}

/// 同一團體同一天只能有一筆未過期的預約
pub fn group_may_reserve(
    reservations: &[Reservation],
    name: &str,
    date: &str,
    now: DateTime<Utc>,
) -> bool {
    !reservations
        .iter()
        .any(|r| r.name == name && r.date == date && !is_expired(r, now))
}

/// Admission checks in order: missing field, group conflict, room conflict.
pub fn check_request(
    reservations: &[Reservation],
    request: &ReservationRequest,
    now: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if let Some(field) = request.first_missing_field() {
        return Err(ValidationError::MissingField { field });
    }

    if !group_may_reserve(reservations, &request.name, &request.date, now) {
        return Err(ValidationError::GroupAlreadyBooked {
            name: request.name.clone(),
            date: request.date.clone(),
        });
    }

    if !room_is_available(reservations, &request.room, &request.date, &request.time) {
        return Err(ValidationError::RoomUnavailable {
            room: request.room.clone(),
            date: request.date.clone(),
            time: request.time.clone(),
        });
    }

    Ok(())
}
