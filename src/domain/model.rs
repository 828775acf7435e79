use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::utils::error::{BookingError, Result};

/// 文件欄位，與儲存端的 JSON 物件一一對應
pub type Fields = Map<String, Value>;

pub const FIELD_NAME: &str = "name";
pub const FIELD_DATE: &str = "date";
pub const FIELD_TIME: &str = "time";
pub const FIELD_ROOM: &str = "room";
pub const FIELD_RESERVATION_TIME: &str = "reservationTime";

/// 儲存端回傳的一筆文件：store 指派的 id 加上欄位
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn str_field(&self, key: &str) -> Result<&str> {
        match self.fields.get(key) {
            Some(Value::String(s)) => Ok(s),
            Some(other) => Err(BookingError::malformed(
                &self.id,
                format!("field '{}' is not a string: {}", key, other),
            )),
            None => Err(BookingError::malformed(
                &self.id,
                format!("missing field '{}'", key),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    LessThan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl FieldFilter {
    pub fn less_than(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::LessThan,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub id: String,
    pub name: String,
    pub date: String,
    pub time: String,
    pub room: String,
    pub reservation_time: DateTime<Utc>,
}

impl Reservation {
    pub fn from_document(doc: &Document) -> Result<Self> {
        let raw_time = doc.str_field(FIELD_RESERVATION_TIME)?;
        let reservation_time = DateTime::parse_from_rfc3339(raw_time)
            .map_err(|e| {
                BookingError::malformed(
                    &doc.id,
                    format!("unparsable {} '{}': {}", FIELD_RESERVATION_TIME, raw_time, e),
                )
            })?
            .with_timezone(&Utc);

        Ok(Self {
            id: doc.id.clone(),
            name: doc.str_field(FIELD_NAME)?.to_string(),
            date: doc.str_field(FIELD_DATE)?.to_string(),
            time: doc.str_field(FIELD_TIME)?.to_string(),
            room: doc.str_field(FIELD_ROOM)?.to_string(),
            reservation_time,
        })
    }
}

/// 使用者填寫的四個欄位
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationRequest {
    pub name: String,
    pub date: String,
    pub time: String,
    pub room: String,
}

impl ReservationRequest {
    pub fn new(
        name: impl Into<String>,
        date: impl Into<String>,
        time: impl Into<String>,
        room: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            date: date.into(),
            time: time.into(),
            room: room.into(),
        }
    }

    /// 第一個空白欄位的名稱
    pub fn first_missing_field(&self) -> Option<&'static str> {
        [
            (FIELD_NAME, &self.name),
            (FIELD_DATE, &self.date),
            (FIELD_TIME, &self.time),
            (FIELD_ROOM, &self.room),
        ]
        .into_iter()
        .find(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
    }

    pub fn to_fields(&self, reservation_time: &str) -> Fields {
        let mut fields = Fields::new();
        fields.insert(FIELD_NAME.to_string(), Value::String(self.name.clone()));
        fields.insert(FIELD_DATE.to_string(), Value::String(self.date.clone()));
        fields.insert(FIELD_TIME.to_string(), Value::String(self.time.clone()));
        fields.insert(FIELD_ROOM.to_string(), Value::String(self.room.clone()));
        fields.insert(
            FIELD_RESERVATION_TIME.to_string(),
            Value::String(reservation_time.to_string()),
        );
        fields
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// 展示層持有的狀態；服務本身只持有 store
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub reservations: Vec<Reservation>,
    pub group_names: Vec<String>,
    pub room_names: Vec<String>,
    pub notices: Vec<Notice>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_reservations(&mut self, reservations: Vec<Reservation>) {
        self.reservations = reservations;
    }

    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            level,
            message: message.into(),
        });
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
