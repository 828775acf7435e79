use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::core::schedule::{self, LocalConvention};
use crate::core::sweeper::SweepReport;
use crate::core::validator;
use crate::domain::model::{
    AppState, FieldFilter, NoticeLevel, Reservation, ReservationRequest, FIELD_NAME,
    FIELD_RESERVATION_TIME,
};
use crate::domain::ports::{ConfigProvider, DocumentStore};
use crate::utils::error::{BookingError, Result};

pub const DEFAULT_GROUPS_COLLECTION: &str = "jumuiaGroups";
pub const DEFAULT_ROOMS_COLLECTION: &str = "rooms";
pub const DEFAULT_RESERVATIONS_COLLECTION: &str = "reservations";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collections {
    pub groups: String,
    pub rooms: String,
    pub reservations: String,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            groups: DEFAULT_GROUPS_COLLECTION.to_string(),
            rooms: DEFAULT_ROOMS_COLLECTION.to_string(),
            reservations: DEFAULT_RESERVATIONS_COLLECTION.to_string(),
        }
    }
}

/// Admission, loading and expiry of reservations over a document store.
///
/// The service keeps no reservation state of its own: callers pass the
/// [`AppState`] they render from, and every time-sensitive operation takes
/// `now` explicitly.
pub struct ReservationService<S: DocumentStore> {
    store: S,
    collections: Collections,
    convention: LocalConvention,
}

impl<S: DocumentStore> ReservationService<S> {
    pub fn new<C: ConfigProvider>(store: S, config: &C) -> Self {
        Self {
            store,
            collections: Collections {
                groups: config.groups_collection().to_string(),
                rooms: config.rooms_collection().to_string(),
                reservations: config.reservations_collection().to_string(),
            },
            convention: config.local_convention(),
        }
    }

    pub fn with_settings(
        store: S,
        collections: Collections,
        convention: impl Into<LocalConvention>,
    ) -> Self {
        Self {
            store,
            collections,
            convention: convention.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn collections(&self) -> &Collections {
        &self.collections
    }

    pub fn local_convention(&self) -> LocalConvention {
        self.convention
    }

    /// 讀取參考清單，只取每份文件的 name 欄位
    pub async fn fetch_reference_list(&self, collection: &str) -> Result<Vec<String>> {
        let documents = self.store.list_all(collection).await?;
        documents
            .iter()
            .map(|doc| doc.str_field(FIELD_NAME).map(str::to_string))
            .collect()
    }

    pub async fn load_reference_data(&self, state: &mut AppState) {
        match self.fetch_reference_list(&self.collections.groups).await {
            Ok(names) => {
                tracing::debug!("Loaded {} groups", names.len());
                state.group_names = names;
            }
            Err(e) => {
                tracing::warn!("⚠️ Failed to load groups from '{}': {}", self.collections.groups, e);
                state.group_names.clear();
                state.notify(NoticeLevel::Warning, "Error fetching Jumuia list!");
            }
        }

        match self.fetch_reference_list(&self.collections.rooms).await {
            Ok(names) => {
                tracing::debug!("Loaded {} rooms", names.len());
                state.room_names = names;
            }
            Err(e) => {
                tracing::warn!("⚠️ Failed to load rooms from '{}': {}", self.collections.rooms, e);
                state.room_names.clear();
                state.notify(NoticeLevel::Warning, "Error fetching Room list!");
            }
        }
    }

    pub async fn fetch_reservations(&self) -> Result<Vec<Reservation>> {
        let documents = self.store.list_all(&self.collections.reservations).await?;
        documents.iter().map(Reservation::from_document).collect()
    }

    /// 整批替換；失敗時保留原本的清單
    pub fn apply_reload(&self, state: &mut AppState, loaded: Result<Vec<Reservation>>) -> bool {
        match loaded {
            Ok(reservations) => {
                tracing::debug!("Loaded {} reservations", reservations.len());
                state.replace_reservations(reservations);
                true
            }
            Err(e) => {
                tracing::warn!("⚠️ Failed to reload reservations: {}", e);
                state.notify(NoticeLevel::Warning, "Error fetching reservations!");
                false
            }
        }
    }

    pub async fn load_reservations(&self, state: &mut AppState) -> bool {
        let loaded = self.fetch_reservations().await;
        self.apply_reload(state, loaded)
    }

    /// Reloads into shared state without holding the lock across store I/O.
    pub async fn load_reservations_shared(&self, state: &Mutex<AppState>) -> bool {
        let loaded = self.fetch_reservations().await;
        let mut guard = state.lock().await;
        self.apply_reload(&mut guard, loaded)
    }

    /// 驗證後寫入一筆預約，成功回傳 store 指派的 id
    ///
    /// 檢查只針對記憶體中的快照，與寫入之間沒有交易保護。
    pub async fn submit_reservation(
        &self,
        state: &mut AppState,
        request: &ReservationRequest,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let admitted = validator::check_request(&state.reservations, request, now).and_then(|_| {
            schedule::reservation_instant(&request.date, &request.time, self.convention)
        });

        let instant = match admitted {
            Ok(instant) => instant,
            Err(rejection) => {
                let err = BookingError::from(rejection);
                tracing::debug!("Reservation rejected: {}", err);
                state.notify(NoticeLevel::Error, err.user_friendly_message());
                return Err(err);
            }
        };

        let fields = request.to_fields(&schedule::format_timestamp(&instant));
        let id = match self
            .store
            .insert(&self.collections.reservations, fields)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                tracing::error!("❌ Failed to insert reservation: {}", e);
                state.notify(NoticeLevel::Error, "Error reserving room.");
                return Err(e);
            }
        };

        tracing::info!(
            "✅ Reserved {} for {} on {} at {} ({})",
            request.room,
            request.name,
            request.date,
            request.time,
            id
        );
        state.notify(NoticeLevel::Success, "Room reserved successfully!");
        self.load_reservations(state).await;

        Ok(id)
    }

    /// 刪除所有 reservationTime 早於 now 的預約
    ///
    /// Deletes run one after another; a failed delete is recorded in the
    /// report and does not stop the rest.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        let cutoff = schedule::format_timestamp(&now);
        let filter = FieldFilter::less_than(FIELD_RESERVATION_TIME, cutoff);
        let expired = self
            .store
            .list_where(&self.collections.reservations, &filter)
            .await?;

        let mut report = SweepReport {
            matched: expired.len(),
            ..SweepReport::default()
        };

        for doc in expired {
            match self
                .store
                .delete(&self.collections.reservations, &doc.id)
                .await
            {
                Ok(()) => report.deleted.push(doc.id),
                Err(e) => {
                    tracing::warn!("⚠️ Failed to delete expired reservation {}: {}", doc.id, e);
                    report.failed.push((doc.id, e));
                }
            }
        }

        if report.matched > 0 {
            tracing::info!(
                "🧹 Removed {} of {} expired reservations",
                report.deleted.len(),
                report.matched
            );
        }

        Ok(report)
    }

    /// Sweep then reload; a failed query is logged and skips the reload.
    pub async fn sweep_and_reload(&self, state: &mut AppState, now: DateTime<Utc>) -> Option<SweepReport> {
        match self.sweep_expired(now).await {
            Ok(report) => {
                self.load_reservations(state).await;
                Some(report)
            }
            Err(e) => {
                tracing::error!("❌ Error removing expired reservations: {}", e);
                None
            }
        }
    }

    pub async fn sweep_and_reload_shared(
        &self,
        state: &Mutex<AppState>,
        now: DateTime<Utc>,
    ) -> Option<SweepReport> {
        match self.sweep_expired(now).await {
            Ok(report) => {
                self.load_reservations_shared(state).await;
                Some(report)
            }
            Err(e) => {
                tracing::error!("❌ Error removing expired reservations: {}", e);
                None
            }
        }
    }

    /// 啟動流程：參考資料、預約清單、一次清除
    pub async fn initialize(&self, state: &mut AppState, now: DateTime<Utc>) {
        tracing::info!("Loading reference data and reservations");
        self.load_reference_data(state).await;
        self.load_reservations(state).await;
        self.sweep_and_reload(state, now).await;
    }
}
