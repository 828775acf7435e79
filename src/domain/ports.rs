use crate::domain::model::{Document, FieldFilter, Fields};
use crate::utils::error::Result;
use async_trait::async_trait;
use crate::core::schedule::LocalConvention;
use std::time::Duration;

/// 遠端文件儲存；所有失敗都以 store 類錯誤回傳
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_all(&self, collection: &str) -> Result<Vec<Document>>;
    async fn insert(&self, collection: &str, fields: Fields) -> Result<String>;
    async fn delete(&self, collection: &str, id: &str) -> Result<()>;
    async fn list_where(&self, collection: &str, filter: &FieldFilter) -> Result<Vec<Document>>;
}

pub trait ConfigProvider: Send + Sync {
    fn groups_collection(&self) -> &str;
    fn rooms_collection(&self) -> &str;
    fn reservations_collection(&self) -> &str;
    fn local_convention(&self) -> LocalConvention;
    fn sweep_interval(&self) -> Duration;
}
