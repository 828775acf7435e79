use crate::domain::model::{Document, FieldFilter, Fields, FilterOp};
use crate::domain::ports::DocumentStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Collections {
    documents: HashMap<String, Vec<Document>>,
    next_id: u64,
}

/// 行程內的文件儲存，依插入順序回傳
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one `{ name }` document per entry, as reference collections hold.
    pub async fn seed_names<I, T>(&self, collection: &str, names: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        for name in names {
            let mut fields = Fields::new();
            fields.insert("name".to_string(), Value::String(name.into()));
            self.insert_document(collection, fields).await;
        }
    }

    pub async fn documents(&self, collection: &str) -> Vec<Document> {
        let inner = self.inner.lock().await;
        inner
            .documents
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn count(&self, collection: &str) -> usize {
        let inner = self.inner.lock().await;
        inner.documents.get(collection).map_or(0, Vec::len)
    }

    async fn insert_document(&self, collection: &str, fields: Fields) -> String {
        let mut inner = self.inner.lock().await;
        inner.next_id += 1;
        let id = format!("mem-{:06}", inner.next_id);
        inner
            .documents
            .entry(collection.to_string())
            .or_default()
            .push(Document::new(id.clone(), fields));
        id
    }
}

/// 同型別才比較，和遠端儲存的排序規則一致
fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn matches(doc: &Document, filter: &FieldFilter) -> bool {
    let Some(value) = doc.fields.get(&filter.field) else {
        return false;
    };
    match filter.op {
        FilterOp::LessThan => compare_values(value, &filter.value) == Some(Ordering::Less),
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_all(&self, collection: &str) -> Result<Vec<Document>> {
        Ok(self.documents(collection).await)
    }

    async fn insert(&self, collection: &str, fields: Fields) -> Result<String> {
        Ok(self.insert_document(collection, fields).await)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if let Some(docs) = inner.documents.get_mut(collection) {
            docs.retain(|doc| doc.id != id);
        }
        Ok(())
    }

    async fn list_where(&self, collection: &str, filter: &FieldFilter) -> Result<Vec<Document>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .documents
            .get(collection)
            .map(|docs| docs.iter().filter(|d| matches(d, filter)).cloned().collect())
            .unwrap_or_default())
    }
}
