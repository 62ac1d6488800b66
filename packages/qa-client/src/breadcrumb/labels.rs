use std::sync::LazyLock;

use async_trait::async_trait;
use moka::future::Cache;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::ClientError;

/// Entities whose ids show up in dashboard paths and get a readable label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    AcademicYear,
    Standard,
    Course,
    Indicator,
}

impl EntityKind {
    /// Kind implied by the path segment preceding an id.
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "academic-years" => Some(EntityKind::AcademicYear),
            "standards" => Some(EntityKind::Standard),
            "courses" => Some(EntityKind::Course),
            "indicators" | "pointers" => Some(EntityKind::Indicator),
            _ => None,
        }
    }

    pub fn collection_path(&self) -> &'static str {
        match self {
            EntityKind::AcademicYear => "/academic-years/",
            EntityKind::Standard => "/standards/",
            EntityKind::Course => "/courses/",
            EntityKind::Indicator => "/indicators/",
        }
    }
}

/// Canonical hyphenated UUID (8-4-4-4-12 hex digits).
pub fn is_uuid(segment: &str) -> bool {
    static UUID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
        #[allow(clippy::unwrap_used)]
        Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
            .unwrap()
    });
    UUID_REGEX.is_match(segment)
}

fn non_empty_str<'v>(entity: &'v Value, field: &str) -> Option<&'v str> {
    entity
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Display label for an entity body.
///
/// Academic years read as `"{start_date} - {end_date}"` when both dates are
/// present; everything else uses `title`, then `name`.
pub fn label_from_entity(kind: EntityKind, entity: &Value) -> Option<String> {
    if kind == EntityKind::AcademicYear {
        if let (Some(start), Some(end)) = (
            non_empty_str(entity, "start_date"),
            non_empty_str(entity, "end_date"),
        ) {
            return Some(format!("{start} - {end}"));
        }
    }
    non_empty_str(entity, "title")
        .or_else(|| non_empty_str(entity, "name"))
        .map(str::to_string)
}

/// Where labels come from on a cache miss.
#[async_trait]
pub trait LabelSource: Send + Sync {
    async fn fetch_label(&self, kind: EntityKind, id: &str) -> Result<Option<String>, ClientError>;
}

#[async_trait]
impl LabelSource for ApiClient {
    async fn fetch_label(&self, kind: EntityKind, id: &str) -> Result<Option<String>, ClientError> {
        let entity = self
            .get_json(&format!("{}{id}/", kind.collection_path()))
            .await?;
        Ok(label_from_entity(kind, &entity))
    }
}

/// Bounded memo of `(kind, id) -> label`.
///
/// Capacity-only LRU, no TTL. Concurrent misses for the same key share one
/// lookup. Only found labels are stored, so a failed lookup is retried on
/// the next render.
#[derive(Clone)]
pub struct LabelCache {
    cache: Cache<(EntityKind, String), String>,
}

impl LabelCache {
    pub fn new(capacity: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(capacity).build(),
        }
    }

    pub async fn get(&self, kind: EntityKind, id: &str) -> Option<String> {
        self.cache.get(&(kind, id.to_string())).await
    }

    pub async fn insert(&self, kind: EntityKind, id: &str, label: String) {
        self.cache.insert((kind, id.to_string()), label).await;
    }

    /// Label for an entity, fetching it on a miss. Lookup errors read as "no label".
    pub async fn resolve(
        &self,
        source: &dyn LabelSource,
        kind: EntityKind,
        id: &str,
    ) -> Option<String> {
        self.cache
            .optionally_get_with((kind, id.to_string()), async {
                match source.fetch_label(kind, id).await {
                    Ok(label) => label,
                    Err(e) => {
                        debug!(?kind, error = %e, "Label lookup failed");
                        None
                    }
                }
            })
            .await
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

/// A cache paired with the source it falls back to.
#[derive(Clone, Copy)]
pub struct LabelResolver<'a> {
    cache: &'a LabelCache,
    source: &'a dyn LabelSource,
}

impl<'a> LabelResolver<'a> {
    pub fn new(cache: &'a LabelCache, source: &'a dyn LabelSource) -> Self {
        Self { cache, source }
    }

    pub async fn resolve(&self, kind: EntityKind, id: &str) -> Option<String> {
        self.cache.resolve(self.source, kind, id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;

    const YEAR_ID: &str = "3f2b8c1e-9d4a-4b7e-8c21-0f6e5d4c3b2a";

    struct CountingSource {
        calls: AtomicUsize,
        label: Option<String>,
    }

    #[async_trait]
    impl LabelSource for CountingSource {
        async fn fetch_label(
            &self,
            _kind: EntityKind,
            _id: &str,
        ) -> Result<Option<String>, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.label.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl LabelSource for FailingSource {
        async fn fetch_label(
            &self,
            _kind: EntityKind,
            _id: &str,
        ) -> Result<Option<String>, ClientError> {
            Err(ClientError::request_failed(500, "boom"))
        }
    }

    #[test]
    fn uuid_detection() {
        assert!(is_uuid(YEAR_ID));
        assert!(is_uuid("3F2B8C1E-9D4A-4B7E-8C21-0F6E5D4C3B2A"));
        assert!(!is_uuid("3f2b8c1e9d4a4b7e8c210f6e5d4c3b2a"));
        assert!(!is_uuid("standards"));
        assert!(!is_uuid("42"));
    }

    #[test]
    fn kinds_from_segments() {
        assert_eq!(
            EntityKind::from_segment("pointers"),
            Some(EntityKind::Indicator)
        );
        assert_eq!(
            EntityKind::from_segment("academic-years"),
            Some(EntityKind::AcademicYear)
        );
        assert_eq!(EntityKind::from_segment("users"), None);
    }

    #[test]
    fn academic_year_label_prefers_dates() {
        let year = json!({"start_date": "2024-09-01", "end_date": "2025-06-30", "title": "AY 24"});
        assert_eq!(
            label_from_entity(EntityKind::AcademicYear, &year).as_deref(),
            Some("2024-09-01 - 2025-06-30")
        );
        let undated = json!({"start_date": "2024-09-01", "name": "AY 24"});
        assert_eq!(
            label_from_entity(EntityKind::AcademicYear, &undated).as_deref(),
            Some("AY 24")
        );
    }

    #[test]
    fn other_labels_use_title_then_name() {
        assert_eq!(
            label_from_entity(EntityKind::Standard, &json!({"title": "Mission", "name": "x"}))
                .as_deref(),
            Some("Mission")
        );
        assert_eq!(
            label_from_entity(EntityKind::Course, &json!({"title": "", "name": "CS101"}))
                .as_deref(),
            Some("CS101")
        );
        assert_eq!(label_from_entity(EntityKind::Course, &json!({"id": 1})), None);
    }

    #[tokio::test]
    async fn resolve_memoizes_found_labels() {
        let cache = LabelCache::new(16);
        let source = CountingSource {
            calls: AtomicUsize::new(0),
            label: Some("Mission".into()),
        };

        for _ in 0..3 {
            let label = cache.resolve(&source, EntityKind::Standard, YEAR_ID).await;
            assert_eq!(label.as_deref(), Some("Mission"));
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn resolve_does_not_cache_misses() {
        let cache = LabelCache::new(16);
        let source = CountingSource {
            calls: AtomicUsize::new(0),
            label: None,
        };

        assert!(cache.resolve(&source, EntityKind::Course, YEAR_ID).await.is_none());
        assert!(cache.resolve(&source, EntityKind::Course, YEAR_ID).await.is_none());
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn resolve_swallows_lookup_errors() {
        let cache = LabelCache::new(16);
        assert!(cache
            .resolve(&FailingSource, EntityKind::Standard, YEAR_ID)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn keys_include_kind() {
        let cache = LabelCache::new(16);
        cache
            .insert(EntityKind::Standard, YEAR_ID, "Standard label".into())
            .await;
        assert!(cache.get(EntityKind::Course, YEAR_ID).await.is_none());
        assert_eq!(
            cache.get(EntityKind::Standard, YEAR_ID).await.as_deref(),
            Some("Standard label")
        );
    }
}
