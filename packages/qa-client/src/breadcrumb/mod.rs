//! Breadcrumb trail for dashboard paths, with entity names looked up
//! through the API and memoized in a bounded cache.

pub mod labels;
pub mod trail;

pub use labels::{is_uuid, label_from_entity, EntityKind, LabelCache, LabelResolver, LabelSource};
pub use trail::{BreadcrumbTrail, Crumb};
