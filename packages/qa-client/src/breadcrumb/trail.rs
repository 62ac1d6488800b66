use std::fmt;

use super::labels::{is_uuid, EntityKind, LabelResolver};

pub const DASHBOARD_HREF: &str = "/dashboard";
pub const ACADEMIC_YEARS_HREF: &str = "/dashboard/academic-years";

const PENDING_LABEL: &str = "...";

/// One link in the trail. `label` is `None` while an entity name is unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub label: Option<String>,
    pub href: String,
}

impl Crumb {
    fn new(label: Option<String>, href: impl Into<String>) -> Self {
        Self {
            label,
            href: href.into(),
        }
    }

    fn fixed(label: &str, href: impl Into<String>) -> Self {
        Self::new(Some(label.to_string()), href)
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(PENDING_LABEL)
    }
}

fn static_label(segment: &str) -> Option<&'static str> {
    match segment {
        "dashboard" => Some("Dashboard"),
        "academic-years" => Some("Academic Years"),
        "standards" => Some("Standards"),
        "courses" => Some("Courses"),
        "indicators" => Some("Indicators"),
        "users" => Some("Users"),
        "structure" => Some("Structure"),
        "requests" => Some("Requests"),
        _ => None,
    }
}

/// `course-files` -> `Course Files`
fn title_case(segment: &str) -> String {
    segment
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Navigation trail for a dashboard path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BreadcrumbTrail {
    crumbs: Vec<Crumb>,
}

impl BreadcrumbTrail {
    /// Build the trail for `pathname`, optionally scoped by a `?year=` query value.
    ///
    /// Dashboard and Academic Years always lead. An academic year id, taken
    /// from the segment after `academic-years` or else from `year_query`, adds
    /// a crumb for that year, and every later href carries `?year=<id>`.
    /// Walking stops right after a standard id.
    pub async fn build(
        pathname: &str,
        year_query: Option<&str>,
        resolver: LabelResolver<'_>,
    ) -> Self {
        let segments: Vec<&str> = pathname.split('/').filter(|s| !s.is_empty()).collect();

        let from_path = segments
            .iter()
            .position(|s| *s == "academic-years")
            .and_then(|i| segments.get(i + 1))
            .copied()
            .filter(|s| is_uuid(s));
        let year_id = from_path.or(year_query.filter(|y| is_uuid(y)));

        let mut crumbs = vec![
            Crumb::fixed("Dashboard", DASHBOARD_HREF),
            Crumb::fixed("Academic Years", ACADEMIC_YEARS_HREF),
        ];

        if let Some(year) = year_id {
            let label = resolver.resolve(EntityKind::AcademicYear, year).await;
            crumbs.push(Crumb::new(label, format!("{ACADEMIC_YEARS_HREF}/{year}")));
        }

        let mut current_path = String::new();
        let mut prev_segment = "";
        for segment in segments {
            current_path.push('/');
            current_path.push_str(segment);

            if segment == "dashboard" || segment == "academic-years" || Some(segment) == year_id {
                prev_segment = segment;
                continue;
            }

            let is_id = is_uuid(segment);
            let label = if is_id {
                match EntityKind::from_segment(prev_segment) {
                    Some(kind) => resolver.resolve(kind, segment).await,
                    None => None,
                }
            } else {
                Some(static_label(segment).map_or_else(|| title_case(segment), str::to_string))
            };

            let href = match year_id {
                Some(year) => format!("{current_path}?year={year}"),
                None => current_path.clone(),
            };
            crumbs.push(Crumb::new(label, href));

            if is_id && prev_segment == "standards" {
                break;
            }
            prev_segment = segment;
        }

        Self { crumbs }
    }

    pub fn crumbs(&self) -> &[Crumb] {
        &self.crumbs
    }

    pub fn into_crumbs(self) -> Vec<Crumb> {
        self.crumbs
    }

    pub fn len(&self) -> usize {
        self.crumbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crumbs.is_empty()
    }
}

impl fmt::Display for BreadcrumbTrail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, crumb) in self.crumbs.iter().enumerate() {
            if i > 0 {
                f.write_str(" > ")?;
            }
            f.write_str(crumb.display_label())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::breadcrumb::labels::{LabelCache, LabelSource};
    use crate::error::ClientError;

    const YEAR: &str = "11111111-2222-4333-8444-555555555555";
    const STANDARD: &str = "aaaaaaaa-bbbb-4ccc-8ddd-eeeeeeeeeeee";
    const COURSE: &str = "99999999-8888-4777-8666-555555555555";

    /// Labels by kind; counts lookups.
    struct FixedLabels {
        calls: AtomicUsize,
    }

    impl FixedLabels {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LabelSource for FixedLabels {
        async fn fetch_label(
            &self,
            kind: EntityKind,
            _id: &str,
        ) -> Result<Option<String>, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(match kind {
                EntityKind::AcademicYear => Some("2024-09-01 - 2025-06-30".into()),
                EntityKind::Standard => Some("Mission and Goals".into()),
                EntityKind::Course => None,
                EntityKind::Indicator => Some("Indicator 1.1".into()),
            })
        }
    }

    async fn build(path: &str, year: Option<&str>, source: &FixedLabels) -> BreadcrumbTrail {
        let cache = LabelCache::new(32);
        BreadcrumbTrail::build(path, year, LabelResolver::new(&cache, source)).await
    }

    fn hrefs(trail: &BreadcrumbTrail) -> Vec<&str> {
        trail.crumbs().iter().map(|c| c.href.as_str()).collect()
    }

    #[test]
    fn title_case_fallback() {
        assert_eq!(title_case("course-files"), "Course Files");
        assert_eq!(title_case("reports"), "Reports");
    }

    #[tokio::test]
    async fn plain_dashboard_has_two_crumbs() {
        let source = FixedLabels::new();
        let trail = build("/dashboard", None, &source).await;
        assert_eq!(hrefs(&trail), vec![DASHBOARD_HREF, ACADEMIC_YEARS_HREF]);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn year_from_path_scopes_later_links() {
        let source = FixedLabels::new();
        let path = format!("/dashboard/academic-years/{YEAR}/standards/{STANDARD}/indicators");
        let trail = build(&path, None, &source).await;

        assert_eq!(
            hrefs(&trail),
            vec![
                DASHBOARD_HREF.to_string(),
                ACADEMIC_YEARS_HREF.to_string(),
                format!("{ACADEMIC_YEARS_HREF}/{YEAR}"),
                format!("/dashboard/academic-years/{YEAR}/standards?year={YEAR}"),
                format!("/dashboard/academic-years/{YEAR}/standards/{STANDARD}?year={YEAR}"),
            ]
        );
        assert_eq!(
            trail.to_string(),
            "Dashboard > Academic Years > 2024-09-01 - 2025-06-30 > Standards > Mission and Goals"
        );
    }

    #[tokio::test]
    async fn year_from_query_when_path_has_none() {
        let source = FixedLabels::new();
        let trail = build("/dashboard/courses", Some(YEAR), &source).await;
        assert_eq!(
            hrefs(&trail),
            vec![
                DASHBOARD_HREF.to_string(),
                ACADEMIC_YEARS_HREF.to_string(),
                format!("{ACADEMIC_YEARS_HREF}/{YEAR}"),
                format!("/dashboard/courses?year={YEAR}"),
            ]
        );
    }

    #[tokio::test]
    async fn non_uuid_year_query_is_ignored() {
        let source = FixedLabels::new();
        let trail = build("/dashboard/users", Some("2024"), &source).await;
        assert_eq!(
            hrefs(&trail),
            vec![DASHBOARD_HREF, ACADEMIC_YEARS_HREF, "/dashboard/users"]
        );
        assert_eq!(trail.crumbs()[2].display_label(), "Users");
    }

    #[tokio::test]
    async fn unknown_label_renders_as_pending() {
        let source = FixedLabels::new();
        let path = format!("/dashboard/courses/{COURSE}/course-files");
        let trail = build(&path, None, &source).await;

        let labels: Vec<&str> = trail.crumbs().iter().map(Crumb::display_label).collect();
        assert_eq!(
            labels,
            vec!["Dashboard", "Academic Years", "Courses", "...", "Course Files"]
        );
        assert_eq!(trail.crumbs()[3].label, None);
    }

    #[tokio::test]
    async fn uuid_after_unknown_segment_is_not_looked_up() {
        let source = FixedLabels::new();
        let path = format!("/dashboard/structure/{COURSE}");
        let trail = build(&path, None, &source).await;
        assert_eq!(trail.len(), 4);
        assert_eq!(trail.crumbs()[3].label, None);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }
}
