//! List query engine: filter, sort and paginate a loaded collection in memory.

use std::{cmp::Ordering, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::pagination::{Pagination, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};

use super::model::Issue;

pub const DEFAULT_SORT_BY: &str = "updatedAt";
pub const DEFAULT_SORT_DIR: &str = "desc";

/// Fields an issue list can be ordered by, named as on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
    Id,
    Title,
    Description,
    Status,
    Priority,
    Assignee,
    CreatedAt,
    UpdatedAt,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort field: {0}")]
pub struct UnknownSortField(pub String);

impl FromStr for SortField {
    type Err = UnknownSortField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "id" => Self::Id,
            "title" => Self::Title,
            "description" => Self::Description,
            "status" => Self::Status,
            "priority" => Self::Priority,
            "assignee" => Self::Assignee,
            "createdAt" => Self::CreatedAt,
            "updatedAt" => Self::UpdatedAt,
            other => return Err(UnknownSortField(other.to_string())),
        })
    }
}

impl SortField {
    /// Absent assignee compares as "".
    pub fn compare(self, a: &Issue, b: &Issue) -> Ordering {
        match self {
            Self::Id => a.id.cmp(&b.id),
            Self::Title => a.title.cmp(&b.title),
            Self::Description => a.description.cmp(&b.description),
            Self::Status => a.status.cmp(&b.status),
            Self::Priority => a.priority.cmp(&b.priority),
            Self::Assignee => a.assignee.as_deref().unwrap_or("").cmp(b.assignee.as_deref().unwrap_or("")),
            Self::CreatedAt => a.created_at.cmp(&b.created_at),
            Self::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Only the exact string `desc` sorts descending.
    pub fn parse(s: &str) -> Self {
        if s == "desc" { Self::Desc } else { Self::Asc }
    }
}

/// Result of the sort step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortOutcome {
    Sorted(SortField, SortDirection),
    /// `sortBy` named no sortable field; filter order was kept.
    Skipped(UnknownSortField),
}

/// Query parameters of `GET /issues`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IssueQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default = "default_sort_dir")]
    pub sort_dir: String,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_sort_by() -> String { DEFAULT_SORT_BY.to_string() }
fn default_sort_dir() -> String { DEFAULT_SORT_DIR.to_string() }
fn default_page() -> i64 { DEFAULT_PAGE }
fn default_page_size() -> i64 { DEFAULT_PAGE_SIZE }

impl Default for IssueQuery {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            priority: None,
            assignee: None,
            sort_by: default_sort_by(),
            sort_dir: default_sort_dir(),
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of a filtered listing. `total` counts all matches, not just this page.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IssuePage {
    pub items: Vec<Issue>,
    pub total: usize,
    pub page: i64,
    pub page_size: i64,
}

// Empty strings behave like an omitted parameter.
fn param(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl IssueQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination { page: self.page, page_size: self.page_size }.normalize()
    }

    pub fn matches(&self, issue: &Issue) -> bool {
        if let Some(search) = param(&self.search) {
            if !issue.title.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        if let Some(status) = param(&self.status) {
            if issue.status != status {
                return false;
            }
        }
        if let Some(priority) = param(&self.priority) {
            if issue.priority != priority {
                return false;
            }
        }
        if let Some(assignee) = param(&self.assignee) {
            match issue.assignee.as_deref().filter(|a| !a.is_empty()) {
                Some(a) if a.to_lowercase().contains(&assignee.to_lowercase()) => {}
                _ => return false,
            }
        }
        true
    }

    pub fn filter(&self, issues: Vec<Issue>) -> Vec<Issue> {
        issues.into_iter().filter(|i| self.matches(i)).collect()
    }

    /// Stable sort in place; equal keys keep their filter order in both directions.
    pub fn sort(&self, issues: &mut [Issue]) -> SortOutcome {
        let field = match self.sort_by.parse::<SortField>() {
            Ok(field) => field,
            Err(unknown) => return SortOutcome::Skipped(unknown),
        };
        let dir = SortDirection::parse(&self.sort_dir);
        match dir {
            SortDirection::Asc => issues.sort_by(|a, b| field.compare(a, b)),
            SortDirection::Desc => issues.sort_by(|a, b| field.compare(b, a)),
        }
        SortOutcome::Sorted(field, dir)
    }

    /// Filter, sort and cut out the requested page.
    pub fn run(&self, issues: Vec<Issue>) -> (IssuePage, SortOutcome) {
        let mut matched = self.filter(issues);
        let outcome = self.sort(&mut matched);
        let total = matched.len();
        let pagination = self.pagination();
        let window = pagination.window(total);
        let items = matched.drain(window).collect();
        let page = IssuePage { items, total, page: pagination.page, page_size: pagination.page_size };
        (page, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issues::model::NewIssue;
    use chrono::{Duration, TimeZone, Utc};

    fn issue(id: u64, title: &str, status: &str, priority: &str, assignee: Option<&str>) -> Issue {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut i = NewIssue {
            title: Some(title.into()),
            status: Some(status.into()),
            priority: Some(priority.into()),
            assignee: assignee.map(Into::into),
            ..Default::default()
        }
        .into_issue(id, base + Duration::minutes(id as i64));
        i.updated_at = base + Duration::minutes(id as i64);
        i
    }

    fn fixture() -> Vec<Issue> {
        vec![
            issue(1, "Login bug", "open", "high", Some("Alice")),
            issue(2, "Crash on save", "closed", "low", None),
            issue(3, "Bugfix for export", "open", "medium", Some("bob")),
            issue(4, "Docs", "open", "high", Some("")),
            issue(5, "another BUG", "closed", "high", Some("alicia")),
        ]
    }

    fn ids(items: &[Issue]) -> Vec<u64> {
        items.iter().map(|i| i.id).collect()
    }

    fn query() -> IssueQuery {
        IssueQuery::default()
    }

    #[test]
    fn default_lists_most_recently_updated_first() {
        let (page, outcome) = query().run(fixture());
        assert_eq!(ids(&page.items), vec![5, 4, 3, 2, 1]);
        assert_eq!(page.total, 5);
        assert_eq!((page.page, page.page_size), (1, 10));
        assert_eq!(outcome, SortOutcome::Sorted(SortField::UpdatedAt, SortDirection::Desc));
    }

    #[test]
    fn search_is_case_insensitive_title_substring() {
        let q = IssueQuery { search: Some("bug".into()), sort_by: "id".into(), sort_dir: "asc".into(), ..query() };
        assert_eq!(ids(&q.run(fixture()).0.items), vec![1, 3, 5]);
    }

    #[test]
    fn status_and_priority_are_exact() {
        let q = IssueQuery { status: Some("open".into()), priority: Some("high".into()), sort_by: "id".into(), sort_dir: "asc".into(), ..query() };
        assert_eq!(ids(&q.run(fixture()).0.items), vec![1, 4]);
        let q = IssueQuery { status: Some("Open".into()), ..query() };
        assert_eq!(q.run(fixture()).0.total, 0);
    }

    #[test]
    fn assignee_filter_skips_unassigned_and_matches_substring() {
        let q = IssueQuery { assignee: Some("ALI".into()), sort_by: "id".into(), sort_dir: "asc".into(), ..query() };
        assert_eq!(ids(&q.run(fixture()).0.items), vec![1, 5]);
    }

    #[test]
    fn empty_params_are_ignored() {
        let q = IssueQuery { search: Some(String::new()), status: Some(String::new()), assignee: Some(String::new()), ..query() };
        assert_eq!(q.run(fixture()).0.total, 5);
    }

    #[test]
    fn filters_commute() {
        let both = IssueQuery { search: Some("bug".into()), status: Some("open".into()), ..query() };
        let status_first = IssueQuery { status: Some("open".into()), ..query() }.filter(fixture());
        let then_search = IssueQuery { search: Some("bug".into()), ..query() }.filter(status_first);
        assert_eq!(ids(&both.filter(fixture())), ids(&then_search));
    }

    #[test]
    fn sort_by_priority_ascending_first_page_of_one() {
        let q = IssueQuery { sort_by: "priority".into(), sort_dir: "asc".into(), page: 1, page_size: 1, ..query() };
        let (page, _) = q.run(fixture());
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].priority, "high");
        assert_eq!(page.items[0].id, 1);
        assert_eq!(page.total, 5);
    }

    #[test]
    fn sort_is_stable_in_both_directions() {
        let asc = IssueQuery { sort_by: "status".into(), sort_dir: "asc".into(), ..query() };
        assert_eq!(ids(&asc.run(fixture()).0.items), vec![2, 5, 1, 3, 4]);
        let desc = IssueQuery { sort_by: "status".into(), sort_dir: "desc".into(), ..query() };
        assert_eq!(ids(&desc.run(fixture()).0.items), vec![1, 3, 4, 2, 5]);
    }

    #[test]
    fn anything_but_desc_is_ascending() {
        let q = IssueQuery { sort_by: "id".into(), sort_dir: "DESC".into(), ..query() };
        assert_eq!(ids(&q.run(fixture()).0.items), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn missing_assignee_sorts_as_empty_string() {
        let q = IssueQuery { sort_by: "assignee".into(), sort_dir: "asc".into(), ..query() };
        assert_eq!(ids(&q.run(fixture()).0.items), vec![2, 4, 1, 5, 3]);
    }

    #[test]
    fn unknown_sort_field_keeps_filter_order() {
        let q = IssueQuery { sort_by: "severity".into(), ..query() };
        let (page, outcome) = q.run(fixture());
        assert_eq!(ids(&page.items), vec![1, 2, 3, 4, 5]);
        assert_eq!(outcome, SortOutcome::Skipped(UnknownSortField("severity".into())));
    }

    #[test]
    fn pagination_normalizes_and_tolerates_out_of_range() {
        let q = IssueQuery { page_size: 0, ..query() };
        assert_eq!(q.run(fixture()).0.page_size, 10);

        let q = IssueQuery { page: 9, page_size: 2, ..query() };
        let (page, _) = q.run(fixture());
        assert!(page.items.is_empty());
        assert_eq!(page.total, 5);
        assert_eq!(page.page, 9);

        let q = IssueQuery { page: 0, ..query() };
        assert!(q.run(fixture()).0.items.is_empty());
    }

    #[test]
    fn pages_add_up_to_total() {
        let page_size = 2;
        let total = query().run(fixture()).0.total as i64;
        let pages = (total + page_size - 1) / page_size;
        let mut seen = Vec::new();
        for page in 1..=pages {
            let q = IssueQuery { page, page_size, ..query() };
            seen.extend(ids(&q.run(fixture()).0.items));
        }
        assert_eq!(seen.len() as i64, total);
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len() as i64, total);
    }

    #[test]
    fn query_deserializes_wire_names_with_defaults() {
        let q: IssueQuery = serde_json::from_value(serde_json::json!({"sortBy": "title", "pageSize": 5})).unwrap();
        assert_eq!(q.sort_by, "title");
        assert_eq!(q.sort_dir, DEFAULT_SORT_DIR);
        assert_eq!(q.page, 1);
        assert_eq!(q.page_size, 5);
    }
}
