//! Filtering and recency ordering of projected records.

use crate::models::{JobUpdate, Notice, Resource};

/// Records that carry a creation time in epoch milliseconds.
pub trait Timestamped {
    fn created_at(&self) -> i64;
}

impl Timestamped for Resource {
    fn created_at(&self) -> i64 {
        self.created_at
    }
}

impl Timestamped for JobUpdate {
    fn created_at(&self) -> i64 {
        self.created_at
    }
}

impl Timestamped for Notice {
    fn created_at(&self) -> i64 {
        self.created_at
    }
}

/// Sort newest first. The sort is stable, so equal timestamps keep snapshot order.
pub fn sort_by_recency<T: Timestamped>(items: &mut [T]) {
    items.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
}

/// Newest `n` records.
pub fn latest<T: Timestamped>(mut items: Vec<T>, n: usize) -> Vec<T> {
    sort_by_recency(&mut items);
    items.truncate(n);
    items
}

/// Whether a resource is filed under the given department and semester.
pub fn matches_selector(resource: &Resource, department: &str, semester: &str) -> bool {
    // Blank selectors must not pick up legacy documents missing these fields.
    if department.trim().is_empty() || semester.trim().is_empty() {
        return false;
    }
    resource.category.to_lowercase() == department.to_lowercase()
        && resource.semester.to_lowercase() == semester.to_lowercase()
}

/// Resources filed under `department` and `semester`, newest first.
///
/// Unknown selector values simply match nothing.
pub fn filter_resources(resources: Vec<Resource>, department: &str, semester: &str) -> Vec<Resource> {
    let mut matching: Vec<Resource> = resources
        .into_iter()
        .filter(|r| matches_selector(r, department, semester))
        .collect();
    sort_by_recency(&mut matching);
    matching
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(id: &str, category: &str, semester: &str, created_at: i64) -> Resource {
        Resource {
            id: id.to_string(),
            title: format!("Resource {}", id),
            category: category.to_string(),
            semester: semester.to_string(),
            pdf_link: "https://drive.example/file".to_string(),
            created_at,
        }
    }

    fn ids(resources: &[Resource]) -> Vec<&str> {
        resources.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_filter_matches_case_insensitively_and_sorts() {
        let all = vec![
            resource("a", "Computer", "3rd Semester", 100),
            resource("b", "computer", "3RD SEMESTER", 300),
            resource("c", "Civil", "3rd Semester", 400),
            resource("d", "Computer", "4th Semester", 500),
            resource("e", "COMPUTER", "3rd semester", 200),
        ];

        let filtered = filter_resources(all, "Computer", "3rd Semester");
        assert_eq!(ids(&filtered), vec!["b", "e", "a"]);
    }

    #[test]
    fn test_unknown_selector_yields_empty() {
        let all = vec![resource("a", "Computer", "3rd Semester", 100)];
        assert!(filter_resources(all.clone(), "Chemistry", "3rd Semester").is_empty());
        assert!(filter_resources(all, "Computer", "9th Semester").is_empty());
        assert!(filter_resources(Vec::new(), "Computer", "3rd Semester").is_empty());
    }

    #[test]
    fn test_blank_selector_ignores_legacy_documents() {
        let all = vec![
            resource("legacy", "", "", 100),
            resource("a", "Computer", "3rd Semester", 200),
        ];
        assert!(filter_resources(all.clone(), "", "").is_empty());
        assert!(filter_resources(all, "Computer", " ").is_empty());
    }

    #[test]
    fn test_equal_timestamps_keep_snapshot_order() {
        let mut items = vec![
            resource("first", "Civil", "1st Semester", 10),
            resource("second", "Civil", "1st Semester", 10),
            resource("newest", "Civil", "1st Semester", 20),
        ];
        sort_by_recency(&mut items);
        assert_eq!(ids(&items), vec!["newest", "first", "second"]);
    }

    #[test]
    fn test_latest_truncates() {
        let notices: Vec<Notice> = (0..6)
            .map(|i| Notice {
                id: i.to_string(),
                title: "t".to_string(),
                text: String::new(),
                created_at: i,
            })
            .collect();
        let newest = latest(notices, 4);
        let newest_ids: Vec<&str> = newest.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(newest_ids, vec!["5", "4", "3", "2"]);
    }
}
