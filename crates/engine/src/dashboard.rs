use crate::support::parse_stored_date;
use sb_core::model::{Category, Feature, FeatureStatus, Project};
use time::Date;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub not_started: usize,
    pub in_progress: usize,
    pub blocked: usize,
    pub done: usize,
}

impl StatusCounts {
    fn record(&mut self, status: FeatureStatus) {
        match status {
            FeatureStatus::NotStarted => self.not_started += 1,
            FeatureStatus::InProgress => self.in_progress += 1,
            FeatureStatus::Blocked => self.blocked += 1,
            FeatureStatus::Done => self.done += 1,
        }
    }

    fn absorb(&mut self, other: &StatusCounts) {
        self.not_started += other.not_started;
        self.in_progress += other.in_progress;
        self.blocked += other.blocked;
        self.done += other.done;
    }
}

#[derive(Clone, Debug)]
pub struct CategoryProgress {
    pub category_id: i64,
    pub name: String,
    /// Rounded mean of the feature percents; 0 when `empty`.
    pub completion: u8,
    /// Distinguishes "nothing tracked yet" from a genuine 0%.
    pub empty: bool,
    pub status_counts: StatusCounts,
    pub overdue: usize,
    /// Short names of features claiming 100% without Done status. Surfaced,
    /// never reclassified.
    pub inconsistent: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct ProjectProgress {
    pub project_id: i64,
    /// Rounded mean over non-empty categories, each weighted equally — NOT
    /// weighted by feature count, so a lone high-priority category is not
    /// diluted by many small ones.
    pub completion: u8,
    pub empty: bool,
    pub status_counts: StatusCounts,
    pub overdue: usize,
    pub inconsistent: Vec<String>,
    pub categories: Vec<CategoryProgress>,
}

pub fn category_progress(
    category: &Category,
    features: &[Feature],
    today: Date,
) -> CategoryProgress {
    let mut status_counts = StatusCounts::default();
    let mut overdue = 0usize;
    let mut inconsistent = Vec::new();
    let mut percent_sum = 0u32;

    for feature in features {
        status_counts.record(feature.status);
        percent_sum += u32::from(feature.percent_done.value());
        if is_overdue(feature, today) {
            overdue += 1;
        }
        if feature.is_inconsistent() {
            inconsistent.push(feature.short_name.clone());
        }
    }

    let empty = features.is_empty();
    let completion = if empty {
        0
    } else {
        round_mean(percent_sum, features.len())
    };

    CategoryProgress {
        category_id: category.id,
        name: category.name.clone(),
        completion,
        empty,
        status_counts,
        overdue,
        inconsistent,
    }
}

pub fn project_progress(
    project: &Project,
    tree: &[(Category, Vec<Feature>)],
    today: Date,
) -> ProjectProgress {
    let categories: Vec<CategoryProgress> = tree
        .iter()
        .map(|(category, features)| category_progress(category, features, today))
        .collect();

    let mut status_counts = StatusCounts::default();
    let mut overdue = 0usize;
    let mut inconsistent = Vec::new();
    for category in &categories {
        status_counts.absorb(&category.status_counts);
        overdue += category.overdue;
        inconsistent.extend(category.inconsistent.iter().cloned());
    }

    let tracked: Vec<&CategoryProgress> = categories.iter().filter(|c| !c.empty).collect();
    let empty = tracked.is_empty();
    let completion = if empty {
        0
    } else {
        round_mean(
            tracked.iter().map(|c| u32::from(c.completion)).sum(),
            tracked.len(),
        )
    };

    ProjectProgress {
        project_id: project.id,
        completion,
        empty,
        status_counts,
        overdue,
        inconsistent,
        categories,
    }
}

/// Overdue means a deadline exists, it has passed, and the feature is not
/// Done. Evaluation date is an explicit input; nothing here mutates state.
fn is_overdue(feature: &Feature, today: Date) -> bool {
    if feature.status == FeatureStatus::Done {
        return false;
    }
    let Some(raw) = feature.estimated_end_date.as_deref() else {
        return false;
    };
    match parse_stored_date(raw) {
        Some(date) => date < today,
        None => false,
    }
}

fn round_mean(sum: u32, count: usize) -> u8 {
    let mean = f64::from(sum) / count as f64;
    mean.round() as u8
}

#[cfg(test)]
mod tests {
    use super::{category_progress, project_progress};
    use sb_core::model::{Category, Feature, FeatureStatus, PercentDone, Project, ProjectStatus};
    use time::{Date, Month};

    fn category(id: i64, name: &str) -> Category {
        Category {
            id,
            project_id: 1,
            name: name.to_string(),
        }
    }

    fn feature(id: i64, short_name: &str, percent: i64, status: FeatureStatus) -> Feature {
        Feature {
            id,
            category_id: 1,
            short_name: short_name.to_string(),
            name: short_name.to_string(),
            percent_done: PercentDone::try_new(percent).expect("percent in range"),
            status,
            estimated_end_date: None,
        }
    }

    fn project() -> Project {
        Project {
            id: 1,
            short_name: "acme".to_string(),
            name: "ACME".to_string(),
            description: String::new(),
            status: ProjectStatus::Active,
            owner_id: 1,
        }
    }

    fn today() -> Date {
        Date::from_calendar_date(2026, Month::August, 6).expect("valid date")
    }

    #[test]
    fn category_mean_is_rounded() {
        let progress = category_progress(
            &category(1, "Backend"),
            &[
                feature(1, "api", 0, FeatureStatus::NotStarted),
                feature(2, "db", 100, FeatureStatus::Done),
            ],
            today(),
        );
        assert_eq!(progress.completion, 50);
        assert!(!progress.empty);
    }

    #[test]
    fn empty_category_is_flagged_not_zero_percent_done() {
        let progress = category_progress(&category(1, "Backlog"), &[], today());
        assert_eq!(progress.completion, 0);
        assert!(progress.empty);
    }

    #[test]
    fn empty_categories_are_excluded_from_project_rollup() {
        let tree = vec![
            (category(1, "Backlog"), vec![]),
            (
                category(2, "Backend"),
                vec![feature(1, "api", 80, FeatureStatus::InProgress)],
            ),
        ];
        let progress = project_progress(&project(), &tree, today());
        assert_eq!(progress.completion, 80, "empty category must not dilute");
        assert!(!progress.empty);
    }

    #[test]
    fn project_with_only_empty_categories_is_empty() {
        let tree = vec![(category(1, "Backlog"), vec![])];
        let progress = project_progress(&project(), &tree, today());
        assert_eq!(progress.completion, 0);
        assert!(progress.empty);
    }

    #[test]
    fn categories_weigh_equally_regardless_of_feature_count() {
        let tree = vec![
            (
                category(1, "Core"),
                vec![feature(1, "engine", 100, FeatureStatus::Done)],
            ),
            (
                category(2, "Polish"),
                vec![
                    feature(2, "a", 0, FeatureStatus::NotStarted),
                    feature(3, "b", 0, FeatureStatus::NotStarted),
                    feature(4, "c", 0, FeatureStatus::NotStarted),
                ],
            ),
        ];
        let progress = project_progress(&project(), &tree, today());
        assert_eq!(progress.completion, 50, "uniform per-category weighting");
    }

    #[test]
    fn inconsistent_features_are_surfaced_not_corrected() {
        let tree = vec![(
            category(1, "Backend"),
            vec![feature(1, "api", 100, FeatureStatus::InProgress)],
        )];
        let progress = project_progress(&project(), &tree, today());
        assert_eq!(progress.inconsistent, vec!["api".to_string()]);
        assert_eq!(progress.status_counts.in_progress, 1);
        assert_eq!(progress.status_counts.done, 0);
    }

    #[test]
    fn overdue_counts_pending_features_past_deadline() {
        let mut past_due = feature(1, "api", 50, FeatureStatus::InProgress);
        past_due.estimated_end_date = Some("2026-08-01".to_string());
        let mut done_late = feature(2, "db", 100, FeatureStatus::Done);
        done_late.estimated_end_date = Some("2026-08-01".to_string());
        let mut future = feature(3, "ui", 10, FeatureStatus::NotStarted);
        future.estimated_end_date = Some("2026-09-01".to_string());

        let progress = category_progress(
            &category(1, "Backend"),
            &[past_due, done_late, future],
            today(),
        );
        assert_eq!(progress.overdue, 1, "done and future-dated are not overdue");
    }

    #[test]
    fn status_counts_cover_all_features() {
        let tree = vec![(
            category(1, "Backend"),
            vec![
                feature(1, "a", 0, FeatureStatus::NotStarted),
                feature(2, "b", 40, FeatureStatus::InProgress),
                feature(3, "c", 60, FeatureStatus::Blocked),
                feature(4, "d", 100, FeatureStatus::Done),
            ],
        )];
        let progress = project_progress(&project(), &tree, today());
        assert_eq!(progress.status_counts.not_started, 1);
        assert_eq!(progress.status_counts.in_progress, 1);
        assert_eq!(progress.status_counts.blocked, 1);
        assert_eq!(progress.status_counts.done, 1);
    }
}
