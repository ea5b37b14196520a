use crate::models::{ClassifiedRow, Status};

/// Manager / status selection. An empty list selects everything.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub managers: Vec<String>,
    pub statuses: Vec<Status>,
}

impl Filter {
    pub fn matches(&self, row: &ClassifiedRow) -> bool {
        let manager_ok = self.managers.is_empty() || self.managers.iter().any(|m| *m == row.manager);
        let status_ok = self.statuses.is_empty() || self.statuses.contains(&row.status());
        manager_ok && status_ok
    }

    pub fn apply(&self, rows: &[ClassifiedRow]) -> Vec<ClassifiedRow> {
        rows.iter().filter(|row| self.matches(row)).cloned().collect()
    }
}

/// Managers in first-seen order.
pub fn distinct_managers(rows: &[ClassifiedRow]) -> Vec<String> {
    let mut managers: Vec<String> = Vec::new();
    for row in rows {
        if !managers.contains(&row.manager) {
            managers.push(row.manager.clone());
        }
    }
    managers
}
