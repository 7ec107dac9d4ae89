//! Student analytics: completion metrics, progress trend and code-run stats.
//!
//! Everything here is pure computation over `StudentAssignment`s and an
//! execution history; the panel in `vedascore-views` owns fetching and
//! rendering.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::model::{parse_due_date, percent, StudentAssignment};

/// Headline numbers for the student's assignments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_assignments: usize,
    pub submitted_assignments: usize,
    pub completion_rate: u32,
    pub average_success_rate: u32,
}

impl PerformanceMetrics {
    pub fn compute(assignments: &[StudentAssignment]) -> Self {
        let submitted: Vec<&StudentAssignment> =
            assignments.iter().filter(|a| a.is_submitted).collect();
        let total = assignments.len();

        let completion_rate = rounded_share(submitted.len(), total);
        let average_success_rate = if submitted.is_empty() {
            0
        } else {
            let sum: u32 = submitted.iter().map(|a| a.progress_percent()).sum();
            (sum as f64 / submitted.len() as f64).round() as u32
        };

        Self {
            total_assignments: total,
            submitted_assignments: submitted.len(),
            completion_rate,
            average_success_rate,
        }
    }

    pub fn pending_assignments(&self) -> usize {
        self.total_assignments - self.submitted_assignments
    }
}

/// One point on the cumulative progress line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressPoint {
    pub assignment: String,
    pub date: String,
    pub completed: bool,
    pub cumulative_progress: u32,
}

/// Assignments ordered by due date with a running completion percentage.
///
/// Unparseable due dates sort first; the sort is stable.
pub fn progress_trend(assignments: &[StudentAssignment]) -> Vec<ProgressPoint> {
    let mut sorted: Vec<&StudentAssignment> = assignments.iter().collect();
    sorted.sort_by_key(|a| parse_due_date(&a.due_date));

    let mut completed = 0usize;
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, a)| {
            if a.is_submitted {
                completed += 1;
            }
            ProgressPoint {
                assignment: a.title.clone(),
                date: a.due_date.clone(),
                completed: a.is_submitted,
                cumulative_progress: rounded_share(completed, i + 1),
            }
        })
        .collect()
}

/// A single code run from the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub language: String,
    pub success: bool,
    pub execution_time_ms: u64,
    #[serde(default)]
    pub error: Option<String>,
    pub timestamp: NaiveDateTime,
}

/// The server keeps no run history, so the panel shows this fixed sample:
/// five runs, one per day over the five days before `now`.
pub fn sample_history(now: NaiveDateTime) -> Vec<ExecutionRecord> {
    let run = |days: i64, language: &str, ms: u64, error: Option<&str>| ExecutionRecord {
        language: language.to_string(),
        success: error.is_none(),
        execution_time_ms: ms,
        error: error.map(str::to_string),
        timestamp: now - Duration::days(days),
    };
    vec![
        run(1, "Python", 120, None),
        run(2, "Python", 80, Some("SyntaxError: invalid syntax")),
        run(3, "JavaScript", 200, None),
        run(4, "Python", 150, None),
        run(5, "Python", 90, Some("NameError: undefined variable")),
    ]
}

/// Map an error message to a display category.
pub fn categorize_error(error: Option<&str>) -> &'static str {
    let Some(message) = error.filter(|m| !m.is_empty()) else {
        return "Unknown";
    };
    let lower = message.to_lowercase();
    const CATEGORIES: [(&str, &str); 6] = [
        ("syntax", "Syntax Error"),
        ("type", "Type Error"),
        ("name", "Name Error"),
        ("index", "Index Error"),
        ("value", "Value Error"),
        ("import", "Import Error"),
    ];
    CATEGORIES
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, label)| *label)
        .unwrap_or("Runtime Error")
}

/// Aggregates over an execution history. Count lists keep first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeAnalytics {
    pub language_usage: Vec<(String, usize)>,
    pub error_types: Vec<(String, usize)>,
    pub average_execution_time_ms: u64,
    pub total_executions: usize,
    pub successful_executions: usize,
}

impl CodeAnalytics {
    pub fn compute(history: &[ExecutionRecord]) -> Self {
        let mut language_usage = Vec::new();
        let mut error_types = Vec::new();
        for run in history {
            bump(&mut language_usage, &run.language);
            if !run.success {
                bump(&mut error_types, categorize_error(run.error.as_deref()));
            }
        }

        let average_execution_time_ms = if history.is_empty() {
            0
        } else {
            let total: u64 = history.iter().map(|r| r.execution_time_ms).sum();
            (total as f64 / history.len() as f64).round() as u64
        };

        Self {
            language_usage,
            error_types,
            average_execution_time_ms,
            total_executions: history.len(),
            successful_executions: history.iter().filter(|r| r.success).count(),
        }
    }
}

fn bump(counts: &mut Vec<(String, usize)>, key: &str) {
    match counts.iter_mut().find(|(k, _)| k == key) {
        Some((_, n)) => *n += 1,
        None => counts.push((key.to_string(), 1)),
    }
}

fn rounded_share(part: usize, whole: usize) -> u32 {
    percent(part as u32, whole as u32)
}

// ---------------------------------------------------------------------------
// Chart specs
// ---------------------------------------------------------------------------

/// Chart kinds the panel draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    Doughnut,
    Line,
    Bar,
    PolarArea,
}

/// A chart ready to hand to a charting library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    /// Canvas element id.
    pub target: String,
    pub kind: ChartKind,
    pub title: String,
    pub labels: Vec<String>,
    #[serde(default)]
    pub series_label: Option<String>,
    pub data: Vec<f64>,
    pub colors: Vec<String>,
}

impl ChartSpec {
    /// The `{type, data, options}` config object a Chart.js-style library
    /// expects.
    pub fn to_config(&self) -> Value {
        let mut dataset = json!({
            "data": self.data,
            "backgroundColor": self.colors,
        });
        if let Some(label) = &self.series_label {
            dataset["label"] = json!(label);
        }
        json!({
            "type": self.kind,
            "data": { "labels": self.labels, "datasets": [dataset] },
            "options": {
                "responsive": true,
                "plugins": { "title": { "display": true, "text": self.title } }
            }
        })
    }
}

/// The four panel charts, in render order.
pub fn build_charts(
    metrics: &PerformanceMetrics,
    trend: &[ProgressPoint],
    code: &CodeAnalytics,
) -> Vec<ChartSpec> {
    let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    let (languages, usage): (Vec<String>, Vec<f64>) = code
        .language_usage
        .iter()
        .map(|(k, n)| (k.clone(), *n as f64))
        .unzip();
    let (errors, error_counts): (Vec<String>, Vec<f64>) = code
        .error_types
        .iter()
        .map(|(k, n)| (k.clone(), *n as f64))
        .unzip();

    vec![
        ChartSpec {
            target: "student-performance-chart".into(),
            kind: ChartKind::Doughnut,
            title: "Assignment Completion".into(),
            labels: strings(&["Completed", "Pending"]),
            series_label: None,
            data: vec![
                metrics.submitted_assignments as f64,
                metrics.pending_assignments() as f64,
            ],
            colors: strings(&["#10b981", "#6b7280"]),
        },
        ChartSpec {
            target: "student-progress-chart".into(),
            kind: ChartKind::Line,
            title: "Learning Progress Over Time".into(),
            labels: trend.iter().map(|p| p.assignment.clone()).collect(),
            series_label: Some("Cumulative Progress (%)".into()),
            data: trend.iter().map(|p| p.cumulative_progress as f64).collect(),
            colors: strings(&["rgba(139, 92, 246, 0.1)"]),
        },
        ChartSpec {
            target: "language-usage-chart".into(),
            kind: ChartKind::Bar,
            title: "Programming Language Usage".into(),
            labels: languages,
            series_label: Some("Code Executions".into()),
            data: usage,
            colors: strings(&["#3b82f6"]),
        },
        ChartSpec {
            target: "error-analysis-chart".into(),
            kind: ChartKind::PolarArea,
            title: "Error Type Distribution".into(),
            labels: errors,
            series_label: None,
            data: error_counts,
            colors: strings(&["#ef4444", "#f59e0b", "#8b5cf6", "#3b82f6", "#10b981", "#6b7280"]),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(title: &str, due: &str, submitted: bool, passed: u32, total: u32) -> StudentAssignment {
        StudentAssignment {
            id: 0,
            title: title.into(),
            description: String::new(),
            due_date: due.into(),
            is_submitted: submitted,
            passed_tests: passed,
            total_tests: total,
        }
    }

    fn now() -> NaiveDateTime {
        parse_due_date("2025-03-10 12:00:00").unwrap()
    }

    #[test]
    fn metrics_average_rounded_percentages() {
        let list = vec![
            assignment("A", "2025-03-01 00:00:00", true, 2, 3),
            assignment("B", "2025-03-02 00:00:00", true, 1, 1),
            assignment("C", "2025-03-03 00:00:00", false, 0, 4),
        ];
        let m = PerformanceMetrics::compute(&list);
        assert_eq!(m.total_assignments, 3);
        assert_eq!(m.submitted_assignments, 2);
        assert_eq!(m.completion_rate, 67);
        // (67 + 100) / 2 = 83.5
        assert_eq!(m.average_success_rate, 84);
        assert_eq!(m.pending_assignments(), 1);
    }

    #[test]
    fn metrics_for_empty_list_are_zero() {
        assert_eq!(PerformanceMetrics::compute(&[]), PerformanceMetrics::default());
    }

    #[test]
    fn trend_is_sorted_and_cumulative() {
        let list = vec![
            assignment("Late", "2025-03-05 00:00:00", false, 0, 0),
            assignment("Early", "2025-03-01 00:00:00", true, 1, 1),
            assignment("Mid", "2025-03-03 00:00:00", true, 1, 1),
        ];
        let trend = progress_trend(&list);
        let names: Vec<&str> = trend.iter().map(|p| p.assignment.as_str()).collect();
        assert_eq!(names, vec!["Early", "Mid", "Late"]);
        let progress: Vec<u32> = trend.iter().map(|p| p.cumulative_progress).collect();
        assert_eq!(progress, vec![100, 100, 67]);
    }

    #[test]
    fn error_categories_checked_in_order() {
        assert_eq!(categorize_error(Some("SyntaxError: invalid syntax")), "Syntax Error");
        assert_eq!(categorize_error(Some("TypeError: bad operand")), "Type Error");
        assert_eq!(categorize_error(Some("NameError: undefined variable")), "Name Error");
        assert_eq!(categorize_error(Some("IndexError: out of range")), "Index Error");
        assert_eq!(categorize_error(Some("ModuleNotFound on import")), "Import Error");
        assert_eq!(categorize_error(Some("segfault")), "Runtime Error");
        assert_eq!(categorize_error(Some("")), "Unknown");
        assert_eq!(categorize_error(None), "Unknown");
    }

    #[test]
    fn sample_history_analytics() {
        let history = sample_history(now());
        assert_eq!(history[4].timestamp, now() - Duration::days(5));

        let code = CodeAnalytics::compute(&history);
        assert_eq!(
            code.language_usage,
            vec![("Python".to_string(), 4), ("JavaScript".to_string(), 1)]
        );
        assert_eq!(
            code.error_types,
            vec![("Syntax Error".to_string(), 1), ("Name Error".to_string(), 1)]
        );
        assert_eq!(code.average_execution_time_ms, 128);
        assert_eq!(code.total_executions, 5);
        assert_eq!(code.successful_executions, 3);
    }

    #[test]
    fn charts_serialize_to_configs() {
        let list = vec![assignment("A", "2025-03-01 00:00:00", true, 1, 2)];
        let metrics = PerformanceMetrics::compute(&list);
        let trend = progress_trend(&list);
        let code = CodeAnalytics::compute(&sample_history(now()));
        let charts = build_charts(&metrics, &trend, &code);

        let kinds: Vec<ChartKind> = charts.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![ChartKind::Doughnut, ChartKind::Line, ChartKind::Bar, ChartKind::PolarArea]
        );

        let config = charts[3].to_config();
        assert_eq!(config["type"], "polarArea");
        assert_eq!(config["data"]["labels"][0], "Syntax Error");
        assert_eq!(charts[0].data, vec![1.0, 0.0]);
        assert!(charts[0].to_config()["data"]["datasets"][0].get("label").is_none());
    }
}
