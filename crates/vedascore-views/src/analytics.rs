//! Student analytics panel.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::NaiveDateTime;
use serde_json::Value;
use tokio::task::JoinHandle;

use vedascore_core::analytics::{
    build_charts, progress_trend, sample_history, ChartSpec, CodeAnalytics, PerformanceMetrics,
    ProgressPoint,
};
use vedascore_core::markup::html_escape;
use vedascore_core::model::StudentAssignment;
use vedascore_core::VedaApi;

use crate::dispatch::Dispatcher;
use crate::loader::{LoadSpec, ResourceLoader};
use crate::poll::{self, ANALYTICS_REFRESH};
use crate::surface::Surface;

pub const QUICK_STATS: &str = "student-quick-stats";

/// Everything one refresh computes.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsSnapshot {
    pub metrics: PerformanceMetrics,
    pub trend: Vec<ProgressPoint>,
    pub code: CodeAnalytics,
    pub charts: Vec<ChartSpec>,
}

impl AnalyticsSnapshot {
    pub fn compute(assignments: &[StudentAssignment], now: NaiveDateTime) -> Self {
        let metrics = PerformanceMetrics::compute(assignments);
        let trend = progress_trend(assignments);
        let code = CodeAnalytics::compute(&sample_history(now));
        let charts = build_charts(&metrics, &trend, &code);
        Self {
            metrics,
            trend,
            code,
            charts,
        }
    }
}

pub struct AnalyticsPanel {
    api: Arc<dyn VedaApi>,
    surface: Arc<dyn Surface>,
    loader: ResourceLoader,
    period: Duration,
    snapshot: Mutex<Option<AnalyticsSnapshot>>,
}

impl AnalyticsPanel {
    pub fn new(api: Arc<dyn VedaApi>, surface: Arc<dyn Surface>) -> Self {
        Self {
            api,
            loader: ResourceLoader::new(surface.clone()),
            surface,
            period: ANALYTICS_REFRESH,
            snapshot: Mutex::new(None),
        }
    }

    pub fn with_refresh(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    fn snapshot_guard(&self) -> MutexGuard<'_, Option<AnalyticsSnapshot>> {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Option<AnalyticsSnapshot> {
        self.snapshot_guard().clone()
    }

    pub fn charts(&self) -> Vec<ChartSpec> {
        self.snapshot_guard()
            .as_ref()
            .map(|s| s.charts.clone())
            .unwrap_or_default()
    }

    /// Chart configs as one JSON array, in render order.
    pub fn chart_configs(&self) -> Value {
        Value::Array(self.charts().iter().map(ChartSpec::to_config).collect())
    }

    /// Recompute from the server. On failure the previous charts stay.
    pub async fn refresh(&self) -> bool {
        let spec = LoadSpec::new("Error loading analytics data");
        let Ok(list) = self
            .loader
            .fetch(&[], &spec, self.api.student_assignments(), |_| {})
            .await
        else {
            return false;
        };
        let assignments = list.assignments;
        let snapshot = AnalyticsSnapshot::compute(&assignments, chrono::Local::now().naive_local());
        self.render(&snapshot);
        *self.snapshot_guard() = Some(snapshot);
        true
    }

    fn render(&self, snapshot: &AnalyticsSnapshot) {
        for chart in &snapshot.charts {
            self.surface.set_html(&chart.target, render_chart(chart));
        }
        self.surface.set_html(QUICK_STATS, render_quick_stats(snapshot));
    }

    /// Refresh now and then every period until the handle is aborted.
    pub fn start_refresh(self: &Arc<Self>) -> JoinHandle<()> {
        let weak = Arc::downgrade(self);
        poll::every(self.period, move || {
            let weak = weak.clone();
            async move {
                if let Some(this) = weak.upgrade() {
                    this.refresh().await;
                }
            }
        })
    }

    pub fn register(self: &Arc<Self>, dispatcher: &mut Dispatcher) {
        let this = self.clone();
        dispatcher.register("analytics.refresh", move |_| {
            let this = this.clone();
            async move {
                this.refresh().await;
                Ok(())
            }
        });
    }
}

/// A canvas plus its config, serialized into a data attribute.
pub fn render_chart(chart: &ChartSpec) -> String {
    format!(
        "<canvas id=\"{}-canvas\" class=\"chart\" data-chart=\"{}\"></canvas>",
        html_escape(&chart.target),
        html_escape(&chart.to_config().to_string())
    )
}

pub fn render_quick_stats(snapshot: &AnalyticsSnapshot) -> String {
    let stats = [
        (format!("{}%", snapshot.metrics.completion_rate), "Completion Rate", "#10b981"),
        (format!("{}%", snapshot.metrics.average_success_rate), "Avg Success Rate", "#3b82f6"),
        (snapshot.code.total_executions.to_string(), "Code Executions", "#8b5cf6"),
        (snapshot.code.successful_executions.to_string(), "Successful Runs", "#f59e0b"),
    ];
    stats
        .iter()
        .map(|(value, label, color)| {
            format!(
                "<div class=\"stat-card\" style=\"border-left: 4px solid {color};\"><div class=\"stat-value\" style=\"color: {color};\">{value}</div><div class=\"stat-label\">{label}</div></div>\n"
            )
        })
        .collect()
}
