//! The page a controller renders into.
//!
//! A `Surface` is a set of named regions, each identified the way a DOM
//! element id would be. Controllers only ever replace, append to, show or
//! hide a region, and raise user-facing notices.

use std::sync::{Mutex, MutexGuard, PoisonError};

use vedascore_core::markup::html_escape;

/// Rendering target for page controllers.
pub trait Surface: Send + Sync {
    /// Replace a region's content.
    fn set_html(&self, region: &str, html: String);

    /// Append to a region's content.
    fn append_html(&self, region: &str, html: &str);

    fn set_visible(&self, region: &str, visible: bool);

    /// Show a blocking message to the user.
    fn notify(&self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Region {
    id: String,
    html: String,
    visible: bool,
}

#[derive(Debug, Default)]
struct MemoryState {
    regions: Vec<Region>,
    notices: Vec<String>,
}

/// A `Surface` that keeps everything in memory.
///
/// Regions are created on first write and remember their creation order,
/// which is also the order `to_document` lays them out in. A region is
/// visible until it is explicitly hidden.
#[derive(Debug, Default)]
pub struct MemorySurface {
    state: Mutex<MemoryState>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_region<R>(&self, id: &str, f: impl FnOnce(&mut Region) -> R) -> R {
        let mut state = self.state();
        let idx = match state.regions.iter().position(|r| r.id == id) {
            Some(idx) => idx,
            None => {
                state.regions.push(Region {
                    id: id.to_string(),
                    html: String::new(),
                    visible: true,
                });
                state.regions.len() - 1
            }
        };
        f(&mut state.regions[idx])
    }

    /// Current content of a region, empty if it was never written.
    pub fn html(&self, region: &str) -> String {
        self.state()
            .regions
            .iter()
            .find(|r| r.id == region)
            .map(|r| r.html.clone())
            .unwrap_or_default()
    }

    pub fn is_visible(&self, region: &str) -> bool {
        self.state()
            .regions
            .iter()
            .find(|r| r.id == region)
            .map(|r| r.visible)
            .unwrap_or(true)
    }

    pub fn region_ids(&self) -> Vec<String> {
        self.state().regions.iter().map(|r| r.id.clone()).collect()
    }

    /// Every notice raised so far, oldest first.
    pub fn notices(&self) -> Vec<String> {
        self.state().notices.clone()
    }

    pub fn last_notice(&self) -> Option<String> {
        self.state().notices.last().cloned()
    }

    /// Lay the regions out as a standalone HTML page.
    pub fn to_document(&self, title: &str) -> String {
        let state = self.state();
        let mut html = String::new();

        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        html.push_str("<meta charset=\"utf-8\">\n");
        html.push_str(&format!("<title>{}</title>\n", html_escape(title)));
        html.push_str("<style>\n");
        html.push_str(CSS);
        html.push_str("</style>\n");
        html.push_str("</head>\n<body>\n");
        html.push_str(&format!("<h1>{}</h1>\n", html_escape(title)));

        if !state.notices.is_empty() {
            html.push_str("<aside class=\"notices\">\n");
            for notice in &state.notices {
                html.push_str(&format!("<p class=\"notice\">{}</p>\n", html_escape(notice)));
            }
            html.push_str("</aside>\n");
        }

        for region in &state.regions {
            let hidden = if region.visible { "" } else { " style=\"display: none;\"" };
            html.push_str(&format!(
                "<section id=\"{}\"{hidden}>\n{}\n</section>\n",
                html_escape(&region.id),
                region.html
            ));
        }

        html.push_str("</body>\n</html>\n");
        html
    }
}

impl Surface for MemorySurface {
    fn set_html(&self, region: &str, html: String) {
        self.with_region(region, |r| r.html = html);
    }

    fn append_html(&self, region: &str, html: &str) {
        self.with_region(region, |r| r.html.push_str(html));
    }

    fn set_visible(&self, region: &str, visible: bool) {
        self.with_region(region, |r| r.visible = visible);
    }

    fn notify(&self, message: &str) {
        tracing::info!(%message, "notice");
        self.state().notices.push(message.to_string());
    }
}

const CSS: &str = r#"
:root { --primary: #8b5cf6; --secondary: #151b2b; --success: #10b981; --info: #3b82f6; --warning: #f59e0b; --danger: #ef4444; }
body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; background: #0b0f19; color: #e0e6f0; max-width: 1100px; margin: 0 auto; padding: 20px; }
section { margin-bottom: 24px; }
.notice { background: var(--secondary); border-left: 4px solid var(--primary); padding: 10px 14px; }
.error { color: var(--danger); }
.loading { text-align: center; padding: 40px; color: #a0aec0; }
.post-card, .submission-card, .assignment-card { background: var(--secondary); border-radius: 12px; padding: 16px; margin-bottom: 12px; }
.quiz-option-correct { color: var(--success); font-weight: bold; }
.score-passed { color: var(--success); }
.score-failed { color: var(--danger); }
table { width: 100%; border-collapse: collapse; }
th, td { padding: 6px 10px; border-bottom: 1px solid #2d3748; text-align: left; }
pre { background: #111827; padding: 12px; overflow-x: auto; }
"#;
