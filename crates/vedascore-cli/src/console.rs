//! A `Surface` that prints to the terminal, used by `--watch` modes.

use std::collections::HashSet;

use vedascore_views::Surface;

/// Prints the watched regions whenever they are replaced, and every notice.
pub struct ConsoleSurface {
    watched: HashSet<String>,
}

impl ConsoleSurface {
    pub fn watching(regions: &[&str]) -> Self {
        Self {
            watched: regions.iter().map(|r| r.to_string()).collect(),
        }
    }
}

impl Surface for ConsoleSurface {
    fn set_html(&self, region: &str, html: String) {
        if self.watched.contains(region) {
            let stamp = chrono::Local::now().format("%H:%M:%S");
            println!("--- {region} ({stamp}) ---\n{html}");
        }
    }

    fn append_html(&self, region: &str, html: &str) {
        if self.watched.contains(region) {
            println!("{html}");
        }
    }

    fn set_visible(&self, _region: &str, _visible: bool) {}

    fn notify(&self, message: &str) {
        eprintln!("{message}");
    }
}
