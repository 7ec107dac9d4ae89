//! The fetch, render, report-error cycle every page repeats.

use std::future::Future;
use std::sync::Arc;

use vedascore_core::markup::html_escape;
use vedascore_core::ApiError;

use crate::surface::Surface;

/// How a region behaves while and after loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSpec {
    /// Placeholder text shown while the request is in flight.
    pub loading: Option<String>,
    /// Lead-in for the inline error text, e.g. "Error loading posts".
    pub error_prefix: String,
}

impl LoadSpec {
    pub fn new(error_prefix: &str) -> Self {
        Self {
            loading: None,
            error_prefix: error_prefix.to_string(),
        }
    }

    pub fn with_loading(mut self, text: &str) -> Self {
        self.loading = Some(text.to_string());
        self
    }
}

/// Placeholder markup for a region that is loading.
pub fn loading_html(text: &str) -> String {
    format!("<div class=\"loading\">{}</div>", html_escape(text))
}

/// Inline error markup.
pub fn error_html(prefix: &str, err: &ApiError) -> String {
    format!(
        "<div class=\"error\">{}: {}</div>",
        html_escape(prefix),
        html_escape(&err.to_string())
    )
}

/// Drives one region through a request.
#[derive(Clone)]
pub struct ResourceLoader {
    surface: Arc<dyn Surface>,
}

impl ResourceLoader {
    pub fn new(surface: Arc<dyn Surface>) -> Self {
        Self { surface }
    }

    /// Await `request` for a view whose error state is more than one
    /// region's inline text.
    ///
    /// The loading placeholder, if any, goes into each of `regions`. On
    /// failure the error is logged, `on_error` draws the error state, and the
    /// error is handed back.
    pub async fn fetch<T, Fut, E>(
        &self,
        regions: &[&str],
        spec: &LoadSpec,
        request: Fut,
        on_error: E,
    ) -> Result<T, ApiError>
    where
        Fut: Future<Output = Result<T, ApiError>>,
        E: FnOnce(&ApiError),
    {
        if let Some(text) = &spec.loading {
            for region in regions {
                self.surface.set_html(region, loading_html(text));
            }
        }

        match request.await {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(error = %e, "{}", spec.error_prefix);
                on_error(&e);
                Err(e)
            }
        }
    }

    /// Await `request`, render the value into `region`, and hand it back.
    ///
    /// On failure the error is logged, written into the region, and `None`
    /// is returned.
    pub async fn load<T, Fut, R>(
        &self,
        region: &str,
        spec: &LoadSpec,
        request: Fut,
        render: R,
    ) -> Option<T>
    where
        Fut: Future<Output = Result<T, ApiError>>,
        R: FnOnce(&T) -> String,
    {
        let value = self
            .fetch(&[region], spec, request, |e| {
                self.surface
                    .set_html(region, error_html(&spec.error_prefix, e))
            })
            .await
            .ok()?;
        self.surface.set_html(region, render(&value));
        Some(value)
    }

    /// Await a user action's request. A failure is logged and raised as a
    /// `<prefix>: <message>` notice.
    pub async fn notify<T, Fut>(&self, spec: &LoadSpec, request: Fut) -> Option<T>
    where
        Fut: Future<Output = Result<T, ApiError>>,
    {
        self.fetch(&[], spec, request, |e| {
            self.surface
                .notify(&format!("{}: {e}", spec.error_prefix))
        })
        .await
        .ok()
    }
}
