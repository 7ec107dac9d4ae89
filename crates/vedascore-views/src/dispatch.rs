//! Action dispatch table.
//!
//! Stands in for DOM event listeners: a user action is a name such as
//! `community.like` plus string parameters, and each controller registers
//! the handlers for its own actions.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use futures::future::BoxFuture;
use thiserror::Error;

/// Errors raised while routing an action.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("{action}: missing parameter '{param}'")]
    MissingParam { action: String, param: String },

    #[error("{action}: invalid value '{value}' for parameter '{param}'")]
    InvalidParam {
        action: String,
        param: String,
        value: String,
    },

    #[error("malformed parameter '{0}' (expected key=value)")]
    MalformedParam(String),
}

/// Parameters attached to an action, keyed like `data-*` attributes.
#[derive(Debug, Clone, Default)]
pub struct Params {
    action: String,
    values: HashMap<String, String>,
}

impl Params {
    pub fn new<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            action: String::new(),
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Parse `key=value` arguments.
    pub fn parse_pairs<S: AsRef<str>>(args: &[S]) -> Result<Self, DispatchError> {
        let mut values = HashMap::new();
        for arg in args {
            let arg = arg.as_ref();
            let (key, value) = arg
                .split_once('=')
                .ok_or_else(|| DispatchError::MalformedParam(arg.to_string()))?;
            values.insert(key.trim().to_string(), value.to_string());
        }
        Ok(Self {
            action: String::new(),
            values,
        })
    }

    pub fn str(&self, name: &str) -> Result<&str, DispatchError> {
        self.values
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| DispatchError::MissingParam {
                action: self.action.clone(),
                param: name.to_string(),
            })
    }

    pub fn opt(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Parse a required parameter.
    pub fn parse<T: FromStr>(&self, name: &str) -> Result<T, DispatchError> {
        let raw = self.str(name)?;
        raw.trim().parse().map_err(|_| DispatchError::InvalidParam {
            action: self.action.clone(),
            param: name.to_string(),
            value: raw.to_string(),
        })
    }
}

type Handler = Arc<dyn Fn(Params) -> BoxFuture<'static, Result<(), DispatchError>> + Send + Sync>;

/// Routes action names to async handlers.
#[derive(Default, Clone)]
pub struct Dispatcher {
    handlers: BTreeMap<String, Handler>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `action`, replacing any earlier one.
    pub fn register<F, Fut>(&mut self, action: &str, handler: F)
    where
        F: Fn(Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), DispatchError>> + Send + 'static,
    {
        let handler: Handler = Arc::new(
            move |params| -> BoxFuture<'static, Result<(), DispatchError>> {
                Box::pin(handler(params))
            },
        );
        self.handlers.insert(action.to_string(), handler);
    }

    pub async fn dispatch(&self, action: &str, mut params: Params) -> Result<(), DispatchError> {
        let handler = self
            .handlers
            .get(action)
            .ok_or_else(|| DispatchError::UnknownAction(action.to_string()))?;
        params.action = action.to_string();
        tracing::debug!(action, "dispatch");
        handler(params).await
    }

    /// Registered action names, sorted.
    pub fn actions(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn counter_dispatcher() -> (Dispatcher, Arc<AtomicU64>) {
        let total = Arc::new(AtomicU64::new(0));
        let mut dispatcher = Dispatcher::new();
        let t = total.clone();
        dispatcher.register("counter.add", move |params| {
            let t = t.clone();
            async move {
                let n: u64 = params.parse("n")?;
                t.fetch_add(n, Ordering::SeqCst);
                Ok(())
            }
        });
        (dispatcher, total)
    }

    #[tokio::test]
    async fn routes_to_handler() {
        let (dispatcher, total) = counter_dispatcher();
        dispatcher
            .dispatch("counter.add", Params::new([("n", "4")]))
            .await
            .unwrap();
        assert_eq!(total.load(Ordering::SeqCst), 4);
        assert_eq!(dispatcher.actions(), vec!["counter.add"]);
    }

    #[tokio::test]
    async fn unknown_action_rejected() {
        let (dispatcher, _) = counter_dispatcher();
        let err = dispatcher
            .dispatch("counter.reset", Params::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::UnknownAction(a) if a == "counter.reset"));
    }

    #[tokio::test]
    async fn missing_and_invalid_params_rejected() {
        let (dispatcher, total) = counter_dispatcher();

        let err = dispatcher
            .dispatch("counter.add", Params::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "counter.add: missing parameter 'n'");

        let err = dispatcher
            .dispatch("counter.add", Params::new([("n", "four")]))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidParam { ref value, .. } if value == "four"));
        assert_eq!(total.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn parse_key_value_pairs() {
        let params = Params::parse_pairs(&["post_id=3", "content=a=b"]).unwrap();
        assert_eq!(params.str("post_id").unwrap(), "3");
        assert_eq!(params.str("content").unwrap(), "a=b");
        assert!(matches!(
            Params::parse_pairs(&["oops"]),
            Err(DispatchError::MalformedParam(_))
        ));
    }
}
