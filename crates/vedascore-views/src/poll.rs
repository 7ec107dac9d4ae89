//! Fixed-interval refresh loops.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Dashboard quiz refresh period.
pub const QUIZ_REFRESH: Duration = Duration::from_secs(30);

/// Analytics panel refresh period.
pub const ANALYTICS_REFRESH: Duration = Duration::from_secs(60);

/// Run `task` now and then every `period` on a spawned task.
///
/// The loop runs until the returned handle is aborted or the runtime shuts
/// down. A slow run delays the next one instead of bunching them up.
pub fn every<F, Fut>(period: Duration, mut task: F) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            task().await;
        }
    })
}
