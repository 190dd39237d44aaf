use std::time::Duration;

use fetcher::Executor;
use futures::FutureExt;
use futures::future::LocalBoxFuture;

/// Runs fetch tasks on yew's local spawner, with browser timers for
/// deadlines.
#[derive(Debug, Clone, Copy, Default)]
pub struct YewExecutor;

impl Executor for YewExecutor {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        yew::platform::spawn_local(task);
    }

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        gloo_timers::future::sleep(duration).boxed_local()
    }
}
