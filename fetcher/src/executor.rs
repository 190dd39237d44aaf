use std::time::Duration;

use futures::future::LocalBoxFuture;

/// The host's cooperative scheduler.
///
/// Everything runs on one thread: tasks are `!Send` and may hold `Rc`s.
pub trait Executor {
    /// Run `task` to completion in the background.
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>);

    /// Resolve after `duration`. Only used for request timeouts.
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}
