//! Correlation ids for events.
//!
//! A caller tags a unit of work (one CLI invocation, one batch line) with a
//! [`RequestContext`]; every [`SearchEvent`](crate::models::SearchEvent)
//! published inside it carries the id as `correlation_id`.
//!
//! Async code scopes the context with a task-local. Queries run through
//! `spawn_blocking` cannot see task-locals, so they enter the context on
//! their thread instead.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

/// Correlation id shared by every event of one unit of work.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestContext {
    id: Arc<str>,
}

impl RequestContext {
    /// Creates a context with a fresh, time-ordered id.
    #[must_use]
    pub fn new() -> Self {
        Self::from_id(Uuid::now_v7().to_string())
    }

    /// Creates a context with a caller-supplied id.
    #[must_use]
    pub fn from_id(id: impl Into<Arc<str>>) -> Self {
        Self { id: id.into() }
    }

    /// Derives the context for one part of this unit, e.g. `<id>/3` for the
    /// third batch line.
    #[must_use]
    pub fn child(&self, part: impl fmt::Display) -> Self {
        Self::from_id(format!("{}/{part}", self.id))
    }
}

impl fmt::Display for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

tokio::task_local! {
    static TASK_CONTEXT: RequestContext;
}

thread_local! {
    static THREAD_CONTEXT: RefCell<Option<RequestContext>> = const { RefCell::new(None) };
}

/// Restores the thread's previous context on drop.
#[must_use = "the context is left as soon as the guard is dropped"]
pub struct RequestContextGuard {
    previous: Option<RequestContext>,
}

impl Drop for RequestContextGuard {
    fn drop(&mut self) {
        THREAD_CONTEXT.with(|slot| *slot.borrow_mut() = self.previous.take());
    }
}

/// Enters `context` on the current thread until the guard drops.
pub fn enter_request_context(context: RequestContext) -> RequestContextGuard {
    let previous = THREAD_CONTEXT.with(|slot| slot.borrow_mut().replace(context));
    RequestContextGuard { previous }
}

/// Runs `fut` with `context` as its task-local context.
pub async fn scope_request_context<F: Future>(context: RequestContext, fut: F) -> F::Output {
    TASK_CONTEXT.scope(context, fut).await
}

/// Returns the active correlation id: the task's context if set, otherwise
/// the thread's.
#[must_use]
pub fn current_request_id() -> Option<String> {
    TASK_CONTEXT
        .try_with(ToString::to_string)
        .ok()
        .or_else(|| THREAD_CONTEXT.with(|slot| slot.borrow().as_ref().map(ToString::to_string)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_context_by_default() {
        assert_eq!(current_request_id(), None);
    }

    #[test]
    fn test_guard_restores_previous_context() {
        let outer = enter_request_context(RequestContext::from_id("outer"));
        {
            let _inner = enter_request_context(RequestContext::from_id("outer").child(2));
            assert_eq!(current_request_id().as_deref(), Some("outer/2"));
        }
        assert_eq!(current_request_id().as_deref(), Some("outer"));
        drop(outer);
        assert_eq!(current_request_id(), None);
    }

    #[tokio::test]
    async fn test_scope_propagates_across_await() {
        let observed = scope_request_context(RequestContext::from_id("batch"), async {
            tokio::task::yield_now().await;
            current_request_id()
        })
        .await;
        assert_eq!(observed.as_deref(), Some("batch"));
        assert_eq!(current_request_id(), None);
    }

    #[tokio::test]
    async fn test_task_context_wins_over_thread_context() {
        let _thread = enter_request_context(RequestContext::from_id("thread"));
        let observed =
            scope_request_context(RequestContext::from_id("task"), async { current_request_id() })
                .await;
        assert_eq!(observed.as_deref(), Some("task"));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(RequestContext::new(), RequestContext::new());
    }
}
