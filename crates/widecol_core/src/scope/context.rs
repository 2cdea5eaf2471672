//! Per-record-type current scope.

use crate::scope::query::Scope;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Holds the "current scope" of one record type.
///
/// The slot is the only state in this crate mutated by concurrent callers.
/// Swaps and restorations happen under a lock that is never held while a
/// scoped body runs, so two overlapping `with_scope` calls on the same type
/// may observe each other's scope during their bodies. Each caller's own
/// enter/exit pair is still atomic and nests correctly on its call stack.
#[derive(Debug)]
pub struct ScopeContext {
    default: Arc<Scope>,
    current: Mutex<Option<Arc<Scope>>>,
}

impl ScopeContext {
    /// Creates a context whose current scope is `default` until overridden.
    pub fn new(default: Scope) -> Self {
        Self {
            default: Arc::new(default),
            current: Mutex::new(None),
        }
    }

    /// The scope used when nothing has been swapped in.
    #[must_use]
    pub fn default_scope(&self) -> Arc<Scope> {
        Arc::clone(&self.default)
    }

    /// The innermost active scope, or the default scope. Never absent.
    #[must_use]
    pub fn current(&self) -> Arc<Scope> {
        self.current
            .lock()
            .clone()
            .unwrap_or_else(|| Arc::clone(&self.default))
    }

    /// Runs `body` with `scope` as the current scope.
    ///
    /// The previous scope is restored when `body` returns, including when it
    /// panics.
    pub fn with_scope<F, R>(&self, scope: Scope, body: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = self.enter(Arc::new(scope));
        body()
    }

    fn enter(&self, scope: Arc<Scope>) -> ScopeGuard<'_> {
        debug!(table = scope.table(), scope = %scope, "entering scope");
        let previous = self.current.lock().replace(scope);
        ScopeGuard {
            context: self,
            previous,
        }
    }
}

/// Restores the previous scope on drop.
struct ScopeGuard<'a> {
    context: &'a ScopeContext,
    previous: Option<Arc<Scope>>,
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        let previous = self.previous.take();
        debug!(restored_default = previous.is_none(), "leaving scope");
        *self.context.current.lock() = previous;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn context() -> ScopeContext {
        ScopeContext::new(Scope::new("posts"))
    }

    #[test]
    fn current_defaults_to_unscoped() {
        let ctx = context();
        assert!(ctx.current().is_unscoped());
        assert_eq!(*ctx.current(), *ctx.default_scope());
    }

    #[test]
    fn nesting_restores_outer_scope() {
        let ctx = context();
        let a = Scope::new("posts").where_eq("blog", "a");
        let b = Scope::new("posts").where_eq("blog", "b");

        ctx.with_scope(a.clone(), || {
            assert_eq!(*ctx.current(), a);
            ctx.with_scope(b.clone(), || {
                assert_eq!(*ctx.current(), b);
            });
            assert_eq!(*ctx.current(), a);
        });
        assert!(ctx.current().is_unscoped());
    }

    #[test]
    fn returns_body_result() {
        let ctx = context();
        let scope = Scope::new("posts").with_limit(1);
        let result: Result<u8, &str> = ctx.with_scope(scope, || Err("boom"));
        assert_eq!(result, Err("boom"));
        assert!(ctx.current().is_unscoped());
    }

    #[test]
    fn panic_restores_previous_scope() {
        let ctx = context();
        let outer = Scope::new("posts").where_eq("blog", "outer");

        ctx.with_scope(outer.clone(), || {
            let result = catch_unwind(AssertUnwindSafe(|| {
                ctx.with_scope(Scope::new("posts").where_eq("blog", "inner"), || {
                    panic!("body failed");
                })
            }));
            assert!(result.is_err());
            assert_eq!(*ctx.current(), outer);
        });
        assert!(ctx.current().is_unscoped());
    }
}
