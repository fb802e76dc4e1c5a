//! The request being handled on the current thread.
//!
//! Parsers that are not handed a request explicitly read from the request
//! installed here with [`scope`]. The binding is thread-local: an async
//! handler that may move between threads should pass its request
//! explicitly instead.
//!
//! # Example
//!
//! ```rust
//! use reqparse_core::{current, RequestContext, RequestSource};
//!
//! let ctx = RequestContext::builder()
//!     .uri("/?page=3".parse().unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert!(!current::is_active());
//! let page = current::scope(ctx, || {
//!     current::with_current(|request| {
//!         request.and_then(|r| r.args()).and_then(|a| a.get("page").cloned())
//!     })
//! });
//! assert_eq!(page.and_then(|v| v.as_str().map(String::from)).as_deref(), Some("3"));
//! assert!(!current::is_active());
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::RequestSource;

thread_local! {
    static CURRENT: RefCell<Option<Rc<dyn RequestSource>>> = const { RefCell::new(None) };
}

/// Restores the previously installed request when dropped, including on
/// unwind.
struct Restore(Option<Rc<dyn RequestSource>>);

impl Drop for Restore {
    fn drop(&mut self) {
        let previous = self.0.take();
        CURRENT.with(|current| *current.borrow_mut() = previous);
    }
}

/// Runs `f` with `request` installed as the current request.
///
/// Scopes nest; the outer request is visible again once `f` returns.
pub fn scope<T>(request: impl RequestSource + 'static, f: impl FnOnce() -> T) -> T {
    let request: Rc<dyn RequestSource> = Rc::new(request);
    let previous = CURRENT.with(|current| current.replace(Some(request)));
    let _restore = Restore(previous);
    tracing::trace!("entered request scope");
    f()
}

/// Calls `f` with the current request, or `None` outside any [`scope`].
pub fn with_current<T>(f: impl FnOnce(Option<&dyn RequestSource>) -> T) -> T {
    // Clone the handle so `f` may open a nested scope.
    let request = CURRENT.with(|current| current.borrow().clone());
    f(request.as_deref())
}

/// Returns `true` inside a [`scope`].
#[must_use]
pub fn is_active() -> bool {
    CURRENT.with(|current| current.borrow().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MultiDict, Value};
    use std::borrow::Cow;

    struct Fixed(MultiDict);

    impl RequestSource for Fixed {
        fn args(&self) -> Option<Cow<'_, MultiDict>> {
            Some(Cow::Borrowed(&self.0))
        }
    }

    fn fixed(value: &str) -> Fixed {
        Fixed(vec![("who", value)].into_iter().collect())
    }

    fn current_who() -> Option<Value> {
        with_current(|request| {
            request
                .and_then(|r| r.args())
                .and_then(|args| args.get("who").cloned())
        })
    }

    #[test]
    fn test_no_current_request() {
        assert!(!is_active());
        assert_eq!(current_who(), None);
    }

    #[test]
    fn test_scope_installs_and_removes() {
        let seen = scope(fixed("outer"), current_who);
        assert_eq!(seen, Some(Value::from("outer")));
        assert!(!is_active());
    }

    #[test]
    fn test_nested_scopes_restore_outer() {
        scope(fixed("outer"), || {
            let inner = scope(fixed("inner"), current_who);
            assert_eq!(inner, Some(Value::from("inner")));
            assert_eq!(current_who(), Some(Value::from("outer")));
        });
        assert!(!is_active());
    }

    #[test]
    fn test_scope_restored_after_panic() {
        let result = std::panic::catch_unwind(|| {
            scope(fixed("doomed"), || panic!("handler failed"));
        });
        assert!(result.is_err());
        assert!(!is_active());
    }

    #[test]
    fn test_scope_is_thread_local() {
        scope(fixed("main"), || {
            let other = std::thread::spawn(is_active).join().unwrap();
            assert!(!other);
            assert!(is_active());
        });
    }
}
