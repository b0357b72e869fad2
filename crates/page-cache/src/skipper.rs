use std::collections::HashSet;

use salvo::handler::Skipper;
use salvo::http::Method;
use salvo::{Depot, Request};

/// Skips requests by method.
///
/// If the request method is in the skip list, the request bypasses the cache.
#[derive(Default, Clone, Debug)]
pub struct MethodSkipper {
    skipped_methods: HashSet<Method>,
}

impl MethodSkipper {
    /// Creates a skipper that skips nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or removes [`Method::GET`].
    #[must_use]
    pub fn skip_get(self, value: bool) -> Self {
        self.skip_method(Method::GET, value)
    }

    /// Adds or removes a [`Method`].
    #[must_use]
    pub fn skip_method(mut self, method: Method, value: bool) -> Self {
        if value {
            self.skipped_methods.insert(method);
        } else {
            self.skipped_methods.remove(&method);
        }
        self
    }

    /// Skips every standard method.
    #[must_use]
    pub fn skip_all(mut self) -> Self {
        self.skipped_methods = [
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::HEAD,
            Method::PATCH,
            Method::OPTIONS,
            Method::CONNECT,
            Method::TRACE,
        ]
        .into_iter()
        .collect();
        self
    }
}

impl Skipper for MethodSkipper {
    fn skipped(&self, req: &mut Request, _depot: &Depot) -> bool {
        self.skipped_methods.contains(req.method())
    }
}
