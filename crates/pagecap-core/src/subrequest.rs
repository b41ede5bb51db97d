//! Request decorator used while capturing pages in a subrequest.
//!
//! A capture runs against a [`SubRequest`] wrapping the caller's request.
//! Everything delegates, except that identity queries go dark once the
//! subrequest logs out, and authentication cannot be started from inside a
//! capture at all.

use crate::{Error, Result};

/// The request abstraction the embedding server provides.
pub trait Request {
    /// HTTP method.
    fn method(&self) -> &str;

    /// Request URI without the query string.
    fn request_uri(&self) -> &str;

    /// Raw query string.
    fn query_string(&self) -> Option<&str>;

    /// First value of a header.
    fn header(&self, name: &str) -> Option<&str>;

    /// Names of all headers.
    fn header_names(&self) -> Vec<&str>;

    /// Session id sent by the client.
    fn requested_session_id(&self) -> Option<&str>;

    /// Authentication scheme, when authenticated.
    fn auth_type(&self) -> Option<&str>;

    /// Login of the authenticated user.
    fn remote_user(&self) -> Option<&str>;

    /// Whether the authenticated user has `role`.
    fn is_user_in_role(&self, role: &str) -> bool;

    /// Name of the authenticated principal.
    fn user_principal(&self) -> Option<&str>;
}

/// Mutable state a [`SubRequest`] keeps apart from its delegate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthState {
    /// Set by [`SubRequest::logout`]; never cleared.
    pub logged_out: bool,
}

/// A [`Request`] decorator for subrequests.
#[derive(Debug, Clone)]
pub struct SubRequest<R> {
    request: R,
    auth: AuthState,
}

impl<R: Request> SubRequest<R> {
    /// Wrap `request`.
    pub const fn new(request: R) -> Self {
        Self {
            request,
            auth: AuthState { logged_out: false },
        }
    }

    /// Replace the delegate, keeping the auth state.
    pub fn set_request(&mut self, request: R) {
        self.request = request;
    }

    /// The delegate.
    pub const fn inner(&self) -> &R {
        &self.request
    }

    /// Unwrap the delegate.
    pub fn into_inner(self) -> R {
        self.request
    }

    /// Current auth state.
    pub const fn auth_state(&self) -> AuthState {
        self.auth
    }

    /// Hide the delegate's identity for the rest of this subrequest.
    pub fn logout(&mut self) {
        self.auth.logged_out = true;
    }

    /// Not available inside a subrequest.
    ///
    /// # Errors
    ///
    /// Always [`Error::Unsupported`].
    pub fn authenticate(&self) -> Result<bool> {
        Err(Error::Unsupported("authenticate in a subrequest"))
    }

    /// Not available inside a subrequest.
    ///
    /// # Errors
    ///
    /// Always [`Error::Unsupported`].
    pub fn login(&mut self, _username: &str, _password: &str) -> Result<()> {
        Err(Error::Unsupported("login in a subrequest"))
    }
}

impl<R: Request> Request for SubRequest<R> {
    fn method(&self) -> &str {
        self.request.method()
    }

    fn request_uri(&self) -> &str {
        self.request.request_uri()
    }

    fn query_string(&self) -> Option<&str> {
        self.request.query_string()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.request.header(name)
    }

    fn header_names(&self) -> Vec<&str> {
        self.request.header_names()
    }

    fn requested_session_id(&self) -> Option<&str> {
        self.request.requested_session_id()
    }

    fn auth_type(&self) -> Option<&str> {
        if self.auth.logged_out {
            return None;
        }
        self.request.auth_type()
    }

    fn remote_user(&self) -> Option<&str> {
        if self.auth.logged_out {
            return None;
        }
        self.request.remote_user()
    }

    fn is_user_in_role(&self, role: &str) -> bool {
        !self.auth.logged_out && self.request.is_user_in_role(role)
    }

    fn user_principal(&self) -> Option<&str> {
        if self.auth.logged_out {
            return None;
        }
        self.request.user_principal()
    }
}
