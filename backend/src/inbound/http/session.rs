//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The cookie carries the authenticated [`Principal`] and nothing else.
//! Handlers resolve it once and pass it explicitly into each use-case.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, Principal};

pub(crate) const PRINCIPAL_KEY: &str = "principal";

/// Newtype wrapper that exposes principal-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store the authenticated principal, rotating the session id.
    pub fn persist_principal(&self, principal: Principal) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(PRINCIPAL_KEY, principal)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// The principal stored in the session, if any.
    ///
    /// A cookie that no longer decodes is treated as logged out.
    pub fn principal(&self) -> Option<Principal> {
        match self.0.get::<Principal>(PRINCIPAL_KEY) {
            Ok(principal) => principal,
            Err(error) => {
                warn!(%error, "discarding unreadable session principal");
                None
            }
        }
    }

    /// Require a logged-in principal or return `401 Unauthorized`.
    pub fn require_principal(&self) -> Result<Principal, Error> {
        self.principal()
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Drop every session value and expire the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
