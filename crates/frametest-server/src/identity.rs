//! Mapping requests to result sessions.
//!
//! The default [`CookieIdentity`] hands every new client an opaque token in a
//! cookie. [`PeerIdentity`] keys sessions by peer IP and user agent instead;
//! two browsers on one machine with the same user agent share a session.

use crate::state::SharedState;
use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::net::SocketAddr;
use uuid::Uuid;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "frametest_session";

/// What the server can observe about a caller.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub peer: Option<SocketAddr>,
    pub user_agent: Option<String>,
    pub session_token: Option<String>,
}

impl ClientInfo {
    fn from_parts(parts: &Parts) -> Self {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let session_token = CookieJar::from_headers(&parts.headers)
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty());

        Self {
            peer,
            user_agent,
            session_token,
        }
    }
}

/// A resolved session key, plus a cookie to hand out if one was minted.
#[derive(Debug, Clone)]
pub struct ResolvedIdentity {
    pub session_id: String,
    pub issued: Option<Cookie<'static>>,
}

/// Strategy for deriving a session id from a request.
pub trait SessionIdentity: Send + Sync {
    fn resolve(&self, client: &ClientInfo) -> ResolvedIdentity;
}

/// Opaque UUID v4 token carried in [`SESSION_COOKIE`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieIdentity;

impl SessionIdentity for CookieIdentity {
    fn resolve(&self, client: &ClientInfo) -> ResolvedIdentity {
        if let Some(token) = &client.session_token {
            return ResolvedIdentity {
                session_id: token.clone(),
                issued: None,
            };
        }

        let token = Uuid::new_v4().to_string();
        let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .build();

        ResolvedIdentity {
            session_id: token,
            issued: Some(cookie),
        }
    }
}

/// Peer IP joined to the user agent with `_`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PeerIdentity;

impl SessionIdentity for PeerIdentity {
    fn resolve(&self, client: &ClientInfo) -> ResolvedIdentity {
        let ip = client
            .peer
            .map(|addr| addr.ip().to_string())
            .unwrap_or_default();
        let user_agent = client.user_agent.as_deref().unwrap_or_default();

        ResolvedIdentity {
            session_id: format!("{ip}_{user_agent}"),
            issued: None,
        }
    }
}

/// Which identity strategy the server uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityMode {
    #[default]
    Cookie,
    Peer,
}

impl IdentityMode {
    pub fn strategy(self) -> Box<dyn SessionIdentity> {
        match self {
            Self::Cookie => Box::new(CookieIdentity),
            Self::Peer => Box::new(PeerIdentity),
        }
    }
}

/// Extractor resolving the caller's session, creating it on first sight.
///
/// `jar` carries the freshly minted cookie, if any; handlers return it as
/// part of the response so the browser keeps its session.
#[derive(Debug)]
pub struct ClientSession {
    pub session_id: String,
    pub jar: CookieJar,
}

impl FromRequestParts<SharedState> for ClientSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let client = ClientInfo::from_parts(parts);
        let resolved = state.identity().resolve(&client);
        state.sessions.ensure(&resolved.session_id);

        let mut jar = CookieJar::new();
        if let Some(cookie) = resolved.issued {
            jar = jar.add(cookie);
        }

        Ok(Self {
            session_id: resolved.session_id,
            jar,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_identity_reuses_token() {
        let client = ClientInfo {
            session_token: Some("abc".into()),
            ..ClientInfo::default()
        };
        let resolved = CookieIdentity.resolve(&client);
        assert_eq!(resolved.session_id, "abc");
        assert!(resolved.issued.is_none());
    }

    #[test]
    fn test_cookie_identity_mints_unique_tokens() {
        let first = CookieIdentity.resolve(&ClientInfo::default());
        let second = CookieIdentity.resolve(&ClientInfo::default());
        assert_ne!(first.session_id, second.session_id);

        let cookie = first.issued.unwrap();
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), first.session_id);
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn test_peer_identity_joins_ip_and_user_agent() {
        let client = ClientInfo {
            peer: Some("127.0.0.1:50000".parse().unwrap()),
            user_agent: Some("HeadlessChrome".into()),
            session_token: None,
        };
        let resolved = PeerIdentity.resolve(&client);
        assert_eq!(resolved.session_id, "127.0.0.1_HeadlessChrome");
        assert!(resolved.issued.is_none());

        // Port differences do not split the session
        let other_port = ClientInfo {
            peer: Some("127.0.0.1:50001".parse().unwrap()),
            ..client
        };
        assert_eq!(PeerIdentity.resolve(&other_port).session_id, resolved.session_id);
    }

    #[test]
    fn test_identity_mode_parses_lowercase() {
        let mode: IdentityMode = serde_json::from_str("\"peer\"").unwrap();
        assert_eq!(mode, IdentityMode::Peer);
        assert_eq!(IdentityMode::default(), IdentityMode::Cookie);
    }
}
