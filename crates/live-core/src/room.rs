//! Room addressing.
//!
//! A session talks to exactly one room. The room is either the server's
//! implicit default room (`/ws`) or a named room (`/ws/{room_id}`) whose id is
//! read from the page path, e.g. `/game/monster_fusion`. Resolution happens
//! once, before any connection attempt, and a failure is final.

use std::fmt;

use thiserror::Error;

/// Path prefix of the WebSocket endpoint on every server.
pub const WS_PATH: &str = "/ws";

/// Room id of the broadcaster hub page.
pub const HUB_ROOM: &str = "hub";

/// Errors that can occur while resolving where to connect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// A named room was expected but the page path does not carry one.
    #[error("could not determine the room name from the page path")]
    MissingRoomId,

    /// The page URL could not be split into scheme, host and path.
    #[error("invalid page URL `{0}`")]
    InvalidPageUrl(String),

    /// The page was not served over http(s) or ws(s).
    #[error("unsupported URL scheme `{0}`")]
    UnsupportedScheme(String),
}

/// How the page expects its room to be chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomMode {
    /// The single implicit room.
    Default,
    /// A room named by the page path.
    Named,
}

/// The resolved room a session is bound to. Immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomAddress {
    Default,
    Named(String),
}

impl RoomAddress {
    /// A named room with a fixed id, such as the [`HUB_ROOM`].
    pub fn named(id: impl Into<String>) -> Self {
        RoomAddress::Named(id.into())
    }

    pub fn room_id(&self) -> Option<&str> {
        match self {
            RoomAddress::Default => None,
            RoomAddress::Named(id) => Some(id),
        }
    }
}

impl fmt::Display for RoomAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomAddress::Default => f.write_str("default room"),
            RoomAddress::Named(id) => write!(f, "room '{id}'"),
        }
    }
}

/// Resolve the room for a page at `location_path`.
///
/// For [`RoomMode::Named`] the room id is the third `/`-separated component of
/// the path, i.e. the segment after a two-level prefix: `/game/{id}` yields
/// `{id}`. An absent or empty segment is [`AddressError::MissingRoomId`].
pub fn resolve(location_path: &str, mode: RoomMode) -> Result<RoomAddress, AddressError> {
    match mode {
        RoomMode::Default => Ok(RoomAddress::Default),
        RoomMode::Named => match location_path.split('/').nth(2) {
            Some(id) if !id.is_empty() => Ok(RoomAddress::Named(id.to_string())),
            _ => Err(AddressError::MissingRoomId),
        },
    }
}

/// Whether the page was served over a secure scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Plain,
    Secure,
}

/// The parts of the page URL that endpoint construction depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    pub scheme: Scheme,
    pub host: String,
    pub path: String,
}

impl PageLocation {
    /// Split a page URL such as `https://example.com:8000/game/monster_fusion`.
    ///
    /// Query strings and fragments are dropped from the path.
    pub fn parse(url: &str) -> Result<Self, AddressError> {
        let (scheme, rest) = url
            .trim()
            .split_once("://")
            .ok_or_else(|| AddressError::InvalidPageUrl(url.to_string()))?;
        let scheme = match scheme.to_ascii_lowercase().as_str() {
            "http" | "ws" => Scheme::Plain,
            "https" | "wss" => Scheme::Secure,
            other => return Err(AddressError::UnsupportedScheme(other.to_string())),
        };

        let (host, path) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, "/"),
        };
        if host.is_empty() {
            return Err(AddressError::InvalidPageUrl(url.to_string()));
        }
        let path = path.split(['?', '#']).next().unwrap_or("/");

        Ok(Self {
            scheme,
            host: host.to_string(),
            path: path.to_string(),
        })
    }

    /// WebSocket endpoint for `room` on the server that served this page.
    ///
    /// `http` → `ws`, `https` → `wss`.
    pub fn endpoint(&self, room: &RoomAddress) -> String {
        let ws_scheme = match self.scheme {
            Scheme::Plain => "ws",
            Scheme::Secure => "wss",
        };
        match room {
            RoomAddress::Default => format!("{ws_scheme}://{}{WS_PATH}", self.host),
            RoomAddress::Named(id) => format!("{ws_scheme}://{}{WS_PATH}/{id}", self.host),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_always_resolves() {
        assert_eq!(resolve("", RoomMode::Default), Ok(RoomAddress::Default));
        assert_eq!(
            resolve("/anything/at/all", RoomMode::Default),
            Ok(RoomAddress::Default)
        );
    }

    #[test]
    fn named_takes_third_component() {
        assert_eq!(
            resolve("/game/monster_fusion", RoomMode::Named),
            Ok(RoomAddress::named("monster_fusion"))
        );
        assert_eq!(
            resolve("/game/typing/extra", RoomMode::Named),
            Ok(RoomAddress::named("typing"))
        );
    }

    #[test]
    fn named_without_id_fails() {
        assert_eq!(resolve("/game", RoomMode::Named), Err(AddressError::MissingRoomId));
        assert_eq!(resolve("/game/", RoomMode::Named), Err(AddressError::MissingRoomId));
        assert_eq!(resolve("/", RoomMode::Named), Err(AddressError::MissingRoomId));
        assert_eq!(resolve("", RoomMode::Named), Err(AddressError::MissingRoomId));
    }

    #[test]
    fn endpoint_upgrades_scheme() {
        let page = PageLocation::parse("http://localhost:8000/").unwrap();
        assert_eq!(page.endpoint(&RoomAddress::Default), "ws://localhost:8000/ws");

        let page = PageLocation::parse("https://games.example.com/game/monster_fusion?x=1").unwrap();
        assert_eq!(page.path, "/game/monster_fusion");
        let room = resolve(&page.path, RoomMode::Named).unwrap();
        assert_eq!(
            page.endpoint(&room),
            "wss://games.example.com/ws/monster_fusion"
        );
    }

    #[test]
    fn hub_is_a_fixed_named_room() {
        let page = PageLocation::parse("http://127.0.0.1:8000").unwrap();
        assert_eq!(page.path, "/");
        assert_eq!(
            page.endpoint(&RoomAddress::named(HUB_ROOM)),
            "ws://127.0.0.1:8000/ws/hub"
        );
    }

    #[test]
    fn rejects_bad_page_urls() {
        assert!(matches!(
            PageLocation::parse("localhost:8000/game"),
            Err(AddressError::InvalidPageUrl(_))
        ));
        assert!(matches!(
            PageLocation::parse("ftp://host/"),
            Err(AddressError::UnsupportedScheme(s)) if s == "ftp"
        ));
        assert!(matches!(
            PageLocation::parse("http:///game/x"),
            Err(AddressError::InvalidPageUrl(_))
        ));
    }
}
