//! Who is calling, and from where.

use adminguard_core::types::AdminId;
use adminguard_entity::session::Session;
use serde::{Deserialize, Serialize};

/// Network origin of a call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    /// Client IP address.
    pub ip_address: String,
    /// User-Agent header value.
    pub user_agent: String,
}

impl ClientInfo {
    /// Creates client info from an address and agent.
    pub fn new(ip_address: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            ip_address: ip_address.into(),
            user_agent: user_agent.into(),
        }
    }
}

/// An authenticated admin performing an administrative action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    /// The acting admin.
    pub admin_id: AdminId,
    /// The acting admin's email.
    pub email: String,
    /// Where the action came from.
    pub client: ClientInfo,
}

impl Actor {
    /// Creates an actor.
    pub fn new(admin_id: AdminId, email: impl Into<String>, client: ClientInfo) -> Self {
        Self {
            admin_id,
            email: email.into(),
            client,
        }
    }

    /// The admin owning `session`, calling from `client`.
    pub fn from_session(session: &Session, client: ClientInfo) -> Self {
        Self::new(session.admin_id, session.email.clone(), client)
    }
}
