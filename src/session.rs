// 🔐 Session Context - who is acting right now
//
// Supplies the actor identifier recorded on price changes and the display
// fields shown in the UI header. Credentials are out of scope: login takes an
// already authenticated actor.

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reference::staff;

pub const ANONYMOUS_ACTOR: &str = "anonymous";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub display_name: String,
    /// Staff role id (see reference::staff)
    pub role: String,
}

impl Actor {
    pub fn new(id: &str, display_name: &str, role: &str) -> Self {
        Actor {
            id: id.to_string(),
            display_name: display_name.to_string(),
            role: role.to_string(),
        }
    }

    /// Initials for compact headers: "Ana Torres" → "AT"
    pub fn initials(&self) -> String {
        self.display_name
            .split_whitespace()
            .filter_map(|w| w.chars().next())
            .flat_map(|c| c.to_uppercase())
            .take(2)
            .collect()
    }

    pub fn can_access_system(&self) -> bool {
        staff::find_role(&self.role)
            .map(|r| r.can_access_system)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub actor: Actor,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct SessionContext {
    current: Option<Session>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log `actor_id` in with `role`, or stay anonymous when no actor is given
    pub fn start(actor_id: Option<&str>, role: &str) -> anyhow::Result<Self> {
        let mut ctx = Self::new();
        if let Some(id) = actor_id {
            ctx.login(Actor::new(id, id, role)).map_err(|e| anyhow!(e))?;
        }
        Ok(ctx)
    }

    /// Start a session for `actor`, replacing any existing one
    pub fn login(&mut self, actor: Actor) -> Result<&Session, String> {
        if !actor.can_access_system() {
            return Err(format!(
                "Role '{}' is not allowed to access the system",
                actor.role
            ));
        }

        let session = Session {
            id: uuid::Uuid::new_v4().to_string(),
            actor,
            started_at: Utc::now(),
        };
        Ok(&*self.current.insert(session))
    }

    pub fn session(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn current_actor(&self) -> Option<&Actor> {
        self.current.as_ref().map(|s| &s.actor)
    }

    /// Actor id to record on changes
    pub fn actor_id_or_anonymous(&self) -> &str {
        self.current_actor()
            .map(|a| a.id.as_str())
            .unwrap_or(ANONYMOUS_ACTOR)
    }

    /// End the session, returning it if there was one
    pub fn logout(&mut self) -> Option<Session> {
        self.current.take()
    }
}
