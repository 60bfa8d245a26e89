use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::permissions::ActionType;
use crate::schema::{UserRole, Uuid};

/// Authenticated identity as handed over by the session collaborator;
/// token issuance and verification live outside this crate.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionData {
    pub user_id: Uuid,
    pub username: String,
    pub role: UserRole,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum Session {
    Anonymous,
    User(SessionData),
}

impl Session {
    pub fn require_user(&self) -> Result<&SessionData, Error> {
        match self {
            Session::Anonymous => Err(Error::Unauthorized),
            Session::User(data) => Ok(data),
        }
    }

    pub fn authenticate(&self, action: ActionType) -> Result<&SessionData, Error> {
        let data = self.require_user()?;
        if !action.authenticate(data) {
            return Err(Error::Forbidden);
        }
        Ok(data)
    }
}

impl From<SessionData> for Session {
    fn from(data: SessionData) -> Self {
        Session::User(data)
    }
}
