use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct State {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: String,
}

impl State {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self { id: super::new_id(), created_at: now, updated_at: now, name: name.into() }
    }
}
