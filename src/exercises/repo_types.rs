use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::ownership::Owned;

#[derive(Debug, Clone, FromRow)]
pub struct Exercise {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: OffsetDateTime,
}

impl Owned for Exercise {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}
