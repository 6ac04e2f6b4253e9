use sea_orm::entity::prelude::*;

/// Single-use code embedded in a callback link.
/// `(project_id, code)` is unique; `used_at` is written once, conditionally.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "verification_codes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub project_id: Uuid,
    pub code: String,
    /// Workflow discriminator, e.g. `EMAIL_VERIFICATION`.
    pub kind: String,
    pub email: String,
    pub payload: Json,
    pub redirect_url: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub used_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
