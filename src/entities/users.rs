use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    /// Stored lowercase
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2id password hash; `None` for OAuth-only accounts
    pub password_hash: Option<String>,

    /// Avatar URL, either an external OAuth picture or a stored object URL
    pub image: Option<String>,

    /// Object key when the avatar was uploaded to our bucket
    pub image_key: Option<String>,

    /// Unique when present; SQLite allows many NULLs under a unique index
    #[sea_orm(unique)]
    pub username: Option<String>,

    pub bio: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::posts::Entity")]
    Posts,
    #[sea_orm(has_many = "super::accounts::Entity")]
    Accounts,
}

impl Related<super::posts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
