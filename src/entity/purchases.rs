use sea_orm::entity::prelude::*;

use crate::payment::PaymentMethod;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "purchases")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub book_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Book price at the moment of purchase; never rewritten.
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price_paid: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_id: Option<String>,
    #[sea_orm(unique)]
    pub download_token: String,
    pub token_expires_at: DateTimeWithTimeZone,
    pub downloaded: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::books::Entity",
        from = "Column::BookId",
        to = "super::books::Column::Id"
    )]
    Books,
}

impl Related<super::books::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Books.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
