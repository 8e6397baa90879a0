//! Member entity - Represents a registered client of the microfinance office.
//!
//! Each member carries a dense `register_number` sequence assigned at
//! registration, a unique national identity number, contact/address fields and
//! up to two guarantor records. Members are never deleted in the normal flow.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Member database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "members")]
pub struct Model {
    /// Unique identifier for the member
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Dense positive sequence assigned at registration, immutable afterwards.
    /// Displayed zero-padded to 6 digits.
    #[sea_orm(unique)]
    pub register_number: i64,
    /// Member's first name
    pub first_name: String,
    /// Member's last name
    pub last_name: String,
    /// National identity number - 9 digits + V/X or 12 digits
    #[sea_orm(unique)]
    pub nic_number: String,
    /// Mobile number (10 digits when present)
    pub mobile_number: Option<String>,
    /// Home phone number
    pub home_number: String,
    /// Street address
    pub street_address: Option<String>,
    /// Primary town line of the address
    pub town_one: Option<String>,
    /// Secondary town - this is the location the loan number's town code is
    /// derived from
    pub town_two: Option<String>,
    /// Categorical group the member belongs to (drives the loan number's
    /// group code)
    pub member_group: Option<String>,
    /// Whether the client holds full membership
    pub is_member: bool,
    /// When the member was registered
    pub created_at: DateTimeUtc,
    /// First guarantor name (required together with the NIC or not at all)
    pub first_guarantor_name: Option<String>,
    /// First guarantor NIC
    pub first_guarantor_nic: Option<String>,
    /// First guarantor phone
    pub first_guarantor_tp: Option<String>,
    /// First guarantor address
    pub first_guarantor_address: Option<String>,
    /// Second guarantor name (required together with the NIC or not at all)
    pub second_guarantor_name: Option<String>,
    /// Second guarantor NIC
    pub second_guarantor_nic: Option<String>,
    /// Second guarantor phone
    pub second_guarantor_tp: Option<String>,
    /// Second guarantor address
    pub second_guarantor_address: Option<String>,
}

/// Defines relationships between Member and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One member has many loans
    #[sea_orm(has_many = "super::loan::Entity")]
    Loans,
}

impl Related<super::loan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Loans.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Full display name
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
