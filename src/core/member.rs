//! Member registration business logic.
//!
//! Validates and registers clients, assigns register numbers, and provides
//! the lookups the loan flows are built on. NIC format, contact numbers and
//! guarantor pairing are all checked here so no malformed member row ever
//! reaches the store; the unique index on `nic_number` backs the duplicate
//! check against concurrent registrations.

use crate::{
    core::sequence,
    entities::{Loan, Member, Payment, loan, member, payment},
    errors::{Error, Result},
};
use sea_orm::{
    DatabaseConnection, QueryOrder, Set, TransactionTrait, prelude::*,
};
use tracing::info;

/// A guarantor attached to a member. Name and NIC are both required - the
/// pairing rule is encoded in the type rather than validated across two
/// optional fields.
#[derive(Debug, Clone)]
pub struct Guarantor {
    /// Guarantor's full name
    pub name: String,
    /// Guarantor's NIC number
    pub nic: String,
    /// Optional phone number
    pub phone: Option<String>,
    /// Optional address
    pub address: Option<String>,
}

/// Input for registering a new member
#[derive(Debug, Clone)]
pub struct NewMember {
    /// First name (required)
    pub first_name: String,
    /// Last name (required)
    pub last_name: String,
    /// National identity number - 9 digits + V/X or 12 digits
    pub nic_number: String,
    /// Mobile number, 10 digits when present
    pub mobile_number: Option<String>,
    /// Home phone number (required)
    pub home_number: String,
    /// Street address
    pub street_address: Option<String>,
    /// Primary town line of the address
    pub town_one: Option<String>,
    /// Town used for the loan number's town code
    pub town_two: Option<String>,
    /// Collection group
    pub member_group: Option<String>,
    /// Whether the client holds full membership
    pub is_member: bool,
    /// First guarantor
    pub first_guarantor: Option<Guarantor>,
    /// Second guarantor
    pub second_guarantor: Option<Guarantor>,
}

/// A member together with their loans and all payments across those loans
#[derive(Debug, Clone)]
pub struct MemberProfile {
    /// The member
    pub member: member::Model,
    /// The member's loans, newest first
    pub loans: Vec<loan::Model>,
    /// All payments across the member's loans, newest first
    pub payments: Vec<payment::Model>,
}

/// Checks the national identity number format: 9 digits followed by V or X,
/// or 12 digits.
#[must_use]
pub fn is_valid_nic(nic: &str) -> bool {
    let bytes = nic.as_bytes();
    match bytes.len() {
        10 => {
            bytes[..9].iter().all(u8::is_ascii_digit)
                && matches!(bytes[9], b'v' | b'V' | b'x' | b'X')
        }
        12 => bytes.iter().all(u8::is_ascii_digit),
        _ => false,
    }
}

/// Registers a new member, assigning the next register number.
///
/// Register number assignment and the insert run in one transaction; a
/// concurrent registration that wins the race surfaces as
/// [`Error::Conflict`] from the unique index, which callers may retry.
pub async fn register_member(
    db: &DatabaseConnection,
    new_member: NewMember,
) -> Result<member::Model> {
    validate_new_member(&new_member)?;

    let nic = new_member.nic_number.trim().to_string();
    if get_member_by_nic(db, &nic).await?.is_some() {
        return Err(Error::Conflict {
            message: format!("A member with NIC {nic} already exists"),
        });
    }

    let txn = db.begin().await?;

    let register_number = sequence::next_register_number(&txn).await?;
    let (first, second) = (new_member.first_guarantor, new_member.second_guarantor);
    let model = member::ActiveModel {
        register_number: Set(register_number),
        first_name: Set(new_member.first_name.trim().to_string()),
        last_name: Set(new_member.last_name.trim().to_string()),
        nic_number: Set(nic),
        mobile_number: Set(new_member.mobile_number),
        home_number: Set(new_member.home_number.trim().to_string()),
        street_address: Set(new_member.street_address),
        town_one: Set(new_member.town_one),
        town_two: Set(new_member.town_two),
        member_group: Set(new_member.member_group),
        is_member: Set(new_member.is_member),
        created_at: Set(chrono::Utc::now()),
        first_guarantor_name: Set(first.as_ref().map(|g| g.name.clone())),
        first_guarantor_nic: Set(first.as_ref().map(|g| g.nic.clone())),
        first_guarantor_tp: Set(first.as_ref().and_then(|g| g.phone.clone())),
        first_guarantor_address: Set(first.and_then(|g| g.address)),
        second_guarantor_name: Set(second.as_ref().map(|g| g.name.clone())),
        second_guarantor_nic: Set(second.as_ref().map(|g| g.nic.clone())),
        second_guarantor_tp: Set(second.as_ref().and_then(|g| g.phone.clone())),
        second_guarantor_address: Set(second.and_then(|g| g.address)),
        ..Default::default()
    };

    let result = model
        .insert(&txn)
        .await
        .map_err(|e| Error::from_insert(e, "member register number or NIC"))?;

    txn.commit().await?;

    info!(
        register_number,
        nic = %result.nic_number,
        "Registered member"
    );
    Ok(result)
}

/// Finds a member by NIC number, returning None when absent.
pub async fn get_member_by_nic(
    db: &DatabaseConnection,
    nic_number: &str,
) -> Result<Option<member::Model>> {
    Member::find()
        .filter(member::Column::NicNumber.eq(nic_number))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a member by id, returning None when absent.
pub async fn get_member_by_id(
    db: &DatabaseConnection,
    member_id: i64,
) -> Result<Option<member::Model>> {
    Member::find_by_id(member_id).one(db).await.map_err(Into::into)
}

/// Retrieves all members, newest first.
pub async fn get_all_members(db: &DatabaseConnection) -> Result<Vec<member::Model>> {
    Member::find()
        .order_by_desc(member::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Builds a member's full profile: the member row, their loans, and every
/// payment recorded against those loans.
pub async fn get_member_profile(
    db: &DatabaseConnection,
    member_id: i64,
) -> Result<MemberProfile> {
    let member = get_member_by_id(db, member_id)
        .await?
        .ok_or_else(|| Error::MemberNotFound {
            reference: member_id.to_string(),
        })?;

    let loans = Loan::find()
        .filter(loan::Column::MemberId.eq(member_id))
        .order_by_desc(loan::Column::CreatedAt)
        .all(db)
        .await?;

    let loan_ids: Vec<i64> = loans.iter().map(|l| l.id).collect();
    let payments = if loan_ids.is_empty() {
        Vec::new()
    } else {
        Payment::find()
            .filter(payment::Column::LoanId.is_in(loan_ids))
            .order_by_desc(payment::Column::PaidDate)
            .all(db)
            .await?
    };

    Ok(MemberProfile {
        member,
        loans,
        payments,
    })
}

fn validate_new_member(new_member: &NewMember) -> Result<()> {
    if new_member.first_name.trim().is_empty() {
        return Err(Error::Validation {
            message: "First name is required".to_string(),
        });
    }
    if new_member.last_name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Last name is required".to_string(),
        });
    }
    if new_member.home_number.trim().is_empty() {
        return Err(Error::Validation {
            message: "Home number is required".to_string(),
        });
    }

    let nic = new_member.nic_number.trim();
    if !is_valid_nic(nic) {
        return Err(Error::InvalidNic {
            nic: nic.to_string(),
        });
    }

    if let Some(mobile) = &new_member.mobile_number {
        if mobile.len() != 10 || !mobile.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::Validation {
                message: "Mobile number must be 10 digits".to_string(),
            });
        }
    }

    for (label, guarantor) in [
        ("First", &new_member.first_guarantor),
        ("Second", &new_member.second_guarantor),
    ] {
        if let Some(g) = guarantor {
            if g.name.trim().is_empty() {
                return Err(Error::Validation {
                    message: format!("{label} guarantor name is required"),
                });
            }
            if g.nic.trim().is_empty() {
                return Err(Error::Validation {
                    message: format!("{label} guarantor NIC is required"),
                });
            }
        }
    }

    Ok(())
}
