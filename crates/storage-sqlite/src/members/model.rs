//! Database models for members.

use chrono::NaiveDateTime;
use commipay_core::errors::Error;
use commipay_core::members::{Member, MemberSummary};
use diesel::prelude::*;

/// Database model for the `users` table.
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct UserDB {
    pub id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub country_code: String,
    pub phone_number: String,
    pub role: String,
    pub is_active: bool,
    pub created_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<UserDB> for Member {
    type Error = Error;

    fn try_from(db: UserDB) -> Result<Self, Self::Error> {
        Ok(Self {
            role: db.role.parse()?,
            id: db.id,
            first_name: db.first_name,
            last_name: db.last_name,
            email: db.email,
            avatar_url: db.avatar_url,
            country_code: db.country_code,
            phone_number: db.phone_number,
            is_active: db.is_active,
            created_by: db.created_by,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl From<UserDB> for MemberSummary {
    fn from(db: UserDB) -> Self {
        Self {
            id: db.id,
            first_name: db.first_name,
            last_name: db.last_name,
            country_code: db.country_code,
            phone_number: db.phone_number,
        }
    }
}

impl From<Member> for UserDB {
    fn from(domain: Member) -> Self {
        Self {
            id: domain.id,
            first_name: domain.first_name,
            last_name: domain.last_name,
            email: domain.email,
            avatar_url: domain.avatar_url,
            country_code: domain.country_code,
            phone_number: domain.phone_number,
            role: domain.role.as_str().to_string(),
            is_active: domain.is_active,
            created_by: domain.created_by,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }
}

pub(crate) fn into_members(rows: Vec<UserDB>) -> commipay_core::Result<Vec<Member>> {
    rows.into_iter().map(Member::try_from).collect()
}
