//! Member domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};
use crate::owner::Role;

/// A member profile. Members are the foreign-key target of committee
/// membership, winning bids and payment obligations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub country_code: String,
    pub phone_number: String,
    pub role: Role,
    pub is_active: bool,
    pub created_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// The name and contact fields joined into ledger and report rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    pub id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub country_code: String,
    pub phone_number: String,
}

impl From<Member> for MemberSummary {
    fn from(member: Member) -> Self {
        Self {
            id: member.id,
            first_name: member.first_name,
            last_name: member.last_name,
            country_code: member.country_code,
            phone_number: member.phone_number,
        }
    }
}

/// Input model for adding a member to the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub country_code: String,
    pub phone_number: String,
}

impl NewMember {
    pub fn validate(&self) -> Result<()> {
        require_text("firstName", &self.first_name)?;
        require_text("countryCode", &self.country_code)?;
        require_text("phoneNumber", &self.phone_number)?;
        Ok(())
    }
}

/// Partial update of a member profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub country_code: Option<String>,
    pub phone_number: Option<String>,
    pub is_active: Option<bool>,
}

impl MemberUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(first_name) = &self.first_name {
            require_text("firstName", first_name)?;
        }
        if let Some(country_code) = &self.country_code {
            require_text("countryCode", country_code)?;
        }
        if let Some(phone_number) = &self.phone_number {
            require_text("phoneNumber", phone_number)?;
        }
        Ok(())
    }

    /// Applies the supplied fields onto an existing profile.
    pub fn apply_to(self, member: &mut Member) {
        if let Some(v) = self.first_name {
            member.first_name = v;
        }
        if let Some(v) = self.last_name {
            member.last_name = Some(v);
        }
        if let Some(v) = self.email {
            member.email = Some(v);
        }
        if let Some(v) = self.avatar_url {
            member.avatar_url = Some(v);
        }
        if let Some(v) = self.country_code {
            member.country_code = v;
        }
        if let Some(v) = self.phone_number {
            member.phone_number = v;
        }
        if let Some(v) = self.is_active {
            member.is_active = v;
        }
    }
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(ValidationError::MissingField(
            field.to_string(),
        )));
    }
    Ok(())
}
