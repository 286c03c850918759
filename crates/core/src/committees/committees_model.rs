//! Committee domain models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::errors::{Error, Result, ValidationError};
use crate::members::Member;
use crate::utils::time_utils::committee_end_date;

/// A rotating-savings group owned by one account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Committee {
    pub id: String,
    /// Pool paid out each month.
    pub amount: Decimal,
    /// Bid ceiling.
    pub bid: Decimal,
    pub start_date: NaiveDate,
    /// Always `start_date + (members.len() - 1)` months unless set explicitly.
    pub end_date: NaiveDate,
    pub monthly_due_day: i32,
    /// Member ids in committee order.
    pub members: Vec<String>,
    pub created_by: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Committee {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

/// Committee with its member ids resolved to profiles, in committee order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommitteeDetails {
    pub id: String,
    pub amount: Decimal,
    pub bid: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub monthly_due_day: i32,
    pub members: Vec<Member>,
    pub created_by: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl CommitteeDetails {
    pub fn from_committee(committee: Committee, members: Vec<Member>) -> Self {
        Self {
            id: committee.id,
            amount: committee.amount,
            bid: committee.bid,
            start_date: committee.start_date,
            end_date: committee.end_date,
            monthly_due_day: committee.monthly_due_day,
            members,
            created_by: committee.created_by,
            created_at: committee.created_at,
            updated_at: committee.updated_at,
        }
    }
}

/// Input model for creating a committee.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCommittee {
    pub amount: Decimal,
    pub bid: Decimal,
    pub start_date: NaiveDate,
    pub monthly_due_day: i32,
    pub members: Vec<String>,
}

impl NewCommittee {
    pub fn validate(&self) -> Result<()> {
        validate_amount("amount", self.amount)?;
        validate_amount("bid", self.bid)?;
        validate_due_day(self.monthly_due_day)?;
        validate_members(&self.members)
    }

    pub fn end_date(&self) -> Result<NaiveDate> {
        committee_end_date(self.start_date, self.members.len())
    }
}

/// Partial update of a committee.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitteeUpdate {
    pub amount: Option<Decimal>,
    pub bid: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    /// Honored only when neither `start_date` nor `members` is supplied.
    pub end_date: Option<NaiveDate>,
    pub monthly_due_day: Option<i32>,
    pub members: Option<Vec<String>>,
}

impl CommitteeUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(amount) = self.amount {
            validate_amount("amount", amount)?;
        }
        if let Some(bid) = self.bid {
            validate_amount("bid", bid)?;
        }
        if let Some(day) = self.monthly_due_day {
            validate_due_day(day)?;
        }
        if let Some(members) = &self.members {
            validate_members(members)?;
        }
        Ok(())
    }

    /// Merges the update into `committee`, recomputing the end date when the
    /// start date or member set changes.
    pub fn apply_to(self, committee: &mut Committee) -> Result<()> {
        let schedule_changed = self.start_date.is_some() || self.members.is_some();

        if let Some(amount) = self.amount {
            committee.amount = amount;
        }
        if let Some(bid) = self.bid {
            committee.bid = bid;
        }
        if let Some(day) = self.monthly_due_day {
            committee.monthly_due_day = day;
        }
        if let Some(start_date) = self.start_date {
            committee.start_date = start_date;
        }
        if let Some(members) = self.members {
            committee.members = members;
        }

        if schedule_changed {
            committee.end_date = committee_end_date(committee.start_date, committee.member_count())?;
        } else if let Some(end_date) = self.end_date {
            committee.end_date = end_date;
        }
        Ok(())
    }
}

fn validate_amount(field: &str, value: Decimal) -> Result<()> {
    if value.is_sign_negative() {
        return Err(Error::invalid_input(format!("{} must not be negative", field)));
    }
    Ok(())
}

fn validate_due_day(day: i32) -> Result<()> {
    if !(1..=31).contains(&day) {
        return Err(Error::invalid_input("monthlyDueDay must be between 1 and 31"));
    }
    Ok(())
}

fn validate_members(members: &[String]) -> Result<()> {
    if members.is_empty() {
        return Err(Error::invalid_input("Members array cannot be empty"));
    }
    let mut seen = HashSet::with_capacity(members.len());
    for member in members {
        if member.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "members".to_string(),
            )));
        }
        if !seen.insert(member.as_str()) {
            return Err(Error::invalid_input(format!(
                "Member {} is listed more than once",
                member
            )));
        }
    }
    Ok(())
}
