//! Database models for committees.

use chrono::{NaiveDate, NaiveDateTime};
use commipay_core::committees::Committee;
use commipay_core::Result;
use diesel::prelude::*;

use crate::utils::{decimal_to_text, text_to_decimal};

/// Database model for the `committees` table. Money columns hold normalized
/// decimal text.
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::committees)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CommitteeDB {
    pub id: String,
    pub amount: String,
    pub bid: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub monthly_due_day: i32,
    pub created_by: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Ordered membership row.
#[derive(Queryable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::committee_members)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CommitteeMemberDB {
    pub committee_id: String,
    pub member_id: String,
    pub position: i32,
}

impl CommitteeDB {
    pub fn from_domain(committee: &Committee) -> Self {
        Self {
            id: committee.id.clone(),
            amount: decimal_to_text(committee.amount),
            bid: decimal_to_text(committee.bid),
            start_date: committee.start_date,
            end_date: committee.end_date,
            monthly_due_day: committee.monthly_due_day,
            created_by: committee.created_by.clone(),
            created_at: committee.created_at,
            updated_at: committee.updated_at,
        }
    }

    pub fn into_domain(self, members: Vec<String>) -> Result<Committee> {
        Ok(Committee {
            amount: text_to_decimal(&self.amount, "committees.amount")?,
            bid: text_to_decimal(&self.bid, "committees.bid")?,
            id: self.id,
            start_date: self.start_date,
            end_date: self.end_date,
            monthly_due_day: self.monthly_due_day,
            members,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

pub fn membership_rows(committee_id: &str, members: &[String]) -> Vec<CommitteeMemberDB> {
    members
        .iter()
        .enumerate()
        .map(|(position, member_id)| CommitteeMemberDB {
            committee_id: committee_id.to_string(),
            member_id: member_id.clone(),
            position: position as i32,
        })
        .collect()
}
