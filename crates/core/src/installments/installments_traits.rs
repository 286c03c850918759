//! Installment engine repository and service traits.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use super::installments_model::{
    Installment, InstallmentPayment, InstallmentPaymentsPage, InstallmentWithBidder,
    NewInstallment, PaymentDetails, PaymentLookup,
};
use crate::errors::Result;
use crate::members::MemberSummary;
use crate::utils::pagination::{PageRequest, Paginated};

/// Trait defining the contract for installment and payment persistence.
///
/// Installments are owner-scoped through their committee: an installment
/// whose committee belongs to another owner behaves like a missing one.
#[async_trait]
pub trait InstallmentRepositoryTrait: Send + Sync {
    /// Inserts the installment and one PENDING payment per member in a single
    /// transaction. A duplicate (committee, month, year) surfaces as a unique
    /// violation and leaves nothing behind.
    async fn create_with_payments(
        &self,
        owner_id: &str,
        new_installment: NewInstallment,
        monthly_contribution: i64,
        member_ids: Vec<String>,
    ) -> Result<Installment>;

    fn get_by_id(&self, owner_id: &str, installment_id: &str) -> Result<Installment>;

    /// Installments of a committee in creation order. `contribution` filters by
    /// exact monthly contribution.
    fn list_for_committee(
        &self,
        owner_id: &str,
        committee_id: &str,
        page: PageRequest,
        contribution: Option<i64>,
    ) -> Result<Paginated<InstallmentWithBidder>>;

    /// Ids of every member who has won an installment of the committee.
    fn list_winning_bidders(&self, owner_id: &str, committee_id: &str) -> Result<Vec<String>>;

    /// Deletes the installment's payments and then the installment in one
    /// transaction. Returns the number of installments removed.
    async fn delete_with_payments(&self, owner_id: &str, installment_id: &str) -> Result<usize>;

    /// Payments joined to member names, ordered by first then last name.
    /// `search` is a case-insensitive substring over first or last name.
    fn list_payments(
        &self,
        owner_id: &str,
        installment_id: &str,
        page: PageRequest,
        search: Option<&str>,
    ) -> Result<InstallmentPaymentsPage>;

    fn get_payment_details(&self, owner_id: &str, payment_id: &str) -> Result<PaymentDetails>;

    /// Moves the addressed payment to PAID or PENDING inside one write
    /// transaction. Leaves the row untouched when it already holds that state.
    async fn mark_payment(
        &self,
        owner_id: &str,
        lookup: PaymentLookup,
        is_paid: bool,
        now: NaiveDateTime,
    ) -> Result<InstallmentPayment>;
}

/// Trait defining the contract for the installment and payment engine.
#[async_trait]
pub trait InstallmentServiceTrait: Send + Sync {
    async fn create_installment(
        &self,
        owner_id: &str,
        new_installment: NewInstallment,
    ) -> Result<Installment>;

    /// Composite-key variant of mark-payment.
    async fn mark_payment(
        &self,
        owner_id: &str,
        installment_id: &str,
        member_id: &str,
        is_paid: bool,
    ) -> Result<InstallmentPayment>;

    /// Single-id variant of mark-payment.
    async fn mark_payment_by_id(
        &self,
        owner_id: &str,
        payment_id: &str,
        is_paid: bool,
    ) -> Result<InstallmentPayment>;

    async fn delete_installment(&self, owner_id: &str, installment_id: &str) -> Result<()>;

    fn get_installments(
        &self,
        owner_id: &str,
        committee_id: &str,
        page: PageRequest,
        search: Option<&str>,
    ) -> Result<Paginated<InstallmentWithBidder>>;

    fn get_payments_for_installment(
        &self,
        owner_id: &str,
        installment_id: &str,
        page: PageRequest,
        search: Option<&str>,
    ) -> Result<InstallmentPaymentsPage>;

    /// Committee members who have not yet won an installment, by first name.
    fn get_available_members(
        &self,
        owner_id: &str,
        committee_id: &str,
    ) -> Result<Vec<MemberSummary>>;

    fn get_payment_details(&self, owner_id: &str, payment_id: &str) -> Result<PaymentDetails>;
}
