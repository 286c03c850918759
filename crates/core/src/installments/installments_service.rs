use log::{debug, info};
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::Arc;

use super::installments_model::{
    compute_monthly_contribution, now, Installment, InstallmentPayment, InstallmentPaymentsPage,
    InstallmentWithBidder, NewInstallment, PaymentDetails, PaymentLookup,
};
use super::installments_traits::{InstallmentRepositoryTrait, InstallmentServiceTrait};
use crate::committees::CommitteeRepositoryTrait;
use crate::errors::{Error, Result};
use crate::members::MemberSummary;
use crate::utils::pagination::{normalize_search, PageRequest, Paginated};

/// Parses a numeric search term ("38", "38.0", "3.8e1") into a whole contribution.
fn whole_amount(term: &str) -> Option<i64> {
    let value = term
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(term))
        .ok()?;
    if value.fract().is_zero() {
        value.to_i64()
    } else {
        None
    }
}

/// The installment and payment engine.
pub struct InstallmentService {
    repository: Arc<dyn InstallmentRepositoryTrait>,
    committee_repository: Arc<dyn CommitteeRepositoryTrait>,
}

impl InstallmentService {
    pub fn new(
        repository: Arc<dyn InstallmentRepositoryTrait>,
        committee_repository: Arc<dyn CommitteeRepositoryTrait>,
    ) -> Self {
        Self {
            repository,
            committee_repository,
        }
    }

    async fn set_payment_state(
        &self,
        owner_id: &str,
        lookup: PaymentLookup,
        is_paid: bool,
    ) -> Result<InstallmentPayment> {
        debug!("Marking {} as paid={} for owner {}", lookup, is_paid, owner_id);
        let payment = self
            .repository
            .mark_payment(owner_id, lookup, is_paid, now())
            .await
            .map_err(|err| replace_not_found(err, "Installment payment record not found"))?;
        info!(
            "Payment {} is now {} ({} paid)",
            payment.id, payment.status, payment.amount_paid
        );
        Ok(payment)
    }
}

fn replace_not_found(err: Error, message: &str) -> Error {
    if err.is_not_found() {
        Error::not_found(message)
    } else {
        err
    }
}

#[async_trait::async_trait]
impl InstallmentServiceTrait for InstallmentService {
    async fn create_installment(
        &self,
        owner_id: &str,
        new_installment: NewInstallment,
    ) -> Result<Installment> {
        new_installment.validate()?;

        let committee = self
            .committee_repository
            .get_by_id(owner_id, &new_installment.committee_id)
            .map_err(|err| replace_not_found(err, "Committee not found or not owned by user"))?;

        if committee.members.is_empty() {
            return Err(Error::invalid_input(format!(
                "Committee {} has no members",
                committee.id
            )));
        }

        let monthly_contribution = compute_monthly_contribution(
            committee.amount,
            new_installment.winning_bid_amount,
            committee.member_count(),
        )?;
        let (month, year) = (new_installment.month, new_installment.year);
        debug!(
            "Creating installment {}/{} for committee {}: contribution {} x {} members",
            month,
            year,
            committee.id,
            monthly_contribution,
            committee.member_count()
        );

        let installment = self
            .repository
            .create_with_payments(
                owner_id,
                new_installment,
                monthly_contribution,
                committee.members,
            )
            .await
            .map_err(|err| {
                if err.is_unique_violation() {
                    Error::Conflict(format!(
                        "An installment for {}/{} already exists for this committee",
                        month, year
                    ))
                } else {
                    err
                }
            })?;
        info!(
            "Installment {} created for committee {}",
            installment.id, installment.committee_id
        );
        Ok(installment)
    }

    async fn mark_payment(
        &self,
        owner_id: &str,
        installment_id: &str,
        member_id: &str,
        is_paid: bool,
    ) -> Result<InstallmentPayment> {
        let lookup = PaymentLookup::ByMember {
            installment_id: installment_id.to_string(),
            member_id: member_id.to_string(),
        };
        self.set_payment_state(owner_id, lookup, is_paid).await
    }

    async fn mark_payment_by_id(
        &self,
        owner_id: &str,
        payment_id: &str,
        is_paid: bool,
    ) -> Result<InstallmentPayment> {
        let lookup = PaymentLookup::ById(payment_id.to_string());
        self.set_payment_state(owner_id, lookup, is_paid).await
    }

    async fn delete_installment(&self, owner_id: &str, installment_id: &str) -> Result<()> {
        let deleted = self
            .repository
            .delete_with_payments(owner_id, installment_id)
            .await?;
        if deleted == 0 {
            return Err(Error::not_found("Installment not found or access denied"));
        }
        info!("Installment {} and its payments deleted", installment_id);
        Ok(())
    }

    fn get_installments(
        &self,
        owner_id: &str,
        committee_id: &str,
        page: PageRequest,
        search: Option<&str>,
    ) -> Result<Paginated<InstallmentWithBidder>> {
        self.committee_repository
            .get_by_id(owner_id, committee_id)
            .map_err(|err| replace_not_found(err, "Committee not found"))?;

        let contribution = match normalize_search(search) {
            None => None,
            Some(term) => match whole_amount(&term) {
                Some(amount) => Some(amount),
                // Contributions are whole numbers; anything else matches nothing.
                None => return Ok(Paginated::new(Vec::new(), 0, page)),
            },
        };
        self.repository
            .list_for_committee(owner_id, committee_id, page, contribution)
    }

    fn get_payments_for_installment(
        &self,
        owner_id: &str,
        installment_id: &str,
        page: PageRequest,
        search: Option<&str>,
    ) -> Result<InstallmentPaymentsPage> {
        self.repository
            .get_by_id(owner_id, installment_id)
            .map_err(|err| replace_not_found(err, "Installment not found"))?;
        let search = normalize_search(search);
        self.repository
            .list_payments(owner_id, installment_id, page, search.as_deref())
    }

    fn get_available_members(
        &self,
        owner_id: &str,
        committee_id: &str,
    ) -> Result<Vec<MemberSummary>> {
        let committee = self
            .committee_repository
            .get_details(owner_id, committee_id)
            .map_err(|err| replace_not_found(err, "Committee not found"))?;
        let winners: HashSet<String> = self
            .repository
            .list_winning_bidders(owner_id, committee_id)?
            .into_iter()
            .collect();

        let mut available: Vec<MemberSummary> = committee
            .members
            .into_iter()
            .filter(|member| !winners.contains(&member.id))
            .map(MemberSummary::from)
            .collect();
        available.sort_by(|a, b| {
            a.first_name
                .cmp(&b.first_name)
                .then_with(|| a.last_name.cmp(&b.last_name))
        });
        Ok(available)
    }

    fn get_payment_details(&self, owner_id: &str, payment_id: &str) -> Result<PaymentDetails> {
        self.repository
            .get_payment_details(owner_id, payment_id)
            .map_err(|err| replace_not_found(err, "Payment record not found"))
    }
}
