//! Installments module - the installment lifecycle and payment ledger engine.

mod installments_model;
mod installments_service;
mod installments_traits;


pub use installments_model::{
    compute_monthly_contribution, resolve_payment_transition, Installment, InstallmentPayment,
    InstallmentPaymentsPage, InstallmentWithBidder, NewInstallment, PaymentDetails,
    PaymentLookup, PaymentStatus, PaymentTransition, PaymentWithMember,
};
pub use installments_service::InstallmentService;
pub use installments_traits::{InstallmentRepositoryTrait, InstallmentServiceTrait};
