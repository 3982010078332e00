//! Business logic services

pub mod catalog;
pub mod email;
pub mod gateway;
pub mod inventory;
pub mod loans;
pub mod notifications;
pub mod payments;
pub mod quota;
pub mod reminders;

use std::sync::Arc;

use crate::{config::RemindersConfig, repository::LendingStore};

use self::{gateway::PaymentGateway, notifications::Notifier};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub payments: payments::PaymentsService,
    pub reminders: reminders::ReminderService,
    pub store: Arc<dyn LendingStore>,
}

impl Services {
    /// Wire every service onto one shared store
    pub fn new(
        store: Arc<dyn LendingStore>,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
        reminders: &RemindersConfig,
    ) -> Self {
        Self {
            catalog: catalog::CatalogService::new(store.clone()),
            loans: loans::LoansService::new(store.clone(), notifier.clone()),
            payments: payments::PaymentsService::new(store.clone(), gateway),
            reminders: reminders::ReminderService::new(
                store.clone(),
                notifier,
                reminders.window_days,
            ),
            store,
        }
    }
}
