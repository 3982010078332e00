//! Shared fixtures for integration tests

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use mockall::mock;
use rust_decimal::Decimal;
use tokio::sync::mpsc;
use uuid::Uuid;

use ebook_lending_server::{
    config::{AppConfig, DatabaseConfig, RemindersConfig, ServerConfig},
    error::AppResult,
    models::{EBook, Loan, Payment, User},
    repository::{InMemoryStore, LendingStore},
    services::{
        gateway::{GatewayFailure, PaymentGateway},
        notifications::{LogNotifier, LoanEvent, Notifier},
        Services,
    },
    AppState,
};

mock! {
    pub Notifier {}

    #[async_trait]
    impl Notifier for Notifier {
        async fn notify(&self, event: LoanEvent, loan: &Loan) -> AppResult<()>;
    }
}

/// Gateway answering every check with the same verdict
pub struct StubGateway {
    verdict: Result<(), GatewayFailure>,
}

impl StubGateway {
    pub fn accepting() -> Self {
        Self { verdict: Ok(()) }
    }

    pub fn failing(failure: GatewayFailure) -> Self {
        Self {
            verdict: Err(failure),
        }
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn check(&self, _payment: &Payment) -> Result<(), GatewayFailure> {
        self.verdict.clone()
    }
}

/// Notifier that waits `delay` and then reports each event on a channel
pub struct RecordingNotifier {
    delay: Duration,
    events: mpsc::UnboundedSender<(LoanEvent, Uuid)>,
}

impl RecordingNotifier {
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<(LoanEvent, Uuid)>) {
        let (events, received) = mpsc::unbounded_channel();
        (Self { delay, events }, received)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, event: LoanEvent, loan: &Loan) -> AppResult<()> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let _ = self.events.send((event, loan.id));
        Ok(())
    }
}

pub fn ebook(title: &str, stock: i32, duration: i32) -> EBook {
    EBook::new(title, "Test Author", stock, "Fiction", Decimal::new(999, 2), duration, "")
}

pub async fn add_user(store: &InMemoryStore, name: &str) -> User {
    let user = User::new(name, format!("{}@example.com", name.to_lowercase())).logged_in();
    store.insert_user(user.clone()).await;
    user
}

pub async fn add_ebook(store: &InMemoryStore, title: &str, stock: i32, duration: i32) -> EBook {
    let ebook = ebook(title, stock, duration);
    store.insert_ebook(ebook.clone()).await;
    ebook
}

pub fn services_with(
    store: Arc<InMemoryStore>,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn Notifier>,
) -> Services {
    let store: Arc<dyn LendingStore> = store;
    Services::new(store, gateway, notifier, &RemindersConfig::default())
}

pub fn services(store: Arc<InMemoryStore>) -> Services {
    services_with(store, Arc::new(StubGateway::accepting()), Arc::new(LogNotifier))
}

pub fn app_state(services: Services) -> AppState {
    let config = AppConfig {
        server: ServerConfig::default(),
        database: DatabaseConfig::default(),
        logging: Default::default(),
        email: Default::default(),
        payment: Default::default(),
        reminders: Default::default(),
    };

    AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    }
}

pub async fn quantity(store: &InMemoryStore, ebook: &EBook) -> i32 {
    store
        .get_ebook(ebook.id)
        .await
        .unwrap()
        .unwrap()
        .quantity_available
}

pub async fn total_loaned(store: &InMemoryStore, user: &User) -> i32 {
    store.get_user(user.id).await.unwrap().unwrap().total_loaned
}
