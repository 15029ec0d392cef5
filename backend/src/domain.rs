use crate::db::DbConnection;
use crate::password;
use shared::{BalanceResponse, LoginResponse, TransferRequest, TransferResponse};
use thiserror::Error;
use tracing::info;

/// Failures surfaced by the domain services.
///
/// Logical outcomes (failed login, rejected transfer, unknown user) are not
/// errors; they travel inside the response records. Only registration
/// conflicts and storage faults reach this type.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),
    #[error("initial balance must not be negative")]
    NegativeInitialBalance,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Account registration, authentication and balance queries
#[derive(Clone)]
pub struct AccountService {
    db: DbConnection,
}

impl AccountService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Register a new user with a freshly hashed password and an opening balance
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        balance: i64,
    ) -> Result<(), DomainError> {
        if balance < 0 {
            return Err(DomainError::NegativeInitialBalance);
        }

        let password_hash = password::hash_password(password)?;
        let created_at = chrono::Utc::now().to_rfc3339();

        let inserted = self
            .db
            .insert_user(username, &password_hash, balance, &created_at)
            .await?;
        if !inserted {
            return Err(DomainError::UsernameTaken(username.to_string()));
        }

        info!("Created user {}", username);
        Ok(())
    }

    /// Verify a username/password pair.
    ///
    /// An unknown username and a wrong password produce identical responses so
    /// the endpoint cannot be used to probe which accounts exist.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<LoginResponse, DomainError> {
        match self.db.get_user(username).await? {
            Some(user) if password::verify_password(&user.password_hash, password) => {
                info!("Authentication succeeded for {}", user.username);
                Ok(LoginResponse::authenticated(user.balance))
            }
            _ => {
                info!("Authentication failed for {}", username);
                Ok(LoginResponse::rejected())
            }
        }
    }

    /// Look up the current balance for a username
    pub async fn balance(&self, username: &str) -> Result<BalanceResponse, DomainError> {
        match self.db.get_balance(username).await? {
            Some(balance) => Ok(BalanceResponse::found(balance)),
            None => Ok(BalanceResponse::not_found()),
        }
    }
}

/// Fund movement between two accounts
#[derive(Clone)]
pub struct TransferService {
    db: DbConnection,
}

impl TransferService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Move the requested amount from sender to receiver.
    ///
    /// Unknown accounts and insufficient funds collapse into one generic
    /// rejection. The endpoint validates the request first; the amount and
    /// self-transfer checks here keep a direct caller from minting funds.
    pub async fn transfer(&self, request: &TransferRequest) -> Result<TransferResponse, DomainError> {
        if request.amount <= 0 || request.sender == request.receiver {
            return Ok(TransferResponse::rejected());
        }

        let moved = self
            .db
            .transfer_balances(&request.sender, &request.receiver, request.amount)
            .await?;

        if moved {
            info!(
                "Transferred {} from {} to {}",
                request.amount, request.sender, request.receiver
            );
            Ok(TransferResponse::completed())
        } else {
            info!(
                "Rejected transfer of {} from {} to {}",
                request.amount, request.sender, request.receiver
            );
            Ok(TransferResponse::rejected())
        }
    }
}
