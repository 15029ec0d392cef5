use serde::{Deserialize, Serialize};
use std::fmt;

/// Message texts carried in response bodies.
///
/// The failure texts are intentionally generic: a failed login never reveals
/// whether the username exists, and a rejected transfer never reveals which
/// side was invalid or what the sender's balance is.
pub mod messages {
    pub const AUTHENTICATION_SUCCESSFUL: &str = "Authentication successful";
    pub const AUTHENTICATION_FAILED: &str = "Authentication failed";
    pub const USER_NOT_FOUND: &str = "User not found";
    pub const FUNDS_TRANSFERRED: &str = "Funds transferred successfully";
    pub const TRANSFER_REJECTED: &str = "Insufficient funds or invalid user";
}

/// Request body for POST /login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    /// Plaintext password, verified against the stored hash and never persisted
    pub password: String,
}

/// Response body for POST /login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub authenticated: bool,
    pub message: String,
    /// Current balance, present only on successful authentication
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<i64>,
}

/// Request body for POST /get_balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceRequest {
    pub username: String,
}

/// Response body for POST /get_balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceResponse {
    /// Current balance, or null when the user does not exist
    pub balance: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Request body for POST /transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub sender: String,
    pub receiver: String,
    /// Amount to move, in whole currency units (must be positive)
    pub amount: i64,
}

/// Response body for POST /transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferResponse {
    pub success: bool,
    pub message: String,
}

/// Field-level validation errors for incoming requests
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyUsername,
    EmptyPassword,
    EmptySender,
    EmptyReceiver,
    AmountNotPositive,
    SenderIsReceiver,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyUsername => write!(f, "username must not be empty"),
            ValidationError::EmptyPassword => write!(f, "password must not be empty"),
            ValidationError::EmptySender => write!(f, "sender must not be empty"),
            ValidationError::EmptyReceiver => write!(f, "receiver must not be empty"),
            ValidationError::AmountNotPositive => write!(f, "amount must be positive"),
            ValidationError::SenderIsReceiver => write!(f, "sender and receiver must differ"),
        }
    }
}

impl std::error::Error for ValidationError {}

impl LoginRequest {
    /// Check required fields before the request reaches the domain layer
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.username.trim().is_empty() {
            return Err(ValidationError::EmptyUsername);
        }
        if self.password.is_empty() {
            return Err(ValidationError::EmptyPassword);
        }
        Ok(())
    }
}

impl BalanceRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.username.trim().is_empty() {
            return Err(ValidationError::EmptyUsername);
        }
        Ok(())
    }
}

impl TransferRequest {
    /// Check required fields and amount bounds before the request reaches
    /// the domain layer
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sender.trim().is_empty() {
            return Err(ValidationError::EmptySender);
        }
        if self.receiver.trim().is_empty() {
            return Err(ValidationError::EmptyReceiver);
        }
        if self.amount <= 0 {
            return Err(ValidationError::AmountNotPositive);
        }
        if self.sender == self.receiver {
            return Err(ValidationError::SenderIsReceiver);
        }
        Ok(())
    }
}

impl LoginResponse {
    /// Successful login carrying the current balance
    pub fn authenticated(balance: i64) -> Self {
        Self {
            authenticated: true,
            message: messages::AUTHENTICATION_SUCCESSFUL.to_string(),
            balance: Some(balance),
        }
    }

    /// Failed login; identical for unknown usernames and wrong passwords
    pub fn rejected() -> Self {
        Self {
            authenticated: false,
            message: messages::AUTHENTICATION_FAILED.to_string(),
            balance: None,
        }
    }
}

impl BalanceResponse {
    pub fn found(balance: i64) -> Self {
        Self {
            balance: Some(balance),
            message: None,
        }
    }

    pub fn not_found() -> Self {
        Self {
            balance: None,
            message: Some(messages::USER_NOT_FOUND.to_string()),
        }
    }
}

impl TransferResponse {
    pub fn completed() -> Self {
        Self {
            success: true,
            message: messages::FUNDS_TRANSFERRED.to_string(),
        }
    }

    /// Rejected transfer; identical for unknown accounts and insufficient funds
    pub fn rejected() -> Self {
        Self {
            success: false,
            message: messages::TRANSFER_REJECTED.to_string(),
        }
    }
}
