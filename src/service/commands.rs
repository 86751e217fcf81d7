//! Command definitions
//!
//! Commands carry the caller's input for operations that create records or
//! move money. Each command validates its own shape before any row is read.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{Amount, Balance, DomainError, Pin};

fn require_non_blank(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(format!("{field} is required")));
    }
    Ok(())
}

// =========================================================================
// CreateUserCommand
// =========================================================================

/// Command to register a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserCommand {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
    pub birthdate: NaiveDate,
}

impl CreateUserCommand {
    pub fn new(
        username: String,
        password: String,
        full_name: String,
        email: String,
        birthdate: NaiveDate,
    ) -> Self {
        Self {
            username,
            password,
            full_name,
            email,
            birthdate,
        }
    }

    /// Check required fields and that the birthdate lies before `today`
    pub fn validate(&self, today: NaiveDate) -> Result<(), DomainError> {
        require_non_blank("Username", &self.username)?;
        require_non_blank("Password", &self.password)?;
        require_non_blank("Full name", &self.full_name)?;
        require_non_blank("Email", &self.email)?;

        if self.birthdate >= today {
            return Err(DomainError::Validation(
                "Birthdate must be in the past".to_string(),
            ));
        }
        Ok(())
    }
}

// =========================================================================
// CreateAccountCommand
// =========================================================================

/// Command to open an account for an existing user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccountCommand {
    pub user_id: i64,
    pub account_number: String,
    pub pin: String,
    pub account_login_number: String,
    pub account_login_password: String,
    pub opening_balance: Decimal,
}

impl CreateAccountCommand {
    pub fn new(
        user_id: i64,
        account_number: String,
        pin: String,
        account_login_number: String,
        account_login_password: String,
    ) -> Self {
        Self {
            user_id,
            account_number,
            pin,
            account_login_number,
            account_login_password,
            opening_balance: Decimal::ZERO,
        }
    }

    pub fn with_opening_balance(mut self, opening_balance: Decimal) -> Self {
        self.opening_balance = opening_balance;
        self
    }

    /// Check required fields, PIN format and the opening balance
    pub fn validate(&self) -> Result<(Pin, Balance), DomainError> {
        require_non_blank("Account number", &self.account_number)?;
        require_non_blank("Account login number", &self.account_login_number)?;
        require_non_blank("Account login password", &self.account_login_password)?;

        let pin = Pin::new(self.pin.clone())?;
        let balance = Balance::new(self.opening_balance)?;
        Ok((pin, balance))
    }
}

// =========================================================================
// TransferCommand
// =========================================================================

/// Command to move money between two accounts identified by account number
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferCommand {
    pub sender_account_number: String,
    pub receiver_account_number: String,
    pub amount: Decimal,
}

impl TransferCommand {
    pub fn new(sender_account_number: String, receiver_account_number: String, amount: Decimal) -> Self {
        Self {
            sender_account_number,
            receiver_account_number,
            amount,
        }
    }

    /// Check the amount and that both account numbers are present
    pub fn validate(&self) -> Result<Amount, DomainError> {
        require_non_blank("Sender account number", &self.sender_account_number)?;
        require_non_blank("Receiver account number", &self.receiver_account_number)?;
        Ok(Amount::new(self.amount)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn user_command(birthdate: NaiveDate) -> CreateUserCommand {
        CreateUserCommand::new(
            "jdoe".to_string(),
            "secret".to_string(),
            "John Doe".to_string(),
            "jdoe@example.com".to_string(),
            birthdate,
        )
    }

    #[test]
    fn test_user_birthdate_must_be_past() {
        assert!(user_command(NaiveDate::from_ymd_opt(1990, 5, 1).unwrap())
            .validate(today())
            .is_ok());
        assert!(matches!(
            user_command(today()).validate(today()),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_user_blank_fields_rejected() {
        let mut cmd = user_command(NaiveDate::from_ymd_opt(1990, 5, 1).unwrap());
        cmd.full_name = "   ".to_string();
        let err = cmd.validate(today()).unwrap_err();
        assert_eq!(err, DomainError::Validation("Full name is required".to_string()));
    }

    #[test]
    fn test_account_command_validation() {
        let cmd = CreateAccountCommand::new(
            1,
            "123456789".to_string(),
            "1234".to_string(),
            "login123".to_string(),
            "password123".to_string(),
        )
        .with_opening_balance(dec!(1000));

        let (pin, balance) = cmd.validate().unwrap();
        assert_eq!(pin.as_str(), "1234");
        assert_eq!(balance.value(), dec!(1000));
    }

    #[test]
    fn test_account_command_rejects_bad_pin_and_balance() {
        let base = CreateAccountCommand::new(
            1,
            "123456789".to_string(),
            "12345".to_string(),
            "login123".to_string(),
            "password123".to_string(),
        );
        assert!(matches!(base.validate(), Err(DomainError::InvalidPin(_))));

        let mut negative = base.with_opening_balance(dec!(-1));
        negative.pin = "1234".to_string();
        assert!(matches!(negative.validate(), Err(DomainError::InvalidAmount(_))));
    }

    #[test]
    fn test_transfer_command_validation() {
        let cmd = TransferCommand::new("A-1".to_string(), "B-2".to_string(), dec!(100));
        assert_eq!(cmd.validate().unwrap().value(), dec!(100));

        let zero = TransferCommand::new("A-1".to_string(), "B-2".to_string(), Decimal::ZERO);
        assert!(matches!(zero.validate(), Err(DomainError::InvalidAmount(_))));

        let blank = TransferCommand::new("".to_string(), "B-2".to_string(), dec!(1));
        assert!(matches!(blank.validate(), Err(DomainError::Validation(_))));
    }
}
