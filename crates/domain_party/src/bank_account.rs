//! Company bank accounts
//!
//! Statement imports, system movements and settlements all reference one
//! of the company's bank accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::BankAccountId;

/// Whether the account belongs to a natural or legal person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BankHolderType {
    NaturalPerson,
    LegalEntity,
}

/// A bank account operated by the company
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyBankAccount {
    pub id: BankAccountId,
    /// Short label shown on screens ("Itau PJ", "Nubank")
    pub label: String,
    /// Clearing-house bank code ("341", "260")
    pub bank_code: String,
    pub branch: String,
    pub account_number: String,
    pub holder_type: BankHolderType,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl CompanyBankAccount {
    pub fn new(
        label: impl Into<String>,
        bank_code: impl Into<String>,
        branch: impl Into<String>,
        account_number: impl Into<String>,
    ) -> Self {
        Self {
            id: BankAccountId::new_v7(),
            label: label.into(),
            bank_code: bank_code.into(),
            branch: branch.into(),
            account_number: account_number.into(),
            holder_type: BankHolderType::LegalEntity,
            active: true,
            created_at: Utc::now(),
        }
    }

    /// Masked account number for display and logs
    pub fn masked_number(&self) -> String {
        let digits: Vec<char> = self.account_number.chars().collect();
        if digits.len() <= 2 {
            return "**".to_string();
        }
        let visible: String = digits[digits.len() - 2..].iter().collect();
        format!("***{visible}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_number_keeps_last_two_digits() {
        let account = CompanyBankAccount::new("Itau PJ", "341", "0123", "45678-9");
        assert_eq!(account.masked_number(), "***-9");
    }

    #[test]
    fn test_masked_number_short_account() {
        let account = CompanyBankAccount::new("X", "000", "0", "12");
        assert_eq!(account.masked_number(), "**");
    }
}
