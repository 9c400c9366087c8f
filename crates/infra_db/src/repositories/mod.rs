//! Repository implementations
//!
//! One repository per domain. Enumerations are stored as lowercase text
//! columns; the [`text`] module centralizes the string mapping so every
//! repository round-trips the same spellings.

pub mod party;
pub mod ledger;
pub mod reconciliation;
pub mod billing;
pub mod reports;

/// Text mappings for enum columns
pub(crate) mod text {
    use core_kernel::Currency;
    use domain_billing::{TimeRecordKind, TimeRecordStatus};
    use domain_ledger::{
        AccountNature, AccountStatus, AccountType, DreSign, EntryKind, EntryStatus,
        InvoicePaymentStatus, PaymentMethod,
    };
    use domain_party::{BankHolderType, ConsultantType, PartyStatus};
    use domain_reconciliation::{Direction, MovementSource};

    use crate::error::DatabaseError;

    pub fn currency(value: &str) -> Result<Currency, DatabaseError> {
        match value {
            "BRL" => Ok(Currency::BRL),
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            other => Err(DatabaseError::invalid_value("currency", other)),
        }
    }

    pub fn entry_kind_str(kind: EntryKind) -> &'static str {
        match kind {
            EntryKind::Payable => "payable",
            EntryKind::Receivable => "receivable",
        }
    }

    pub fn entry_kind(value: &str) -> Result<EntryKind, DatabaseError> {
        match value {
            "payable" => Ok(EntryKind::Payable),
            "receivable" => Ok(EntryKind::Receivable),
            other => Err(DatabaseError::invalid_value("kind", other)),
        }
    }

    pub fn entry_status_str(status: EntryStatus) -> &'static str {
        status.as_str()
    }

    pub fn entry_status(value: &str) -> Result<EntryStatus, DatabaseError> {
        match value {
            "open" => Ok(EntryStatus::Open),
            "overdue" => Ok(EntryStatus::Overdue),
            "paid" => Ok(EntryStatus::Paid),
            "canceled" => Ok(EntryStatus::Canceled),
            other => Err(DatabaseError::invalid_value("status", other)),
        }
    }

    pub fn payment_method_str(method: PaymentMethod) -> &'static str {
        match method {
            PaymentMethod::Pix => "pix",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Boleto => "boleto",
            PaymentMethod::Card => "card",
            PaymentMethod::Cash => "cash",
            PaymentMethod::Other => "other",
        }
    }

    pub fn payment_method(value: &str) -> Result<PaymentMethod, DatabaseError> {
        match value {
            "pix" => Ok(PaymentMethod::Pix),
            "transfer" => Ok(PaymentMethod::Transfer),
            "boleto" => Ok(PaymentMethod::Boleto),
            "card" => Ok(PaymentMethod::Card),
            "cash" => Ok(PaymentMethod::Cash),
            "other" => Ok(PaymentMethod::Other),
            other => Err(DatabaseError::invalid_value("payment_method", other)),
        }
    }

    pub fn invoice_payment_status_str(status: InvoicePaymentStatus) -> &'static str {
        match status {
            InvoicePaymentStatus::Unpaid => "unpaid",
            InvoicePaymentStatus::Paid => "paid",
        }
    }

    pub fn invoice_payment_status(value: &str) -> Result<InvoicePaymentStatus, DatabaseError> {
        match value {
            "unpaid" => Ok(InvoicePaymentStatus::Unpaid),
            "paid" => Ok(InvoicePaymentStatus::Paid),
            other => Err(DatabaseError::invalid_value("payment_status", other)),
        }
    }

    pub fn direction_str(direction: Direction) -> &'static str {
        direction.as_str()
    }

    pub fn direction(value: &str) -> Result<Direction, DatabaseError> {
        match value {
            "credit" => Ok(Direction::Credit),
            "debit" => Ok(Direction::Debit),
            other => Err(DatabaseError::invalid_value("direction", other)),
        }
    }

    pub fn movement_source_str(source: MovementSource) -> &'static str {
        match source {
            MovementSource::Manual => "manual",
            MovementSource::Ofx => "ofx",
        }
    }

    pub fn movement_source(value: &str) -> Result<MovementSource, DatabaseError> {
        match value {
            "manual" => Ok(MovementSource::Manual),
            "ofx" => Ok(MovementSource::Ofx),
            other => Err(DatabaseError::invalid_value("source", other)),
        }
    }

    pub fn time_record_kind_str(kind: TimeRecordKind) -> &'static str {
        match kind {
            TimeRecordKind::Daily => "daily",
            TimeRecordKind::Weekly => "weekly",
        }
    }

    pub fn time_record_kind(value: &str) -> Result<TimeRecordKind, DatabaseError> {
        match value {
            "daily" => Ok(TimeRecordKind::Daily),
            "weekly" => Ok(TimeRecordKind::Weekly),
            other => Err(DatabaseError::invalid_value("kind", other)),
        }
    }

    pub fn time_record_status_str(status: TimeRecordStatus) -> &'static str {
        match status {
            TimeRecordStatus::Pending => "pending",
            TimeRecordStatus::Approved => "approved",
            TimeRecordStatus::Rejected => "rejected",
        }
    }

    pub fn time_record_status(value: &str) -> Result<TimeRecordStatus, DatabaseError> {
        match value {
            "pending" => Ok(TimeRecordStatus::Pending),
            "approved" => Ok(TimeRecordStatus::Approved),
            "rejected" => Ok(TimeRecordStatus::Rejected),
            other => Err(DatabaseError::invalid_value("status", other)),
        }
    }

    pub fn party_status_str(status: PartyStatus) -> &'static str {
        match status {
            PartyStatus::Active => "active",
            PartyStatus::Inactive => "inactive",
        }
    }

    pub fn party_status(value: &str) -> Result<PartyStatus, DatabaseError> {
        match value {
            "active" => Ok(PartyStatus::Active),
            "inactive" => Ok(PartyStatus::Inactive),
            other => Err(DatabaseError::invalid_value("status", other)),
        }
    }

    pub fn consultant_type_str(kind: ConsultantType) -> &'static str {
        match kind {
            ConsultantType::Contractor => "contractor",
            ConsultantType::Employee => "employee",
        }
    }

    pub fn consultant_type(value: &str) -> Result<ConsultantType, DatabaseError> {
        match value {
            "contractor" => Ok(ConsultantType::Contractor),
            "employee" => Ok(ConsultantType::Employee),
            other => Err(DatabaseError::invalid_value("consultant_type", other)),
        }
    }

    pub fn holder_type_str(kind: BankHolderType) -> &'static str {
        match kind {
            BankHolderType::NaturalPerson => "natural_person",
            BankHolderType::LegalEntity => "legal_entity",
        }
    }

    pub fn holder_type(value: &str) -> Result<BankHolderType, DatabaseError> {
        match value {
            "natural_person" => Ok(BankHolderType::NaturalPerson),
            "legal_entity" => Ok(BankHolderType::LegalEntity),
            other => Err(DatabaseError::invalid_value("holder_type", other)),
        }
    }

    pub fn account_type_str(kind: AccountType) -> &'static str {
        match kind {
            AccountType::Asset => "asset",
            AccountType::Liability => "liability",
            AccountType::Equity => "equity",
            AccountType::Revenue => "revenue",
            AccountType::Cost => "cost",
            AccountType::Expense => "expense",
            AccountType::Other => "other",
        }
    }

    pub fn account_type(value: &str) -> Result<AccountType, DatabaseError> {
        match value {
            "asset" => Ok(AccountType::Asset),
            "liability" => Ok(AccountType::Liability),
            "equity" => Ok(AccountType::Equity),
            "revenue" => Ok(AccountType::Revenue),
            "cost" => Ok(AccountType::Cost),
            "expense" => Ok(AccountType::Expense),
            "other" => Ok(AccountType::Other),
            other => Err(DatabaseError::invalid_value("account_type", other)),
        }
    }

    pub fn nature_str(nature: AccountNature) -> &'static str {
        match nature {
            AccountNature::Debit => "debit",
            AccountNature::Credit => "credit",
        }
    }

    pub fn nature(value: &str) -> Result<AccountNature, DatabaseError> {
        match value {
            "debit" => Ok(AccountNature::Debit),
            "credit" => Ok(AccountNature::Credit),
            other => Err(DatabaseError::invalid_value("nature", other)),
        }
    }

    pub fn account_status_str(status: AccountStatus) -> &'static str {
        match status {
            AccountStatus::Active => "active",
            AccountStatus::Inactive => "inactive",
            AccountStatus::Pending => "pending",
        }
    }

    pub fn account_status(value: &str) -> Result<AccountStatus, DatabaseError> {
        match value {
            "active" => Ok(AccountStatus::Active),
            "inactive" => Ok(AccountStatus::Inactive),
            "pending" => Ok(AccountStatus::Pending),
            other => Err(DatabaseError::invalid_value("status", other)),
        }
    }

    pub fn dre_sign_str(sign: DreSign) -> &'static str {
        match sign {
            DreSign::Add => "add",
            DreSign::Subtract => "subtract",
        }
    }

    pub fn dre_sign(value: &str) -> Result<DreSign, DatabaseError> {
        match value {
            "add" => Ok(DreSign::Add),
            "subtract" => Ok(DreSign::Subtract),
            other => Err(DatabaseError::invalid_value("dre_sign", other)),
        }
    }
}
