//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for common entities across the
//! consulting core. Fixtures are consistent and predictable for unit
//! tests.

use chrono::NaiveDate;
use core_kernel::{Currency, Money, Period};
use domain_party::{Client, Consultant, ConsultantType, Supplier, TaxId};
use rust_decimal_macros::dec;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Standard BRL amount
    pub fn brl_100() -> Money {
        Money::brl(dec!(100.00))
    }

    /// Typical invoice value
    pub fn brl_invoice() -> Money {
        Money::brl(dec!(15000.00))
    }

    /// Typical hourly rate
    pub fn brl_rate() -> Money {
        Money::brl(dec!(180.00))
    }

    /// Zero BRL
    pub fn brl_zero() -> Money {
        Money::zero(Currency::BRL)
    }

    /// USD amount for currency mismatch tests
    pub fn usd_100() -> Money {
        Money::new(dec!(100.00), Currency::USD)
    }
}

/// Fixture for date/period test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Standard billing month start (Jan 1, 2025)
    pub fn month_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    /// Standard billing month end (Jan 31, 2025)
    pub fn month_end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
    }

    /// A day inside the billing month
    pub fn mid_month() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    /// A day after the billing month
    pub fn after_month() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 10).unwrap()
    }

    /// The standard one-month billing period
    pub fn billing_month() -> Period {
        Period::new(Self::month_start(), Self::month_end()).unwrap()
    }
}

/// Fixture for tax identifiers with valid check digits
pub struct TaxIdFixtures;

impl TaxIdFixtures {
    pub fn cpf() -> TaxId {
        TaxId::parse("529.982.247-25").unwrap()
    }

    pub fn cnpj() -> TaxId {
        TaxId::parse("11.222.333/0001-81").unwrap()
    }
}

/// Fixture for party records
pub struct PartyFixtures;

impl PartyFixtures {
    /// A standard active client with a 30-day payment term
    pub fn client() -> Client {
        Client::new("Acme Consultoria Ltda", "Acme", TaxIdFixtures::cnpj())
    }

    /// A supplier a contractor invoices through
    pub fn supplier() -> Supplier {
        Supplier::new("Dev Servicos ME", "Dev Servicos", TaxIdFixtures::cnpj())
    }

    /// A contractor consultant linked to [`Self::supplier`]'s id
    pub fn contractor(supplier: &Supplier) -> Consultant {
        Consultant::new("Ana Souza", "ana@example.com", ConsultantType::Contractor)
            .with_supplier(supplier.id)
    }
}
