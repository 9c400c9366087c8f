//! Effective-dated consultant rates
//!
//! A consultant's hourly rate changes over time; billing closure must
//! price each time record with the rate that was effective on the
//! record's start date. Rates never overlap: at most one rate per
//! consultant per effective date, and the latest `effective_from` on or
//! before the lookup date wins.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{ConsultantId, Money};
use crate::error::PartyError;

/// An hourly rate effective from a given date onward
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultantRate {
    pub consultant_id: ConsultantId,
    pub effective_from: NaiveDate,
    pub hourly_rate: Money,
}

/// In-memory rate lookup used by billing closure
///
/// Repositories load the relevant consultants' rates into a table; the
/// closure aggregator then resolves rates without further queries.
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    rates: Vec<ConsultantRate>,
}

impl RateTable {
    pub fn new() -> Self {
        Self { rates: Vec::new() }
    }

    /// Adds a rate, rejecting a duplicate effective date for the consultant
    pub fn add(&mut self, rate: ConsultantRate) -> Result<(), PartyError> {
        let duplicate = self.rates.iter().any(|r| {
            r.consultant_id == rate.consultant_id && r.effective_from == rate.effective_from
        });
        if duplicate {
            return Err(PartyError::DuplicateRate {
                consultant: rate.consultant_id.to_string(),
                date: rate.effective_from.to_string(),
            });
        }
        self.rates.push(rate);
        Ok(())
    }

    /// Resolves the rate effective on `date` for the consultant
    ///
    /// Picks the rate with the latest `effective_from` that is on or
    /// before the date.
    pub fn effective_rate(
        &self,
        consultant_id: ConsultantId,
        date: NaiveDate,
    ) -> Result<Money, PartyError> {
        self.rates
            .iter()
            .filter(|r| r.consultant_id == consultant_id && r.effective_from <= date)
            .max_by_key(|r| r.effective_from)
            .map(|r| r.hourly_rate)
            .ok_or_else(|| PartyError::NoEffectiveRate {
                consultant: consultant_id.to_string(),
                date: date.to_string(),
            })
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rate(consultant_id: ConsultantId, from: NaiveDate, value: rust_decimal::Decimal) -> ConsultantRate {
        ConsultantRate {
            consultant_id,
            effective_from: from,
            hourly_rate: Money::brl(value),
        }
    }

    #[test]
    fn test_latest_effective_rate_wins() {
        let id = ConsultantId::new();
        let mut table = RateTable::new();
        table.add(rate(id, date(2024, 1, 1), dec!(150))).unwrap();
        table.add(rate(id, date(2025, 1, 1), dec!(180))).unwrap();

        assert_eq!(
            table.effective_rate(id, date(2024, 6, 1)).unwrap().amount(),
            dec!(150)
        );
        assert_eq!(
            table.effective_rate(id, date(2025, 6, 1)).unwrap().amount(),
            dec!(180)
        );
    }

    #[test]
    fn test_rate_effective_on_its_start_date() {
        let id = ConsultantId::new();
        let mut table = RateTable::new();
        table.add(rate(id, date(2025, 1, 1), dec!(180))).unwrap();

        assert!(table.effective_rate(id, date(2025, 1, 1)).is_ok());
        assert!(matches!(
            table.effective_rate(id, date(2024, 12, 31)),
            Err(PartyError::NoEffectiveRate { .. })
        ));
    }

    #[test]
    fn test_duplicate_effective_date_rejected() {
        let id = ConsultantId::new();
        let mut table = RateTable::new();
        table.add(rate(id, date(2025, 1, 1), dec!(180))).unwrap();
        assert!(matches!(
            table.add(rate(id, date(2025, 1, 1), dec!(200))),
            Err(PartyError::DuplicateRate { .. })
        ));
    }

    #[test]
    fn test_rates_isolated_per_consultant() {
        let a = ConsultantId::new();
        let b = ConsultantId::new();
        let mut table = RateTable::new();
        table.add(rate(a, date(2025, 1, 1), dec!(180))).unwrap();

        assert!(table.effective_rate(b, date(2025, 6, 1)).is_err());
    }
}
