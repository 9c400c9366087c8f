//! Tests for the party domain

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{ConsultantId, Money};
use domain_party::{
    Client, Consultant, ConsultantRate, ConsultantType, PartyError, RateTable, Supplier, TaxId,
};

mod tax_ids {
    use super::*;

    #[test]
    fn test_cpf_and_cnpj_round_trip_serde() {
        let cpf = TaxId::parse("529.982.247-25").unwrap();
        let json = serde_json::to_string(&cpf).unwrap();
        assert_eq!(json, "\"52998224725\"");
        let back: TaxId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cpf);
    }

    #[test]
    fn test_invalid_tax_id_fails_deserialization() {
        let result: Result<TaxId, _> = serde_json::from_str("\"12345678900\"");
        assert!(result.is_err());
    }
}

mod rates {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_rate_history_resolution_across_changes() {
        let id = ConsultantId::new();
        let mut table = RateTable::new();
        for (year, value) in [(2023, dec!(120)), (2024, dec!(150)), (2025, dec!(180))] {
            table
                .add(ConsultantRate {
                    consultant_id: id,
                    effective_from: date(year, 1, 1),
                    hourly_rate: Money::brl(value),
                })
                .unwrap();
        }

        assert_eq!(
            table.effective_rate(id, date(2023, 7, 1)).unwrap().amount(),
            dec!(120)
        );
        assert_eq!(
            table.effective_rate(id, date(2024, 12, 31)).unwrap().amount(),
            dec!(150)
        );
        assert_eq!(
            table.effective_rate(id, date(2026, 1, 1)).unwrap().amount(),
            dec!(180)
        );
    }

    #[test]
    fn test_missing_rate_is_an_error_not_a_default() {
        let table = RateTable::new();
        let err = table
            .effective_rate(ConsultantId::new(), date(2025, 1, 1))
            .unwrap_err();
        assert!(matches!(err, PartyError::NoEffectiveRate { .. }));
    }
}

mod parties {
    use super::*;

    #[test]
    fn test_contractor_requires_supplier_for_payables() {
        let supplier = Supplier::new(
            "Dev Servicos ME",
            "Dev Servicos",
            TaxId::parse("11.222.333/0001-81").unwrap(),
        );
        let consultant =
            Consultant::new("Ana Souza", "ana@example.com", ConsultantType::Contractor)
                .with_supplier(supplier.id);

        assert_eq!(consultant.supplier_id, Some(supplier.id));
    }

    #[test]
    fn test_client_statuses() {
        let mut client = Client::new(
            "Acme Ltda",
            "Acme",
            TaxId::parse("11.222.333/0001-81").unwrap(),
        );
        assert!(client.status.is_active());
        client.deactivate();
        assert!(!client.status.is_active());
    }
}
