//! DRE aggregation
//!
//! Input rows are amounts that already happened (settled payments and
//! receipts, classified bank movements) joined to their chart account's
//! DRE metadata. Aggregation is pure arithmetic: group, sum, apply the
//! sign, order by the configured DRE order. Amounts whose entry or
//! movement has no classification cannot be placed on the statement and
//! are reported as a separate unclassified total rather than silently
//! dropped.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::Period;
use domain_ledger::DreSign;

/// One settled/classified amount feeding the DRE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedAmount {
    /// DRE metadata from the chart account; None when unclassified
    pub classification: Option<DreClassification>,
    /// Positive magnitude of the settled amount
    pub amount: Decimal,
}

/// The chart account fields that place an amount on the DRE
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DreClassification {
    pub group: String,
    pub subgroup: String,
    pub order: u16,
    pub sign: DreSign,
}

/// One line (subgroup) of a DRE group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DreLine {
    pub subgroup: String,
    pub order: u16,
    /// Sum with the sign applied
    pub total: Decimal,
}

/// One DRE group with its lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DreGroup {
    pub name: String,
    pub order: u16,
    pub total: Decimal,
    pub lines: Vec<DreLine>,
}

/// The assembled profit-and-loss statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DreStatement {
    pub period: Period,
    pub groups: Vec<DreGroup>,
    /// Sum of all group totals
    pub net_result: Decimal,
    /// Magnitude that could not be placed for lack of classification
    pub unclassified_total: Decimal,
}

/// Builds DRE statements from classified amounts
pub struct DreAggregator;

impl DreAggregator {
    /// Aggregates rows into an ordered statement
    pub fn build(period: Period, rows: &[ClassifiedAmount]) -> DreStatement {
        let mut groups: Vec<DreGroup> = Vec::new();
        let mut unclassified_total = Decimal::ZERO;

        for row in rows {
            let classification = match &row.classification {
                Some(c) => c,
                None => {
                    unclassified_total += row.amount;
                    continue;
                }
            };
            let signed = match classification.sign {
                DreSign::Add => row.amount,
                DreSign::Subtract => -row.amount,
            };

            let group_index = match groups.iter().position(|g| g.name == classification.group) {
                Some(i) => i,
                None => {
                    groups.push(DreGroup {
                        name: classification.group.clone(),
                        order: classification.order,
                        total: Decimal::ZERO,
                        lines: Vec::new(),
                    });
                    groups.len() - 1
                }
            };
            let group = &mut groups[group_index];
            group.order = group.order.min(classification.order);
            group.total += signed;

            let line_index = match group
                .lines
                .iter()
                .position(|l| l.subgroup == classification.subgroup)
            {
                Some(i) => i,
                None => {
                    group.lines.push(DreLine {
                        subgroup: classification.subgroup.clone(),
                        order: classification.order,
                        total: Decimal::ZERO,
                    });
                    group.lines.len() - 1
                }
            };
            let line = &mut group.lines[line_index];
            line.order = line.order.min(classification.order);
            line.total += signed;
        }

        groups.sort_by_key(|g| g.order);
        for group in &mut groups {
            group.lines.sort_by_key(|l| l.order);
        }
        let net_result: Decimal = groups.iter().map(|g| g.total).sum();

        tracing::debug!(
            groups = groups.len(),
            net = %net_result,
            unclassified = %unclassified_total,
            "dre statement built"
        );

        DreStatement {
            period,
            groups,
            net_result,
            unclassified_total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn period() -> Period {
        Period::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        )
        .unwrap()
    }

    fn row(group: &str, subgroup: &str, order: u16, sign: DreSign, amount: Decimal) -> ClassifiedAmount {
        ClassifiedAmount {
            classification: Some(DreClassification {
                group: group.to_string(),
                subgroup: subgroup.to_string(),
                order,
                sign,
            }),
            amount,
        }
    }

    #[test]
    fn test_groups_sum_and_sign() {
        let rows = vec![
            row("Receita Bruta", "Servicos", 1, DreSign::Add, dec!(10000.00)),
            row("Receita Bruta", "Servicos", 1, DreSign::Add, dec!(5000.00)),
            row("Custos", "Consultores", 2, DreSign::Subtract, dec!(6000.00)),
            row("Despesas", "Tarifas", 3, DreSign::Subtract, dec!(250.00)),
        ];
        let statement = DreAggregator::build(period(), &rows);

        assert_eq!(statement.groups.len(), 3);
        assert_eq!(statement.groups[0].name, "Receita Bruta");
        assert_eq!(statement.groups[0].total, dec!(15000.00));
        assert_eq!(statement.groups[1].total, dec!(-6000.00));
        assert_eq!(statement.groups[2].total, dec!(-250.00));
        assert_eq!(statement.net_result, dec!(8750.00));
        assert!(statement.unclassified_total.is_zero());
    }

    #[test]
    fn test_groups_ordered_by_dre_order() {
        let rows = vec![
            row("Despesas", "", 9, DreSign::Subtract, dec!(1.00)),
            row("Receita", "", 1, DreSign::Add, dec!(2.00)),
            row("Custos", "", 5, DreSign::Subtract, dec!(3.00)),
        ];
        let statement = DreAggregator::build(period(), &rows);
        let names: Vec<&str> = statement.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Receita", "Custos", "Despesas"]);
    }

    #[test]
    fn test_lines_split_by_subgroup() {
        let rows = vec![
            row("Despesas", "Tarifas", 4, DreSign::Subtract, dec!(100.00)),
            row("Despesas", "Impostos", 3, DreSign::Subtract, dec!(300.00)),
            row("Despesas", "Tarifas", 4, DreSign::Subtract, dec!(50.00)),
        ];
        let statement = DreAggregator::build(period(), &rows);

        let group = &statement.groups[0];
        assert_eq!(group.total, dec!(-450.00));
        assert_eq!(group.lines.len(), 2);
        assert_eq!(group.lines[0].subgroup, "Impostos");
        assert_eq!(group.lines[1].subgroup, "Tarifas");
        assert_eq!(group.lines[1].total, dec!(-150.00));
    }

    #[test]
    fn test_unclassified_reported_not_dropped() {
        let rows = vec![
            row("Receita", "", 1, DreSign::Add, dec!(100.00)),
            ClassifiedAmount {
                classification: None,
                amount: dec!(42.00),
            },
        ];
        let statement = DreAggregator::build(period(), &rows);
        assert_eq!(statement.net_result, dec!(100.00));
        assert_eq!(statement.unclassified_total, dec!(42.00));
    }

    #[test]
    fn test_empty_input_is_an_empty_statement() {
        let statement = DreAggregator::build(period(), &[]);
        assert!(statement.groups.is_empty());
        assert!(statement.net_result.is_zero());
    }
}
