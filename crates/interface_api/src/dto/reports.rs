//! Report DTOs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use domain_reports::DreStatement;

#[derive(Debug, Deserialize)]
pub struct DreQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct DreLineResponse {
    pub subgroup: String,
    pub total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct DreGroupResponse {
    pub name: String,
    pub total: Decimal,
    pub lines: Vec<DreLineResponse>,
}

#[derive(Debug, Serialize)]
pub struct DreResponse {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub groups: Vec<DreGroupResponse>,
    pub net_result: Decimal,
    pub unclassified_total: Decimal,
}

impl From<DreStatement> for DreResponse {
    fn from(statement: DreStatement) -> Self {
        Self {
            period_start: statement.period.start(),
            period_end: statement.period.end(),
            groups: statement
                .groups
                .into_iter()
                .map(|group| DreGroupResponse {
                    name: group.name,
                    total: group.total,
                    lines: group
                        .lines
                        .into_iter()
                        .map(|line| DreLineResponse {
                            subgroup: line.subgroup,
                            total: line.total,
                        })
                        .collect(),
                })
                .collect(),
            net_result: statement.net_result,
            unclassified_total: statement.unclassified_total,
        }
    }
}
