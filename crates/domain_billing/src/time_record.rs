//! Time records
//!
//! A time record is a consultant's statement of hours worked on a
//! project activity. Daily records carry a single hour count; weekly
//! records carry one count per weekday and the total is computed. The
//! total is always stored quantized to two decimal places, half up.
//!
//! Records start pending, are approved or rejected by management, and
//! only approved records that are not yet attached to an invoice are
//! eligible for billing closure.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ActivityId, ClientId, ConsultantId, InvoiceId, ProjectId, TimeRecordId};
use crate::error::BillingError;

/// Daily or weekly entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRecordKind {
    Daily,
    Weekly,
}

/// Review workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRecordStatus {
    Pending,
    Approved,
    Rejected,
}

/// Hours per weekday for weekly records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekHours {
    pub monday: Option<Decimal>,
    pub tuesday: Option<Decimal>,
    pub wednesday: Option<Decimal>,
    pub thursday: Option<Decimal>,
    pub friday: Option<Decimal>,
    pub saturday: Option<Decimal>,
    pub sunday: Option<Decimal>,
}

impl WeekHours {
    fn days(&self) -> [Option<Decimal>; 7] {
        [
            self.monday,
            self.tuesday,
            self.wednesday,
            self.thursday,
            self.friday,
            self.saturday,
            self.sunday,
        ]
    }

    pub fn total(&self) -> Decimal {
        self.days()
            .into_iter()
            .map(|d| d.unwrap_or(Decimal::ZERO))
            .sum()
    }

    fn has_negative(&self) -> bool {
        self.days()
            .into_iter()
            .flatten()
            .any(|d| d.is_sign_negative())
    }
}

/// A consultant's time record against a project activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeRecord {
    pub id: TimeRecordId,
    pub activity_id: ActivityId,
    pub project_id: ProjectId,
    pub client_id: ClientId,
    pub consultant_id: ConsultantId,
    pub kind: TimeRecordKind,
    pub status: TimeRecordStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Hours for daily records
    pub hours: Option<Decimal>,
    /// Hours per weekday for weekly records
    pub week_hours: WeekHours,
    /// Computed from `hours` or `week_hours`, 2dp half up
    pub total_hours: Decimal,
    pub description: String,
    pub rejection_reason: String,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Set when consumed by billing closure
    pub invoice_id: Option<InvoiceId>,
    /// Denormalized invoice number for listings
    pub invoice_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimeRecord {
    /// Creates a pending daily record
    pub fn daily(
        activity_id: ActivityId,
        project_id: ProjectId,
        client_id: ClientId,
        consultant_id: ConsultantId,
        day: NaiveDate,
        hours: Decimal,
    ) -> Self {
        let mut record = Self::base(
            activity_id,
            project_id,
            client_id,
            consultant_id,
            TimeRecordKind::Daily,
            day,
            day,
        );
        record.hours = Some(hours);
        record.total_hours = record.calculate_total_hours();
        record
    }

    /// Creates a pending weekly record
    pub fn weekly(
        activity_id: ActivityId,
        project_id: ProjectId,
        client_id: ClientId,
        consultant_id: ConsultantId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        week_hours: WeekHours,
    ) -> Self {
        let mut record = Self::base(
            activity_id,
            project_id,
            client_id,
            consultant_id,
            TimeRecordKind::Weekly,
            start_date,
            end_date,
        );
        record.week_hours = week_hours;
        record.total_hours = record.calculate_total_hours();
        record
    }

    fn base(
        activity_id: ActivityId,
        project_id: ProjectId,
        client_id: ClientId,
        consultant_id: ConsultantId,
        kind: TimeRecordKind,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TimeRecordId::new_v7(),
            activity_id,
            project_id,
            client_id,
            consultant_id,
            kind,
            status: TimeRecordStatus::Pending,
            start_date,
            end_date,
            hours: None,
            week_hours: WeekHours::default(),
            total_hours: Decimal::ZERO,
            description: String::new(),
            rejection_reason: String::new(),
            reviewed_by: None,
            reviewed_at: None,
            invoice_id: None,
            invoice_number: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Total hours: the weekly grid summed, or the daily count
    pub fn calculate_total_hours(&self) -> Decimal {
        let total = match self.kind {
            TimeRecordKind::Weekly => self.week_hours.total(),
            TimeRecordKind::Daily => self.hours.unwrap_or(Decimal::ZERO),
        };
        total.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
    }

    /// Validates dates and hour counts
    pub fn validate(&self) -> Result<(), BillingError> {
        let mut issues = Vec::new();

        if self.end_date < self.start_date {
            issues.push("end_date: must be on or after the start date".to_string());
        }
        match self.kind {
            TimeRecordKind::Daily => {
                match self.hours {
                    Some(h) if h > Decimal::ZERO => {}
                    Some(_) => issues.push("hours: must be greater than zero".to_string()),
                    None => issues.push("hours: required for daily records".to_string()),
                }
            }
            TimeRecordKind::Weekly => {
                if self.week_hours.has_negative() {
                    issues.push("week_hours: negative hours not allowed".to_string());
                }
                if self.week_hours.total() <= Decimal::ZERO {
                    issues.push("week_hours: at least one weekday required".to_string());
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(BillingError::Validation(issues))
        }
    }

    /// Approves a pending record
    pub fn approve(&mut self, reviewer: impl Into<String>) -> Result<(), BillingError> {
        if self.status != TimeRecordStatus::Pending {
            return Err(BillingError::InvalidState(format!(
                "only pending records can be approved, status is {:?}",
                self.status
            )));
        }
        self.status = TimeRecordStatus::Approved;
        self.reviewed_by = Some(reviewer.into());
        self.reviewed_at = Some(Utc::now());
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Rejects a pending record with a reason
    pub fn reject(
        &mut self,
        reviewer: impl Into<String>,
        reason: impl Into<String>,
    ) -> Result<(), BillingError> {
        if self.status != TimeRecordStatus::Pending {
            return Err(BillingError::InvalidState(format!(
                "only pending records can be rejected, status is {:?}",
                self.status
            )));
        }
        self.status = TimeRecordStatus::Rejected;
        self.rejection_reason = reason.into();
        self.reviewed_by = Some(reviewer.into());
        self.reviewed_at = Some(Utc::now());
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Approved and not yet consumed by a closure
    pub fn is_billable(&self) -> bool {
        self.status == TimeRecordStatus::Approved && self.invoice_id.is_none()
    }

    /// Links the record to the invoice that billed it
    pub fn attach_to_invoice(&mut self, invoice_id: InvoiceId, invoice_number: impl Into<String>) {
        self.invoice_id = Some(invoice_id);
        self.invoice_number = invoice_number.into();
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily(hours: Decimal) -> TimeRecord {
        TimeRecord::daily(
            ActivityId::new(),
            ProjectId::new(),
            ClientId::new(),
            ConsultantId::new(),
            date(2025, 1, 10),
            hours,
        )
    }

    #[test]
    fn test_daily_total_hours() {
        let record = daily(dec!(7.5));
        assert_eq!(record.total_hours, dec!(7.50));
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_weekly_total_sums_days() {
        let record = TimeRecord::weekly(
            ActivityId::new(),
            ProjectId::new(),
            ClientId::new(),
            ConsultantId::new(),
            date(2025, 1, 6),
            date(2025, 1, 12),
            WeekHours {
                monday: Some(dec!(8)),
                tuesday: Some(dec!(8)),
                wednesday: Some(dec!(4.25)),
                ..WeekHours::default()
            },
        );
        assert_eq!(record.total_hours, dec!(20.25));
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_daily_requires_positive_hours() {
        let record = daily(dec!(0));
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_weekly_requires_some_hours() {
        let record = TimeRecord::weekly(
            ActivityId::new(),
            ProjectId::new(),
            ClientId::new(),
            ConsultantId::new(),
            date(2025, 1, 6),
            date(2025, 1, 12),
            WeekHours::default(),
        );
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_negative_weekday_rejected() {
        let record = TimeRecord::weekly(
            ActivityId::new(),
            ProjectId::new(),
            ClientId::new(),
            ConsultantId::new(),
            date(2025, 1, 6),
            date(2025, 1, 12),
            WeekHours {
                monday: Some(dec!(10)),
                tuesday: Some(dec!(-2)),
                ..WeekHours::default()
            },
        );
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_inverted_dates_rejected() {
        let mut record = daily(dec!(8));
        record.end_date = date(2025, 1, 9);
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_approval_workflow() {
        let mut record = daily(dec!(8));
        record.approve("manager").unwrap();
        assert_eq!(record.status, TimeRecordStatus::Approved);
        assert!(record.is_billable());

        // Approved records cannot be re-reviewed
        assert!(record.approve("manager").is_err());
        assert!(record.reject("manager", "late").is_err());
    }

    #[test]
    fn test_rejection_records_reason() {
        let mut record = daily(dec!(8));
        record.reject("manager", "wrong activity").unwrap();
        assert_eq!(record.status, TimeRecordStatus::Rejected);
        assert_eq!(record.rejection_reason, "wrong activity");
        assert!(!record.is_billable());
    }

    #[test]
    fn test_attached_record_not_billable() {
        let mut record = daily(dec!(8));
        record.approve("manager").unwrap();
        record.attach_to_invoice(InvoiceId::new(), "FAT-202501-001");
        assert!(!record.is_billable());
        assert_eq!(record.invoice_number, "FAT-202501-001");
    }
}
