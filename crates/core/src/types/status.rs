//! Status enums for the office's records.
//!
//! Each enum mirrors a `CHECK (status IN (...))` constraint in the schema.
//! The stored text is produced by `as_str` and parsed back with `FromStr`;
//! anything outside the set is rejected instead of stored.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::UnknownVariant;

/// Defines a closed, text-backed enumeration.
///
/// The first listed variant is the `Default`, matching the column default.
macro_rules! stored_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$( Self::$variant ),+];

            /// Text stored in the database column.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $text ),+
                }
            }
        }

        impl Default for $name {
            #[allow(clippy::indexing_slicing)]
            fn default() -> Self {
                Self::ALL[0]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok(Self::$variant), )+
                    _ => Err(UnknownVariant::new($kind, s)),
                }
            }
        }
    };
}

stored_enum! {
    /// Lifecycle of a legal case.
    CaseStatus, "case status" {
        Open => "open",
        Closed => "closed",
        Pending => "pending",
        Postponed => "postponed",
    }
}

stored_enum! {
    /// Progress of an office task.
    TaskStatus, "task status" {
        Pending => "pending",
        InProgress => "in_progress",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

stored_enum! {
    /// Urgency of an office task.
    TaskPriority, "task priority" {
        Medium => "medium",
        Low => "low",
        High => "high",
        Urgent => "urgent",
    }
}

stored_enum! {
    /// State of a calendar appointment.
    AppointmentStatus, "appointment status" {
        Scheduled => "scheduled",
        Completed => "completed",
        Cancelled => "cancelled",
        Rescheduled => "rescheduled",
    }
}

stored_enum! {
    /// Billing state of an invoice.
    InvoiceStatus, "invoice status" {
        Draft => "draft",
        Sent => "sent",
        Paid => "paid",
        Overdue => "overdue",
        Cancelled => "cancelled",
    }
}

stored_enum! {
    /// State of a court hearing attached to a case.
    HearingStatus, "hearing status" {
        Scheduled => "scheduled",
        Completed => "completed",
        Postponed => "postponed",
        Cancelled => "cancelled",
    }
}

impl TaskStatus {
    /// Whether the task still needs attention.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }
}

impl InvoiceStatus {
    /// Whether the invoice still expects a payment.
    #[must_use]
    pub const fn is_outstanding(self) -> bool {
        matches!(self, Self::Sent | Self::Overdue)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_column_defaults() {
        assert_eq!(CaseStatus::default(), CaseStatus::Open);
        assert_eq!(TaskStatus::default(), TaskStatus::Pending);
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
        assert_eq!(AppointmentStatus::default(), AppointmentStatus::Scheduled);
        assert_eq!(InvoiceStatus::default(), InvoiceStatus::Draft);
        assert_eq!(HearingStatus::default(), HearingStatus::Scheduled);
    }

    #[test]
    fn test_every_variant_parses_back() {
        for status in CaseStatus::ALL {
            assert_eq!(status.as_str().parse::<CaseStatus>().unwrap(), *status);
        }
        for status in TaskStatus::ALL {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), *status);
        }
        for status in InvoiceStatus::ALL {
            assert_eq!(status.as_str().parse::<InvoiceStatus>().unwrap(), *status);
        }
    }

    #[test]
    fn test_out_of_set_value_is_rejected() {
        let err = "archived".parse::<CaseStatus>().unwrap_err();
        assert_eq!(err.kind, "case status");
        assert_eq!(err.to_string(), "invalid case status: archived");

        assert!("done".parse::<TaskStatus>().is_err());
        assert!("refunded".parse::<InvoiceStatus>().is_err());
    }

    #[test]
    fn test_in_progress_uses_snake_case() {
        assert_eq!(TaskStatus::InProgress.as_str(), "in_progress");
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn test_open_and_outstanding_helpers() {
        assert!(TaskStatus::InProgress.is_open());
        assert!(!TaskStatus::Cancelled.is_open());
        assert!(InvoiceStatus::Overdue.is_outstanding());
        assert!(!InvoiceStatus::Paid.is_outstanding());
    }
}
