use std::{fmt, str::FromStr};

use crate::error::{UnknownVariant, ValidationError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TrackingStatus {
    Tracked,
    Untracked,
    #[default]
    Unset,
}

impl TrackingStatus {
    pub const SELECTABLE: [TrackingStatus; 2] =
        [TrackingStatus::Tracked, TrackingStatus::Untracked];

    /// Wire form sent to the workflow endpoint; empty when unset.
    pub fn as_str(self) -> &'static str {
        match self {
            TrackingStatus::Tracked => "Tracked",
            TrackingStatus::Untracked => "Untracked",
            TrackingStatus::Unset => "",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TrackingStatus::Unset => "Select status",
            other => other.as_str(),
        }
    }

    pub fn is_set(self) -> bool {
        self != TrackingStatus::Unset
    }
}

impl FromStr for TrackingStatus {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Tracked" => Ok(TrackingStatus::Tracked),
            "Untracked" => Ok(TrackingStatus::Untracked),
            "" => Ok(TrackingStatus::Unset),
            other => Err(UnknownVariant::new(RecordField::TrackingStatus, other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Store {
    Slidezz,
    Tt,
    A2k,
    #[default]
    Unset,
}

impl Store {
    pub const SELECTABLE: [Store; 3] = [Store::Slidezz, Store::Tt, Store::A2k];

    pub fn as_str(self) -> &'static str {
        match self {
            Store::Slidezz => "slidezz",
            Store::Tt => "TT",
            Store::A2k => "a2k",
            Store::Unset => "",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Store::Unset => "Select store",
            other => other.as_str(),
        }
    }

    pub fn is_set(self) -> bool {
        self != Store::Unset
    }
}

impl FromStr for Store {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "slidezz" => Ok(Store::Slidezz),
            "TT" => Ok(Store::Tt),
            "a2k" => Ok(Store::A2k),
            "" => Ok(Store::Unset),
            other => Err(UnknownVariant::new(RecordField::Store, other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    OrderNumber,
    TrackingStatus,
    Link,
    Store,
    Action,
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordField::OrderNumber => "order number",
            RecordField::TrackingStatus => "tracking status",
            RecordField::Link => "link",
            RecordField::Store => "store",
            RecordField::Action => "action",
        };
        f.write_str(name)
    }
}

/// Draft order-return record as edited by the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub order_number: String,
    pub tracking_status: TrackingStatus,
    pub link: String,
    pub store: Store,
    pub action: String,
}

impl Record {
    pub fn is_empty(&self) -> bool {
        self == &Record::default()
    }

    pub fn missing_fields(&self) -> Vec<RecordField> {
        let mut missing = Vec::new();
        if self.order_number.is_empty() {
            missing.push(RecordField::OrderNumber);
        }
        if !self.tracking_status.is_set() {
            missing.push(RecordField::TrackingStatus);
        }
        if !self.store.is_set() {
            missing.push(RecordField::Store);
        }
        missing
    }

    /// Link and action never gate submission.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { missing })
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting,
    Success,
    Error,
}

impl SubmissionStatus {
    pub fn is_transient(self) -> bool {
        matches!(self, SubmissionStatus::Success | SubmissionStatus::Error)
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubmissionStatus::Idle => "idle",
            SubmissionStatus::Submitting => "submitting",
            SubmissionStatus::Success => "success",
            SubmissionStatus::Error => "error",
        };
        f.write_str(name)
    }
}
