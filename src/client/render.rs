//! # Result Presentation
//!
//! Text rendering of an [`ExtractionResult`] and of the current error, plus
//! the copy-to-clipboard acknowledgment state. No business logic lives here.

use std::fmt::Write as _;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::common::error::NormalizedError;
use crate::common::messages::ExtractionResult;

/// Shown in place of any field the backend did not return.
pub const NOT_AVAILABLE: &str = "N/A";

/// How long the "copied" acknowledgment stays visible.
pub const COPY_ACK_DURATION: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Gender,
    DateOfBirth,
    AadhaarNumber,
    Pincode,
    Address,
}

impl Field {
    pub const PERSONAL: [Field; 4] = [
        Field::Name,
        Field::Gender,
        Field::DateOfBirth,
        Field::AadhaarNumber,
    ];
    pub const LOCATION: [Field; 2] = [Field::Pincode, Field::Address];

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Full Name",
            Field::Gender => "Gender",
            Field::DateOfBirth => "Date of Birth",
            Field::AadhaarNumber => "Aadhaar Number",
            Field::Pincode => "Pincode",
            Field::Address => "Address",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Gender => "gender",
            Field::DateOfBirth => "dob",
            Field::AadhaarNumber => "aadhaar",
            Field::Pincode => "pincode",
            Field::Address => "address",
        }
    }

    pub fn copyable(self) -> bool {
        !matches!(self, Field::Gender)
    }

    pub fn value(self, result: &ExtractionResult) -> Option<&str> {
        let value = match self {
            Field::Name => &result.name,
            Field::Gender => &result.gender,
            Field::DateOfBirth => return result.birth_date(),
            Field::AadhaarNumber => &result.aadhaar_number,
            Field::Pincode => &result.pincode,
            Field::Address => &result.address,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }

    /// Value for display: the field, or [`NOT_AVAILABLE`].
    pub fn display(self, result: &ExtractionResult) -> &str {
        self.value(result).unwrap_or(NOT_AVAILABLE)
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(Field::Name),
            "gender" => Ok(Field::Gender),
            "dob" | "dateofbirth" | "date-of-birth" => Ok(Field::DateOfBirth),
            "aadhaar" | "aadhaarnumber" | "aadhaar-number" => Ok(Field::AadhaarNumber),
            "pincode" => Ok(Field::Pincode),
            "address" => Ok(Field::Address),
            other => Err(format!("unknown field '{}'", other)),
        }
    }
}

pub fn render_result(result: &ExtractionResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Extracted Information");
    let _ = writeln!(out, "=====================");
    for (title, fields) in [
        ("Personal Information", &Field::PERSONAL[..]),
        ("Location Information", &Field::LOCATION[..]),
    ] {
        let _ = writeln!(out, "\n{}", title);
        for field in fields {
            let _ = writeln!(out, "  {:<15} {}", format!("{}:", field.label()), field.display(result));
        }
    }
    out
}

pub fn render_error(err: &NormalizedError) -> String {
    let mut out = format!("Error: {}", err.message);
    if let Some(details) = &err.details {
        let details = match details {
            serde_json::Value::String(s) => s.clone(),
            other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
        };
        let _ = write!(out, "\nDetails: {}", details);
    }
    out
}

/// Tracks which field was copied last and clears it after [`COPY_ACK_DURATION`].
#[derive(Debug, Default)]
pub struct CopyTracker {
    copied: Option<(Field, Instant)>,
}

impl CopyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy `field`, returning the text to put on the clipboard.
    ///
    /// Returns `None` for fields that cannot be copied or have no value.
    pub fn copy(&mut self, result: &ExtractionResult, field: Field, now: Instant) -> Option<String> {
        if !field.copyable() {
            return None;
        }
        let value = field.value(result)?.to_string();
        self.copied = Some((field, now));
        Some(value)
    }

    /// The field whose acknowledgment is still showing at `now`.
    pub fn copied_field(&self, now: Instant) -> Option<Field> {
        self.copied
            .filter(|(_, at)| now.saturating_duration_since(*at) < COPY_ACK_DURATION)
            .map(|(field, _)| field)
    }
}
