//! Data models for the linkage engine.

pub mod feature;
pub mod identifier;
pub mod person;
pub mod pii;

pub use feature::Feature;
pub use identifier::Identifier;
pub use person::{BlockingValue, Patient, Person};
pub use pii::{
    PiiAddress, PiiName, PiiRecord, RawPiiAddress, RawPiiName, RawPiiRecord, RawTelecom, Telecom,
    TelecomSystem,
};
