//! Core vCard types.

mod data_type;
mod datetime;
mod media;
mod parameter;
mod property;
mod structured;
mod value;
mod vcard;
mod warning;

pub use data_type::VCardDataType;
pub use datetime::DateOrTime;
pub use media::MediaValue;
pub use parameter::{ParameterCatalog, VCardParameters, encodings, names as param_names};
pub use property::{PropertyKind, VCardProperty};
pub use structured::{
    Address, Agent, Gender, Organization, Related, Sex, StructuredName, TelUri, Telephone,
    Timezone,
};
pub use value::{PropertyValue, RawValue};
pub use vcard::{VCard, VCardVersion, describe_versions};
pub use warning::Warning;
