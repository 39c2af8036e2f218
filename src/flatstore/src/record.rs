//! Record codec.
//!
//! Each corpus line is a `|`-delimited tuple with a fixed schema:
//!
//! ```text
//! 00000001|GARCIA|LOPEZ|JUAN|19800101|...|MARIA|PEDRO
//!    id    surname surname given  birth      mother father
//! ```
//!
//! Parsing never fails. Extra parts are dropped and missing trailing parts
//! become empty strings, so both engines always hand out fully defined
//! records of the same shape.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Field delimiter within a corpus line.
pub const DELIMITER: u8 = b'|';

/// Number of fields in a record.
pub const FIELD_COUNT: usize = 16;

/// A named position in the record schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    PaternalSurname,
    MaternalSurname,
    GivenNames,
    BirthDate,
    RegistrationDate,
    IssueDate,
    ExpiryDate,
    BirthGeoCode,
    AddressGeoCode,
    Address,
    Sex,
    MaritalStatus,
    CheckDigit,
    MotherName,
    FatherName,
}

/// Schema in column order.
pub const SCHEMA: [Field; FIELD_COUNT] = [
    Field::Id,
    Field::PaternalSurname,
    Field::MaternalSurname,
    Field::GivenNames,
    Field::BirthDate,
    Field::RegistrationDate,
    Field::IssueDate,
    Field::ExpiryDate,
    Field::BirthGeoCode,
    Field::AddressGeoCode,
    Field::Address,
    Field::Sex,
    Field::MaritalStatus,
    Field::CheckDigit,
    Field::MotherName,
    Field::FatherName,
];

impl Field {
    /// Column position of this field.
    pub fn position(self) -> usize {
        self as usize
    }

    /// Serialized name of this field.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::PaternalSurname => "paternal_surname",
            Field::MaternalSurname => "maternal_surname",
            Field::GivenNames => "given_names",
            Field::BirthDate => "birth_date",
            Field::RegistrationDate => "registration_date",
            Field::IssueDate => "issue_date",
            Field::ExpiryDate => "expiry_date",
            Field::BirthGeoCode => "birth_geo_code",
            Field::AddressGeoCode => "address_geo_code",
            Field::Address => "address",
            Field::Sex => "sex",
            Field::MaritalStatus => "marital_status",
            Field::CheckDigit => "check_digit",
            Field::MotherName => "mother_name",
            Field::FatherName => "father_name",
        }
    }

    /// Look up a field by its serialized name.
    pub fn from_name(name: &str) -> Option<Field> {
        SCHEMA.iter().copied().find(|f| f.as_str() == name)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed corpus line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    fields: [String; FIELD_COUNT],
}

impl Record {
    /// Parse a line into a record. Never fails.
    pub fn parse(line: &str) -> Self {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let mut parts = line.split(DELIMITER as char);
        let fields = std::array::from_fn(|_| parts.next().unwrap_or_default().to_string());
        Self { fields }
    }

    /// Parse raw corpus bytes; invalid UTF-8 is replaced.
    pub fn parse_bytes(line: &[u8]) -> Self {
        Self::parse(&String::from_utf8_lossy(line))
    }

    /// Value of `field`; empty when the line was short.
    pub fn get(&self, field: Field) -> &str {
        &self.fields[field.position()]
    }

    /// The record identifier (leading field).
    pub fn id(&self) -> &str {
        self.get(Field::Id)
    }

    /// Field values in schema order.
    pub fn values(&self) -> &[String] {
        &self.fields
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FIELD_COUNT))?;
        for field in SCHEMA {
            map.serialize_entry(field.as_str(), self.get(field))?;
        }
        map.end()
    }
}

/// Leading field of a raw line, without parsing the rest.
pub(crate) fn leading_field(line: &[u8]) -> &[u8] {
    match line.iter().position(|&b| b == DELIMITER) {
        Some(pos) => &line[..pos],
        None => line.strip_suffix(b"\r").unwrap_or(line),
    }
}
