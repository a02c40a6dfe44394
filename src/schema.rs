//! Record types, categorical domains, and derived-feature bucketing

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One row as it comes off the input CSV, before any cleaning.
///
/// Every field is optional: an empty cell deserializes to `None` and is
/// handled by the transform step, not treated as a parse failure.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    pub age: Option<i64>,
    pub sex: Option<String>,
    pub bmi: Option<f64>,
    pub children: Option<i64>,
    pub smoker: Option<String>,
    pub region: Option<String>,
    pub charges: Option<f64>,
}

/// Policyholder sex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Male, Sex::Female];

    /// Parse the raw CSV value; anything outside the domain is `None`.
    pub fn from_raw(value: &str) -> Option<Self> {
        match value {
            "male" => Some(Sex::Male),
            "female" => Some(Sex::Female),
            _ => None,
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sex::Male => "male",
            Sex::Female => "female",
        })
    }
}

/// Smoking status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SmokerStatus {
    Yes,
    No,
}

impl SmokerStatus {
    pub const ALL: [SmokerStatus; 2] = [SmokerStatus::Yes, SmokerStatus::No];

    pub fn from_raw(value: &str) -> Option<Self> {
        match value {
            "yes" => Some(SmokerStatus::Yes),
            "no" => Some(SmokerStatus::No),
            _ => None,
        }
    }
}

impl fmt::Display for SmokerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SmokerStatus::Yes => "yes",
            SmokerStatus::No => "no",
        })
    }
}

/// Residential region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Northeast,
    Northwest,
    Southeast,
    Southwest,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::Northeast,
        Region::Northwest,
        Region::Southeast,
        Region::Southwest,
    ];

    pub fn from_raw(value: &str) -> Option<Self> {
        match value {
            "northeast" => Some(Region::Northeast),
            "northwest" => Some(Region::Northwest),
            "southeast" => Some(Region::Southeast),
            "southwest" => Some(Region::Southwest),
            _ => None,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Region::Northeast => "northeast",
            Region::Northwest => "northwest",
            Region::Southeast => "southeast",
            Region::Southwest => "southwest",
        })
    }
}

/// BMI bucket derived from the fixed breakpoints
/// (0, 18.5) / [18.5, 25) / [25, 30) / [30, 100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub const ALL: [BmiCategory; 4] = [
        BmiCategory::Underweight,
        BmiCategory::Normal,
        BmiCategory::Overweight,
        BmiCategory::Obese,
    ];

    /// Bucket a BMI value. Values outside (0, 100) have no category.
    pub fn from_bmi(bmi: f64) -> Option<Self> {
        if bmi <= 0.0 || bmi >= 100.0 {
            return None;
        }
        Some(if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        })
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        })
    }
}

/// Age bucket derived from the fixed breakpoints
/// (0, 25] / (25, 35] / (35, 45] / (45, 55] / (55, 100].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AgeGroup {
    #[serde(rename = "18-25")]
    Age18To25,
    #[serde(rename = "26-35")]
    Age26To35,
    #[serde(rename = "36-45")]
    Age36To45,
    #[serde(rename = "46-55")]
    Age46To55,
    #[serde(rename = "56+")]
    Age56Plus,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 5] = [
        AgeGroup::Age18To25,
        AgeGroup::Age26To35,
        AgeGroup::Age36To45,
        AgeGroup::Age46To55,
        AgeGroup::Age56Plus,
    ];

    /// Bucket an age in years. Values outside (0, 100] have no group.
    pub fn from_age(age: u32) -> Option<Self> {
        Some(match age {
            1..=25 => AgeGroup::Age18To25,
            26..=35 => AgeGroup::Age26To35,
            36..=45 => AgeGroup::Age36To45,
            46..=55 => AgeGroup::Age46To55,
            56..=100 => AgeGroup::Age56Plus,
            _ => return None,
        })
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AgeGroup::Age18To25 => "18-25",
            AgeGroup::Age26To35 => "26-35",
            AgeGroup::Age36To45 => "36-45",
            AgeGroup::Age46To55 => "46-55",
            AgeGroup::Age56Plus => "56+",
        })
    }
}

/// One cleaned policyholder record: the seven typed raw fields followed by
/// the four derived features. Field order is the serialization order of the
/// processed CSV (7 raw + 4 derived columns).
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    pub age: u32,
    pub sex: Sex,
    pub bmi: f64,
    pub children: u32,
    pub smoker: SmokerStatus,
    pub region: Region,
    pub charges: f64,
    pub bmi_category: Option<BmiCategory>,
    pub age_group: Option<AgeGroup>,
    pub is_smoker: u8,
    pub charges_per_person: f64,
}

impl Record {
    /// Build a record from validated raw fields, computing every derived
    /// feature. Derivation is per record; nothing depends on other rows.
    pub fn new(
        age: u32,
        sex: Sex,
        bmi: f64,
        children: u32,
        smoker: SmokerStatus,
        region: Region,
        charges: f64,
    ) -> Self {
        Record {
            bmi_category: BmiCategory::from_bmi(bmi),
            age_group: AgeGroup::from_age(age),
            is_smoker: u8::from(smoker == SmokerStatus::Yes),
            charges_per_person: charges / f64::from(children + 1),
            age,
            sex,
            bmi,
            children,
            smoker,
            region,
            charges,
        }
    }
}

/// Closed set of grouping factors for charge aggregation.
///
/// Grouping by an arbitrary column-name string is rejected at construction
/// time: the only way in from text is [`GroupKey::from_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Sex,
    Smoker,
    Region,
    BmiCategory,
    AgeGroup,
    Children,
}

impl GroupKey {
    pub const ALL: [GroupKey; 6] = [
        GroupKey::Sex,
        GroupKey::Smoker,
        GroupKey::Region,
        GroupKey::BmiCategory,
        GroupKey::AgeGroup,
        GroupKey::Children,
    ];

    /// Column name of this factor in the processed dataset.
    pub fn column_name(self) -> &'static str {
        match self {
            GroupKey::Sex => "sex",
            GroupKey::Smoker => "smoker",
            GroupKey::Region => "region",
            GroupKey::BmiCategory => "bmi_category",
            GroupKey::AgeGroup => "age_group",
            GroupKey::Children => "children",
        }
    }

    /// Category label of `record` under this factor, or `None` when the
    /// record falls in no bucket (out-of-range BMI or age).
    pub fn label_for(self, record: &Record) -> Option<String> {
        match self {
            GroupKey::Sex => Some(record.sex.to_string()),
            GroupKey::Smoker => Some(record.smoker.to_string()),
            GroupKey::Region => Some(record.region.to_string()),
            GroupKey::BmiCategory => record.bmi_category.map(|c| c.to_string()),
            GroupKey::AgeGroup => record.age_group.map(|g| g.to_string()),
            GroupKey::Children => Some(record.children.to_string()),
        }
    }
}

impl FromStr for GroupKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sex" => Ok(GroupKey::Sex),
            "smoker" => Ok(GroupKey::Smoker),
            "region" => Ok(GroupKey::Region),
            "bmi_category" => Ok(GroupKey::BmiCategory),
            "age_group" => Ok(GroupKey::AgeGroup),
            "children" => Ok(GroupKey::Children),
            other => Err(Error::UnknownField(other.to_string())),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}
