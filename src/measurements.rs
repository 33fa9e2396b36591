//! Measurement schemas mapped from device registers
//!
//! Six fixed measurements are derived from one device snapshot. Each field
//! is a small pure mapping from (page, register) to a scalar, expressed as
//! a tagged [`FieldSpec`] so the whole table is a static registry built at
//! compile time.

use crate::client::typing::RegisterValue;
use crate::client::{DeviceSnapshot, PageId};
use crate::error::{KotelError, Result};

/// How one measurement field is derived from the snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSpec {
    /// Typed value of one register
    Value {
        /// Page holding the register
        page: PageId,
        /// Register name
        register: &'static str,
    },

    /// `1 - value` of a 0/1 register whose raw polarity is inverted
    Inverted {
        /// Page holding the register
        page: PageId,
        /// Register name
        register: &'static str,
    },

    /// Three-valued season category derived from two mode registers
    ///
    /// The manual-override register wins: non-zero means season 2.
    /// Otherwise the selector register picks season 1 (selector 0) or
    /// season 0 (selector non-zero).
    Season {
        /// Manual-override mode register
        mode: (PageId, &'static str),
        /// Secondary season selector register
        selector: (PageId, &'static str),
    },
}

impl FieldSpec {
    /// Evaluate this field against a snapshot
    pub fn eval(&self, snapshot: &DeviceSnapshot) -> Result<RegisterValue> {
        match *self {
            FieldSpec::Value { page, register } => lookup(snapshot, page, register).cloned(),
            FieldSpec::Inverted { page, register } => {
                match lookup(snapshot, page, register)? {
                    RegisterValue::Integer(v) => Ok(RegisterValue::Integer(1 - v)),
                    RegisterValue::Float(v) => Ok(RegisterValue::Float(1.0 - v)),
                    RegisterValue::Text(v) => Err(KotelError::parse(format!(
                        "Register {register} is not numeric: {v:?}"
                    ))),
                }
            }
            FieldSpec::Season { mode, selector } => {
                let mode_value = integer(snapshot, mode)?;
                let selector_value = integer(snapshot, selector)?;
                let season = if mode_value != 0 {
                    2
                } else if selector_value == 0 {
                    1
                } else {
                    0
                };
                Ok(RegisterValue::Integer(season))
            }
        }
    }
}

fn lookup<'a>(
    snapshot: &'a DeviceSnapshot,
    page: PageId,
    register: &'static str,
) -> Result<&'a RegisterValue> {
    snapshot
        .get(&page)
        .and_then(|registers| registers.get(register))
        .ok_or_else(|| KotelError::missing_register(page.key(), register))
}

fn integer(snapshot: &DeviceSnapshot, reg: (PageId, &'static str)) -> Result<i64> {
    let (page, register) = reg;
    lookup(snapshot, page, register)?
        .as_integer()
        .ok_or_else(|| KotelError::parse(format!("Register {register} is not an integer")))
}

/// One named measurement: an ordered list of named field derivations
#[derive(Debug, Clone, Copy)]
pub struct MeasurementSpec {
    /// Schema name (namespace prefix is applied at record build time)
    pub name: &'static str,
    /// Field derivations in output order
    pub fields: &'static [(&'static str, FieldSpec)],
}

/// The result of applying one measurement spec to one snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRecord {
    /// Namespaced measurement name
    pub measurement: String,
    /// Field values in schema order
    pub fields: Vec<(&'static str, RegisterValue)>,
}

/// Apply a measurement spec to a snapshot
///
/// All-or-nothing: the first field that fails fails the whole record.
pub fn apply(
    spec: &MeasurementSpec,
    snapshot: &DeviceSnapshot,
    prefix: &str,
) -> Result<MeasurementRecord> {
    let mut fields = Vec::with_capacity(spec.fields.len());
    for (name, field_spec) in spec.fields {
        fields.push((*name, field_spec.eval(snapshot)?));
    }

    Ok(MeasurementRecord {
        measurement: format!("{prefix}{}", spec.name),
        fields,
    })
}

/// Find a registered measurement by schema name
pub fn find(name: &str) -> Option<&'static MeasurementSpec> {
    MEASUREMENTS.iter().find(|spec| spec.name == name)
}

/// The fixed measurement registry
///
/// Register bindings follow the controller firmware's page layout; the
/// mapper itself is generic over however many schemas are listed here.
pub static MEASUREMENTS: &[MeasurementSpec] = &[
    MeasurementSpec {
        name: "heating",
        fields: &[
            (
                "manual_regulation_point",
                FieldSpec::Value {
                    page: PageId::Heating,
                    register: "__R2373.1_BOOL_i",
                },
            ),
            (
                "manual_regulation_point_temperature",
                FieldSpec::Value {
                    page: PageId::Heating,
                    register: "__R2376_REAL_.1f",
                },
            ),
            (
                "curve_number",
                FieldSpec::Value {
                    page: PageId::Heating,
                    register: "__R2369_USINT_d",
                },
            ),
            (
                "curve_shift_comfort",
                FieldSpec::Value {
                    page: PageId::Heating,
                    register: "__R2502_REAL_.1f",
                },
            ),
            (
                "curve_shift_attenuation",
                FieldSpec::Value {
                    page: PageId::Heating,
                    register: "__R2516_REAL_.1f",
                },
            ),
            (
                "prewarming",
                FieldSpec::Value {
                    page: PageId::Heating,
                    register: "__R2362.1_BOOL_i",
                },
            ),
            (
                "season",
                FieldSpec::Season {
                    mode: (PageId::Heating, "__R190_USINT_u"),
                    selector: (PageId::Heating, "__R196_USINT_u"),
                },
            ),
            (
                "desired",
                FieldSpec::Value {
                    page: PageId::Heating,
                    register: "__R23596_REAL_.1f",
                },
            ),
            (
                "backwater",
                FieldSpec::Value {
                    page: PageId::Temperatures,
                    register: "__R23101_REAL_.1f",
                },
            ),
            (
                "status",
                FieldSpec::Value {
                    page: PageId::Statuses,
                    register: "__R24261.0_BOOL_i",
                },
            ),
        ],
    },
    MeasurementSpec {
        name: "hot_water",
        fields: &[
            (
                "enabled",
                FieldSpec::Value {
                    page: PageId::HotWater,
                    register: "__R4501.1_BOOL_i",
                },
            ),
            (
                "comfort",
                FieldSpec::Value {
                    page: PageId::HotWater,
                    register: "__R4513_REAL_.1f",
                },
            ),
            (
                "attenuation",
                FieldSpec::Value {
                    page: PageId::HotWater,
                    register: "__R4541_REAL_.1f",
                },
            ),
            (
                "desired",
                FieldSpec::Value {
                    page: PageId::HotWater,
                    register: "__R23612_REAL_.1f",
                },
            ),
            (
                "temperature",
                FieldSpec::Value {
                    page: PageId::Temperatures,
                    register: "__R23107_REAL_.1f",
                },
            ),
            (
                "status",
                FieldSpec::Value {
                    page: PageId::Statuses,
                    register: "__R24435.0_BOOL_i",
                },
            ),
        ],
    },
    MeasurementSpec {
        name: "compressor",
        fields: &[
            (
                "enabled",
                FieldSpec::Inverted {
                    page: PageId::Compressor,
                    register: "__R811.1_BOOL_i",
                },
            ),
            (
                "total_time",
                FieldSpec::Value {
                    page: PageId::Compressor,
                    register: "__R23658_UDINT_u",
                },
            ),
            (
                "temperature",
                FieldSpec::Value {
                    page: PageId::Temperatures,
                    register: "__R23083_REAL_.1f",
                },
            ),
            (
                "status",
                FieldSpec::Value {
                    page: PageId::Statuses,
                    register: "__R24434.6_BOOL_i",
                },
            ),
        ],
    },
    MeasurementSpec {
        name: "boiler",
        fields: &[
            (
                "enabled",
                FieldSpec::Inverted {
                    page: PageId::Boiler,
                    register: "__R1747.1_BOOL_i",
                },
            ),
            (
                "threshold",
                FieldSpec::Value {
                    page: PageId::Boiler,
                    register: "__R1858_REAL_.1f",
                },
            ),
            (
                "status_1",
                FieldSpec::Value {
                    page: PageId::Statuses,
                    register: "__R24029.0_BOOL_i",
                },
            ),
            (
                "status_2",
                FieldSpec::Value {
                    page: PageId::Statuses,
                    register: "__R24056.0_BOOL_i",
                },
            ),
            (
                "status_3",
                FieldSpec::Value {
                    page: PageId::Statuses,
                    register: "__R24083.0_BOOL_i",
                },
            ),
        ],
    },
    MeasurementSpec {
        name: "evaporator",
        fields: &[
            (
                "outdoors",
                FieldSpec::Value {
                    page: PageId::Temperatures,
                    register: "__R23065_REAL_.1f",
                },
            ),
            (
                "evaporator",
                FieldSpec::Value {
                    page: PageId::Temperatures,
                    register: "__R23071_REAL_.1f",
                },
            ),
            (
                "status_fan",
                FieldSpec::Value {
                    page: PageId::Statuses,
                    register: "__R24137.0_BOOL_i",
                },
            ),
        ],
    },
    MeasurementSpec {
        name: "heat_pump",
        fields: &[
            (
                "input",
                FieldSpec::Value {
                    page: PageId::Temperatures,
                    register: "__R23053_REAL_.1f",
                },
            ),
            (
                "output",
                FieldSpec::Value {
                    page: PageId::Temperatures,
                    register: "__R23059_REAL_.1f",
                },
            ),
            (
                "status",
                FieldSpec::Value {
                    page: PageId::Statuses,
                    register: "__R24434.7_BOOL_i",
                },
            ),
        ],
    },
];
