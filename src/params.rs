use crate::plugin::{PluginClass, PortRange};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterKind {
    Boolean,
    Integer,
    Float,
}

/// Host-facing description of one control port. Ranges are stored as floats
/// even for boolean and integer parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    pub kind: ParameterKind,
    pub lower: f32,
    pub upper: f32,
    pub default: f32,
    pub controllable: bool,
    pub writable: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParameterValue {
    Boolean(bool),
    Integer(i32),
    Float(f32),
}

pub fn value_kind(value: ParameterValue) -> ParameterKind {
    match value {
        ParameterValue::Boolean(_) => ParameterKind::Boolean,
        ParameterValue::Integer(_) => ParameterKind::Integer,
        ParameterValue::Float(_) => ParameterKind::Float,
    }
}

/// Derive a parameter descriptor from a control port's metadata. Missing
/// metadata falls back to defined defaults; an out-of-range default widens
/// the declared bound and is reported as a correctable inconsistency.
pub fn derive_param_spec<P: PluginClass>(
    plugin: &P,
    port: usize,
    writable: bool,
) -> ParameterDescriptor {
    let name = plugin
        .port_symbol(port)
        .unwrap_or_else(|| format!("port_{port}"));

    if plugin.port_is_toggled(port) {
        // Toggled ports ignore any numeric range metadata.
        return ParameterDescriptor {
            name,
            kind: ParameterKind::Boolean,
            lower: 0.0,
            upper: 1.0,
            default: 0.0,
            controllable: true,
            writable,
        };
    }

    let PortRange {
        default,
        minimum,
        maximum,
    } = plugin.port_range(port);
    let default = default.unwrap_or(0.0);
    let mut lower = minimum.unwrap_or(0.0);
    let mut upper = maximum.unwrap_or(1.0);

    if default < lower {
        warn!(
            uri = %plugin.uri(),
            port, lower, default, "lower bound above default, forcing it down"
        );
        lower = default;
    }
    if default > upper {
        warn!(
            uri = %plugin.uri(),
            port, upper, default, "upper bound below default, forcing it up"
        );
        upper = default;
    }

    let kind = if plugin.port_is_integer(port) {
        ParameterKind::Integer
    } else {
        ParameterKind::Float
    };

    ParameterDescriptor {
        name,
        kind,
        lower,
        upper,
        default,
        controllable: true,
        writable,
    }
}

/// The descriptor's default as a host-facing value.
pub fn default_value(descriptor: &ParameterDescriptor) -> ParameterValue {
    match descriptor.kind {
        ParameterKind::Boolean => ParameterValue::Boolean(descriptor.default > 0.0),
        ParameterKind::Integer => ParameterValue::Integer(descriptor.default as i32),
        ParameterKind::Float => ParameterValue::Float(descriptor.default),
    }
}

/// Translate a host-facing value into native control-port storage. Booleans
/// use the native gate polarity: true is stored as 0.0, false as 1.0.
pub fn encode_value(value: ParameterValue) -> f32 {
    match value {
        ParameterValue::Boolean(on) => {
            if on {
                0.0
            } else {
                1.0
            }
        }
        ParameterValue::Integer(v) => v as f32,
        ParameterValue::Float(v) => v,
    }
}

/// Translate native control-port storage back into a host-facing value.
/// Booleans report stored values above 0.0 as true; integers are clamped to
/// the representable range and truncated.
pub fn decode_value(kind: ParameterKind, stored: f32) -> ParameterValue {
    match kind {
        ParameterKind::Boolean => ParameterValue::Boolean(stored > 0.0),
        ParameterKind::Integer => {
            ParameterValue::Integer(stored.clamp(i32::MIN as f32, i32::MAX as f32) as i32)
        }
        ParameterKind::Float => ParameterValue::Float(stored),
    }
}
