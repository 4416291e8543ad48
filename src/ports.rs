use crate::plugin::{GroupId, PluginClass, PortDirection, SignalKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One native port as referenced by the schema. `bundle_slot` is the port's
/// position within its channel group; `None` for ungrouped ports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortDescriptor {
    pub index: usize,
    pub bundle_slot: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassifiedPort {
    pub index: usize,
    pub direction: PortDirection,
    pub kind: SignalKind,
    pub group: Option<GroupId>,
}

/// Classify every native port in enumeration order. Group membership implies
/// an audio channel, so grouped ports are never separately kind-classified.
/// Ports matching neither the audio nor the control class are dropped from
/// the result and never surface as an error.
pub fn classify<P: PluginClass>(plugin: &P) -> Vec<ClassifiedPort> {
    let count = plugin.ports_count();
    let mut classified = Vec::with_capacity(count);

    for index in 0..count {
        let direction = plugin.port_direction(index);

        if let Some(group) = plugin.port_group(index) {
            classified.push(ClassifiedPort {
                index,
                direction,
                kind: SignalKind::Audio,
                group: Some(group),
            });
            continue;
        }

        match plugin.port_kind(index) {
            Some(kind) => classified.push(ClassifiedPort {
                index,
                direction,
                kind,
                group: None,
            }),
            None => {
                debug!(port = index, "skipping port with unrecognized class");
            }
        }
    }

    classified
}
