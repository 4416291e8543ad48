use crate::plugin::{GroupId, PluginClass, PortDirection};
use crate::ports::{ClassifiedPort, PortDescriptor};
use serde::{Deserialize, Serialize};

/// A plugin-declared bundle of audio ports the host treats as one
/// multi-channel pad. `pad` is dense and 0-based per direction, assigned in
/// first-discovery order; `ports` keeps native enumeration order, which is
/// also the buffer-slot order at processing time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelGroup {
    pub id: GroupId,
    pub symbol: Option<String>,
    pub direction: PortDirection,
    pub pad: usize,
    pub ports: Vec<PortDescriptor>,
}

fn find_group<'a>(groups: &'a mut [ChannelGroup], id: &GroupId) -> Option<&'a mut ChannelGroup> {
    groups.iter_mut().find(|group| &group.id == id)
}

/// Aggregate grouped ports into per-direction channel groups. Collections
/// are append-only and keyed by opaque identity equality.
pub fn build_groups<P: PluginClass>(
    plugin: &P,
    classified: &[ClassifiedPort],
) -> (Vec<ChannelGroup>, Vec<ChannelGroup>) {
    let mut in_groups: Vec<ChannelGroup> = vec![];
    let mut out_groups: Vec<ChannelGroup> = vec![];

    for port in classified {
        let Some(id) = port.group.as_ref() else {
            continue;
        };
        let groups = match port.direction {
            PortDirection::Input => &mut in_groups,
            PortDirection::Output => &mut out_groups,
        };

        if find_group(groups, id).is_none() {
            groups.push(ChannelGroup {
                id: id.clone(),
                symbol: plugin.group_symbol(id),
                direction: port.direction,
                pad: groups.len(),
                ports: vec![],
            });
        }

        let group = find_group(groups, id).expect("group inserted above");
        let bundle_slot = group.ports.len();
        group.ports.push(PortDescriptor {
            index: port.index,
            bundle_slot: Some(bundle_slot),
        });
    }

    (in_groups, out_groups)
}
