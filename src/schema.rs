use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::group::{ChannelGroup, build_groups};
use crate::params::{ParameterDescriptor, derive_param_spec};
use crate::plugin::{PluginClass, PortDirection, SignalKind};
use crate::ports::{PortDescriptor, classify};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const FALLBACK_NAME: &str = "no description available";
pub const FALLBACK_AUTHOR: &str = "no author available";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeCategory {
    Source,
    Sink,
    Analyzer,
    FilterEffect,
}

impl NodeCategory {
    pub fn tags(&self) -> &'static str {
        match self {
            NodeCategory::Source => "Source/Audio/LV2",
            NodeCategory::Sink => "Sink/Audio/LV2",
            NodeCategory::Analyzer => "Sink/Analyzer/Audio/LV2",
            NodeCategory::FilterEffect => "Filter/Effect/Audio/LV2",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDetails {
    pub long_name: String,
    pub author: String,
    pub category: NodeCategory,
}

/// One connection point the host must register for a plugin type. Group pads
/// carry the group's channel count; ungrouped pads carry exactly one channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PadTemplate {
    pub name: String,
    pub direction: PortDirection,
    pub index: usize,
    pub channels: usize,
}

/// Serializable summary of a plugin type for host-side tooling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PluginNodeInfo {
    pub uri: String,
    pub details: NodeDetails,
    pub pads: Vec<PadTemplate>,
    pub params: Vec<ParameterDescriptor>,
}

/// Complete derived description of one plugin type. Built exactly once at
/// discovery time, immutable thereafter, and shared read-only by every
/// instance of the type.
pub struct PluginTypeSchema<P: PluginClass> {
    pub uri: String,
    pub audio_in_ports: Vec<PortDescriptor>,
    pub audio_out_ports: Vec<PortDescriptor>,
    pub control_in_ports: Vec<PortDescriptor>,
    pub control_out_ports: Vec<PortDescriptor>,
    pub in_groups: Vec<ChannelGroup>,
    pub out_groups: Vec<ChannelGroup>,
    pub can_process_in_place: bool,
    pub details: NodeDetails,
    params: Vec<ParameterDescriptor>,
    pad_templates: Vec<PadTemplate>,
    plugin: P,
}

impl<P: PluginClass> fmt::Debug for PluginTypeSchema<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginTypeSchema")
            .field("uri", &self.uri)
            .field("audio_in", &self.audio_in_ports.len())
            .field("audio_out", &self.audio_out_ports.len())
            .field("groups_in", &self.in_groups.len())
            .field("groups_out", &self.out_groups.len())
            .field("params", &self.params.len())
            .finish()
    }
}

impl<P: PluginClass> PluginTypeSchema<P> {
    pub fn plugin(&self) -> &P {
        &self.plugin
    }

    pub fn pad_templates(&self) -> &[PadTemplate] {
        &self.pad_templates
    }

    /// Parameter descriptors: all control inputs in port-discovery order,
    /// followed by all control outputs.
    pub fn params(&self) -> &[ParameterDescriptor] {
        &self.params
    }

    /// A position past the declared parameter list is a schema/host mismatch
    /// and aborts.
    pub fn param_spec(&self, position: usize) -> &ParameterDescriptor {
        self.params.get(position).unwrap_or_else(|| {
            panic!(
                "parameter position {position} out of range for '{}' ({} declared)",
                self.uri,
                self.params.len()
            )
        })
    }

    pub fn node_info(&self) -> PluginNodeInfo {
        PluginNodeInfo {
            uri: self.uri.clone(),
            details: self.details.clone(),
            pads: self.pad_templates.clone(),
            params: self.params.clone(),
        }
    }
}

/// Build the schema for one plugin type. Never fails: absent metadata
/// resolves to defined fallbacks and unrecognized ports are dropped.
pub fn build_schema<P: PluginClass>(plugin: P) -> PluginTypeSchema<P> {
    let classified = classify(&plugin);
    let (in_groups, out_groups) = build_groups(&plugin, &classified);

    let mut audio_in_ports = vec![];
    let mut audio_out_ports = vec![];
    let mut control_in_ports = vec![];
    let mut control_out_ports = vec![];

    for port in &classified {
        if port.group.is_some() {
            continue;
        }
        let descriptor = PortDescriptor {
            index: port.index,
            bundle_slot: None,
        };
        match (port.kind, port.direction) {
            (SignalKind::Audio, PortDirection::Input) => audio_in_ports.push(descriptor),
            (SignalKind::Audio, PortDirection::Output) => audio_out_ports.push(descriptor),
            (SignalKind::Control, PortDirection::Input) => control_in_ports.push(descriptor),
            (SignalKind::Control, PortDirection::Output) => control_out_ports.push(descriptor),
        }
    }

    let category = if in_groups.is_empty() && audio_in_ports.is_empty() {
        NodeCategory::Source
    } else if out_groups.is_empty() && audio_out_ports.is_empty() {
        if control_out_ports.is_empty() {
            NodeCategory::Sink
        } else {
            NodeCategory::Analyzer
        }
    } else {
        NodeCategory::FilterEffect
    };

    let uri = plugin.uri();
    let details = NodeDetails {
        long_name: plugin.name().unwrap_or_else(|| FALLBACK_NAME.to_string()),
        author: plugin.author().unwrap_or_else(|| FALLBACK_AUTHOR.to_string()),
        category,
    };
    info!(uri = %uri, tags = details.category.tags(), "discovered plugin type");

    let mut params = Vec::with_capacity(control_in_ports.len() + control_out_ports.len());
    for descriptor in &control_in_ports {
        params.push(derive_param_spec(&plugin, descriptor.index, true));
    }
    for descriptor in &control_out_ports {
        params.push(derive_param_spec(&plugin, descriptor.index, false));
    }

    let mut pad_templates = vec![];
    for group in &in_groups {
        pad_templates.push(PadTemplate {
            name: group
                .symbol
                .clone()
                .unwrap_or_else(|| format!("group_in_{}", group.pad)),
            direction: PortDirection::Input,
            index: group.pad,
            channels: group.ports.len(),
        });
    }
    for group in &out_groups {
        pad_templates.push(PadTemplate {
            name: group
                .symbol
                .clone()
                .unwrap_or_else(|| format!("group_out_{}", group.pad)),
            direction: PortDirection::Output,
            index: group.pad,
            channels: group.ports.len(),
        });
    }
    for (pad, descriptor) in audio_in_ports.iter().enumerate() {
        pad_templates.push(PadTemplate {
            name: plugin
                .port_symbol(descriptor.index)
                .unwrap_or_else(|| format!("port_{}", descriptor.index)),
            direction: PortDirection::Input,
            index: pad,
            channels: 1,
        });
    }
    for (pad, descriptor) in audio_out_ports.iter().enumerate() {
        pad_templates.push(PadTemplate {
            name: plugin
                .port_symbol(descriptor.index)
                .unwrap_or_else(|| format!("port_{}", descriptor.index)),
            direction: PortDirection::Output,
            index: pad,
            channels: 1,
        });
    }

    PluginTypeSchema {
        uri,
        audio_in_ports,
        audio_out_ports,
        control_in_ports,
        control_out_ports,
        in_groups,
        out_groups,
        can_process_in_place: !plugin.in_place_broken(),
        details,
        params,
        pad_templates,
        plugin,
    }
}

/// Process-wide map from plugin identity to its schema. Populated once at
/// registry load; node instances are constructed by reference to a schema,
/// never by rebuilding one.
pub struct SchemaRegistry<P: PluginClass> {
    schemas: HashMap<String, Arc<PluginTypeSchema<P>>>,
}

impl<P: PluginClass> SchemaRegistry<P> {
    pub fn new() -> Self {
        Self {
            schemas: HashMap::new(),
        }
    }

    /// Register a freshly built schema. Returns false when a schema with the
    /// same URI is already present; the existing one is kept.
    pub fn register(&mut self, schema: PluginTypeSchema<P>) -> bool {
        if self.schemas.contains_key(&schema.uri) {
            return false;
        }
        self.schemas
            .insert(schema.uri.clone(), Arc::new(schema));
        true
    }

    pub fn get(&self, uri: &str) -> Option<&Arc<PluginTypeSchema<P>>> {
        self.schemas.get(uri)
    }

    pub fn uris(&self) -> Vec<String> {
        let mut uris = self.schemas.keys().cloned().collect::<Vec<_>>();
        uris.sort();
        uris
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl<P: PluginClass> Default for SchemaRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}
