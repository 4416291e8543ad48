use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    Input,
    Output,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalKind {
    Audio,
    Control,
}

/// Opaque channel-group identity. Two ports belong to the same group iff
/// their tokens are equal; no normalization is applied, so differently
/// spelled identities are never merged.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Raw range metadata of a control port. Every field is individually
/// optional; fallbacks are applied by the parameter bridge, not here.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PortRange {
    pub default: Option<f32>,
    pub minimum: Option<f32>,
    pub maximum: Option<f32>,
}

/// Introspectable description of one plugin type, as exposed by a plugin
/// registry. Queried once per type during schema discovery.
pub trait PluginClass {
    type Instance: PluginInstance;

    fn uri(&self) -> String;
    fn name(&self) -> Option<String>;
    fn author(&self) -> Option<String>;
    fn ports_count(&self) -> usize;
    fn port_direction(&self, port: usize) -> PortDirection;

    /// Signal kind of an ungrouped port. Implementations check the audio
    /// class first, then the control class; `None` means the port class is
    /// not recognized and the port will not appear in the schema.
    fn port_kind(&self, port: usize) -> Option<SignalKind>;

    /// Single-valued group-membership lookup. `None` means ungrouped.
    fn port_group(&self, port: usize) -> Option<GroupId>;

    fn port_symbol(&self, port: usize) -> Option<String>;
    fn port_range(&self, port: usize) -> PortRange;
    fn port_is_toggled(&self, port: usize) -> bool;
    fn port_is_integer(&self, port: usize) -> bool;

    /// Subject-based lookup of a group's display symbol.
    fn group_symbol(&self, group: &GroupId) -> Option<String>;

    /// Whether the plugin declares that in-place processing is broken.
    fn in_place_broken(&self) -> bool;

    /// `None` when the native instantiation yields no instance.
    fn instantiate(&self, sample_rate: f64) -> Option<Self::Instance>;
}

/// One native plugin instance. Owned exclusively by its processor and driven
/// from a single logical thread.
pub trait PluginInstance {
    /// Bind `data` to a native port. The binding stays in effect until the
    /// port is re-connected or the instance is dropped.
    ///
    /// # Safety
    ///
    /// `data` must point to storage that outlives the binding and stays
    /// valid across every subsequent `run` call.
    unsafe fn connect_port(&mut self, port: usize, data: *mut f32);

    fn activate(&mut self);
    fn run(&mut self, frames: usize);
    fn deactivate(&mut self);
}
