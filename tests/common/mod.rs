#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use lv2_bridge::plugin::{
    GroupId, PluginClass, PluginInstance, PortDirection, PortRange, SignalKind,
};

/// One recorded native call, with connect targets captured as raw addresses
/// so binding offsets can be asserted exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Call {
    Connect(usize, usize),
    Activate,
    Run(usize),
    Deactivate,
}

#[derive(Clone, Debug)]
pub struct PortSpec {
    pub direction: PortDirection,
    pub kind: Option<SignalKind>,
    pub group: Option<String>,
    pub symbol: Option<String>,
    pub toggled: bool,
    pub integer: bool,
    pub range: PortRange,
}

impl PortSpec {
    fn new(direction: PortDirection, kind: Option<SignalKind>) -> Self {
        Self {
            direction,
            kind,
            group: None,
            symbol: None,
            toggled: false,
            integer: false,
            range: PortRange::default(),
        }
    }

    pub fn audio(direction: PortDirection) -> Self {
        Self::new(direction, Some(SignalKind::Audio))
    }

    pub fn control(direction: PortDirection) -> Self {
        Self::new(direction, Some(SignalKind::Control))
    }

    pub fn grouped(direction: PortDirection, group: &str) -> Self {
        let mut spec = Self::new(direction, None);
        spec.group = Some(group.to_string());
        spec
    }

    pub fn unknown(direction: PortDirection) -> Self {
        Self::new(direction, None)
    }

    pub fn symbol(mut self, symbol: &str) -> Self {
        self.symbol = Some(symbol.to_string());
        self
    }

    pub fn toggled(mut self) -> Self {
        self.toggled = true;
        self
    }

    pub fn integer(mut self) -> Self {
        self.integer = true;
        self
    }

    pub fn range(
        mut self,
        default: Option<f32>,
        minimum: Option<f32>,
        maximum: Option<f32>,
    ) -> Self {
        self.range = PortRange {
            default,
            minimum,
            maximum,
        };
        self
    }
}

pub struct FakePlugin {
    pub uri: String,
    pub name: Option<String>,
    pub author: Option<String>,
    pub ports: Vec<PortSpec>,
    pub group_symbols: Vec<(String, String)>,
    pub in_place_broken: bool,
    pub fail_instantiate: bool,
    pub calls: Arc<Mutex<Vec<Call>>>,
}

impl FakePlugin {
    pub fn new(uri: &str, ports: Vec<PortSpec>) -> Self {
        Self {
            uri: uri.to_string(),
            name: Some("Fake Plugin".to_string()),
            author: Some("Fake Author".to_string()),
            ports,
            group_symbols: vec![],
            in_place_broken: false,
            fail_instantiate: false,
            calls: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn with_group_symbol(mut self, group: &str, symbol: &str) -> Self {
        self.group_symbols
            .push((group.to_string(), symbol.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("call log lock").clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().expect("call log lock").clear();
    }
}

impl PluginClass for FakePlugin {
    type Instance = FakeInstance;

    fn uri(&self) -> String {
        self.uri.clone()
    }

    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    fn author(&self) -> Option<String> {
        self.author.clone()
    }

    fn ports_count(&self) -> usize {
        self.ports.len()
    }

    fn port_direction(&self, port: usize) -> PortDirection {
        self.ports[port].direction
    }

    fn port_kind(&self, port: usize) -> Option<SignalKind> {
        self.ports[port].kind
    }

    fn port_group(&self, port: usize) -> Option<GroupId> {
        self.ports[port].group.as_deref().map(GroupId::new)
    }

    fn port_symbol(&self, port: usize) -> Option<String> {
        self.ports[port].symbol.clone()
    }

    fn port_range(&self, port: usize) -> PortRange {
        self.ports[port].range
    }

    fn port_is_toggled(&self, port: usize) -> bool {
        self.ports[port].toggled
    }

    fn port_is_integer(&self, port: usize) -> bool {
        self.ports[port].integer
    }

    fn group_symbol(&self, group: &GroupId) -> Option<String> {
        self.group_symbols
            .iter()
            .find(|(id, _)| id == group.as_str())
            .map(|(_, symbol)| symbol.clone())
    }

    fn in_place_broken(&self) -> bool {
        self.in_place_broken
    }

    fn instantiate(&self, _sample_rate: f64) -> Option<FakeInstance> {
        if self.fail_instantiate {
            return None;
        }
        Some(FakeInstance {
            calls: self.calls.clone(),
        })
    }
}

pub struct FakeInstance {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl PluginInstance for FakeInstance {
    unsafe fn connect_port(&mut self, port: usize, data: *mut f32) {
        self.calls
            .lock()
            .expect("call log lock")
            .push(Call::Connect(port, data as usize));
    }

    fn activate(&mut self) {
        self.calls.lock().expect("call log lock").push(Call::Activate);
    }

    fn run(&mut self, frames: usize) {
        self.calls
            .lock()
            .expect("call log lock")
            .push(Call::Run(frames));
    }

    fn deactivate(&mut self) {
        self.calls
            .lock()
            .expect("call log lock")
            .push(Call::Deactivate);
    }
}
