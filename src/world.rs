#![cfg(all(unix, not(target_os = "macos")))]

use std::sync::Arc;

use crate::plugin::{GroupId, PluginClass, PluginInstance, PortDirection, PortRange, SignalKind};
use crate::schema::{PluginTypeSchema, SchemaRegistry, build_schema};
use lilv::World;
use lilv::instance::{ActiveInstance, Instance};
use lilv::node::Node;
use lilv::plugin::Plugin;
use lv2_raw::LV2Feature;
use tracing::{debug, warn};

const LV2_CORE__INPUT_PORT: &str = "http://lv2plug.in/ns/lv2core#InputPort";
const LV2_CORE__AUDIO_PORT: &str = "http://lv2plug.in/ns/lv2core#AudioPort";
const LV2_CORE__CONTROL_PORT: &str = "http://lv2plug.in/ns/lv2core#ControlPort";
const LV2_CORE__INTEGER: &str = "http://lv2plug.in/ns/lv2core#integer";
const LV2_CORE__TOGGLED: &str = "http://lv2plug.in/ns/lv2core#toggled";
const LV2_CORE__IN_PLACE_BROKEN: &str = "http://lv2plug.in/ns/lv2core#inPlaceBroken";
const LV2_CORE__SYMBOL: &str = "http://lv2plug.in/ns/lv2core#symbol";
const LV2_PORT_GROUPS__GROUP: &str = "http://lv2plug.in/ns/ext/port-groups#group";

struct WorldHandle {
    world: World,
    input_class: Node,
    audio_class: Node,
    control_class: Node,
    integer_prop: Node,
    toggled_prop: Node,
    in_group_pred: Node,
    symbol_pred: Node,
}

/// Process-wide LV2 context: the loaded lilv world plus the class and
/// predicate nodes discovery queries against. Created once at startup and
/// passed into discovery and instance construction; torn down at exit.
pub struct Lv2World {
    shared: Arc<WorldHandle>,
}

impl Lv2World {
    pub fn new() -> Self {
        let world = World::new();
        world.load_all();

        let input_class = world.new_uri(LV2_CORE__INPUT_PORT);
        let audio_class = world.new_uri(LV2_CORE__AUDIO_PORT);
        let control_class = world.new_uri(LV2_CORE__CONTROL_PORT);
        let integer_prop = world.new_uri(LV2_CORE__INTEGER);
        let toggled_prop = world.new_uri(LV2_CORE__TOGGLED);
        let in_group_pred = world.new_uri(LV2_PORT_GROUPS__GROUP);
        let symbol_pred = world.new_uri(LV2_CORE__SYMBOL);

        Self {
            shared: Arc::new(WorldHandle {
                world,
                input_class,
                audio_class,
                control_class,
                integer_prop,
                toggled_prop,
                in_group_pred,
                symbol_pred,
            }),
        }
    }

    /// Walk every installed plugin and build one schema per distinct type.
    pub fn discover(&self) -> SchemaRegistry<Lv2PluginClass> {
        let mut registry = SchemaRegistry::new();
        for plugin in self.shared.world.plugins().iter() {
            if !plugin.verify() {
                warn!("skipping plugin that failed verification");
                continue;
            }
            if plugin.uri().as_uri().is_none() {
                continue;
            }
            let schema = build_schema(Lv2PluginClass {
                plugin,
                shared: self.shared.clone(),
            });
            if !registry.register(schema) {
                debug!("plugin type already registered, skipping duplicate");
            }
        }
        registry
    }

    /// Build the schema for a single plugin URI, if installed and valid.
    pub fn schema_for(&self, uri: &str) -> Option<PluginTypeSchema<Lv2PluginClass>> {
        let uri_node = self.shared.world.new_uri(uri);
        let plugin = self.shared.world.plugins().plugin(&uri_node)?;
        if !plugin.verify() {
            return None;
        }
        Some(build_schema(Lv2PluginClass {
            plugin,
            shared: self.shared.clone(),
        }))
    }
}

impl Default for Lv2World {
    fn default() -> Self {
        Self::new()
    }
}

/// One lilv plugin plus the shared world context, implementing the
/// introspection seam the schema builder discovers against.
pub struct Lv2PluginClass {
    plugin: Plugin,
    shared: Arc<WorldHandle>,
}

impl Lv2PluginClass {
    fn node_token(node: &Node) -> Option<String> {
        node.as_uri()
            .map(str::to_string)
            .or_else(|| node.as_str().map(str::to_string))
    }
}

impl PluginClass for Lv2PluginClass {
    type Instance = Lv2Instance;

    fn uri(&self) -> String {
        self.plugin
            .uri()
            .as_uri()
            .unwrap_or_default()
            .to_string()
    }

    fn name(&self) -> Option<String> {
        self.plugin.name().as_str().map(str::to_string)
    }

    fn author(&self) -> Option<String> {
        self.plugin
            .author_name()
            .and_then(|node| node.as_str().map(str::to_string))
    }

    fn ports_count(&self) -> usize {
        self.plugin.ports_count()
    }

    fn port_direction(&self, port: usize) -> PortDirection {
        let is_input = self
            .plugin
            .iter_ports()
            .find(|p| p.index() == port)
            .map(|p| p.is_a(&self.shared.input_class))
            .unwrap_or(false);
        if is_input {
            PortDirection::Input
        } else {
            PortDirection::Output
        }
    }

    fn port_kind(&self, port: usize) -> Option<SignalKind> {
        let port = self.plugin.iter_ports().find(|p| p.index() == port)?;
        if port.is_a(&self.shared.audio_class) {
            Some(SignalKind::Audio)
        } else if port.is_a(&self.shared.control_class) {
            Some(SignalKind::Control)
        } else {
            None
        }
    }

    fn port_group(&self, port: usize) -> Option<GroupId> {
        let port = self.plugin.iter_ports().find(|p| p.index() == port)?;
        let group = port.get(&self.shared.in_group_pred)?;
        Self::node_token(&group).map(GroupId::new)
    }

    fn port_symbol(&self, port: usize) -> Option<String> {
        let port = self.plugin.iter_ports().find(|p| p.index() == port)?;
        port.symbol()
            .and_then(|node| node.as_str().map(str::to_string))
    }

    fn port_range(&self, port: usize) -> PortRange {
        let Some(port) = self.plugin.iter_ports().find(|p| p.index() == port) else {
            return PortRange::default();
        };
        let range = port.range();
        PortRange {
            default: range.default.and_then(|node| node.as_float()),
            minimum: range.minimum.and_then(|node| node.as_float()),
            maximum: range.maximum.and_then(|node| node.as_float()),
        }
    }

    fn port_is_toggled(&self, port: usize) -> bool {
        self.plugin
            .iter_ports()
            .find(|p| p.index() == port)
            .map(|p| p.has_property(&self.shared.toggled_prop))
            .unwrap_or(false)
    }

    fn port_is_integer(&self, port: usize) -> bool {
        self.plugin
            .iter_ports()
            .find(|p| p.index() == port)
            .map(|p| p.has_property(&self.shared.integer_prop))
            .unwrap_or(false)
    }

    fn group_symbol(&self, group: &GroupId) -> Option<String> {
        let subject = self.shared.world.new_uri(group.as_str());
        let nodes = self
            .shared
            .world
            .find_nodes(Some(&subject), &self.shared.symbol_pred, None);
        nodes
            .iter()
            .next()
            .and_then(|node| node.as_str().map(str::to_string))
    }

    fn in_place_broken(&self) -> bool {
        self.plugin
            .required_features()
            .iter()
            .chain(self.plugin.optional_features().iter())
            .any(|feature| feature.as_uri() == Some(LV2_CORE__IN_PLACE_BROKEN))
    }

    fn instantiate(&self, sample_rate: f64) -> Option<Lv2Instance> {
        let features: Vec<&LV2Feature> = vec![];
        let instance = unsafe { self.plugin.instantiate(sample_rate, features) }?;
        Some(Lv2Instance {
            state: Some(Lv2InstanceState::Idle(instance)),
        })
    }
}

enum Lv2InstanceState {
    Idle(Instance),
    Active(ActiveInstance),
}

/// Exclusively owned native instance; activation state is tracked so the
/// consuming lilv activate/deactivate calls stay balanced.
pub struct Lv2Instance {
    state: Option<Lv2InstanceState>,
}

impl PluginInstance for Lv2Instance {
    unsafe fn connect_port(&mut self, port: usize, data: *mut f32) {
        match self.state.as_mut() {
            Some(Lv2InstanceState::Idle(instance)) => unsafe {
                instance.connect_port_mut(port, data);
            },
            Some(Lv2InstanceState::Active(active)) => unsafe {
                active.instance_mut().connect_port_mut(port, data);
            },
            None => panic!("connect_port called on a released instance"),
        }
    }

    fn activate(&mut self) {
        let Some(Lv2InstanceState::Idle(instance)) = self.state.take() else {
            panic!("activate called out of lifecycle order");
        };
        self.state = Some(Lv2InstanceState::Active(unsafe { instance.activate() }));
    }

    fn run(&mut self, frames: usize) {
        match self.state.as_mut() {
            Some(Lv2InstanceState::Active(active)) => unsafe { active.run(frames) },
            _ => panic!("run called on an inactive instance"),
        }
    }

    fn deactivate(&mut self) {
        let Some(Lv2InstanceState::Active(active)) = self.state.take() else {
            panic!("deactivate called out of lifecycle order");
        };
        let idle = unsafe { active.deactivate() };
        if idle.is_none() {
            warn!("native deactivate returned no idle instance");
        }
        self.state = idle.map(Lv2InstanceState::Idle);
    }
}
