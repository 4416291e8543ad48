use std::fmt;
use std::sync::Arc;

use crate::group::ChannelGroup;
use crate::params::{ParameterValue, decode_value, default_value, encode_value, value_kind};
use crate::plugin::{PluginClass, PluginInstance};
use crate::schema::PluginTypeSchema;
use tracing::debug;

/// Host-owned audio storage for one block. Group buffers are planar: channel
/// `j` of a group occupies `[j * frames, (j + 1) * frames)`. Slice counts
/// must match the schema's group and ungrouped-port counts exactly.
pub struct BlockBuffers<'a, 'b> {
    pub group_in: &'a mut [&'b mut [f32]],
    pub audio_in: &'a mut [&'b mut [f32]],
    pub group_out: &'a mut [&'b mut [f32]],
    pub audio_out: &'a mut [&'b mut [f32]],
}

/// One running node instance driving a native plugin against its shared
/// schema. The lifecycle is strictly
/// setup → start → run_block (×N) → stop → cleanup; calling a transition
/// from any other state aborts, since it means the host and the schema have
/// diverged.
pub struct NodeProcessor<P: PluginClass> {
    schema: Arc<PluginTypeSchema<P>>,
    instance: Option<P::Instance>,
    activated: bool,
    control_in: Box<[f32]>,
    control_out: Box<[f32]>,
}

impl<P: PluginClass> fmt::Debug for NodeProcessor<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeProcessor")
            .field("uri", &self.schema.uri)
            .field("configured", &self.instance.is_some())
            .field("activated", &self.activated)
            .finish()
    }
}

impl<P: PluginClass> NodeProcessor<P> {
    /// Control-input slots start at each parameter's default, pushed through
    /// the same value translation a host write would use.
    pub fn new(schema: Arc<PluginTypeSchema<P>>) -> Self {
        let control_in = schema.params()[..schema.control_in_ports.len()]
            .iter()
            .map(|descriptor| encode_value(default_value(descriptor)))
            .collect::<Vec<f32>>()
            .into_boxed_slice();
        let control_out = vec![0.0; schema.control_out_ports.len()].into_boxed_slice();

        Self {
            schema,
            instance: None,
            activated: false,
            control_in,
            control_out,
        }
    }

    pub fn schema(&self) -> &Arc<PluginTypeSchema<P>> {
        &self.schema
    }

    pub fn is_configured(&self) -> bool {
        self.instance.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.activated
    }

    /// Instantiate the plugin at `sample_rate` and bind every control slot
    /// exactly once; the bindings persist for the instance's lifetime. An
    /// instantiation failure is an `Err`, not a panic: the plugin type is
    /// simply unavailable and the host must not proceed to `start`.
    pub fn setup(&mut self, sample_rate: f64) -> Result<(), String> {
        assert!(
            self.instance.is_none(),
            "setup called on a configured processor"
        );

        debug!(uri = %self.schema.uri, sample_rate, "instantiating plugin");
        let Some(mut instance) = self.schema.plugin().instantiate(sample_rate) else {
            return Err(format!(
                "Failed to instantiate '{}' at {} Hz",
                self.schema.uri, sample_rate
            ));
        };

        for (slot, descriptor) in self.schema.control_in_ports.iter().enumerate() {
            unsafe { instance.connect_port(descriptor.index, &mut self.control_in[slot]) };
        }
        for (slot, descriptor) in self.schema.control_out_ports.iter().enumerate() {
            unsafe { instance.connect_port(descriptor.index, &mut self.control_out[slot]) };
        }

        self.instance = Some(instance);
        Ok(())
    }

    pub fn start(&mut self) {
        assert!(!self.activated, "start called on an active processor");
        let instance = self
            .instance
            .as_mut()
            .unwrap_or_else(|| panic!("start called before setup"));

        debug!(uri = %self.schema.uri, "activating");
        instance.activate();
        self.activated = true;
    }

    /// Bind every audio port for this block, then run the plugin for exactly
    /// `frames` frames. Bindings are recomputed each block because the host
    /// may hand over different buffers each cycle; this path performs no
    /// allocation and is safe to call back-to-back.
    pub fn run_block(&mut self, buffers: BlockBuffers<'_, '_>, frames: usize) {
        assert!(self.activated, "run_block called on an inactive processor");
        let instance = self
            .instance
            .as_mut()
            .unwrap_or_else(|| panic!("run_block called without an instance"));
        let schema = &self.schema;

        assert_eq!(
            buffers.group_in.len(),
            schema.in_groups.len(),
            "input group buffer count does not match the schema"
        );
        assert_eq!(
            buffers.audio_in.len(),
            schema.audio_in_ports.len(),
            "audio input buffer count does not match the schema"
        );
        assert_eq!(
            buffers.group_out.len(),
            schema.out_groups.len(),
            "output group buffer count does not match the schema"
        );
        assert_eq!(
            buffers.audio_out.len(),
            schema.audio_out_ports.len(),
            "audio output buffer count does not match the schema"
        );

        for (group, buffer) in schema.in_groups.iter().zip(buffers.group_in.iter_mut()) {
            bind_group(instance, group, buffer, frames);
        }
        for (descriptor, buffer) in schema
            .audio_in_ports
            .iter()
            .zip(buffers.audio_in.iter_mut())
        {
            assert!(buffer.len() >= frames, "audio input buffer too small");
            unsafe { instance.connect_port(descriptor.index, buffer.as_mut_ptr()) };
        }
        for (group, buffer) in schema.out_groups.iter().zip(buffers.group_out.iter_mut()) {
            bind_group(instance, group, buffer, frames);
        }
        for (descriptor, buffer) in schema
            .audio_out_ports
            .iter()
            .zip(buffers.audio_out.iter_mut())
        {
            assert!(buffer.len() >= frames, "audio output buffer too small");
            unsafe { instance.connect_port(descriptor.index, buffer.as_mut_ptr()) };
        }

        instance.run(frames);
    }

    pub fn stop(&mut self) {
        assert!(self.activated, "stop called on an inactive processor");
        let instance = self
            .instance
            .as_mut()
            .unwrap_or_else(|| panic!("stop called without an instance"));

        debug!(uri = %self.schema.uri, "deactivating");
        instance.deactivate();
        self.activated = false;
    }

    pub fn cleanup(&mut self) {
        assert!(!self.activated, "cleanup called while still active");
        assert!(self.instance.is_some(), "cleanup called before setup");

        debug!(uri = %self.schema.uri, "releasing instance");
        self.instance = None;
    }

    /// Write a parameter by its declared position. Only control inputs are
    /// writable; writing an output or an undeclared position aborts.
    pub fn set_parameter(&mut self, position: usize, value: ParameterValue) {
        assert!(
            position < self.control_in.len(),
            "parameter position {position} is not a writable control input"
        );
        let kind = self.schema.param_spec(position).kind;
        assert_eq!(
            value_kind(value),
            kind,
            "parameter position {position} value kind mismatch"
        );
        self.control_in[position] = encode_value(value);
    }

    /// Read a parameter by its declared position (control inputs first, then
    /// control outputs). An undeclared position aborts.
    pub fn parameter(&self, position: usize) -> ParameterValue {
        let kind = self.schema.param_spec(position).kind;
        let inputs = self.control_in.len();
        let stored = if position < inputs {
            self.control_in[position]
        } else {
            self.control_out[position - inputs]
        };
        decode_value(kind, stored)
    }
}

fn bind_group<I: PluginInstance>(
    instance: &mut I,
    group: &ChannelGroup,
    buffer: &mut [f32],
    frames: usize,
) {
    assert!(
        buffer.len() >= group.ports.len() * frames,
        "group pad buffer too small for {} channels of {} frames",
        group.ports.len(),
        frames
    );
    let base = buffer.as_mut_ptr();
    for (slot, port) in group.ports.iter().enumerate() {
        unsafe { instance.connect_port(port.index, base.add(slot * frames)) };
    }
}
