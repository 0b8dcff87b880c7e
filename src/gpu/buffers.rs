use super::pipeline::TraceUniforms;
use crate::constants::VERTEX_STRIDE;
use crate::trace::Trace;
use wgpu::util::DeviceExt;

/// Backend resources of one trace.
///
/// Created once when the trace is attached (or when the plot is recreated)
/// and sized to the trace's fixed length; per frame only their contents are
/// rewritten.
pub(crate) struct TraceBuffers {
    pub(crate) vertex: wgpu::Buffer,
    uniforms: wgpu::Buffer,
    pub(crate) bind_group: wgpu::BindGroup,
}

impl TraceBuffers {
    pub(crate) fn create(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        trace: &Trace,
    ) -> Self {
        let vertex = if trace.is_empty() {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("trace_vb"),
                size: VERTEX_STRIDE,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        } else {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("trace_vb"),
                contents: bytemuck::cast_slice(trace.xy()),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            })
        };
        let uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("trace_uniforms"),
            size: std::mem::size_of::<TraceUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("trace_bg"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.as_entire_binding(),
            }],
        });
        Self {
            vertex,
            uniforms,
            bind_group,
        }
    }

    /// Stage the trace's current vertices and transform for the next pass.
    pub(crate) fn upload(&self, queue: &wgpu::Queue, trace: &Trace, uniforms: &TraceUniforms) {
        queue.write_buffer(&self.vertex, 0, bytemuck::cast_slice(trace.xy()));
        queue.write_buffer(&self.uniforms, 0, bytemuck::bytes_of(uniforms));
    }
}
