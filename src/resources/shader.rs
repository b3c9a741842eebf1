use anyhow::bail;

use crate::resources::load_string;

/// A compiled WGSL module plus the entry points the pipelines use.
///
/// The wrapped [`wgpu::ShaderModule`] is freed when this struct drops;
/// pipelines built from it keep their own reference on the GPU side.
#[derive(Debug)]
pub struct ShaderProgram {
    pub module: wgpu::ShaderModule,
    pub vs_entry: &'static str,
    pub fs_entry: &'static str,
}

impl ShaderProgram {
    /// Compile WGSL source that ships inside the binary.
    pub fn from_source(device: &wgpu::Device, label: &str, source: &str) -> Self {
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        Self {
            module,
            vs_entry: "vs_main",
            fs_entry: "fs_main",
        }
    }

    /// Compile a WGSL file from the `assets/` directory.
    ///
    /// Unlike [`from_source`](Self::from_source), which only sees shaders
    /// that ship inside the binary, this compiles user-provided source, so
    /// validation runs under an error scope and a broken shader is an error
    /// rather than a crash later at pipeline creation.
    pub async fn from_file(device: &wgpu::Device, file_name: &str) -> anyhow::Result<Self> {
        let source = load_string(file_name).await?;

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let program = Self::from_source(device, file_name, &source);
        if let Some(error) = device.pop_error_scope().await {
            bail!("shader {file_name} failed validation: {error}");
        }
        Ok(program)
    }
}
