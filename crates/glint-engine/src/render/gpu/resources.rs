//! GPU-side resource tables addressed by backend ids.

use crate::device::DepthStencilTarget;
use crate::render::backend::{Image, TextureSettings};
use crate::render::error::BackendError;

use super::pipeline::sampler_descriptor;

/// Id-indexed table. Ids are never reused, so a stale id cannot alias a newer
/// resource.
pub(super) struct Slab<T> {
    entries: Vec<Option<T>>,
}

impl<T> Default for Slab<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T> Slab<T> {
    /// Stores `value`; the returned id starts at 1.
    pub(super) fn insert(&mut self, value: T) -> u32 {
        self.entries.push(Some(value));
        self.entries.len() as u32
    }

    pub(super) fn get(&self, id: u32) -> Option<&T> {
        let index = id.checked_sub(1)? as usize;
        self.entries.get(index)?.as_ref()
    }

    pub(super) fn get_mut(&mut self, id: u32) -> Option<&mut T> {
        let index = id.checked_sub(1)? as usize;
        self.entries.get_mut(index)?.as_mut()
    }

    pub(super) fn remove(&mut self, id: u32) -> Option<T> {
        let index = id.checked_sub(1)? as usize;
        self.entries.get_mut(index)?.take()
    }

    pub(super) fn live(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }
}

// ── textures ──────────────────────────────────────────────────────────────

/// Sampled texture plus the group 1 bind group that exposes it.
pub(super) struct TextureEntry {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
}

impl TextureEntry {
    /// Uploads `image` as an RGBA8 texture.
    pub(super) fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        image: &Image,
        settings: TextureSettings,
    ) -> Result<Self, BackendError> {
        let rgba = image.to_rgba8()?;
        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("glint texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            size,
        );

        Ok(Self::with_texture(device, layout, texture, settings))
    }

    /// Color attachment that can later be sampled.
    pub(super) fn render_target(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("glint framebuffer color"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        Self::with_texture(device, layout, texture, TextureSettings::default())
    }

    fn with_texture(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        texture: wgpu::Texture,
        settings: TextureSettings,
    ) -> Self {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = Self::make_bind_group(device, layout, &view, settings);
        Self { texture, view, bind_group }
    }

    fn make_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        view: &wgpu::TextureView,
        settings: TextureSettings,
    ) -> wgpu::BindGroup {
        let sampler = device.create_sampler(&sampler_descriptor(settings));
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("glint texture bind group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        })
    }

    /// Rebuilds the sampler with new filtering and wrapping.
    pub(super) fn apply_settings(
        &mut self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        settings: TextureSettings,
    ) {
        self.bind_group = Self::make_bind_group(device, layout, &self.view, settings);
    }

    pub(super) fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }

    pub(super) fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub(super) fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

/// Offscreen target: a texture from the texture table plus its own
/// depth/stencil attachment.
pub(super) struct FramebufferEntry {
    pub texture: u32,
    pub depth: DepthStencilTarget,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_start_at_one_and_are_not_reused() {
        let mut slab = Slab::default();
        let a = slab.insert("a");
        let b = slab.insert("b");
        assert_eq!((a, b), (1, 2));

        assert_eq!(slab.remove(a), Some("a"));
        assert_eq!(slab.get(a), None);
        assert_eq!(slab.insert("c"), 3);
        assert_eq!(slab.live(), 2);
    }

    #[test]
    fn zero_and_out_of_range_ids_miss() {
        let mut slab: Slab<u8> = Slab::default();
        slab.insert(7);
        assert_eq!(slab.get(0), None);
        assert_eq!(slab.get(2), None);
        assert_eq!(slab.remove(9), None);
        if let Some(v) = slab.get_mut(1) {
            *v = 8;
        }
        assert_eq!(slab.get(1), Some(&8));
    }
}
