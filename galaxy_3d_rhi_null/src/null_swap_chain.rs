/// Swap chain - Null implementation of the SwapChain trait
///
/// No surface is created: the window handle is only checked during
/// creation. The back buffers are native objects of their own, recreated on
/// every resize.

use galaxy_3d_rhi::galaxy3d::{Error, Result};
use galaxy_3d_rhi::galaxy3d::rhi::{
    NativeHandle, Ptr, RenderPass, Resource, ResourceBase, ResourceType, SwapChain, SwapChainDesc,
};
use galaxy_3d_rhi::{engine_debug, engine_error};
use raw_window_handle::RawWindowHandle;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use crate::null_device::NullDevice;

/// Number of back buffers (double buffering)
const BACK_BUFFER_COUNT: usize = 2;

/// Back buffer state, replaced as a whole on resize
struct BackBuffers {
    handles: Vec<NativeHandle>,
    width: u32,
    height: u32,
    /// Index of the buffer commands currently render into
    current: usize,
}

pub struct NullSwapChain {
    base: ResourceBase,
    device: Arc<NullDevice>,
    render_pass: Ptr<dyn RenderPass>,
    back_buffers: Mutex<BackBuffers>,
    vsync_interval: AtomicU32,
}

impl NullSwapChain {
    pub fn create(
        device: &Arc<NullDevice>,
        render_pass: &Ptr<dyn RenderPass>,
        desc: &SwapChainDesc,
        name: &str,
    ) -> Result<Ptr<dyn SwapChain>> {
        desc.validate(&**render_pass)?;
        if is_empty_window(&desc.window) {
            return Err(Error::InvalidDescriptor(format!(
                "swap chain '{}' window handle is null",
                name
            )));
        }

        let handle = device.allocate(ResourceType::SwapChain, name)?;
        let back_buffers = match allocate_back_buffers(device, name) {
            Ok(handles) => handles,
            Err(error) => {
                device.release(handle);
                return Err(error);
            }
        };

        let swap_chain = NullSwapChain {
            base: ResourceBase::new(handle, name),
            device: device.clone(),
            render_pass: render_pass.clone(),
            back_buffers: Mutex::new(BackBuffers {
                handles: back_buffers,
                width: desc.width,
                height: desc.height,
                current: 0,
            }),
            vsync_interval: AtomicU32::new(desc.vsync_interval),
        };
        Ok(Ptr::from_arc(Arc::new(swap_chain) as Arc<dyn SwapChain>))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BackBuffers>> {
        self.back_buffers
            .lock()
            .map_err(|_| Error::BackendError("Swap chain lock poisoned".to_string()))
    }
}

/// Window handles the Null backend cannot accept
fn is_empty_window(window: &RawWindowHandle) -> bool {
    match window {
        RawWindowHandle::Web(handle) => handle.id == 0,
        _ => false,
    }
}

fn allocate_back_buffers(device: &NullDevice, name: &str) -> Result<Vec<NativeHandle>> {
    let mut handles = Vec::with_capacity(BACK_BUFFER_COUNT);
    for index in 0..BACK_BUFFER_COUNT {
        match device.allocate(ResourceType::Texture, &format!("{} back buffer {}", name, index)) {
            Ok(handle) => handles.push(handle),
            Err(error) => {
                for handle in handles {
                    device.release(handle);
                }
                return Err(error);
            }
        }
    }
    Ok(handles)
}

impl Resource for NullSwapChain {
    fn resource_base(&self) -> &ResourceBase {
        &self.base
    }

    fn resource_type(&self) -> ResourceType {
        ResourceType::SwapChain
    }

    fn self_destruct(&self) {
        if let Ok(back_buffers) = self.back_buffers.lock() {
            for handle in &back_buffers.handles {
                self.device.release(*handle);
            }
        }
        self.device.release(self.base.native_handle());
    }
}

impl SwapChain for NullSwapChain {
    fn render_pass(&self) -> &Ptr<dyn RenderPass> {
        &self.render_pass
    }

    fn width(&self) -> u32 {
        self.lock().map(|back_buffers| back_buffers.width).unwrap_or(0)
    }

    fn height(&self) -> u32 {
        self.lock().map(|back_buffers| back_buffers.height).unwrap_or(0)
    }

    fn present(&self) -> Result<()> {
        self.device.check_device()?;

        let mut back_buffers = self.lock()?;
        back_buffers.current = (back_buffers.current + 1) % BACK_BUFFER_COUNT;
        self.device.record_present();
        Ok(())
    }

    fn resize_buffers(&self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            let message = format!(
                "Cannot resize swap chain '{}' to {}x{}",
                self.base.debug_name(),
                width,
                height
            );
            engine_error!("galaxy3d::null::NullSwapChain", "{}", message);
            return Err(Error::InvalidDescriptor(message));
        }
        self.device.check_device()?;

        let mut back_buffers = self.lock()?;
        if back_buffers.width == width && back_buffers.height == height {
            return Ok(());
        }

        let handles = allocate_back_buffers(&self.device, self.base.debug_name())?;
        for handle in std::mem::replace(&mut back_buffers.handles, handles) {
            self.device.release(handle);
        }
        back_buffers.width = width;
        back_buffers.height = height;
        back_buffers.current = 0;

        engine_debug!(
            "galaxy3d::null::NullSwapChain",
            "Swap chain '{}' resized to {}x{}",
            self.base.debug_name(),
            width,
            height
        );
        Ok(())
    }

    fn vertical_synchronization_interval(&self) -> u32 {
        self.vsync_interval.load(Ordering::Acquire)
    }

    fn set_vertical_synchronization_interval(&self, interval: u32) {
        self.vsync_interval.store(interval, Ordering::Release);
    }
}
