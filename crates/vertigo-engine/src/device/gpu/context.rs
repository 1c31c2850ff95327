use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use winit::window::Window;

use crate::device::{GpuError, GpuInfo, GpuInit};

/// Instance, window surface and adapter. Exists between `initialize` and
/// `terminate`.
pub(super) struct Display {
    /// Kept alive for the surface and adapter.
    #[allow(dead_code)]
    pub instance: wgpu::Instance,
    pub surface: wgpu::Surface<'static>,
    pub adapter: wgpu::Adapter,
}

/// Logical device and queue. Exists between `create_context` and
/// `destroy_context`.
pub(super) struct Context {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

pub(super) type ErrorQueue = Arc<Mutex<VecDeque<GpuError>>>;

/// Creates the instance and the window surface, then picks an adapter that
/// can present to it.
///
/// Adapter acquisition is asynchronous under wgpu; it is driven to
/// completion here.
pub(super) fn open_display(window: Arc<Window>, init: &GpuInit) -> Result<Display, String> {
    let size = window.inner_size();
    if size.width == 0 || size.height == 0 {
        return Err("window has zero size".into());
    }

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: init.backends,
        ..Default::default()
    });

    // An `Arc<Window>` target ties the surface lifetime to the window handle.
    let surface = instance
        .create_surface(window)
        .map_err(|e| format!("failed to create wgpu surface: {e}"))?;

    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: init.power_preference,
        compatible_surface: Some(&surface),
        force_fallback_adapter: false,
    }))
    .map_err(|e| format!("failed to find a suitable GPU adapter: {e}"))?;

    let info = adapter.get_info();
    log::info!(
        "using adapter \"{}\" (backend: {:?}, type: {:?})",
        info.name,
        info.backend,
        info.device_type
    );

    Ok(Display {
        instance,
        surface,
        adapter,
    })
}

/// Requests the device and routes uncaptured errors into `errors`.
pub(super) fn create_device(
    adapter: &wgpu::Adapter,
    init: &GpuInit,
    errors: ErrorQueue,
) -> Result<Context, String> {
    let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
        label: Some("vertigo device"),
        required_features: init.required_features,
        required_limits: init.required_limits.clone(),
        experimental_features: wgpu::ExperimentalFeatures::disabled(),
        memory_hints: wgpu::MemoryHints::Performance,
        trace: wgpu::Trace::Off,
    }))
    .map_err(|e| format!("failed to create wgpu device/queue: {e}"))?;

    device.on_uncaptured_error(Arc::new(move |e| {
        let err = classify(e);
        log::debug!("uncaptured gpu error queued: {err}");
        if let Ok(mut queue) = errors.lock() {
            queue.push_back(err);
        }
    }));

    log::debug!("device limits: {:?}", device.limits());
    Ok(Context { device, queue })
}

fn classify(e: wgpu::Error) -> GpuError {
    match e {
        wgpu::Error::Validation { description, .. } => GpuError::Validation(description),
        oom @ wgpu::Error::OutOfMemory { .. } => GpuError::OutOfMemory(oom.to_string()),
        other => GpuError::Internal(other.to_string()),
    }
}

const REPORTED_FEATURES: &[(wgpu::Features, &str)] = &[
    (wgpu::Features::DEPTH_CLIP_CONTROL, "DEPTH_CLIP_CONTROL"),
    (wgpu::Features::TEXTURE_COMPRESSION_BC, "TEXTURE_COMPRESSION_BC"),
    (wgpu::Features::TEXTURE_COMPRESSION_ETC2, "TEXTURE_COMPRESSION_ETC2"),
    (wgpu::Features::TEXTURE_COMPRESSION_ASTC, "TEXTURE_COMPRESSION_ASTC"),
    (wgpu::Features::TIMESTAMP_QUERY, "TIMESTAMP_QUERY"),
    (wgpu::Features::INDIRECT_FIRST_INSTANCE, "INDIRECT_FIRST_INSTANCE"),
    (wgpu::Features::SHADER_F16, "SHADER_F16"),
    (wgpu::Features::FLOAT32_FILTERABLE, "FLOAT32_FILTERABLE"),
    (wgpu::Features::POLYGON_MODE_LINE, "POLYGON_MODE_LINE"),
];

/// Driver strings in the shape of a GL context query.
pub(super) fn gpu_info(adapter: &wgpu::Adapter) -> GpuInfo {
    let info = adapter.get_info();
    let features = adapter.features();

    GpuInfo {
        vendor: vendor_name(info.vendor),
        renderer: info.name,
        version: format!("{:?} {} {}", info.backend, info.driver, info.driver_info)
            .trim_end()
            .to_string(),
        extensions: REPORTED_FEATURES
            .iter()
            .filter(|(f, _)| features.contains(*f))
            .map(|(_, name)| (*name).to_string())
            .collect(),
    }
}

fn vendor_name(id: u32) -> String {
    match id {
        0x10de => "NVIDIA".into(),
        0x1002 => "AMD".into(),
        0x8086 => "Intel".into(),
        0x106b => "Apple".into(),
        0x13b5 => "ARM".into(),
        0x5143 => "Qualcomm".into(),
        0x1010 => "Imagination".into(),
        other => format!("{other:#06x}"),
    }
}
