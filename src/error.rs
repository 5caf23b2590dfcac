//! Error types for the heart field.
//!
//! The per-frame update is infallible. Errors only arise while setting up
//! the window and GPU, while loading configuration, or from the renderer,
//! whose failures are handled inside the frame loop.

use std::fmt;

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::NoAdapter => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors from loading or validating a [`FieldConfig`](crate::FieldConfig).
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read or write the config file.
    Io(std::io::Error),
    /// The file is not valid JSON for a config.
    Parse(serde_json::Error),
    /// A value is out of its allowed range.
    Invalid { field: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to access config file: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {}", e),
            ConfigError::Invalid { field, reason } => write!(f, "Invalid config value `{}`: {}", field, reason),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Outcome of a failed draw, reported by a [`FrameSink`](crate::FrameSink).
///
/// None of these escape the frame loop.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// The surface must be reconfigured; the loop continues.
    SurfaceLost,
    /// This frame was dropped (timeout, surface unavailable); the loop continues.
    Skipped(String),
    /// Rendering cannot continue; the field is disposed.
    Fatal(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::SurfaceLost => write!(f, "Render surface lost"),
            RenderError::Skipped(msg) => write!(f, "Frame skipped: {}", msg),
            RenderError::Fatal(msg) => write!(f, "Fatal render error: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}

/// Errors that can occur when running a heart field window.
#[derive(Debug)]
pub enum FieldError {
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// The configuration was rejected.
    Config(ConfigError),
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            FieldError::Window(e) => write!(f, "Failed to create window: {}", e),
            FieldError::Gpu(e) => write!(f, "GPU error: {}", e),
            FieldError::Config(e) => write!(f, "Config error: {}", e),
        }
    }
}

impl std::error::Error for FieldError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FieldError::EventLoop(e) => Some(e),
            FieldError::Window(e) => Some(e),
            FieldError::Gpu(e) => Some(e),
            FieldError::Config(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for FieldError {
    fn from(e: winit::error::EventLoopError) -> Self {
        FieldError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for FieldError {
    fn from(e: winit::error::OsError) -> Self {
        FieldError::Window(e)
    }
}

impl From<GpuError> for FieldError {
    fn from(e: GpuError) -> Self {
        FieldError::Gpu(e)
    }
}

impl From<ConfigError> for FieldError {
    fn from(e: ConfigError) -> Self {
        FieldError::Config(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Invalid {
            field: "point_count",
            reason: "must be at least 1".into(),
        };
        assert_eq!(err.to_string(), "Invalid config value `point_count`: must be at least 1");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_field_error_wraps_config_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");
        let err = FieldError::from(ConfigError::from(io));
        assert!(err.to_string().starts_with("Config error:"));
        assert!(err.source().is_some());
    }
}
