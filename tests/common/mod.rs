//! Shared test doubles.
//!
//! - [`RecordingBackend`]: a GPU-free [`RenderBackend`] that counts what it creates.
//! - [`RecordingExecutor`]: a [`GraphExecutor`] that logs every command it receives.
//! - [`capture_logs`]: collects `log` records emitted on the current test thread.

#![allow(dead_code)]

use std::cell::RefCell;
use std::sync::Once;
use std::sync::atomic::{AtomicUsize, Ordering};

use glam::Vec2;

use analog_glitch::backend::MeshData;
use analog_glitch::graph::{GraphExecutor, RasterAttachment, RasterCommands};
use analog_glitch::{
    GlitchError, Material, RenderBackend, Result, ShaderProperty, SharedMesh, TextureDesc,
    TextureHandle,
};

// ============================================================================
// Backend
// ============================================================================

/// Stand-in for a compiled shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestProgram {
    pub name: &'static str,
}

pub const GLITCH_PROGRAM: TestProgram = TestProgram {
    name: "analog_glitch",
};

#[derive(Debug)]
pub struct RecordingMesh {
    pub id: usize,
    pub vertex_count: usize,
    pub index_count: usize,
}

/// Program instance that remembers the last value set for each property.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordingMaterial {
    pub id: usize,
    pub scan_line_jitter: Option<Vec2>,
    pub vertical_jump: Option<Vec2>,
    pub horizontal_shake: Option<f32>,
    pub color_drift: Option<Vec2>,
    /// Setter calls that named a property of the wrong type.
    pub rejected: usize,
}

impl Material for RecordingMaterial {
    fn set_vector(&mut self, property: ShaderProperty, value: Vec2) {
        match property {
            ShaderProperty::ScanLineJitter => self.scan_line_jitter = Some(value),
            ShaderProperty::VerticalJump => self.vertical_jump = Some(value),
            ShaderProperty::ColorDrift => self.color_drift = Some(value),
            _ => self.rejected += 1,
        }
    }

    fn set_float(&mut self, property: ShaderProperty, value: f32) {
        match property {
            ShaderProperty::HorizontalShake => self.horizontal_shake = Some(value),
            _ => self.rejected += 1,
        }
    }
}

#[derive(Default)]
pub struct RecordingBackend {
    /// Makes every `create_material` call fail.
    pub fail_material: bool,
    /// Makes every `create_mesh` call fail.
    pub fail_mesh: bool,
    materials_created: AtomicUsize,
    meshes_created: AtomicUsize,
    triangle: SharedMesh<RecordingMesh>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_material() -> Self {
        Self {
            fail_material: true,
            ..Self::default()
        }
    }

    pub fn failing_mesh() -> Self {
        Self {
            fail_mesh: true,
            ..Self::default()
        }
    }

    pub fn materials_created(&self) -> usize {
        self.materials_created.load(Ordering::Relaxed)
    }

    pub fn meshes_created(&self) -> usize {
        self.meshes_created.load(Ordering::Relaxed)
    }
}

impl RenderBackend for RecordingBackend {
    type Program = TestProgram;
    type Material = RecordingMaterial;
    type Mesh = RecordingMesh;

    fn create_material(&self, program: &TestProgram) -> Result<RecordingMaterial> {
        if self.fail_material {
            return Err(GlitchError::ProgramInstantiation {
                program: program.name.to_owned(),
                reason: "instantiation disabled".to_owned(),
            });
        }
        let id = self.materials_created.fetch_add(1, Ordering::Relaxed);
        Ok(RecordingMaterial {
            id,
            ..RecordingMaterial::default()
        })
    }

    fn create_mesh(&self, data: &MeshData) -> Result<RecordingMesh> {
        if self.fail_mesh {
            return Err(GlitchError::MeshCreation(data.name.to_owned()));
        }
        let id = self.meshes_created.fetch_add(1, Ordering::Relaxed);
        Ok(RecordingMesh {
            id,
            vertex_count: data.positions.len(),
            index_count: data.indices.len(),
        })
    }

    fn shared_fullscreen_triangle(&self) -> &SharedMesh<RecordingMesh> {
        &self.triangle
    }
}

// ============================================================================
// Executor
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateTransient {
        texture: TextureHandle,
        label: String,
    },
    BeginPass {
        name: String,
        attachments: Vec<RasterAttachment>,
    },
    SetGlobalTexture {
        property: ShaderProperty,
        texture: TextureHandle,
    },
    DrawMesh {
        mesh: usize,
        material: RecordingMaterial,
    },
    EndPass,
}

#[derive(Debug, Default)]
pub struct RecordingExecutor {
    pub commands: Vec<Command>,
    /// Textures this executor reports as having no storage.
    pub unbound: Vec<TextureHandle>,
    /// Makes every `draw_mesh` call fail.
    pub fail_draw: bool,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draws(&self) -> Vec<&RecordingMaterial> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::DrawMesh { material, .. } => Some(material),
                _ => None,
            })
            .collect()
    }
}

impl RasterCommands<RecordingBackend> for RecordingExecutor {
    fn set_global_texture(&mut self, property: ShaderProperty, texture: TextureHandle) {
        self.commands
            .push(Command::SetGlobalTexture { property, texture });
    }

    fn draw_mesh(&mut self, mesh: &RecordingMesh, material: &mut RecordingMaterial) -> Result<()> {
        if self.fail_draw {
            return Err(GlitchError::DrawOutsidePass);
        }
        self.commands.push(Command::DrawMesh {
            mesh: mesh.id,
            material: material.clone(),
        });
        Ok(())
    }
}

impl GraphExecutor<RecordingBackend> for RecordingExecutor {
    fn create_transient(&mut self, texture: TextureHandle, desc: &TextureDesc) {
        self.commands.push(Command::CreateTransient {
            texture,
            label: desc.label.clone(),
        });
    }

    fn begin_raster_pass(
        &mut self,
        name: &str,
        reads: &[TextureHandle],
        attachments: &[RasterAttachment],
    ) -> Result<()> {
        let used = reads.iter().chain(attachments.iter().map(|a| &a.texture));
        if let Some(&texture) = used.into_iter().find(|t| self.unbound.contains(t)) {
            return Err(GlitchError::UnboundTexture {
                pass: name.to_owned(),
                texture,
            });
        }
        self.commands.push(Command::BeginPass {
            name: name.to_owned(),
            attachments: attachments.to_vec(),
        });
        Ok(())
    }

    fn end_raster_pass(&mut self) {
        self.commands.push(Command::EndPass);
    }
}

// ============================================================================
// Log capture
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedLog {
    pub level: log::Level,
    pub message: String,
}

thread_local! {
    static CAPTURED: RefCell<Vec<CapturedLog>> = const { RefCell::new(Vec::new()) };
}

struct ThreadLogger;

impl log::Log for ThreadLogger {
    fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        CAPTURED.with(|logs| {
            logs.borrow_mut().push(CapturedLog {
                level: record.level(),
                message: record.args().to_string(),
            });
        });
    }

    fn flush(&self) {}
}

static LOGGER: ThreadLogger = ThreadLogger;
static INSTALL: Once = Once::new();

/// Installs the capturing logger (once per test binary) and clears the
/// current thread's buffer. Each test runs on its own thread, so records
/// never leak between tests.
pub fn capture_logs() {
    INSTALL.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(log::LevelFilter::Trace);
        }
    });
    CAPTURED.with(|logs| logs.borrow_mut().clear());
}

/// Records captured on this thread so far.
pub fn captured_logs() -> Vec<CapturedLog> {
    CAPTURED.with(|logs| logs.borrow().clone())
}

/// Captured records at exactly `level`.
pub fn captured_at(level: log::Level) -> Vec<CapturedLog> {
    captured_logs()
        .into_iter()
        .filter(|l| l.level == level)
        .collect()
}
