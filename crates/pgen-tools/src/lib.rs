//! Per-tool project file renderers for the project generator.
//!
//! Each supported tool implements [`ToolIntegration`]: it receives a
//! finished [`ExportDictionary`](pgen_meta::ExportDictionary) and writes the
//! tool's project files into the export's output directory. The
//! [`ToolDispatcher`] maps tool names (and aliases) to implementations.
//!
//! Built-in tools:
//!
//! - `gcc_arm` (alias `make_gcc_arm`): a GNU Make `Makefile` for the
//!   `arm-none-eabi` toolchain
//! - `gnu_mcu_eclipse`: Eclipse `.project` / `.cproject` files for the
//!   GNU MCU Eclipse plugin

pub mod dispatcher;
pub mod eclipse;
pub mod error;
pub mod integration;
pub mod makefile;

pub use dispatcher::ToolDispatcher;
pub use eclipse::EclipseGnuMcu;
pub use error::{Error, Result};
pub use integration::{GeneratedProject, ToolIntegration};
pub use makefile::MakefileGccArm;
