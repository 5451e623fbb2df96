//! The seam between the recipe and the external build tool.
//!
//! The Builder and Packager stages never compile or copy anything themselves;
//! they drive a [`BuildTool`] through its configure, build and install steps
//! against the run's [`Layout`]. Parallelism inside a step belongs to the tool.

use crate::core::layout::Layout;
use crate::lifecycle::errors::ToolFailure;

/// An external build system driven in three blocking steps.
pub trait BuildTool {
    /// Tool name for log messages.
    fn name(&self) -> &str;

    /// Read the generated inputs under the layout and prepare a build graph.
    fn configure(&self, layout: &Layout) -> Result<(), ToolFailure>;

    /// Compile according to the configured graph.
    fn build(&self, layout: &Layout) -> Result<(), ToolFailure>;

    /// Stage build outputs into the layout's install root.
    fn install(&self, layout: &Layout) -> Result<(), ToolFailure>;
}

impl<T: BuildTool + ?Sized> BuildTool for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn configure(&self, layout: &Layout) -> Result<(), ToolFailure> {
        (**self).configure(layout)
    }

    fn build(&self, layout: &Layout) -> Result<(), ToolFailure> {
        (**self).build(layout)
    }

    fn install(&self, layout: &Layout) -> Result<(), ToolFailure> {
        (**self).install(layout)
    }
}
