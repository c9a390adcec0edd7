// Application layer: state shared across projects

pub mod context;

pub use context::DesignerContext;
