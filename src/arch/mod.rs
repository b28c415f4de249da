//! Architecture-specific support. This kernel targets 32-bit x86 only; the
//! module is still split out from `main.rs` the way a multi-arch kernel
//! would, since that is the shape the rest of this tree's ambient
//! scaffolding (serial, logging, build info) was written against.

pub mod x86;
