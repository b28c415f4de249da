//! Small freestanding support utilities shared by the rest of the kernel:
//! an error taxonomy for the ASOFS/syscall boundary and the panic handler.

pub mod error;
pub mod panic;
