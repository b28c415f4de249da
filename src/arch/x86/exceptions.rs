//! CPU exception handling (vectors 0-31).
//!
//! None of these are recoverable in a kernel with no process isolation and
//! no paging: every exception prints a diagnostic to the serial console and
//! halts. This mirrors the original firmware's behavior of simply not
//! handling exceptions beyond registering a (potentially absent) handler -
//! the distinction here is that ASOS always installs one, so a stray fault
//! is reported instead of silently triple-faulting.

use super::idt::Regs;

const EXCEPTION_NAMES: [&str; 32] = [
    "Divide Error", "Debug", "NMI", "Breakpoint", "Overflow", "Bound Range Exceeded",
    "Invalid Opcode", "Device Not Available", "Double Fault", "Coprocessor Segment Overrun",
    "Invalid TSS", "Segment Not Present", "Stack Segment Fault", "General Protection Fault",
    "Page Fault", "Reserved", "x87 FPU Error", "Alignment Check", "Machine Check",
    "SIMD Floating-Point Exception", "Virtualization Exception", "Reserved", "Reserved",
    "Reserved", "Reserved", "Reserved", "Reserved", "Reserved", "Reserved", "Reserved",
    "Reserved", "Reserved",
];

/// Invoked by the common ISR stub in `idt.rs` for vectors 0-31.
pub fn handle(regs: &mut Regs) {
    let vector = regs.int_no as usize;
    let name = EXCEPTION_NAMES.get(vector).copied().unwrap_or("Unknown Exception");

    crate::serial_println!(
        "\n[EXCEPTION] #{} {} at eip={:#010x} cs={:#06x} err={:#x}",
        vector, name, regs.eip, regs.cs, regs.err_code
    );
    crate::serial_println!(
        "  eax={:#010x} ebx={:#010x} ecx={:#010x} edx={:#010x}",
        regs.eax, regs.ebx, regs.ecx, regs.edx
    );
    crate::serial_println!(
        "  esi={:#010x} edi={:#010x} ebp={:#010x} eflags={:#010x}",
        regs.esi, regs.edi, regs.ebp, regs.eflags
    );

    loop {
        unsafe { core::arch::asm!("cli", "hlt") };
    }
}
