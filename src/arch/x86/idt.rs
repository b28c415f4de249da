//! # Interrupt Descriptor Table (32-bit protected mode)
//!
//! Builds the 256-entry IDT by hand: each entry is an 8-byte interrupt-gate
//! descriptor (`base_low`, `selector`, zero, `flags`, `base_high`), loaded
//! with `lidt`. This does not reuse the `x86_64` crate's
//! `InterruptDescriptorTable`, which only knows how to build the 16-byte
//! long-mode gate format.
//!
//! Vectors 0-31 are the CPU exceptions, 32-47 are the remapped PIC IRQ
//! lines (see `pic.rs`), and 0x80 is the legacy `int 0x80` syscall gate
//! (`arch::x86::syscall`), present at DPL=3 even though this kernel never
//! leaves ring 0 so the `int` instruction itself is always permitted.

use bitflags::bitflags;
use core::mem::size_of;

const IDT_ENTRIES: usize = 256;

/// Segment selector for the flat kernel code segment. This kernel assumes
/// a GDT already set up by an earlier boot stage (outside this crate's
/// scope) with the conventional selector 0x08 for ring-0 code.
pub const KERNEL_CODE_SELECTOR: u16 = 0x08;

bitflags! {
    /// The one-byte `type_attr` field of a 32-bit interrupt-gate
    /// descriptor: present bit, descriptor privilege level (2 bits), and
    /// gate type. Typed so a gate can't be assembled from a bit pattern
    /// that isn't one of "kernel interrupt gate" or "user interrupt gate".
    #[derive(Clone, Copy)]
    struct GateFlags: u8 {
        const PRESENT    = 0x80;
        const DPL3       = 0x60;
        const GATE_32BIT_INT = 0x0E;
    }
}

const GATE_KERNEL: GateFlags = GateFlags::PRESENT.union(GateFlags::GATE_32BIT_INT);
const GATE_USER: GateFlags = GateFlags::PRESENT.union(GateFlags::DPL3).union(GateFlags::GATE_32BIT_INT);

#[repr(C, packed)]
#[derive(Clone, Copy)]
struct IdtEntry {
    base_low: u16,
    selector: u16,
    always0: u8,
    flags: u8,
    base_high: u16,
}

impl IdtEntry {
    const fn missing() -> Self {
        Self { base_low: 0, selector: 0, always0: 0, flags: 0, base_high: 0 }
    }
}

#[repr(C, packed)]
struct IdtPointer {
    limit: u16,
    base: u32,
}

static mut IDT: [IdtEntry; IDT_ENTRIES] = [IdtEntry::missing(); IDT_ENTRIES];

/// Registers saved by the common ISR/IRQ stub, in `pushad` order followed
/// by the values the CPU itself pushes on an interrupt.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Regs {
    pub edi: u32,
    pub esi: u32,
    pub ebp: u32,
    pub esp_dummy: u32,
    pub ebx: u32,
    pub edx: u32,
    pub ecx: u32,
    pub eax: u32,
    pub int_no: u32,
    pub err_code: u32,
    pub eip: u32,
    pub cs: u32,
    pub eflags: u32,
}

fn set_gate(num: usize, base: u32, selector: u16, flags: GateFlags) {
    unsafe {
        IDT[num] = IdtEntry {
            base_low: (base & 0xFFFF) as u16,
            selector,
            always0: 0,
            flags: flags.bits(),
            base_high: ((base >> 16) & 0xFFFF) as u16,
        };
    }
}

/// Install one low-level assembly entry point at the given vector, DPL=0.
fn set_kernel_gate(num: usize, handler: unsafe extern "C" fn()) {
    set_gate(num, handler as u32, KERNEL_CODE_SELECTOR, GATE_KERNEL);
}

/// Install a DPL=3 gate, used solely for the `int 0x80` syscall entry.
pub fn set_user_gate(num: usize, handler: u32) {
    set_gate(num, handler, KERNEL_CODE_SELECTOR, GATE_USER);
}

macro_rules! isr_stub {
    ($name:ident, $num:expr, has_err = $has_err:expr) => {
        core::arch::global_asm!(concat!(
            ".global ", stringify!($name), "\n",
            stringify!($name), ":\n",
            if $has_err { "" } else { "push 0\n" },
            "push ", stringify!($num), "\n",
            "jmp isr_common_stub\n",
        ));
    };
}

macro_rules! irq_stub {
    ($name:ident, $irq:expr) => {
        core::arch::global_asm!(concat!(
            ".global ", stringify!($name), "\n",
            stringify!($name), ":\n",
            "push 0\n",
            "push ", stringify!($irq), "\n",
            "jmp irq_common_stub\n",
        ));
    };
}

core::arch::global_asm!(
    r#"
.global isr_common_stub
isr_common_stub:
    pushad
    mov ebx, esp
    push ds
    push es
    push fs
    push gs
    mov ax, {kernel_data}
    mov ds, ax
    mov es, ax
    mov fs, ax
    mov gs, ax
    push ebx
    call {isr_handler}
    add esp, 4
    pop gs
    pop fs
    pop es
    pop ds
    popad
    add esp, 8
    iretd

.global irq_common_stub
irq_common_stub:
    pushad
    mov ebx, esp
    push ds
    push es
    push fs
    push gs
    mov ax, {kernel_data}
    mov ds, ax
    mov es, ax
    mov fs, ax
    mov gs, ax
    push ebx
    call {irq_handler}
    add esp, 4
    pop gs
    pop fs
    pop es
    pop ds
    popad
    add esp, 8
    iretd
"#,
    kernel_data = const 0x10,
    isr_handler = sym isr_handler_trampoline,
    irq_handler = sym irq_handler_trampoline,
);

extern "C" fn isr_handler_trampoline(regs: *mut Regs) {
    unsafe { crate::arch::x86::exceptions::handle(&mut *regs) }
}

extern "C" fn irq_handler_trampoline(regs: *mut Regs) {
    unsafe { crate::arch::x86::irq::dispatch(&mut *regs) }
}

isr_stub!(isr0, 0, has_err = false);
isr_stub!(isr1, 1, has_err = false);
isr_stub!(isr2, 2, has_err = false);
isr_stub!(isr3, 3, has_err = false);
isr_stub!(isr4, 4, has_err = false);
isr_stub!(isr5, 5, has_err = false);
isr_stub!(isr6, 6, has_err = false);
isr_stub!(isr7, 7, has_err = false);
isr_stub!(isr8, 8, has_err = true);
isr_stub!(isr9, 9, has_err = false);
isr_stub!(isr10, 10, has_err = true);
isr_stub!(isr11, 11, has_err = true);
isr_stub!(isr12, 12, has_err = true);
isr_stub!(isr13, 13, has_err = true);
isr_stub!(isr14, 14, has_err = true);
isr_stub!(isr15, 15, has_err = false);
isr_stub!(isr16, 16, has_err = false);
isr_stub!(isr17, 17, has_err = true);
isr_stub!(isr18, 18, has_err = false);
isr_stub!(isr19, 19, has_err = false);
isr_stub!(isr20, 20, has_err = false);
isr_stub!(isr21, 21, has_err = false);
isr_stub!(isr22, 22, has_err = false);
isr_stub!(isr23, 23, has_err = false);
isr_stub!(isr24, 24, has_err = false);
isr_stub!(isr25, 25, has_err = false);
isr_stub!(isr26, 26, has_err = false);
isr_stub!(isr27, 27, has_err = false);
isr_stub!(isr28, 28, has_err = false);
isr_stub!(isr29, 29, has_err = false);
isr_stub!(isr30, 30, has_err = true);
isr_stub!(isr31, 31, has_err = false);

irq_stub!(irq0, 0);
irq_stub!(irq1, 1);
irq_stub!(irq2, 2);
irq_stub!(irq3, 3);
irq_stub!(irq4, 4);
irq_stub!(irq5, 5);
irq_stub!(irq6, 6);
irq_stub!(irq7, 7);
irq_stub!(irq8, 8);
irq_stub!(irq9, 9);
irq_stub!(irq10, 10);
irq_stub!(irq11, 11);
irq_stub!(irq12, 12);
irq_stub!(irq13, 13);
irq_stub!(irq14, 14);
irq_stub!(irq15, 15);

extern "C" {
    fn isr0(); fn isr1(); fn isr2(); fn isr3(); fn isr4(); fn isr5(); fn isr6(); fn isr7();
    fn isr8(); fn isr9(); fn isr10(); fn isr11(); fn isr12(); fn isr13(); fn isr14(); fn isr15();
    fn isr16(); fn isr17(); fn isr18(); fn isr19(); fn isr20(); fn isr21(); fn isr22(); fn isr23();
    fn isr24(); fn isr25(); fn isr26(); fn isr27(); fn isr28(); fn isr29(); fn isr30(); fn isr31();
    fn irq0(); fn irq1(); fn irq2(); fn irq3(); fn irq4(); fn irq5(); fn irq6(); fn irq7();
    fn irq8(); fn irq9(); fn irq10(); fn irq11(); fn irq12(); fn irq13(); fn irq14(); fn irq15();
}

/// Build the IDT (exceptions + remapped IRQs) and load it with `lidt`.
/// The `int 0x80` syscall gate is installed separately by
/// `arch::x86::syscall::init`, once its trampoline address is known.
///
/// # Safety
/// Must be called exactly once, with interrupts disabled, before `sti`.
pub unsafe fn init() {
    set_kernel_gate(0, isr0); set_kernel_gate(1, isr1); set_kernel_gate(2, isr2); set_kernel_gate(3, isr3);
    set_kernel_gate(4, isr4); set_kernel_gate(5, isr5); set_kernel_gate(6, isr6); set_kernel_gate(7, isr7);
    set_kernel_gate(8, isr8); set_kernel_gate(9, isr9); set_kernel_gate(10, isr10); set_kernel_gate(11, isr11);
    set_kernel_gate(12, isr12); set_kernel_gate(13, isr13); set_kernel_gate(14, isr14); set_kernel_gate(15, isr15);
    set_kernel_gate(16, isr16); set_kernel_gate(17, isr17); set_kernel_gate(18, isr18); set_kernel_gate(19, isr19);
    set_kernel_gate(20, isr20); set_kernel_gate(21, isr21); set_kernel_gate(22, isr22); set_kernel_gate(23, isr23);
    set_kernel_gate(24, isr24); set_kernel_gate(25, isr25); set_kernel_gate(26, isr26); set_kernel_gate(27, isr27);
    set_kernel_gate(28, isr28); set_kernel_gate(29, isr29); set_kernel_gate(30, isr30); set_kernel_gate(31, isr31);

    set_kernel_gate(32, irq0); set_kernel_gate(33, irq1); set_kernel_gate(34, irq2); set_kernel_gate(35, irq3);
    set_kernel_gate(36, irq4); set_kernel_gate(37, irq5); set_kernel_gate(38, irq6); set_kernel_gate(39, irq7);
    set_kernel_gate(40, irq8); set_kernel_gate(41, irq9); set_kernel_gate(42, irq10); set_kernel_gate(43, irq11);
    set_kernel_gate(44, irq12); set_kernel_gate(45, irq13); set_kernel_gate(46, irq14); set_kernel_gate(47, irq15);

    flush();
}

/// Reload `IDTR` from the current table. Called once at init and again
/// after `syscall::init` patches in the 0x80 gate.
pub unsafe fn flush() {
    let ptr = IdtPointer {
        limit: (size_of::<[IdtEntry; IDT_ENTRIES]>() - 1) as u16,
        base: core::ptr::addr_of!(IDT) as u32,
    };
    core::arch::asm!("lidt [{0}]", in(reg) &ptr, options(nostack, preserves_flags));
}
