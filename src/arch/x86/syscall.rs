//! # `int 0x80` syscall entry
//!
//! A naked trampoline installed at IDT vector 0x80, DPL=3 (even though
//! this kernel never runs ring-3 code - see the crate's Non-goals around
//! user/kernel isolation - so the gate's DPL has no real enforcement
//! effect here beyond documenting the calling convention). It saves every
//! general-purpose register, forwards `eax`/`ebx`/`ecx`/`edx` to
//! `syscall::dispatch`, and writes the i32 return value back into the
//! `eax` slot of the saved register block before restoring everything and
//! returning with `iretd`.
//!
//! ABI: `eax` = syscall number, `ebx`/`ecx`/`edx` = up to three arguments,
//! return value in `eax` (negative = error).

core::arch::global_asm!(
    r#"
.global syscall_trampoline
syscall_trampoline:
    pushad
    push edx
    push ecx
    push ebx
    push eax
    call {dispatch}
    add esp, 16
    mov [esp + 28], eax
    popad
    iretd
"#,
    dispatch = sym dispatch_trampoline,
);

extern "C" {
    fn syscall_trampoline();
}

extern "C" fn dispatch_trampoline(eax: u32, ebx: u32, ecx: u32, edx: u32) -> u32 {
    crate::syscall::dispatch(eax, ebx, ecx, edx) as u32
}

/// Patch the `int 0x80` gate into the IDT and reload it.
///
/// # Safety
/// Must run once during boot, after `idt::init` has built the base table.
pub unsafe fn init() {
    super::idt::set_user_gate(0x80, syscall_trampoline as u32);
    super::idt::flush();
}
