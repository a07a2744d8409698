//! x86_64 machine layer: interrupt flag, context switch, 8254 timer.

use x86_64::instructions::interrupts;
use x86_64::instructions::port::Port;

/// RFLAGS with only the always-set reserved bit. New threads start with
/// interrupts masked; the entry trampoline enables them.
const RFLAGS_BASE: u64 = 0x2;

pub fn interrupts_enabled() -> bool {
    interrupts::are_enabled()
}

pub fn enable_interrupts() {
    interrupts::enable();
}

pub fn disable_interrupts() {
    interrupts::disable();
}

/// Enable interrupts and halt until the next one arrives. `sti` shadows
/// the next instruction, so the pair is atomic and no wakeup can slip in
/// between.
pub fn wait_for_interrupt() {
    interrupts::enable_and_hlt();
}

/// Program 8254 channel 0 for a periodic interrupt at `freq` Hz
/// (control word: counter 0, LSB then MSB, mode 2, binary).
pub fn pit_init(freq: u32) {
    let count = ((1_193_180 + freq / 2) / freq) as u16;

    unsafe {
        Port::<u8>::new(0x43).write(0x34);
        Port::<u8>::new(0x40).write((count & 0xff) as u8);
        Port::<u8>::new(0x40).write((count >> 8) as u8);
    }
}

/// Saved register frame of a descheduled thread. Field order is the
/// layout `switch_context` reads and writes; keep the two in sync.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct Context {
    pub r15: u64,
    pub r14: u64,
    pub r13: u64,
    pub r12: u64,
    pub r11: u64,
    pub r10: u64,
    pub r9: u64,
    pub r8: u64,
    pub rsi: u64,
    pub rdi: u64,
    pub rbp: u64,
    pub rdx: u64,
    pub rcx: u64,
    pub rbx: u64,
    pub rax: u64,
    pub rip: u64,
    pub rsp: u64,
    pub rflags: u64,
}

impl Context {
    pub const fn zeroed() -> Self {
        Self {
            r15: 0,
            r14: 0,
            r13: 0,
            r12: 0,
            r11: 0,
            r10: 0,
            r9: 0,
            r8: 0,
            rsi: 0,
            rdi: 0,
            rbp: 0,
            rdx: 0,
            rcx: 0,
            rbx: 0,
            rax: 0,
            rip: 0,
            rsp: 0,
            rflags: 0,
        }
    }

    /// Craft the frame for a thread that has never run: first dispatch
    /// lands in `entry` with `arg` in rdi and an empty stack.
    pub fn prepare(&mut self, entry: extern "C" fn(usize) -> !, arg: usize, stack_top: u64) {
        *self = Context::zeroed();
        self.rip = entry as usize as u64;
        self.rdi = arg as u64;
        self.rsp = stack_top;
        self.rflags = RFLAGS_BASE;
    }
}

/// Save the running register state into `old` and resume `new`. Returns
/// when the `old` context is dispatched again. Both pointers must stay
/// valid across the switch and interrupts must be masked; the restored
/// rflags keep them masked until the resumed code re-enables them.
#[unsafe(naked)]
pub unsafe extern "C" fn switch_context(_old: *mut Context, _new: *const Context) {
    core::arch::naked_asm!(
        // Save the outgoing context (skipped for a null old pointer).
        "test rdi, rdi",
        "jz 2f",
        "mov [rdi + 0x00], r15",
        "mov [rdi + 0x08], r14",
        "mov [rdi + 0x10], r13",
        "mov [rdi + 0x18], r12",
        "mov [rdi + 0x20], r11",
        "mov [rdi + 0x28], r10",
        "mov [rdi + 0x30], r9",
        "mov [rdi + 0x38], r8",
        "mov [rdi + 0x40], rsi",
        "mov [rdi + 0x48], rdi",
        "mov [rdi + 0x50], rbp",
        "mov [rdi + 0x58], rdx",
        "mov [rdi + 0x60], rcx",
        "mov [rdi + 0x68], rbx",
        "mov [rdi + 0x70], rax",
        // Return address is the saved rip; rsp is its pre-call value.
        "mov rax, [rsp]",
        "mov [rdi + 0x78], rax",
        "lea rax, [rsp + 8]",
        "mov [rdi + 0x80], rax",
        "pushfq",
        "pop rax",
        "mov [rdi + 0x88], rax",
        // Restore the incoming context.
        "2:",
        "mov r15, [rsi + 0x00]",
        "mov r14, [rsi + 0x08]",
        "mov r13, [rsi + 0x10]",
        "mov r12, [rsi + 0x18]",
        "mov r11, [rsi + 0x20]",
        "mov r10, [rsi + 0x28]",
        "mov r9,  [rsi + 0x30]",
        "mov r8,  [rsi + 0x38]",
        "mov rbp, [rsi + 0x50]",
        "mov rdx, [rsi + 0x58]",
        "mov rcx, [rsi + 0x60]",
        "mov rbx, [rsi + 0x68]",
        "mov rax, [rsi + 0x70]",
        "mov rdi, [rsi + 0x88]",
        "push rdi",
        "popfq",
        "mov rsp, [rsi + 0x80]",
        "mov rdi, [rsi + 0x78]",
        "push rdi",
        "mov rdi, [rsi + 0x48]",
        "mov rsi, [rsi + 0x40]",
        "ret",
    )
}
