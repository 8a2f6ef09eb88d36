//! Motorola 68000 interpreter (§4.D).
//!
//! Dispatch is decode-then-match rather than a literal 65,536-entry
//! function-pointer table (§9 permits either; a match compiles to a dense
//! jump table for the common opcode classes and is far cheaper to keep
//! correct by hand). Addressing-mode decode lives in [`addressing`];
//! opcode execution is grouped by semantic family under `exec`, mirroring
//! how the 6809 core splits `alu`/`branch`/`load_store`/`stack`/`transfer`.

mod addressing;
mod decode;
mod exec;
mod status;

pub use addressing::Ea;
pub use status::SrBit;

use crate::core::bus::InterruptState;
use crate::core::component::BusMasterComponent;
use crate::core::{Bus, BusMaster, Component};
use crate::cpu::{Cpu, CpuStateTrait, M68000State};

/// Operand width. The 68000 is byte/word/long throughout; there is no
/// narrower or wider unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Size {
    Byte,
    Word,
    Long,
}

impl Size {
    pub fn bytes(self) -> u32 {
        match self {
            Size::Byte => 1,
            Size::Word => 2,
            Size::Long => 4,
        }
    }

    /// Decode the common 2-bit size field used by MOVE and most ALU
    /// opcodes (`00` = byte, `01` = word, `10` = long).
    pub fn from_bits2(bits: u16) -> Option<Size> {
        match bits {
            0b00 => Some(Size::Byte),
            0b01 => Some(Size::Word),
            0b10 => Some(Size::Long),
            _ => None,
        }
    }
}

/// Exception vector numbers (§4.D "Exceptions").
pub mod vectors {
    pub const BUS_ERROR: u8 = 2;
    pub const ADDRESS_ERROR: u8 = 3;
    pub const ILLEGAL_INSTRUCTION: u8 = 4;
    pub const DIVIDE_BY_ZERO: u8 = 5;
    pub const CHK: u8 = 6;
    pub const TRAPV: u8 = 7;
    pub const PRIVILEGE_VIOLATION: u8 = 8;
    pub const TRACE: u8 = 9;
    pub const LINE_A: u8 = 10;
    pub const LINE_F: u8 = 11;
    pub const AUTOVECTOR_BASE: u8 = 24; // level n -> AUTOVECTOR_BASE + n
    pub const TRAP_BASE: u8 = 32; // TRAP #n -> TRAP_BASE + n
}

/// Extra context pushed for address/bus error exceptions, beyond the
/// universal PC+SR frame (§4.D step 3).
#[derive(Clone, Copy, Debug)]
pub struct FaultFrame {
    pub instruction_register: u16,
    pub access_address: u32,
    pub function_code: u16,
}

/// An exception raised mid-instruction, to be taken at the next dispatch
/// boundary rather than unwound through Rust control flow.
#[derive(Clone, Copy, Debug)]
pub struct PendingException {
    pub vector: u8,
    pub fault: Option<FaultFrame>,
}

pub struct M68000 {
    pub d: [u32; 8],
    /// A0-A7. `a[7]` is always the *currently active* stack pointer; `ssp`
    /// and `usp` below shadow the inactive one so a supervisor/user mode
    /// switch can restore it.
    pub a: [u32; 8],
    pub ssp: u32,
    pub usp: u32,
    pub pc: u32,
    pub sr: u16,
    /// Vector base register. The bare 68000 has no VBR (it's always 0,
    /// vectors live at the bottom of bank 0); kept as a field so the
    /// exception-dispatch code reads uniformly and a future 68010-class
    /// core could relocate it.
    pub vbr: u32,
    pub stopped: bool,
    run_stop_requested: bool,
    pending_exception: Option<PendingException>,
    nmi_latched: bool,
    trace_pending: bool,
}

impl M68000 {
    pub fn new() -> Self {
        M68000 {
            d: [0; 8],
            a: [0; 8],
            ssp: 0,
            usp: 0,
            pc: 0,
            sr: 0,
            vbr: 0,
            stopped: false,
            run_stop_requested: false,
            pending_exception: None,
            nmi_latched: false,
            trace_pending: false,
        }
    }

    /// Raise an exception to be taken at the next instruction boundary.
    /// Called both by the interrupt check and by execution handlers that
    /// detect a fault mid-instruction (odd address, zero divisor, etc).
    pub fn raise(&mut self, vector: u8, fault: Option<FaultFrame>) {
        // Higher-priority exceptions (bus/address error) pre-empt a
        // lower-priority one already queued this instruction.
        let priority = |v: u8| matches!(v, vectors::BUS_ERROR | vectors::ADDRESS_ERROR);
        if self.pending_exception.is_none() || priority(vector) {
            self.pending_exception = Some(PendingException { vector, fault });
        }
    }

    /// Called from a memory-handler callback invoked during a bus access
    /// (§4.D "Suspension (`run_stop`)"); aborts the current timeslice at
    /// the next instruction boundary.
    pub fn run_stop(&mut self) {
        self.run_stop_requested = true;
    }

    fn take_exception(&mut self, bus: &mut dyn Bus, master: BusMaster, exc: PendingException) -> u32 {
        let old_sr = self.sr;
        status::set_flag(&mut self.sr, SrBit::T, false);
        let was_supervisor = status::flag(self.sr, SrBit::S);
        status::set_flag(&mut self.sr, SrBit::S, true);
        if !was_supervisor {
            self.usp = self.a[7]; // A7 held the user stack before the switch
        }

        self.ssp = self.ssp.wrapping_sub(4);
        bus.write32(master, self.ssp, self.pc);
        self.ssp = self.ssp.wrapping_sub(2);
        bus.write16(master, self.ssp, old_sr);

        if let Some(f) = exc.fault {
            self.ssp = self.ssp.wrapping_sub(2);
            bus.write16(master, self.ssp, f.function_code);
            self.ssp = self.ssp.wrapping_sub(4);
            bus.write32(master, self.ssp, f.access_address);
            self.ssp = self.ssp.wrapping_sub(2);
            bus.write16(master, self.ssp, f.instruction_register);
        }

        self.a[7] = self.ssp;
        let vector_addr = self.vbr.wrapping_add(exc.vector as u32 * 4);
        self.pc = bus.read32(master, vector_addr);

        exception_cycles(exc.vector)
    }

    /// Check for a pending external interrupt at the current instruction
    /// boundary (§4.D "Interrupt policy"). NMI is edge-latched; ordinary
    /// auto-vectored levels are level-sensitive and re-fire every boundary
    /// until the guest lowers the line via the virtual-IRQ register.
    fn check_interrupts(&mut self, bus: &dyn Bus, master: BusMaster) {
        let ints: InterruptState = bus.check_interrupts(master);
        if ints.nmi {
            if !self.nmi_latched {
                self.nmi_latched = true;
                self.raise(vectors::AUTOVECTOR_BASE + 7, None);
            }
        } else {
            self.nmi_latched = false;
        }

        if self.pending_exception.is_none()
            && ints.level > 0
            && ints.level > status::interrupt_mask(self.sr)
        {
            self.raise(vectors::AUTOVECTOR_BASE + ints.level, None);
        }
    }

    /// Execute one instruction (or one pending exception), returning the
    /// cycle cost charged to the caller's clock.
    fn step(&mut self, bus: &mut dyn Bus, master: BusMaster) -> u32 {
        self.check_interrupts(bus, master);

        if let Some(exc) = self.pending_exception.take() {
            self.stopped = false;
            return self.take_exception(bus, master, exc);
        }

        if self.stopped {
            return 4;
        }

        if self.trace_pending {
            self.trace_pending = false;
            self.raise(vectors::TRACE, None);
        }

        if self.pc & 1 != 0 {
            let bad_pc = self.pc;
            exec::system::address_error(self, bad_pc, 0, 0b10);
            let exc = self.pending_exception.take().expect("just raised");
            return self.take_exception(bus, master, exc);
        }

        let opcode = bus.read16(master, self.pc);
        self.pc = self.pc.wrapping_add(2);
        let cycles = decode::dispatch(self, bus, master, opcode);

        if status::flag(self.sr, SrBit::T) {
            self.trace_pending = true;
        }

        cycles
    }
}

fn exception_cycles(vector: u8) -> u32 {
    match vector {
        v if v == vectors::BUS_ERROR || v == vectors::ADDRESS_ERROR => 50,
        v if v >= vectors::TRAP_BASE => 34,
        v if v >= vectors::AUTOVECTOR_BASE => 44,
        _ => 34,
    }
}

impl Default for M68000 {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for M68000 {
    fn tick(&mut self) -> bool {
        false
    }

    fn clock_divider(&self) -> u64 {
        // The 68000 runs at crystal/2 on the Neo Geo board (§3).
        2
    }
}

impl BusMasterComponent for M68000 {
    type Bus = dyn Bus;

    /// Runs exactly one instruction (or exception) per call; the scheduler
    /// decides how many calls make up a timeslice. Returns true once the
    /// run-stop flag has been asserted, signalling the caller to stop
    /// issuing further ticks this timeslice (§4.D "Suspension").
    fn tick_with_bus(&mut self, bus: &mut Self::Bus, master: BusMaster) -> bool {
        self.step(bus, master);
        let stop = self.run_stop_requested;
        self.run_stop_requested = false;
        stop
    }
}

impl Cpu for M68000 {
    fn reset(&mut self) {
        self.d = [0; 8];
        self.a = [0; 8];
        self.sr = 0;
        status::set_flag(&mut self.sr, SrBit::S, true);
        status::set_interrupt_mask(&mut self.sr, 7);
        self.stopped = false;
        self.run_stop_requested = false;
        self.pending_exception = None;
        self.nmi_latched = false;
        self.trace_pending = false;
        // SSP and PC are loaded from the reset vector (bank 0, words 0 and
        // 1) by the machine aggregate once the BIOS bank is mapped in, via
        // `load_reset_vector`.
    }

    fn signal_interrupt(&mut self, _int: InterruptState) {
        // Interrupts are pulled from `Bus::check_interrupts` at every
        // instruction boundary rather than pushed, since the Neo Geo's
        // virtual-IRQ bitmask is owned by the memory decoder (§4.D
        // "Virtual IRQ"), not cached locally by the CPU.
    }

    fn is_sleeping(&self) -> bool {
        self.stopped
    }
}

impl M68000 {
    /// Execute one instruction (or pending exception/interrupt) and return
    /// its cycle cost. `BusMasterComponent::tick_with_bus` exists for
    /// generic multi-CPU code and only reports the instruction-boundary
    /// bool; a machine that already knows its CPU is an `M68000` calls
    /// this directly to drive the scheduler's master clock accurately.
    pub fn run_one(&mut self, bus: &mut dyn Bus, master: BusMaster) -> u32 {
        self.step(bus, master)
    }

    /// Load SSP and PC from the reset vector at `VBR+0`/`VBR+4`. Called by
    /// the machine aggregate after `reset()` and after a watchdog-induced
    /// `cpu_reset()` (§4.G).
    pub fn load_reset_vector(&mut self, bus: &mut dyn Bus, master: BusMaster) {
        self.ssp = bus.read32(master, self.vbr);
        self.a[7] = self.ssp;
        self.pc = bus.read32(master, self.vbr.wrapping_add(4));
    }
}

impl CpuStateTrait for M68000 {
    type Snapshot = M68000State;

    fn snapshot(&self) -> M68000State {
        M68000State {
            d: self.d,
            a: self.a,
            ssp: self.ssp,
            usp: self.usp,
            pc: self.pc,
            sr: self.sr,
        }
    }
}
