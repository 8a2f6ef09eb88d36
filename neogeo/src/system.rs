//! `NeoGeoSystem`: the machine aggregate tying the CPU, memory decoder,
//! scheduler, video, and peripherals together behind [`mvs_core::prelude::Machine`].
//!
//! Grounded on `machines/src/joust.rs`'s `JoustSystem`: one struct
//! implements both [`Bus`] and `Machine` directly rather than splitting a
//! separate `bus.rs`, and `tick()`'s raw-pointer self-aliasing (so the CPU
//! field can drive `self` as its own bus) is reused here for the
//! scheduler's `run_frame` callback. The one addition this board needs that
//! Joust's didn't: the CPU field itself is swapped out with
//! [`std::mem::take`] for the duration of each timeslice instead of
//! aliased, since `M68000::run_one` needs `&mut dyn Bus` and `self.cpu`
//! would otherwise alias itself. Memory-mapped I/O banks (2, 3, 4, D) are
//! dispatched directly here rather than through [`MemoryDecoder`] handlers,
//! since they need sibling access to video/peripheral/palette state that a
//! `BankHandler` trait object can't borrow; banks 0, 1, and C are plain
//! backing buffers and go through the decoder as intended.

use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::Rc;

use mvs_core::cache::SpriteCache;
use mvs_core::cpu::M68000;
use mvs_core::memory::Size;
use mvs_core::prelude::{
    Bank, Bus, BusMaster, Clock, Cpu, InputButton, InterruptState, Machine, MemoryDecoder,
    Scheduler,
};
use mvs_core::scheduler::EventId;

use crate::cartridge::{CartridgeError, CartridgeRom};
use crate::peripherals::Peripherals;
use crate::video::{Lspc, Palette};

const SPRITE_SLOT_BYTES: usize = 16 * 16;
const SPRITE_CACHE_ENTRIES: usize = 4096;
const BACKUP_RAM_SIZE: usize = 64 * 1024;
const MEGABANK_MASK: u32 = 0xFFFFF;

pub struct NeoGeoSystem {
    cpu: M68000,
    decoder: MemoryDecoder,
    scheduler: Scheduler,
    video: Lspc,
    peripherals: Peripherals,
    rom: CartridgeRom,
    palette: Palette,
    sprite_cache: RefCell<SpriteCache>,
    backup_ram: Vec<u8>,

    clock: Clock,
    frame_begin_clock: Clock,

    program_bank: u32,
    vectors_mapped_to_bios: bool,
    fix_uses_cart: bool,
    backup_write_protected: bool,

    irq1: bool,
    irq2: Rc<Cell<bool>>,
    irq3: bool,
    raster_event: Option<EventId>,
}

impl NeoGeoSystem {
    pub fn new(cart_dir: &Path) -> Result<Self, CartridgeError> {
        let rom = CartridgeRom::from_directory(cart_dir)?;
        Ok(Self::from_rom(rom))
    }

    fn from_rom(rom: CartridgeRom) -> Self {
        let mut decoder = MemoryDecoder::new();
        decoder.set_bank(0x0, Bank::backing_ro(rom.program_fixed.clone(), MEGABANK_MASK));
        decoder.set_bank(0x1, Bank::backing(vec![0u8; 0x10000], 0xFFFF));
        decoder.set_bank(0xC, Bank::backing_ro(rom.bios_program.clone(), 0x1FFFF));

        let mut scheduler = Scheduler::new();
        let mut peripherals = Peripherals::new();
        peripherals.install(&mut scheduler);

        let mut system = NeoGeoSystem {
            cpu: M68000::new(),
            decoder,
            scheduler,
            video: Lspc::new(),
            peripherals,
            rom,
            palette: Palette::new(),
            sprite_cache: RefCell::new(SpriteCache::new(SPRITE_SLOT_BYTES, SPRITE_CACHE_ENTRIES)),
            backup_ram: vec![0u8; BACKUP_RAM_SIZE],

            clock: 0,
            frame_begin_clock: 0,

            program_bank: 0,
            vectors_mapped_to_bios: false,
            fix_uses_cart: false,
            backup_write_protected: false,

            irq1: false,
            irq2: Rc::new(Cell::new(false)),
            irq3: false,
            raster_event: None,
        };
        system.power_on();
        system
    }

    /// Reset the CPU and load PC/SSP from whichever vector table is
    /// currently mapped into bank 0. Shared by construction and
    /// [`Machine::reset`].
    fn power_on(&mut self) {
        self.sync_bank0_vectors();
        let mut cpu = std::mem::take(&mut self.cpu);
        cpu.reset();
        cpu.load_reset_vector(self, BusMaster::Cpu);
        self.cpu = cpu;
    }

    /// Run one frame's worth of scheduled events and CPU execution, then
    /// service VBlank. `Scheduler::run_frame` takes `&mut self.scheduler`
    /// as its receiver; the callback can't also capture `self` by
    /// reference without conflicting with that borrow, so it captures a
    /// raw pointer instead (`machines/src/joust.rs`'s `tick()` idiom).
    /// Nothing reachable through that pointer touches `self.scheduler`
    /// again before the call returns — peripheral writes that would
    /// otherwise need it defer through [`Peripherals::flush_pending`].
    pub fn step_frame(&mut self) {
        self.frame_begin_clock = self.clock;
        let sys_ptr: *mut Self = self;
        self.scheduler
            .run_frame(move |to| unsafe { (*sys_ptr).run_cpu_to(to) });
        self.peripherals.flush_pending(&mut self.scheduler);
        self.on_vblank();
    }

    /// Advance the CPU until `self.clock` reaches `deadline`, returning the
    /// clock actually reached. The CPU is swapped out for the duration so
    /// `self` (missing only its own placeholder CPU) can be passed to it
    /// as `&mut dyn Bus`.
    fn run_cpu_to(&mut self, deadline: Clock) -> Clock {
        let mut cpu = std::mem::take(&mut self.cpu);
        while self.clock < deadline {
            if self.peripherals.watchdog.reset_pending() {
                self.peripherals.watchdog.acknowledge_reset();
                cpu.reset();
                cpu.load_reset_vector(self, BusMaster::Cpu);
            }
            let cycles = cpu.run_one(self, BusMaster::Cpu).max(1);
            self.clock += cycles as Clock;
        }
        self.cpu = cpu;
        self.clock
    }

    fn on_vblank(&mut self) {
        self.irq1 = true;
        self.video.vblank_tick();

        if let Some(id) = self.raster_event.take() {
            self.scheduler.cancel_event(id);
        }
        if let Some(line) = self.video.raster_irq_line() {
            let flag = self.irq2.clone();
            let deadline = self.scheduler.clock() + line as Clock * mvs_core::scheduler::LINE_CLOCK;
            self.raster_event = Some(
                self.scheduler
                    .add_event(deadline, Box::new(move |_| { flag.set(true); 0 })),
            );
        }
    }

    /// Rebuild bank 0's image: the cartridge's fixed program ROM, with its
    /// first 128 bytes overlaid by the BIOS's own vectors when mapped in
    /// (`0x3A0003`/`0x3A0013`, §3 "Two vector tables").
    fn sync_bank0_vectors(&mut self) {
        let mut image = self.rom.program_fixed.clone();
        if self.vectors_mapped_to_bios {
            image[..0x80].copy_from_slice(&self.rom.bios_program[..0x80]);
        }
        self.decoder.swap_backing(0x0, image, MEGABANK_MASK);
    }

    fn read_any(&mut self, addr: u32, size: Size) -> u32 {
        match (addr >> 20) & 0xF {
            0x2 => self.read_program_banked(addr, size),
            0x3 => self.hw_read(addr, size),
            0x4 => self.read_palette(addr, size),
            0xD => be_read(&self.backup_ram, (addr & 0xFFFF) as usize, size),
            _ => self.decoder.read(addr, size),
        }
    }

    fn write_any(&mut self, addr: u32, size: Size, value: u32) {
        match (addr >> 20) & 0xF {
            0x2 => self.write_program_banked(addr, value),
            0x3 => self.hw_write(addr, size, value),
            0x4 => self.write_palette(addr, size, value),
            0xD => {
                if !self.backup_write_protected {
                    be_write(&mut self.backup_ram, (addr & 0xFFFF) as usize, size, value);
                }
            }
            _ => self.decoder.write(addr, size, value),
        }
    }

    fn read_program_banked(&mut self, addr: u32, size: Size) -> u32 {
        let base = self.program_bank * 0x100000 + (addr & MEGABANK_MASK);
        match size {
            Size::Byte => self.rom.program_banked.read_byte(base) as u32,
            Size::Word => {
                let hi = self.rom.program_banked.read_byte(base) as u32;
                let lo = self.rom.program_banked.read_byte(base + 1) as u32;
                (hi << 8) | lo
            }
            Size::Long => {
                let b0 = self.rom.program_banked.read_byte(base) as u32;
                let b1 = self.rom.program_banked.read_byte(base + 1) as u32;
                let b2 = self.rom.program_banked.read_byte(base + 2) as u32;
                let b3 = self.rom.program_banked.read_byte(base + 3) as u32;
                (b0 << 24) | (b1 << 16) | (b2 << 8) | b3
            }
        }
    }

    /// Writes anywhere in bank 2 are swallowed except the bank-select range
    /// `0x2FFFF0..=0x2FFFFF`, which picks one of eight 1 MiB windows of
    /// `b.rom` (§4.F "Bank-switch"). Zero-based, unlike the original's
    /// `+1`: that offset exists only to skip past a `p.rom` prefix in its
    /// single combined ROM array, which this engine doesn't have since
    /// `program_fixed` and `program_banked` are kept separate.
    fn write_program_banked(&mut self, addr: u32, value: u32) {
        if addr & MEGABANK_MASK >= 0xFFFF0 {
            self.program_bank = value & 0x7;
        }
    }

    fn hw_read(&mut self, addr: u32, size: Size) -> u32 {
        let sub = (addr >> 16) & 0xFF;
        let lo = addr & 0xFFFF;
        let value = match (sub, lo) {
            (0x30, 0x0000) => self.peripherals.input.p1_controls() as u32,
            (0x30, 0x0001) => 0xFF,
            (0x32, 0x0000) => 1,
            (0x32, 0x0001) => {
                (self.peripherals.input.status_a_low() as u32)
                    | ((self.peripherals.rtc.data_r() as u32) << 6)
                    | ((self.peripherals.rtc.tp_r() as u32) << 7)
            }
            (0x38, 0x0000) => self.peripherals.input.status_b() as u32,
            (0x3C, 0x0002) => self.video.vram_data_r() as u32,
            (0x3C, 0x0006) => self.video.mode_r(self.clock - self.frame_begin_clock) as u32,
            _ => 0xFFFF_FFFF,
        };
        match size {
            Size::Byte => value & 0xFF,
            Size::Word => value & 0xFFFF,
            Size::Long => value,
        }
    }

    fn hw_write(&mut self, addr: u32, _size: Size, value: u32) {
        let sub = (addr >> 16) & 0xFF;
        let lo = addr & 0xFFFF;
        match (sub, lo) {
            (0x30, 0x0001) => self.peripherals.request_watchdog_kick(),
            (0x32, 0x0000) => {} // Z80 sound command: log-only stub, no sound core behind it (§1 Non-goals).
            (0x38, 0x0051) => self.peripherals.write_rtc_serial(value as u8),
            (0x3A, 0x0003) => {
                self.vectors_mapped_to_bios = true;
                self.sync_bank0_vectors();
            }
            (0x3A, 0x0013) => {
                self.vectors_mapped_to_bios = false;
                self.sync_bank0_vectors();
            }
            (0x3A, 0x000B) => self.fix_uses_cart = false,
            (0x3A, 0x001B) => self.fix_uses_cart = true,
            (0x3A, 0x000D) => self.backup_write_protected = true,
            (0x3A, 0x001D) => self.backup_write_protected = false,
            (0x3A, 0x000F) => self.palette.select_bank(1),
            (0x3A, 0x001F) => self.palette.select_bank(0),
            (0x3C, 0x0000) => self.video.vram_addr_w(value as u16),
            (0x3C, 0x0002) => self.video.vram_data_w(value as u16),
            (0x3C, 0x0004) => self.video.vram_modulo_w(value as u16),
            (0x3C, 0x0006) => self.video.mode_w(value as u16),
            (0x3C, 0x000C) => {
                if value & 1 != 0 {
                    self.irq3 = false;
                }
                if value & 2 != 0 {
                    self.irq2.set(false);
                }
                if value & 4 != 0 {
                    self.irq1 = false;
                }
            }
            _ => {}
        }
    }

    fn read_palette(&mut self, addr: u32, size: Size) -> u32 {
        match size {
            Size::Word => self.palette.read_word(addr) as u32,
            Size::Byte => {
                let w = self.palette.read_word(addr & !1);
                if addr & 1 == 0 { (w >> 8) as u32 } else { (w & 0xFF) as u32 }
            }
            Size::Long => {
                let hi = self.palette.read_word(addr) as u32;
                let lo = self.palette.read_word(addr + 2) as u32;
                (hi << 16) | lo
            }
        }
    }

    fn write_palette(&mut self, addr: u32, size: Size, value: u32) {
        match size {
            Size::Word => self.palette.write_word(addr, value as u16),
            Size::Byte => {
                let mut w = self.palette.read_word(addr & !1);
                if addr & 1 == 0 {
                    w = (w & 0x00FF) | ((value as u16) << 8);
                } else {
                    w = (w & 0xFF00) | (value as u16 & 0xFF);
                }
                self.palette.write_word(addr & !1, w);
            }
            Size::Long => {
                self.palette.write_word(addr, (value >> 16) as u16);
                self.palette.write_word(addr + 2, value as u16);
            }
        }
    }
}

fn be_read(data: &[u8], off: usize, size: Size) -> u32 {
    match size {
        Size::Byte => *data.get(off).unwrap_or(&0xFF) as u32,
        Size::Word => {
            let hi = *data.get(off).unwrap_or(&0xFF) as u32;
            let lo = *data.get(off + 1).unwrap_or(&0xFF) as u32;
            (hi << 8) | lo
        }
        Size::Long => {
            let b0 = *data.get(off).unwrap_or(&0xFF) as u32;
            let b1 = *data.get(off + 1).unwrap_or(&0xFF) as u32;
            let b2 = *data.get(off + 2).unwrap_or(&0xFF) as u32;
            let b3 = *data.get(off + 3).unwrap_or(&0xFF) as u32;
            (b0 << 24) | (b1 << 16) | (b2 << 8) | b3
        }
    }
}

fn be_write(data: &mut [u8], off: usize, size: Size, value: u32) {
    match size {
        Size::Byte => {
            if let Some(b) = data.get_mut(off) {
                *b = value as u8;
            }
        }
        Size::Word => {
            if off + 1 < data.len() {
                data[off] = (value >> 8) as u8;
                data[off + 1] = value as u8;
            }
        }
        Size::Long => {
            if off + 3 < data.len() {
                data[off] = (value >> 24) as u8;
                data[off + 1] = (value >> 16) as u8;
                data[off + 2] = (value >> 8) as u8;
                data[off + 3] = value as u8;
            }
        }
    }
}

impl Bus for NeoGeoSystem {
    fn read8(&mut self, _master: BusMaster, addr: u32) -> u8 {
        self.read_any(addr, Size::Byte) as u8
    }

    fn read16(&mut self, _master: BusMaster, addr: u32) -> u16 {
        self.read_any(addr, Size::Word) as u16
    }

    fn read32(&mut self, _master: BusMaster, addr: u32) -> u32 {
        self.read_any(addr, Size::Long)
    }

    fn write8(&mut self, _master: BusMaster, addr: u32, data: u8) {
        self.write_any(addr, Size::Byte, data as u32);
    }

    fn write16(&mut self, _master: BusMaster, addr: u32, data: u16) {
        self.write_any(addr, Size::Word, data as u32);
    }

    fn write32(&mut self, _master: BusMaster, addr: u32, data: u32) {
        self.write_any(addr, Size::Long, data);
    }

    fn check_interrupts(&self, _target: BusMaster) -> InterruptState {
        let level = if self.irq3 {
            3
        } else if self.irq2.get() {
            2
        } else if self.irq1 {
            1
        } else {
            0
        };
        InterruptState { level, nmi: false }
    }

    /// The 68000's own RESET instruction pulses every peripheral's reset
    /// line but leaves the CPU's own registers untouched (§4.G "Resets").
    fn reset_peripherals(&mut self, _master: BusMaster) {
        self.program_bank = 0;
        self.vectors_mapped_to_bios = false;
        self.fix_uses_cart = false;
        self.backup_write_protected = false;
        self.palette.select_bank(0);
        self.irq1 = false;
        self.irq2.set(false);
        self.irq3 = false;
        self.sync_bank0_vectors();
    }
}

impl Machine for NeoGeoSystem {
    fn display_size(&self) -> (u32, u32) {
        (crate::video::lspc::SCREEN_WIDTH, crate::video::lspc::SCREEN_HEIGHT)
    }

    fn run_frame(&mut self) {
        self.step_frame();
    }

    fn render_frame(&self, buffer: &mut [u8]) {
        let fix_rom: &[u8] = if self.fix_uses_cart { &self.rom.cart_fix } else { &self.rom.bios_fix };
        let mut cache = self.sprite_cache.borrow_mut();
        self.video.render(
            buffer,
            &self.palette,
            self.palette.active_bank(),
            fix_rom,
            &self.rom.sprite_rom,
            &mut cache,
        );
    }

    fn set_input(&mut self, button: u8, pressed: bool) {
        self.peripherals.input.set(button, pressed);
    }

    fn input_map(&self) -> &[InputButton] {
        crate::peripherals::input::INPUT_MAP
    }

    fn reset(&mut self) {
        self.video = Lspc::new();
        self.palette = Palette::new();
        self.sprite_cache.borrow_mut().reset();
        self.program_bank = 0;
        self.fix_uses_cart = false;
        self.backup_write_protected = false;
        self.irq1 = false;
        self.irq2.set(false);
        self.irq3 = false;
        if let Some(id) = self.raster_event.take() {
            self.scheduler.cancel_event(id);
        }
        self.power_on();
    }

    fn save_nvram(&self) -> Option<&[u8]> {
        Some(&self.backup_ram)
    }

    fn load_nvram(&mut self, data: &[u8]) {
        let n = data.len().min(self.backup_ram.len());
        self.backup_ram[..n].copy_from_slice(&data[..n]);
    }
}
