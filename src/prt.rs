//! Z180 Programmable Reload Timer (PRT).
//!
//! Two independent down-counting channels sharing one control register
//! (TCR). Each channel reloads from TRLDi when its counter reaches zero
//! and, if its timer-interrupt-enable bit is set, latches a TIF flag that
//! the I/O dispatcher surfaces to the CPU as a pending interrupt.

/// Z180 PRT prescaler: one timer tick per this many CPU cycles.
const PRESCALER: u64 = 20;

mod tcr {
    pub const TDE0: u8 = 1 << 0;
    pub const TDE1: u8 = 1 << 1;
    pub const TIE0: u8 = 1 << 4;
    pub const TIE1: u8 = 1 << 5;
    pub const TIF0: u8 = 1 << 6;
    pub const TIF1: u8 = 1 << 7;
}

#[derive(Debug, Clone, Copy, Default)]
struct Channel {
    tmdr: u16,
    trld: u16,
}

impl Channel {
    fn reset(&mut self) {
        self.tmdr = 0xFFFF;
        self.trld = 0xFFFF;
    }
}

#[derive(Debug)]
pub struct Prt {
    ch: [Channel; 2],
    tcr: u8,
    /// leftover cycles that haven't yet accumulated to a whole tick
    carry: u64,
}

impl Prt {
    pub fn new() -> Self {
        let mut prt = Prt {
            ch: [Channel::default(); 2],
            tcr: 0,
            carry: 0,
        };
        prt.reset();
        prt
    }

    pub fn reset(&mut self) {
        for c in &mut self.ch {
            c.reset();
        }
        self.tcr = 0;
        self.carry = 0;
    }

    fn tde(&self, i: usize) -> bool {
        self.tcr & (if i == 0 { tcr::TDE0 } else { tcr::TDE1 }) != 0
    }

    fn tie(&self, i: usize) -> bool {
        self.tcr & (if i == 0 { tcr::TIE0 } else { tcr::TIE1 }) != 0
    }

    fn tif(&self, i: usize) -> bool {
        self.tcr & (if i == 0 { tcr::TIF0 } else { tcr::TIF1 }) != 0
    }

    fn set_tif(&mut self, i: usize) {
        self.tcr |= if i == 0 { tcr::TIF0 } else { tcr::TIF1 };
    }

    /// Advance both channels by `cycles` CPU cycles.
    pub fn step(&mut self, cycles: u64) {
        self.carry += cycles;
        let ticks = self.carry / PRESCALER;
        self.carry %= PRESCALER;
        if ticks == 0 {
            return;
        }
        let ticks16 = ticks.min(u16::MAX as u64) as u16;
        for i in 0..2 {
            if !self.tde(i) {
                continue;
            }
            if self.ch[i].tmdr <= ticks16 {
                self.ch[i].tmdr = self.ch[i].trld;
                self.set_tif(i);
            } else {
                self.ch[i].tmdr -= ticks16;
            }
        }
    }

    pub fn interrupt_pending(&self, i: usize) -> bool {
        self.tie(i) && self.tif(i)
    }

    pub fn read_tmdr_lo(&self, i: usize) -> u8 {
        (self.ch[i].tmdr & 0xFF) as u8
    }
    pub fn read_tmdr_hi(&self, i: usize) -> u8 {
        (self.ch[i].tmdr >> 8) as u8
    }
    pub fn write_tmdr_lo(&mut self, i: usize, v: u8) {
        self.ch[i].tmdr = (self.ch[i].tmdr & 0xFF00) | v as u16;
    }
    pub fn write_tmdr_hi(&mut self, i: usize, v: u8) {
        self.ch[i].tmdr = (self.ch[i].tmdr & 0x00FF) | ((v as u16) << 8);
    }

    pub fn read_trld_lo(&self, i: usize) -> u8 {
        (self.ch[i].trld & 0xFF) as u8
    }
    pub fn read_trld_hi(&self, i: usize) -> u8 {
        (self.ch[i].trld >> 8) as u8
    }
    pub fn write_trld_lo(&mut self, i: usize, v: u8) {
        self.ch[i].trld = (self.ch[i].trld & 0xFF00) | v as u16;
    }
    pub fn write_trld_hi(&mut self, i: usize, v: u8) {
        self.ch[i].trld = (self.ch[i].trld & 0x00FF) | ((v as u16) << 8);
    }

    pub fn read_tcr(&self) -> u8 {
        self.tcr
    }

    /// TIF bits are write-one-to-leave-unchanged; writing 0 clears them.
    /// All other bits are freely writable.
    pub fn write_tcr(&mut self, v: u8) {
        let kept_tif = self.tcr & v & (tcr::TIF0 | tcr::TIF1);
        self.tcr = (v & !(tcr::TIF0 | tcr::TIF1)) | kept_tif;
    }
}

impl Default for Prt {
    fn default() -> Self {
        Self::new()
    }
}
