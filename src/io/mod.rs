//! Z180 internal I/O register window dispatcher.
//!
//! Demultiplexes 8-bit port addresses into the relocatable 64-byte internal
//! register window (ASCI0/ASCI1/PRT/MMU bank registers and the ICR that
//! relocates the window itself) or, for ports outside that window, into
//! externally registered devices.

pub mod device;

use std::collections::BTreeMap;

use log::debug;

use crate::asci::AsciChannel;
use crate::mmu::Mmu;
use crate::prt::Prt;
use device::Device;

/// CSIO stub: fabricated values that make RomWBW's SD-card probe skip
/// detection instead of hanging, since CSIO itself is not modeled.
const CSIO_STAT_OFFSET: u8 = 0x0A;
const CSIO_DATA_OFFSET: u8 = 0x0B;

pub struct IoDispatcher {
    internal_base: u8,
    regs: [u8; 64],
    pub asci0: AsciChannel,
    pub asci1: AsciChannel,
    pub prt: Prt,
    devices: BTreeMap<u8, Box<dyn Device>>,
}

impl IoDispatcher {
    pub fn new() -> Self {
        IoDispatcher {
            internal_base: 0x00,
            regs: [0u8; 64],
            asci0: AsciChannel::new(),
            asci1: AsciChannel::new(),
            prt: Prt::new(),
            devices: BTreeMap::new(),
        }
    }

    pub fn reset(&mut self) {
        self.internal_base = 0xC0;
        self.regs = [0u8; 64];
        self.asci0.reset();
        self.asci1.reset();
        self.prt.reset();
    }

    pub fn register_device(&mut self, port: u8, device: Box<dyn Device>) {
        self.devices.insert(port, device);
    }

    fn is_internal(&self, port: u8) -> bool {
        (port & 0xC0) == (self.internal_base & 0xC0)
    }

    pub fn read(&mut self, port: u8, mmu: &mut Mmu) -> u8 {
        if !self.is_internal(port) {
            return match self.devices.get_mut(&port) {
                Some(dev) => dev.read(port),
                None => {
                    debug!("unmapped external port read {:#04x}", port);
                    0xFF
                }
            };
        }

        let offset = port & 0x3F;
        match offset {
            0x00 => self.asci0.read_cntla(),
            0x02 => self.asci0.read_cntlb(),
            0x04 => self.asci0.read_stat(),
            0x06 | 0x08 => self.asci0.read_rdr(),
            0x0E => self.asci0.read_ier(),
            0x12 => self.asci0.read_asext(),

            0x01 => self.asci1.read_cntla(),
            0x03 => self.asci1.read_cntlb(),
            0x05 => self.asci1.read_stat(),
            0x07 | 0x09 => self.asci1.read_rdr(),
            0x0F => self.asci1.read_ier(),
            0x13 => self.asci1.read_asext(),

            0x10 => self.prt.read_tmdr_lo(0),
            0x11 => self.prt.read_tmdr_hi(0),
            0x14 => self.prt.read_trld_lo(0),
            0x15 => self.prt.read_trld_hi(0),
            0x16 => self.prt.read_tmdr_lo(1),
            0x17 => self.prt.read_tmdr_hi(1),
            0x18 => self.prt.read_trld_lo(1),
            0x19 => self.prt.read_trld_hi(1),
            0x1A => self.prt.read_tcr(),

            0x38 => mmu.cbr(),
            0x39 => mmu.bbr(),
            0x3A => mmu.cbar(),

            0x3F => self.internal_base & 0xC0,

            CSIO_STAT_OFFSET => 0x00,
            CSIO_DATA_OFFSET => 0xFF,

            _ => self.regs[offset as usize],
        }
    }

    pub fn write(&mut self, port: u8, value: u8, mmu: &mut Mmu) {
        if !self.is_internal(port) {
            if let Some(dev) = self.devices.get_mut(&port) {
                dev.write(port, value);
            } else {
                debug!("unmapped external port write {:#04x} <- {:#04x}", port, value);
            }
            return;
        }

        let offset = port & 0x3F;
        match offset {
            0x00 => self.asci0.write_cntla(value),
            0x02 => self.asci0.write_cntlb(value),
            0x04 => self.asci0.write_stat(value),
            0x06 | 0x08 => self.asci0.write_tdr(value),
            0x0E => self.asci0.write_ier(value),
            0x12 => self.asci0.write_asext(value),

            0x01 => self.asci1.write_cntla(value),
            0x03 => self.asci1.write_cntlb(value),
            0x05 => self.asci1.write_stat(value),
            0x07 | 0x09 => self.asci1.write_tdr(value),
            0x0F => self.asci1.write_ier(value),
            0x13 => self.asci1.write_asext(value),

            0x10 => self.prt.write_tmdr_lo(0, value),
            0x11 => self.prt.write_tmdr_hi(0, value),
            0x14 => self.prt.write_trld_lo(0, value),
            0x15 => self.prt.write_trld_hi(0, value),
            0x16 => self.prt.write_tmdr_lo(1, value),
            0x17 => self.prt.write_tmdr_hi(1, value),
            0x18 => self.prt.write_trld_lo(1, value),
            0x19 => self.prt.write_trld_hi(1, value),
            0x1A => self.prt.write_tcr(value),

            0x38 => mmu.set_cbr(value),
            0x39 => mmu.set_bbr(value),
            0x3A => mmu.set_cbar(value),

            0x3F => {
                debug!("ICR relocation: internal base {:#04x} -> {:#04x}", self.internal_base, value & 0xC0);
                self.internal_base = value & 0xC0;
            }

            CSIO_STAT_OFFSET | CSIO_DATA_OFFSET => {}

            _ => self.regs[offset as usize] = value,
        }
    }

    /// Highest-priority pending interrupt vector, or `None` if nothing is
    /// pending. Only meaningful when the CPU's IFF1 is set.
    pub fn pending_vector(&self) -> Option<u8> {
        let il = self.regs[0x33];
        if self.prt.interrupt_pending(0) {
            Some((il & 0xE0) | 0x04)
        } else if self.prt.interrupt_pending(1) {
            Some((il & 0xE0) | 0x06)
        } else if self.asci0.interrupt_pending() {
            Some((il & 0xE0) | 0x0E)
        } else {
            None
        }
    }
}

impl Default for IoDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_base_then_relocates() {
        let mut io = IoDispatcher::new();
        let mut mmu = Mmu::new();
        assert!(io.is_internal(0x00));
        io.write(0x3F, 0xC0, &mut mmu);
        assert_eq!(io.internal_base, 0xC0);
        assert!(io.is_internal(0xC0));
        assert!(!io.is_internal(0x00));
    }

    #[test]
    fn mmu_registers_route_through_dispatcher() {
        let mut io = IoDispatcher::new();
        let mut mmu = Mmu::new();
        io.write(0x38, 0x12, &mut mmu);
        io.write(0x39, 0x34, &mut mmu);
        io.write(0x3A, 0x56, &mut mmu);
        assert_eq!(mmu.cbr(), 0x12);
        assert_eq!(mmu.bbr(), 0x34);
        assert_eq!(mmu.cbar(), 0x56);
        assert_eq!(io.read(0x38, &mut mmu), 0x12);
    }

    #[test]
    fn asci0_tdr_rdr_roundtrip_through_dispatcher() {
        let mut io = IoDispatcher::new();
        let mut mmu = Mmu::new();
        io.write(0x06, 0x41, &mut mmu);
        assert_eq!(io.asci0.drain_tx(), vec![0x41]);

        io.asci0.receive_from_console(0x5A);
        assert_eq!(io.read(0x06, &mut mmu), 0x5A);
        assert_eq!(io.read(0x06, &mut mmu), 0);
    }

    #[test]
    fn csio_stub_values() {
        let mut io = IoDispatcher::new();
        let mut mmu = Mmu::new();
        assert_eq!(io.read(0x0A, &mut mmu), 0x00);
        assert_eq!(io.read(0x0B, &mut mmu), 0xFF);
    }

    #[test]
    fn pending_vector_priority() {
        let mut io = IoDispatcher::new();
        io.regs[0x33] = 0x40; // IL
        io.prt.write_tcr(0x33); // TDE0+TDE1+TIE0+TIE1 enabled
        io.prt.write_trld_lo(0, 5);
        io.prt.write_tmdr_lo(0, 1);
        io.prt.write_trld_lo(1, 5);
        io.prt.write_tmdr_lo(1, 1);
        io.prt.step(20);
        assert_eq!(io.pending_vector(), Some(0x44));
    }

    #[test]
    fn unmapped_external_port_reads_0xff() {
        let mut io = IoDispatcher::new();
        let mut mmu = Mmu::new();
        io.write(0x3F, 0xC0, &mut mmu); // relocate so port 0x00 is external
        assert_eq!(io.read(0x00, &mut mmu), 0xFF);
    }
}
