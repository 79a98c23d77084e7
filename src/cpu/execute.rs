//! Opcode dispatch across the base, CB, ED, and DD/FD (index) opcode
//! spaces, decoded via the conventional x/y/z/p/q bitfield decomposition of
//! the opcode byte (x = bits 7-6, y = bits 5-3, z = bits 2-0, p = y>>1,
//! q = y&1). Z180 extensions (MLT, TST, IN0/OUT0, OTIMx) are interleaved
//! into the ED space at their real silicon opcodes.

use super::Cpu;
use crate::bus::Bus;
use log::warn;

impl Cpu {
    pub(super) fn execute(&mut self, bus: &mut Bus, opcode: u8) {
        match opcode {
            0xCB => self.execute_cb(bus, None),
            0xED => self.execute_ed(bus),
            0xDD => self.execute_index(bus, true),
            0xFD => self.execute_index(bus, false),
            _ => self.execute_base(bus, opcode),
        }
    }

    fn execute_base(&mut self, bus: &mut Bus, opcode: u8) {
        let x = (opcode >> 6) & 3;
        let y = (opcode >> 3) & 7;
        let z = opcode & 7;
        let p = y >> 1;
        let q = y & 1;

        match x {
            0 => self.execute_x0(bus, y, z, p, q),
            1 => {
                if y == 6 && z == 6 {
                    self.halted = true;
                } else {
                    let val = self.get_reg8(z, bus);
                    self.set_reg8(y, val, bus);
                }
            }
            2 => {
                let val = self.get_reg8(z, bus);
                self.alu_op(y, val);
            }
            3 => self.execute_x3(bus, y, z, p, q),
            _ => unreachable!(),
        }
    }

    fn execute_x0(&mut self, bus: &mut Bus, y: u8, z: u8, p: u8, q: u8) {
        match z {
            0 => match y {
                0 => {}
                1 => self.ex_af(),
                2 => {
                    let d = self.fetch_disp(bus);
                    self.set_b(self.b().wrapping_sub(1));
                    if self.b() != 0 {
                        self.pc = (self.pc as i32 + d as i32) as u16;
                    }
                }
                3 => {
                    let d = self.fetch_disp(bus);
                    self.pc = (self.pc as i32 + d as i32) as u16;
                }
                4..=7 => {
                    let d = self.fetch_disp(bus);
                    if self.check_cc(y - 4) {
                        self.pc = (self.pc as i32 + d as i32) as u16;
                    }
                }
                _ => unreachable!(),
            },
            1 => {
                if q == 0 {
                    let nn = self.fetch_imm16(bus);
                    self.set_rp(p, nn);
                } else {
                    let rp = self.get_rp(p);
                    self.hl = self.alu_add16(self.hl, rp);
                }
            }
            2 => match (q, p) {
                (0, 0) => bus.write_byte(self.bc, self.a),
                (0, 1) => bus.write_byte(self.de, self.a),
                (0, 2) => {
                    let nn = self.fetch_imm16(bus);
                    bus.write_word(nn, self.hl);
                }
                (0, 3) => {
                    let nn = self.fetch_imm16(bus);
                    bus.write_byte(nn, self.a);
                }
                (1, 0) => self.a = bus.read_byte(self.bc),
                (1, 1) => self.a = bus.read_byte(self.de),
                (1, 2) => {
                    let nn = self.fetch_imm16(bus);
                    self.hl = bus.read_word(nn);
                }
                (1, 3) => {
                    let nn = self.fetch_imm16(bus);
                    self.a = bus.read_byte(nn);
                }
                _ => unreachable!(),
            },
            3 => {
                let rp = self.get_rp(p);
                self.set_rp(p, if q == 0 { rp.wrapping_add(1) } else { rp.wrapping_sub(1) });
            }
            4 => {
                let v = self.get_reg8(y, bus);
                let r = self.alu_inc(v);
                self.set_reg8(y, r, bus);
            }
            5 => {
                let v = self.get_reg8(y, bus);
                let r = self.alu_dec(v);
                self.set_reg8(y, r, bus);
            }
            6 => {
                let n = self.fetch_imm8(bus);
                self.set_reg8(y, n, bus);
            }
            7 => self.execute_accum_misc(y),
            _ => unreachable!(),
        }
    }

    fn execute_accum_misc(&mut self, y: u8) {
        match y {
            0 => {
                let c = self.a & 0x80 != 0;
                self.a = self.a.rotate_left(1);
                self.set_flag_c(c);
                self.set_flag_h(false);
                self.set_flag_n(false);
            }
            1 => {
                let c = self.a & 0x01 != 0;
                self.a = self.a.rotate_right(1);
                self.set_flag_c(c);
                self.set_flag_h(false);
                self.set_flag_n(false);
            }
            2 => {
                let old_c = self.flag_c();
                let new_c = self.a & 0x80 != 0;
                self.a = (self.a << 1) | old_c as u8;
                self.set_flag_c(new_c);
                self.set_flag_h(false);
                self.set_flag_n(false);
            }
            3 => {
                let old_c = self.flag_c();
                let new_c = self.a & 0x01 != 0;
                self.a = (self.a >> 1) | ((old_c as u8) << 7);
                self.set_flag_c(new_c);
                self.set_flag_h(false);
                self.set_flag_n(false);
            }
            4 => self.daa(),
            5 => {
                self.a = !self.a;
                self.set_flag_h(true);
                self.set_flag_n(true);
            }
            6 => {
                self.set_flag_c(true);
                self.set_flag_h(false);
                self.set_flag_n(false);
            }
            7 => {
                let c = self.flag_c();
                self.set_flag_h(c);
                self.set_flag_c(!c);
                self.set_flag_n(false);
            }
            _ => unreachable!(),
        }
    }

    fn daa(&mut self) {
        let a = self.a;
        let n = self.flag_n();
        let mut c = self.flag_c();
        let h = self.flag_h();
        let mut add: u8 = 0;

        if h || (a & 0x0F) > 0x09 {
            add |= 0x06;
        }
        if c || a > 0x99 {
            add |= 0x60;
            c = true;
        }

        let result = if n { a.wrapping_sub(add) } else { a.wrapping_add(add) };
        let half_out = if n {
            h && (a & 0x0F) < 0x06
        } else {
            (a & 0x0F) + (add & 0x0F) > 0x0F
        };

        self.a = result;
        self.set_sz_flags(result);
        self.set_flag_h(half_out);
        self.set_flag_pv(Self::parity(result));
        self.set_flag_c(c);
    }

    fn execute_x3(&mut self, bus: &mut Bus, y: u8, z: u8, p: u8, q: u8) {
        match z {
            0 => {
                if self.check_cc(y) {
                    self.pc = self.pop_word(bus);
                }
            }
            1 => {
                if q == 0 {
                    let v = self.pop_word(bus);
                    self.set_rp2(p, v);
                } else {
                    match p {
                        0 => self.pc = self.pop_word(bus),
                        1 => self.exx(),
                        2 => self.pc = self.hl,
                        3 => self.sp = self.hl,
                        _ => unreachable!(),
                    }
                }
            }
            2 => {
                let nn = self.fetch_imm16(bus);
                if self.check_cc(y) {
                    self.pc = nn;
                }
            }
            3 => match y {
                0 => self.pc = self.fetch_imm16(bus),
                1 => self.execute_cb(bus, None),
                2 => {
                    let n = self.fetch_imm8(bus);
                    bus.port_out(n, self.a);
                }
                3 => {
                    let n = self.fetch_imm8(bus);
                    self.a = bus.port_in(n);
                }
                4 => {
                    let lo = bus.read_byte(self.sp);
                    let hi = bus.read_byte(self.sp.wrapping_add(1));
                    bus.write_byte(self.sp, self.l());
                    bus.write_byte(self.sp.wrapping_add(1), self.h());
                    self.hl = ((hi as u16) << 8) | lo as u16;
                }
                5 => self.ex_de_hl(),
                6 => {
                    self.iff1 = false;
                    self.iff2 = false;
                }
                7 => {
                    self.iff1 = true;
                    self.iff2 = true;
                }
                _ => unreachable!(),
            },
            4 => {
                let nn = self.fetch_imm16(bus);
                if self.check_cc(y) {
                    self.push_word(bus, self.pc);
                    self.pc = nn;
                }
            }
            5 => {
                if q == 0 {
                    let v = self.get_rp2(p);
                    self.push_word(bus, v);
                } else {
                    match p {
                        0 => {
                            let nn = self.fetch_imm16(bus);
                            self.push_word(bus, self.pc);
                            self.pc = nn;
                        }
                        1 => self.execute_index(bus, true),
                        2 => self.execute_ed(bus),
                        3 => self.execute_index(bus, false),
                        _ => unreachable!(),
                    }
                }
            }
            6 => {
                let n = self.fetch_imm8(bus);
                self.alu_op(y, n);
            }
            7 => {
                self.push_word(bus, self.pc);
                self.pc = (y as u16) * 8;
            }
            _ => unreachable!(),
        }
    }

    fn alu_op(&mut self, y: u8, val: u8) {
        match y {
            0 => self.a = self.alu_add(val, false),
            1 => self.a = self.alu_add(val, true),
            2 => self.a = self.alu_sub(val, false),
            3 => self.a = self.alu_sub(val, true),
            4 => self.alu_and(val),
            5 => self.alu_xor(val),
            6 => self.alu_or(val),
            7 => {
                self.alu_sub(val, false);
            }
            _ => unreachable!(),
        }
    }

    // ========== CB prefix: rotates/shifts, BIT, RES, SET ==========

    fn execute_cb(&mut self, bus: &mut Bus, index_addr: Option<u16>) {
        let opcode = self.fetch_byte(bus);
        let x = (opcode >> 6) & 3;
        let y = (opcode >> 3) & 7;
        let z = opcode & 7;

        let val = match index_addr {
            Some(addr) => bus.read_byte(addr),
            None => self.get_reg8(z, bus),
        };

        let result = match x {
            0 => self.rot_op(y, val),
            1 => {
                let bit_set = val & (1 << y) != 0;
                self.set_flag_z(!bit_set);
                self.set_flag_h(true);
                self.set_flag_n(false);
                self.set_flag_s(y == 7 && bit_set);
                val
            }
            2 => val & !(1 << y),
            3 => val | (1 << y),
            _ => unreachable!(),
        };

        if x != 1 {
            match index_addr {
                Some(addr) => bus.write_byte(addr, result),
                None => self.set_reg8(z, result, bus),
            }
        }
    }

    fn rot_op(&mut self, y: u8, val: u8) -> u8 {
        let (result, carry) = match y {
            0 => (val.rotate_left(1), val & 0x80 != 0),
            1 => (val.rotate_right(1), val & 0x01 != 0),
            2 => {
                let c = self.flag_c();
                ((val << 1) | c as u8, val & 0x80 != 0)
            }
            3 => {
                let c = self.flag_c();
                ((val >> 1) | ((c as u8) << 7), val & 0x01 != 0)
            }
            4 => (val << 1, val & 0x80 != 0),
            5 => ((val >> 1) | (val & 0x80), val & 0x01 != 0),
            6 => ((val << 1) | 1, val & 0x80 != 0),
            7 => (val >> 1, val & 0x01 != 0),
            _ => unreachable!(),
        };
        self.set_sz_flags(result);
        self.set_flag_h(false);
        self.set_flag_n(false);
        self.set_flag_c(carry);
        self.set_flag_pv(Self::parity(result));
        result
    }

    // ========== ED prefix ==========

    fn execute_ed(&mut self, bus: &mut Bus) {
        let opcode = self.fetch_byte(bus);
        match opcode {
            0x00 => self.ed_in0(bus, 0),
            0x08 => self.ed_in0(bus, 1),
            0x10 => self.ed_in0(bus, 2),
            0x18 => self.ed_in0(bus, 3),
            0x20 => self.ed_in0(bus, 4),
            0x28 => self.ed_in0(bus, 5),
            0x38 => self.ed_in0(bus, 7),

            0x01 => self.ed_out0(bus, 0),
            0x09 => self.ed_out0(bus, 1),
            0x11 => self.ed_out0(bus, 2),
            0x19 => self.ed_out0(bus, 3),
            0x21 => self.ed_out0(bus, 4),
            0x29 => self.ed_out0(bus, 5),
            0x39 => self.ed_out0(bus, 7),

            0x04 => {
                let v = self.b();
                self.ed_tst(v);
            }
            0x0C => {
                let v = self.c();
                self.ed_tst(v);
            }
            0x14 => {
                let v = self.d();
                self.ed_tst(v);
            }
            0x1C => {
                let v = self.e();
                self.ed_tst(v);
            }
            0x24 => {
                let v = self.h();
                self.ed_tst(v);
            }
            0x2C => {
                let v = self.l();
                self.ed_tst(v);
            }
            0x34 => {
                let v = bus.read_byte(self.hl);
                self.ed_tst(v);
            }
            0x3C => {
                let v = self.a;
                self.ed_tst(v);
            }
            0x64 => {
                let v = self.fetch_imm8(bus);
                self.ed_tst(v);
            }

            0x4C => self.ed_mlt(0),
            0x5C => self.ed_mlt(1),
            0x6C => self.ed_mlt(2),
            0x7C => self.ed_mlt(3),

            0x83 => self.ed_otim(bus, 1, false),
            0x8B => self.ed_otim(bus, -1, false),
            0x93 => self.ed_otim(bus, 1, true),
            0x9B => self.ed_otim(bus, -1, true),

            0x40..=0x7F => self.execute_ed_x1(bus, opcode),
            0xA0..=0xBF => self.execute_ed_bli(bus, opcode),

            _ => warn!("unimplemented ED opcode {:#04x} at pc {:#06x}", opcode, self.pc),
        }
    }

    fn ed_in0(&mut self, bus: &mut Bus, reg_idx: u8) {
        let port = self.fetch_imm8(bus);
        let val = bus.port_in(port);
        self.set_reg8(reg_idx, val, bus);
        self.set_sz_flags(val);
        self.set_flag_h(false);
        self.set_flag_n(false);
        self.set_flag_pv(Self::parity(val));
    }

    fn ed_out0(&mut self, bus: &mut Bus, reg_idx: u8) {
        let port = self.fetch_imm8(bus);
        let val = self.get_reg8(reg_idx, bus);
        bus.port_out(port, val);
    }

    fn ed_tst(&mut self, val: u8) {
        let result = self.a & val;
        self.set_sz_flags(result);
        self.set_flag_h(true);
        self.set_flag_n(false);
        self.set_flag_c(false);
        self.set_flag_pv(Self::parity(result));
    }

    fn ed_mlt(&mut self, rp_idx: u8) {
        let rp = self.get_rp(rp_idx);
        let hi = (rp >> 8) as u16;
        let lo = rp & 0xFF;
        self.set_rp(rp_idx, hi * lo);
    }

    fn ed_otim(&mut self, bus: &mut Bus, dir: i8, repeat: bool) {
        let val = bus.read_byte(self.hl);
        bus.port_out(self.c(), val);
        self.hl = self.hl.wrapping_add(dir as i16 as u16);
        self.set_c(self.c().wrapping_add(dir as u8));
        self.set_b(self.b().wrapping_sub(1));
        self.set_flag_n(true);
        self.set_flag_z(self.b() == 0);
        if repeat && self.b() != 0 {
            self.pc = self.pc.wrapping_sub(2);
        }
    }

    fn execute_ed_x1(&mut self, bus: &mut Bus, opcode: u8) {
        let y = (opcode >> 3) & 7;
        let z = opcode & 7;
        let p = y >> 1;
        let q = y & 1;

        match z {
            0 => {
                let val = bus.port_in(self.c());
                if y != 6 {
                    self.set_reg8(y, val, bus);
                }
                self.set_sz_flags(val);
                self.set_flag_h(false);
                self.set_flag_n(false);
                self.set_flag_pv(Self::parity(val));
            }
            1 => {
                let val = if y == 6 { 0 } else { self.get_reg8(y, bus) };
                bus.port_out(self.c(), val);
            }
            2 => {
                let rp = self.get_rp(p);
                self.hl = self.alu_adc16(self.hl, rp, q == 0);
            }
            3 => {
                let addr = self.fetch_imm16(bus);
                if q == 0 {
                    let v = self.get_rp(p);
                    bus.write_word(addr, v);
                } else {
                    let v = bus.read_word(addr);
                    self.set_rp(p, v);
                }
            }
            4 => {
                let a = self.a;
                self.a = 0;
                self.a = self.alu_sub(a, false);
            }
            5 => {
                self.iff1 = self.iff2;
                self.pc = self.pop_word(bus);
            }
            6 => {
                self.im = match y {
                    2 | 6 => 1,
                    3 | 7 => 2,
                    _ => 0,
                };
            }
            7 => match y {
                0 => self.i = self.a,
                1 => self.r = self.a,
                2 => {
                    self.a = self.i;
                    self.set_sz_flags(self.a);
                    self.set_flag_h(false);
                    self.set_flag_n(false);
                    self.set_flag_pv(self.iff2);
                }
                3 => {
                    self.a = self.r;
                    self.set_sz_flags(self.a);
                    self.set_flag_h(false);
                    self.set_flag_n(false);
                    self.set_flag_pv(self.iff2);
                }
                4 => self.rrd(bus),
                5 => self.rld(bus),
                _ => {}
            },
            _ => unreachable!(),
        }
    }

    fn rrd(&mut self, bus: &mut Bus) {
        let mem = bus.read_byte(self.hl);
        let new_mem = ((self.a & 0x0F) << 4) | (mem >> 4);
        let new_a = (self.a & 0xF0) | (mem & 0x0F);
        bus.write_byte(self.hl, new_mem);
        self.a = new_a;
        self.set_sz_flags(self.a);
        self.set_flag_h(false);
        self.set_flag_n(false);
        self.set_flag_pv(Self::parity(self.a));
    }

    fn rld(&mut self, bus: &mut Bus) {
        let mem = bus.read_byte(self.hl);
        let new_mem = ((mem << 4) & 0xF0) | (self.a & 0x0F);
        let new_a = (self.a & 0xF0) | (mem >> 4);
        bus.write_byte(self.hl, new_mem);
        self.a = new_a;
        self.set_sz_flags(self.a);
        self.set_flag_h(false);
        self.set_flag_n(false);
        self.set_flag_pv(Self::parity(self.a));
    }

    fn execute_ed_bli(&mut self, bus: &mut Bus, opcode: u8) {
        let y = (opcode >> 3) & 7;
        let z = opcode & 7;
        if y < 4 || z > 3 {
            warn!("unimplemented ED block opcode {:#04x} at pc {:#06x}", opcode, self.pc);
            return;
        }
        let yy = y - 4;
        let dir: i8 = if yy & 1 == 0 { 1 } else { -1 };
        let repeat = yy & 2 != 0;

        match z {
            0 => self.bli_ld(bus, dir, repeat),
            1 => self.bli_cp(bus, dir, repeat),
            2 => self.bli_in(bus, dir, repeat),
            3 => self.bli_out(bus, dir, repeat),
            _ => unreachable!(),
        }
    }

    fn bli_ld(&mut self, bus: &mut Bus, dir: i8, repeat: bool) {
        let val = bus.read_byte(self.hl);
        bus.write_byte(self.de, val);
        self.hl = self.hl.wrapping_add(dir as i16 as u16);
        self.de = self.de.wrapping_add(dir as i16 as u16);
        self.bc = self.bc.wrapping_sub(1);
        self.set_flag_n(false);
        self.set_flag_h(false);
        self.set_flag_pv(self.bc != 0);
        if repeat && self.bc != 0 {
            self.pc = self.pc.wrapping_sub(2);
        }
    }

    fn bli_cp(&mut self, bus: &mut Bus, dir: i8, repeat: bool) {
        let val = bus.read_byte(self.hl);
        let result = self.a.wrapping_sub(val);
        let half = (self.a & 0x0F) < (val & 0x0F);
        self.hl = self.hl.wrapping_add(dir as i16 as u16);
        self.bc = self.bc.wrapping_sub(1);
        self.set_sz_flags(result);
        self.set_flag_h(half);
        self.set_flag_n(true);
        self.set_flag_pv(self.bc != 0);
        if repeat && self.bc != 0 && result != 0 {
            self.pc = self.pc.wrapping_sub(2);
        }
    }

    fn bli_in(&mut self, bus: &mut Bus, dir: i8, repeat: bool) {
        let val = bus.port_in(self.c());
        bus.write_byte(self.hl, val);
        self.hl = self.hl.wrapping_add(dir as i16 as u16);
        self.set_b(self.b().wrapping_sub(1));
        self.set_flag_n(true);
        self.set_flag_z(self.b() == 0);
        if repeat && self.b() != 0 {
            self.pc = self.pc.wrapping_sub(2);
        }
    }

    fn bli_out(&mut self, bus: &mut Bus, dir: i8, repeat: bool) {
        let val = bus.read_byte(self.hl);
        bus.port_out(self.c(), val);
        self.hl = self.hl.wrapping_add(dir as i16 as u16);
        self.set_b(self.b().wrapping_sub(1));
        self.set_flag_n(true);
        self.set_flag_z(self.b() == 0);
        if repeat && self.b() != 0 {
            self.pc = self.pc.wrapping_sub(2);
        }
    }

    // ========== DD/FD prefix: IX/IY substitution ==========

    fn get_index(&self, use_ix: bool) -> u16 {
        if use_ix {
            self.ix
        } else {
            self.iy
        }
    }

    fn set_index(&mut self, use_ix: bool, val: u16) {
        if use_ix {
            self.ix = val;
        } else {
            self.iy = val;
        }
    }

    fn get_index_reg8(&mut self, use_ix: bool, idx: u8, bus: &mut Bus) -> u8 {
        match idx {
            4 => if use_ix { self.ixh() } else { self.iyh() },
            5 => if use_ix { self.ixl() } else { self.iyl() },
            _ => self.get_reg8(idx, bus),
        }
    }

    fn set_index_reg8(&mut self, use_ix: bool, idx: u8, val: u8, bus: &mut Bus) {
        match idx {
            4 => if use_ix { self.set_ixh(val) } else { self.set_iyh(val) },
            5 => if use_ix { self.set_ixl(val) } else { self.set_iyl(val) },
            _ => self.set_reg8(idx, val, bus),
        }
    }

    fn execute_index(&mut self, bus: &mut Bus, use_ix: bool) {
        let opcode = self.fetch_byte(bus);

        match opcode {
            0xCB => {
                let d = self.fetch_disp(bus);
                let addr = self.get_index(use_ix).wrapping_add(d as i16 as u16);
                self.execute_cb(bus, Some(addr));
            }
            0x21 => {
                let nn = self.fetch_imm16(bus);
                self.set_index(use_ix, nn);
            }
            0x22 => {
                let nn = self.fetch_imm16(bus);
                bus.write_word(nn, self.get_index(use_ix));
            }
            0x2A => {
                let nn = self.fetch_imm16(bus);
                let v = bus.read_word(nn);
                self.set_index(use_ix, v);
            }
            0x23 => {
                let v = self.get_index(use_ix).wrapping_add(1);
                self.set_index(use_ix, v);
            }
            0x2B => {
                let v = self.get_index(use_ix).wrapping_sub(1);
                self.set_index(use_ix, v);
            }
            0x09 | 0x19 | 0x29 | 0x39 => {
                let p = (opcode >> 4) & 3;
                let rp = if p == 2 { self.get_index(use_ix) } else { self.get_rp(p) };
                let idx = self.get_index(use_ix);
                let result = self.alu_add16(idx, rp);
                self.set_index(use_ix, result);
            }
            0x34 => {
                let d = self.fetch_disp(bus);
                let addr = self.get_index(use_ix).wrapping_add(d as i16 as u16);
                let v = bus.read_byte(addr);
                let r = self.alu_inc(v);
                bus.write_byte(addr, r);
            }
            0x35 => {
                let d = self.fetch_disp(bus);
                let addr = self.get_index(use_ix).wrapping_add(d as i16 as u16);
                let v = bus.read_byte(addr);
                let r = self.alu_dec(v);
                bus.write_byte(addr, r);
            }
            0x36 => {
                let d = self.fetch_disp(bus);
                let n = self.fetch_imm8(bus);
                let addr = self.get_index(use_ix).wrapping_add(d as i16 as u16);
                bus.write_byte(addr, n);
            }
            0xE1 => {
                let v = self.pop_word(bus);
                self.set_index(use_ix, v);
            }
            0xE5 => {
                let v = self.get_index(use_ix);
                self.push_word(bus, v);
            }
            0xE9 => self.pc = self.get_index(use_ix),
            0xF9 => self.sp = self.get_index(use_ix),
            0xE3 => {
                let lo = bus.read_byte(self.sp);
                let hi = bus.read_byte(self.sp.wrapping_add(1));
                let idx = self.get_index(use_ix);
                bus.write_byte(self.sp, idx as u8);
                bus.write_byte(self.sp.wrapping_add(1), (idx >> 8) as u8);
                self.set_index(use_ix, ((hi as u16) << 8) | lo as u16);
            }
            _ => self.execute_index_generic(bus, use_ix, opcode),
        }
    }

    fn execute_index_generic(&mut self, bus: &mut Bus, use_ix: bool, opcode: u8) {
        let x = (opcode >> 6) & 3;
        let y = (opcode >> 3) & 7;
        let z = opcode & 7;

        match x {
            1 if y == 6 && z == 6 => self.halted = true,
            1 if z == 6 => {
                let d = self.fetch_disp(bus);
                let addr = self.get_index(use_ix).wrapping_add(d as i16 as u16);
                let v = bus.read_byte(addr);
                self.set_reg8(y, v, bus);
            }
            1 if y == 6 => {
                let d = self.fetch_disp(bus);
                let addr = self.get_index(use_ix).wrapping_add(d as i16 as u16);
                let v = self.get_reg8(z, bus);
                bus.write_byte(addr, v);
            }
            1 => {
                let v = self.get_index_reg8(use_ix, z, bus);
                self.set_index_reg8(use_ix, y, v, bus);
            }
            2 if z == 6 => {
                let d = self.fetch_disp(bus);
                let addr = self.get_index(use_ix).wrapping_add(d as i16 as u16);
                let v = bus.read_byte(addr);
                self.alu_op(y, v);
            }
            2 => {
                let v = self.get_index_reg8(use_ix, z, bus);
                self.alu_op(y, v);
            }
            _ => warn!("unimplemented indexed opcode {:#04x} at pc {:#06x}", opcode, self.pc),
        }
    }
}
