mod alu;
mod branch;
mod load_store;
mod stack;

use crate::core::Bus;
use crate::cpu::state::{CpuStateTrait, I8080State};

#[repr(u8)]
#[derive(Copy, Clone, Debug)]
pub enum Flag {
    CY = 0x01, // Carry
    P = 0x04,  // Parity (even)
    AC = 0x10, // Auxiliary carry (carry out of bit 3)
    Z = 0x40,  // Zero
    S = 0x80,  // Sign
}

/// PSW bit 1 always reads as 1; bits 3 and 5 always read as 0.
pub(crate) const FLAGS_FIXED_SET: u8 = 0x02;
pub(crate) const FLAGS_MASK: u8 = 0xD5;

/// Intel 8080, executed one whole instruction at a time.
///
/// The scheduler loop drives it with [`I8080::fetch`] / [`I8080::execute`]
/// and injects interrupts with [`I8080::interrupt`]. Operand bytes are read
/// from the bus at PC while the instruction executes.
pub struct I8080 {
    // Registers
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,

    // Internal state
    pub inte: bool, // Interrupt enable flip-flop (EI/DI)
    pub halted: bool,
}

impl Default for I8080 {
    fn default() -> Self {
        Self::new()
    }
}

impl I8080 {
    pub fn new() -> Self {
        Self {
            a: 0,
            f: FLAGS_FIXED_SET,
            b: 0,
            c: 0,
            d: 0,
            e: 0,
            h: 0,
            l: 0,
            sp: 0,
            pc: 0x0000,
            inte: false,
            halted: false,
        }
    }

    /// Power-on reset: PC to 0x0000, interrupts disabled, HLT released.
    /// The 8080 leaves the other registers undefined; they are zeroed here.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    // Helpers for 16-bit register access
    pub fn get_bc(&self) -> u16 { ((self.b as u16) << 8) | self.c as u16 }
    pub fn set_bc(&mut self, val: u16) { self.b = (val >> 8) as u8; self.c = val as u8; }

    pub fn get_de(&self) -> u16 { ((self.d as u16) << 8) | self.e as u16 }
    pub fn set_de(&mut self, val: u16) { self.d = (val >> 8) as u8; self.e = val as u8; }

    pub fn get_hl(&self) -> u16 { ((self.h as u16) << 8) | self.l as u16 }
    pub fn set_hl(&mut self, val: u16) { self.h = (val >> 8) as u8; self.l = val as u8; }

    /// Processor status word: A in the high byte, normalized flags in the low byte.
    pub fn get_psw(&self) -> u16 {
        ((self.a as u16) << 8) | ((self.f & FLAGS_MASK) | FLAGS_FIXED_SET) as u16
    }

    pub fn set_psw(&mut self, val: u16) {
        self.a = (val >> 8) as u8;
        self.f = (val as u8 & FLAGS_MASK) | FLAGS_FIXED_SET;
    }

    pub fn flag(&self, flag: Flag) -> bool {
        self.f & flag as u8 != 0
    }

    pub(crate) fn set_flag(&mut self, flag: Flag, value: bool) {
        if value {
            self.f |= flag as u8;
        } else {
            self.f &= !(flag as u8);
        }
    }

    /// Register pair by 2-bit index: 0=BC, 1=DE, 2=HL, 3=SP.
    pub(crate) fn get_rp(&self, rp: u8) -> u16 {
        match rp {
            0 => self.get_bc(),
            1 => self.get_de(),
            2 => self.get_hl(),
            3 => self.sp,
            _ => unreachable!(),
        }
    }

    pub(crate) fn set_rp(&mut self, rp: u8, val: u16) {
        match rp {
            0 => self.set_bc(val),
            1 => self.set_de(val),
            2 => self.set_hl(val),
            3 => self.sp = val,
            _ => unreachable!(),
        }
    }

    /// Read 8-bit operand by 3-bit index: B, C, D, E, H, L, M (memory at HL), A.
    pub(crate) fn read_reg<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        index: u8,
    ) -> u8 {
        match index {
            0 => self.b,
            1 => self.c,
            2 => self.d,
            3 => self.e,
            4 => self.h,
            5 => self.l,
            6 => bus.read(self.get_hl()),
            7 => self.a,
            _ => unreachable!(),
        }
    }

    pub(crate) fn write_reg<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        index: u8,
        val: u8,
    ) {
        match index {
            0 => self.b = val,
            1 => self.c = val,
            2 => self.d = val,
            3 => self.e = val,
            4 => self.h = val,
            5 => self.l = val,
            6 => bus.write(self.get_hl(), val),
            7 => self.a = val,
            _ => unreachable!(),
        }
    }

    pub(crate) fn read_imm8<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u8 {
        let val = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        val
    }

    pub(crate) fn read_imm16<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u16 {
        let low = self.read_imm8(bus) as u16;
        let high = self.read_imm8(bus) as u16;
        (high << 8) | low
    }

    /// Fetch the opcode at PC and advance PC past it.
    pub fn fetch<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u8 {
        self.read_imm8(bus)
    }

    /// Service an interrupt by executing `opcode` (normally an RST) without
    /// fetching it. Acknowledge clears INTE and releases HLT.
    pub fn interrupt<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        opcode: u8,
    ) -> bool {
        self.inte = false;
        self.halted = false;
        self.execute(bus, opcode)
    }

    /// Execute one instruction whose opcode has already been fetched.
    /// Returns `true` if the CPU is halted afterwards (HLT).
    pub fn execute<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        opcode: u8,
    ) -> bool {
        match opcode {
            // NOP and its undocumented aliases
            0x00 | 0x08 | 0x10 | 0x18 | 0x20 | 0x28 | 0x30 | 0x38 => {}

            // 16-bit loads and direct addressing
            0x01 | 0x11 | 0x21 | 0x31 => self.op_lxi(bus, opcode),
            0x02 | 0x12 => self.op_stax(bus, opcode),
            0x0A | 0x1A => self.op_ldax(bus, opcode),
            0x22 => self.op_shld(bus),
            0x2A => self.op_lhld(bus),
            0x32 => self.op_sta(bus),
            0x3A => self.op_lda(bus),

            // 16-bit arithmetic
            0x03 | 0x13 | 0x23 | 0x33 => self.op_inx(opcode),
            0x0B | 0x1B | 0x2B | 0x3B => self.op_dcx(opcode),
            0x09 | 0x19 | 0x29 | 0x39 => self.op_dad(opcode),

            // INR r / DCR r / MVI r: 00 rrr 100 / 00 rrr 101 / 00 rrr 110
            op if op & 0xC7 == 0x04 => self.op_inr(bus, op),
            op if op & 0xC7 == 0x05 => self.op_dcr(bus, op),
            op if op & 0xC7 == 0x06 => self.op_mvi(bus, op),

            // Accumulator rotates and flag operations
            0x07 => self.op_rlc(),
            0x0F => self.op_rrc(),
            0x17 => self.op_ral(),
            0x1F => self.op_rar(),
            0x27 => self.op_daa(),
            0x2F => self.a = !self.a, // CMA: no flags affected
            0x37 => self.set_flag(Flag::CY, true),
            0x3F => self.set_flag(Flag::CY, !self.flag(Flag::CY)),

            // HLT sits in the middle of the MOV block (MOV M,M)
            0x76 => self.halted = true,
            0x40..=0x7F => self.op_mov(bus, opcode),

            // ADD/ADC/SUB/SBB/ANA/XRA/ORA/CMP r: 10 ooo rrr
            0x80..=0xBF => {
                let val = self.read_reg(bus, opcode & 0x07);
                self.perform_alu_op((opcode >> 3) & 0x07, val);
            }

            // Immediate ALU: 11 ooo 110
            op if op & 0xC7 == 0xC6 => {
                let val = self.read_imm8(bus);
                self.perform_alu_op((op >> 3) & 0x07, val);
            }

            // Control transfer
            op if op & 0xC7 == 0xC0 => self.op_ret_cond(bus, op),
            op if op & 0xC7 == 0xC2 => self.op_jmp_cond(bus, op),
            op if op & 0xC7 == 0xC4 => self.op_call_cond(bus, op),
            op if op & 0xC7 == 0xC7 => self.op_rst(bus, op),
            0xC3 | 0xCB => self.op_jmp(bus),
            0xC9 | 0xD9 => self.op_ret(bus),
            0xCD | 0xDD | 0xED | 0xFD => self.op_call(bus),
            0xE9 => self.pc = self.get_hl(), // PCHL

            // Stack
            0xC1 | 0xD1 | 0xE1 | 0xF1 => self.op_pop(bus, opcode),
            0xC5 | 0xD5 | 0xE5 | 0xF5 => self.op_push(bus, opcode),
            0xE3 => self.op_xthl(bus),
            0xF9 => self.sp = self.get_hl(), // SPHL

            0xEB => self.op_xchg(),

            // I/O
            0xD3 => {
                let port = self.read_imm8(bus);
                bus.io_write(port, self.a);
            }
            0xDB => {
                let port = self.read_imm8(bus);
                self.a = bus.io_read(port);
            }

            // Interrupt enable
            0xF3 => self.inte = false,
            0xFB => self.inte = true,

            _ => unreachable!("8080 opcode decode is exhaustive"),
        }

        self.halted
    }
}

impl CpuStateTrait for I8080 {
    type Snapshot = I8080State;

    fn snapshot(&self) -> I8080State {
        I8080State {
            a: self.a,
            f: (self.f & FLAGS_MASK) | FLAGS_FIXED_SET,
            b: self.b,
            c: self.c,
            d: self.d,
            e: self.e,
            h: self.h,
            l: self.l,
            sp: self.sp,
            pc: self.pc,
            inte: self.inte,
            halted: self.halted,
        }
    }
}
