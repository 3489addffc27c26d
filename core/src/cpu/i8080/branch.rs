use crate::core::Bus;
use crate::cpu::i8080::{Flag, I8080};

impl I8080 {
    /// Evaluate a 3-bit condition code: NZ, Z, NC, C, PO, PE, P, M.
    fn condition(&self, cc: u8) -> bool {
        match cc {
            0 => !self.flag(Flag::Z),
            1 => self.flag(Flag::Z),
            2 => !self.flag(Flag::CY),
            3 => self.flag(Flag::CY),
            4 => !self.flag(Flag::P),
            5 => self.flag(Flag::P),
            6 => !self.flag(Flag::S),
            7 => self.flag(Flag::S),
            _ => unreachable!(),
        }
    }

    /// JMP a16
    pub(crate) fn op_jmp<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        self.pc = self.read_imm16(bus);
    }

    /// Jcc a16: 11 ccc 010. The operand is always consumed.
    pub(crate) fn op_jmp_cond<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        opcode: u8,
    ) {
        let target = self.read_imm16(bus);
        if self.condition((opcode >> 3) & 0x07) {
            self.pc = target;
        }
    }

    /// CALL a16
    pub(crate) fn op_call<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        let target = self.read_imm16(bus);
        self.push16(bus, self.pc);
        self.pc = target;
    }

    /// Ccc a16: 11 ccc 100
    pub(crate) fn op_call_cond<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        opcode: u8,
    ) {
        let target = self.read_imm16(bus);
        if self.condition((opcode >> 3) & 0x07) {
            self.push16(bus, self.pc);
            self.pc = target;
        }
    }

    /// RET
    pub(crate) fn op_ret<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        self.pc = self.pop16(bus);
    }

    /// Rcc: 11 ccc 000
    pub(crate) fn op_ret_cond<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        opcode: u8,
    ) {
        if self.condition((opcode >> 3) & 0x07) {
            self.pc = self.pop16(bus);
        }
    }

    /// RST n: 11 nnn 111: push PC, jump to n * 8.
    ///
    /// When injected as an interrupt the opcode was never fetched, so the
    /// pushed PC is the address of the instruction that would have run next.
    pub(crate) fn op_rst<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        opcode: u8,
    ) {
        self.push16(bus, self.pc);
        self.pc = (opcode & 0x38) as u16;
    }
}
