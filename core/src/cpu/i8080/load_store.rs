use crate::core::Bus;
use crate::cpu::i8080::I8080;

impl I8080 {
    /// MOV d,s: 01 ddd sss (0x76 is HLT and never reaches here)
    pub(crate) fn op_mov<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        opcode: u8,
    ) {
        let val = self.read_reg(bus, opcode & 0x07);
        self.write_reg(bus, (opcode >> 3) & 0x07, val);
    }

    /// MVI r,d8: 00 rrr 110
    pub(crate) fn op_mvi<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        opcode: u8,
    ) {
        let val = self.read_imm8(bus);
        self.write_reg(bus, (opcode >> 3) & 0x07, val);
    }

    /// LXI rp,d16: 00 rp0 001
    pub(crate) fn op_lxi<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        opcode: u8,
    ) {
        let val = self.read_imm16(bus);
        self.set_rp((opcode >> 4) & 0x03, val);
    }

    /// STAX B / STAX D
    pub(crate) fn op_stax<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        opcode: u8,
    ) {
        let addr = self.get_rp((opcode >> 4) & 0x01);
        bus.write(addr, self.a);
    }

    /// LDAX B / LDAX D
    pub(crate) fn op_ldax<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        opcode: u8,
    ) {
        let addr = self.get_rp((opcode >> 4) & 0x01);
        self.a = bus.read(addr);
    }

    /// SHLD a16: L to (a16), H to (a16+1)
    pub(crate) fn op_shld<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.read_imm16(bus);
        bus.write(addr, self.l);
        bus.write(addr.wrapping_add(1), self.h);
    }

    /// LHLD a16
    pub(crate) fn op_lhld<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.read_imm16(bus);
        self.l = bus.read(addr);
        self.h = bus.read(addr.wrapping_add(1));
    }

    /// STA a16
    pub(crate) fn op_sta<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.read_imm16(bus);
        bus.write(addr, self.a);
    }

    /// LDA a16
    pub(crate) fn op_lda<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.read_imm16(bus);
        self.a = bus.read(addr);
    }

    /// XCHG: swap DE and HL
    pub(crate) fn op_xchg(&mut self) {
        std::mem::swap(&mut self.d, &mut self.h);
        std::mem::swap(&mut self.e, &mut self.l);
    }
}
