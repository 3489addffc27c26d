use crate::core::Bus;
use crate::cpu::i8080::I8080;

impl I8080 {
    pub(crate) fn push16<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        val: u16,
    ) {
        self.sp = self.sp.wrapping_sub(1);
        bus.write(self.sp, (val >> 8) as u8);
        self.sp = self.sp.wrapping_sub(1);
        bus.write(self.sp, val as u8);
    }

    pub(crate) fn pop16<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let low = bus.read(self.sp) as u16;
        self.sp = self.sp.wrapping_add(1);
        let high = bus.read(self.sp) as u16;
        self.sp = self.sp.wrapping_add(1);
        (high << 8) | low
    }

    /// PUSH rp: 11 rp0 101 (rp: 0=BC, 1=DE, 2=HL, 3=PSW)
    pub(crate) fn op_push<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        opcode: u8,
    ) {
        let val = match (opcode >> 4) & 0x03 {
            3 => self.get_psw(),
            rp => self.get_rp(rp),
        };
        self.push16(bus, val);
    }

    /// POP rp: 11 rp0 001 (rp: 0=BC, 1=DE, 2=HL, 3=PSW)
    pub(crate) fn op_pop<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        opcode: u8,
    ) {
        let val = self.pop16(bus);
        match (opcode >> 4) & 0x03 {
            3 => self.set_psw(val),
            rp => self.set_rp(rp, val),
        }
    }

    /// XTHL: exchange HL with the word at the top of the stack
    pub(crate) fn op_xthl<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        let low = bus.read(self.sp);
        let high = bus.read(self.sp.wrapping_add(1));
        bus.write(self.sp, self.l);
        bus.write(self.sp.wrapping_add(1), self.h);
        self.l = low;
        self.h = high;
    }
}
