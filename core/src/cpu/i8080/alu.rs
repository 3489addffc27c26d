use crate::core::Bus;
use crate::cpu::i8080::{FLAGS_FIXED_SET, Flag, I8080};

impl I8080 {
    // --- Flag Helpers ---

    fn get_parity(val: u8) -> bool {
        val.count_ones() % 2 == 0
    }

    /// Set S, Z and P from `result`, leaving AC and CY untouched.
    fn update_flags_szp(&mut self, result: u8) {
        self.set_flag(Flag::S, result & 0x80 != 0);
        self.set_flag(Flag::Z, result == 0);
        self.set_flag(Flag::P, Self::get_parity(result));
    }

    fn do_add(&mut self, val: u8, carry_in: bool) {
        let a = self.a;
        let c_val = (carry_in && self.flag(Flag::CY)) as u8;
        let result_u16 = (a as u16) + (val as u16) + (c_val as u16);
        let result = result_u16 as u8;

        self.update_flags_szp(result);
        self.set_flag(Flag::AC, (a & 0xF) + (val & 0xF) + c_val > 0xF);
        self.set_flag(Flag::CY, result_u16 > 0xFF);
        self.a = result;
    }

    /// Subtract with borrow, returning the result without storing it (shared by CMP).
    ///
    /// The 8080 subtracts by adding the two's complement, so AC is the carry out
    /// of bit 3 of `a + !val + !borrow`, and CY is the inverted carry (borrow).
    fn do_sub(&mut self, val: u8, borrow_in: bool) -> u8 {
        let a = self.a;
        let b_val = (borrow_in && self.flag(Flag::CY)) as u8;
        let result = a.wrapping_sub(val).wrapping_sub(b_val);

        self.update_flags_szp(result);
        self.set_flag(Flag::AC, (a & 0xF) + (!val & 0xF) + (1 - b_val) > 0xF);
        self.set_flag(Flag::CY, (a as u16) < (val as u16) + (b_val as u16));
        result
    }

    fn do_logic(&mut self, result: u8, aux_carry: bool) {
        self.a = result;
        self.update_flags_szp(result);
        self.set_flag(Flag::AC, aux_carry);
        self.set_flag(Flag::CY, false);
    }

    /// ALU operation by 3-bit index: ADD, ADC, SUB, SBB, ANA, XRA, ORA, CMP.
    pub(crate) fn perform_alu_op(&mut self, op: u8, val: u8) {
        match op {
            0 => self.do_add(val, false), // ADD
            1 => self.do_add(val, true),  // ADC
            2 => self.a = self.do_sub(val, false), // SUB
            3 => self.a = self.do_sub(val, true),  // SBB
            // ANA: AC is the OR of bit 3 of both operands
            4 => self.do_logic(self.a & val, (self.a | val) & 0x08 != 0),
            5 => self.do_logic(self.a ^ val, false), // XRA
            6 => self.do_logic(self.a | val, false), // ORA
            7 => {
                self.do_sub(val, false); // CMP
            }
            _ => unreachable!(),
        }
    }

    /// INR r: 00 rrr 100. CY unaffected.
    pub(crate) fn op_inr<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        opcode: u8,
    ) {
        let index = (opcode >> 3) & 0x07;
        let result = self.read_reg(bus, index).wrapping_add(1);
        self.update_flags_szp(result);
        self.set_flag(Flag::AC, result & 0x0F == 0x00);
        self.write_reg(bus, index, result);
    }

    /// DCR r: 00 rrr 101. CY unaffected.
    pub(crate) fn op_dcr<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        opcode: u8,
    ) {
        let index = (opcode >> 3) & 0x07;
        let result = self.read_reg(bus, index).wrapping_sub(1);
        self.update_flags_szp(result);
        self.set_flag(Flag::AC, result & 0x0F != 0x0F);
        self.write_reg(bus, index, result);
    }

    /// INX rp: 00 rp0 011. No flags.
    pub(crate) fn op_inx(&mut self, opcode: u8) {
        let rp = (opcode >> 4) & 0x03;
        self.set_rp(rp, self.get_rp(rp).wrapping_add(1));
    }

    /// DCX rp: 00 rp1 011. No flags.
    pub(crate) fn op_dcx(&mut self, opcode: u8) {
        let rp = (opcode >> 4) & 0x03;
        self.set_rp(rp, self.get_rp(rp).wrapping_sub(1));
    }

    /// DAD rp: HL += rp, only CY affected.
    pub(crate) fn op_dad(&mut self, opcode: u8) {
        let rp = (opcode >> 4) & 0x03;
        let result = self.get_hl() as u32 + self.get_rp(rp) as u32;
        self.set_flag(Flag::CY, result > 0xFFFF);
        self.set_hl(result as u16);
    }

    // --- Accumulator rotates (CY only) ---

    pub(crate) fn op_rlc(&mut self) {
        let carry = self.a & 0x80 != 0;
        self.a = self.a.rotate_left(1);
        self.set_flag(Flag::CY, carry);
    }

    pub(crate) fn op_rrc(&mut self) {
        let carry = self.a & 0x01 != 0;
        self.a = self.a.rotate_right(1);
        self.set_flag(Flag::CY, carry);
    }

    /// RAL: rotate left through carry.
    pub(crate) fn op_ral(&mut self) {
        let carry = self.a & 0x80 != 0;
        self.a = (self.a << 1) | self.flag(Flag::CY) as u8;
        self.set_flag(Flag::CY, carry);
    }

    /// RAR: rotate right through carry.
    pub(crate) fn op_rar(&mut self) {
        let carry = self.a & 0x01 != 0;
        self.a = (self.a >> 1) | ((self.flag(Flag::CY) as u8) << 7);
        self.set_flag(Flag::CY, carry);
    }

    /// DAA: decimal adjust after BCD addition.
    pub(crate) fn op_daa(&mut self) {
        let a = self.a;
        let mut correction = 0u8;
        let mut carry = self.flag(Flag::CY);

        if (a & 0x0F) > 9 || self.flag(Flag::AC) {
            correction |= 0x06;
        }
        if (a >> 4) > 9 || carry || ((a >> 4) >= 9 && (a & 0x0F) > 9) {
            correction |= 0x60;
            carry = true;
        }

        let result = a.wrapping_add(correction);
        self.f = FLAGS_FIXED_SET;
        self.update_flags_szp(result);
        self.set_flag(Flag::AC, (a & 0x0F) + (correction & 0x0F) > 0x0F);
        self.set_flag(Flag::CY, carry);
        self.a = result;
    }
}
