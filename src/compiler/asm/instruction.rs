use std::fmt;

use crate::constants::common::STACK_SLOT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Adr,
    Bl,
    Fadd,
    Fdiv,
    Fmov,
    Fmul,
    Fneg,
    Fsub,
    Ldp,
    Ldr,
    Mov,
    Movk,
    Ret,
    Stp,
    Str,
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Opcode::Adr => "adr",
            Opcode::Bl => "bl",
            Opcode::Fadd => "fadd",
            Opcode::Fdiv => "fdiv",
            Opcode::Fmov => "fmov",
            Opcode::Fmul => "fmul",
            Opcode::Fneg => "fneg",
            Opcode::Fsub => "fsub",
            Opcode::Ldp => "ldp",
            Opcode::Ldr => "ldr",
            Opcode::Mov => "mov",
            Opcode::Movk => "movk",
            Opcode::Ret => "ret",
            Opcode::Stp => "stp",
            Opcode::Str => "str",
        };
        write!(f, "{s}")
    }
}

/// Scratch registers: `s0` holds the value of the last expression and `s1`
/// the right operand of a binary operation. `w9` stages literal bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    S0,
    S1,
    W9,
    Wzr,
    X1,
    X2,
    X29,
    X30,
    Sp,
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Register::S0 => "s0",
            Register::S1 => "s1",
            Register::W9 => "w9",
            Register::Wzr => "wzr",
            Register::X1 => "x1",
            Register::X2 => "x2",
            Register::X29 => "x29",
            Register::X30 => "x30",
            Register::Sp => "sp",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Register(Register),
    Immediate(f64),
    Integer(usize),
    Label(String),
    /// `lsl #n` on a `movk` half-word.
    Shift(u32),
    /// `[sp, #-slot]!`: reserve a slot, then address it.
    Push,
    /// `[sp], #slot`: address the top slot, then release it.
    Pop,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Register(register) => write!(f, "{register}"),
            Operand::Immediate(value) => write!(f, "#{value}"),
            Operand::Integer(value) => write!(f, "#{value}"),
            Operand::Label(label) => write!(f, "{label}"),
            Operand::Shift(amount) => write!(f, "lsl #{amount}"),
            Operand::Push => write!(f, "[{}, #-{STACK_SLOT}]!", Register::Sp),
            Operand::Pop => write!(f, "[{}], #{STACK_SLOT}", Register::Sp),
        }
    }
}

impl From<Register> for Operand {
    fn from(register: Register) -> Self {
        Operand::Register(register)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operands: Vec<Operand>,
}

impl Instruction {
    #[must_use]
    pub fn new(opcode: Opcode, operands: Vec<Operand>) -> Instruction {
        Instruction { opcode, operands }
    }

    #[must_use]
    pub fn is_return(&self) -> bool {
        self.opcode == Opcode::Ret
    }
}

/// `opcode a, b, c`, or the bare opcode when it takes no operands.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        let operands = self
            .operands
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        if !operands.is_empty() {
            write!(f, " {operands}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_text() {
        let fmov = Instruction::new(
            Opcode::Fmov,
            vec![Register::S0.into(), Operand::Immediate(2.5)],
        );
        assert_eq!(fmov.to_string(), "fmov s0, #2.5");
        let push = Instruction::new(Opcode::Str, vec![Register::S0.into(), Operand::Push]);
        assert_eq!(push.to_string(), "str s0, [sp, #-16]!");
        let pop = Instruction::new(Opcode::Ldr, vec![Register::S0.into(), Operand::Pop]);
        assert_eq!(pop.to_string(), "ldr s0, [sp], #16");
        assert_eq!(Instruction::new(Opcode::Ret, Vec::new()).to_string(), "ret");
        let movk = Instruction::new(
            Opcode::Movk,
            vec![Register::W9.into(), Operand::Integer(15820), Operand::Shift(16)],
        );
        assert_eq!(movk.to_string(), "movk w9, #15820, lsl #16");
    }
}
