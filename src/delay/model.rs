//! Executable model of the Thumb delay routine.
//!
//! [`ROUTINE`] lists the instructions of `thumb::wait_cycles` in order.
//! [`execute`] steps through them for one delay byte with ARMv7-M flag, pc
//! and cycle semantics, so the cycle count is derived from the control flow
//! the routine actually takes, including where the computed jump lands.

use super::cost;

/// One instruction of the routine. All operate on `r0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insn {
    /// `adds r0, #imm`
    Adds(u32),
    /// `subs r0, #imm`, carry set when no borrow.
    Subs(u32),
    /// `bhs` to the instruction at this index.
    Bhs(usize),
    /// `lsls r0, r0, #imm`
    Lsls(u32),
    /// `rsbs r0, r0, #0`
    Negs,
    /// `add pc, r0`
    AddPc,
    /// `nop`
    Nop,
}

/// The routine, in program order.
pub const ROUTINE: [Insn; 9] = [
    Insn::Adds(3),
    Insn::Subs(3),
    Insn::Bhs(1),
    Insn::Lsls(1),
    Insn::Adds(4),
    Insn::Negs,
    Insn::AddPc,
    Insn::Nop,
    Insn::Nop,
];

/// Instruction set state the routine is executed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecState {
    /// 16-bit encodings, pc reads 4 ahead.
    Thumb,
    /// 32-bit encodings, pc reads 8 ahead.
    Arm,
}

impl ExecState {
    const fn insn_size(self) -> u32 {
        match self {
            ExecState::Thumb => 2,
            ExecState::Arm => 4,
        }
    }

    const fn pc_offset(self) -> u32 {
        match self {
            ExecState::Thumb => 4,
            ExecState::Arm => 8,
        }
    }
}

/// What one run of the routine did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Trace {
    /// Cycles from the first instruction to falling off the end.
    pub cycles: u32,
    /// Taken `bhs` branches.
    pub taken_iterations: u32,
    /// `nop`s executed after the computed jump.
    pub correction_nops: u32,
}

/// Ways the computed jump can go wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Target address is not a multiple of the instruction size.
    MisalignedJump { target: u32 },
    /// Target is behind the jump or past the end of the routine.
    JumpOutOfRoutine { target: u32 },
}

/// Runs [`ROUTINE`] with `r0 = delay`.
pub const fn execute(state: ExecState, delay: u8) -> Result<Trace, Fault> {
    let size = state.insn_size();
    let mut r0 = delay as u32;
    let mut carry = false;
    let mut trace = Trace {
        cycles: 0,
        taken_iterations: 0,
        correction_nops: 0,
    };

    let mut pc = 0;
    while pc < ROUTINE.len() {
        let mut next = pc + 1;
        match ROUTINE[pc] {
            Insn::Adds(imm) => {
                r0 = r0.wrapping_add(imm);
                trace.cycles += cost::ALU;
            }
            Insn::Subs(imm) => {
                carry = r0 >= imm;
                r0 = r0.wrapping_sub(imm);
                trace.cycles += cost::ALU;
            }
            Insn::Bhs(target) => {
                if carry {
                    next = target;
                    trace.taken_iterations += 1;
                    trace.cycles += cost::BRANCH_TAKEN;
                } else {
                    trace.cycles += cost::BRANCH_NOT_TAKEN;
                }
            }
            Insn::Lsls(imm) => {
                r0 = r0.wrapping_shl(imm);
                trace.cycles += cost::ALU;
            }
            Insn::Negs => {
                r0 = 0u32.wrapping_sub(r0);
                trace.cycles += cost::ALU;
            }
            Insn::AddPc => {
                let target = (pc as u32 * size + state.pc_offset()).wrapping_add(r0);
                if target % size != 0 {
                    return Err(Fault::MisalignedJump { target });
                }
                let index = (target / size) as usize;
                if index <= pc || index > ROUTINE.len() {
                    return Err(Fault::JumpOutOfRoutine { target });
                }
                next = index;
                trace.cycles += cost::WRITE_PC;
            }
            Insn::Nop => {
                trace.correction_nops += 1;
                trace.cycles += cost::ALU;
            }
        }
        pc = next;
    }
    Ok(trace)
}
