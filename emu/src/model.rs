use arch::alu::Alu;
use arch::memmap::{MEMORY_SIZE, STACK_TOP};
use arch::mode::Mode;
use arch::op::Opcode;
use arch::program::{vector_slot, Program, ProgramError, INTERRUPT_VECTORS};
use arch::reg::Reg;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::fault::Fault;

/// The instruction one `tick` executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub addr: u16,
    pub opcode: Opcode,
}

/// PENPAL machine state: two 8-bit registers, 16-bit IP/SP/FP and one flat
/// 64KB memory holding code, data and the downward-growing stack.
pub struct Vm {
    mem: Vec<u8>,
    a: u8,
    b: u8,
    ip: u16,
    sp: u16,
    fp: u16,
    halted: bool,
    in_interrupt: bool,
    /// The loaded image carries a vector table.
    vectors: bool,
    rng: SmallRng,
}

impl Default for Vm {
    fn default() -> Self {
        Vm::new()
    }
}

impl Vm {
    pub fn new() -> Self {
        Vm::with_rng(SmallRng::from_entropy())
    }

    /// `rand` draws from a generator seeded with `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Vm::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Self {
        Vm {
            mem: vec![0; MEMORY_SIZE],
            a: 0,
            b: 0,
            ip: 0,
            sp: STACK_TOP,
            fp: STACK_TOP,
            halted: false,
            in_interrupt: false,
            vectors: false,
            rng,
        }
    }

    /// Parse a binary (with or without header) and load it.
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), ProgramError> {
        let program = Program::parse(bytes)?;
        self.load_program(&program);
        Ok(())
    }

    /// Clear memory, copy the image to address 0 and reset every register.
    pub fn load_program(&mut self, program: &Program) {
        let len = program.image.len().min(MEMORY_SIZE);
        self.mem.fill(0);
        self.mem[..len].copy_from_slice(&program.image[..len]);
        self.a = 0;
        self.b = 0;
        self.ip = program.entry;
        self.sp = STACK_TOP;
        self.fp = STACK_TOP;
        self.halted = false;
        self.in_interrupt = false;
        self.vectors = program.has_vectors();
        tracing::debug!(
            "loaded {} bytes, entry {:#06x}, vectors {}",
            len,
            program.entry,
            self.vectors
        );
    }
}

// Inspection
impl Vm {
    pub fn peek(&self, addr: u16) -> u8 {
        self.mem[addr as usize]
    }

    pub fn poke(&mut self, addr: u16, val: u8) {
        self.mem[addr as usize] = val;
    }

    /// Big-endian word at `addr`.
    pub fn peek16(&self, addr: u16) -> u16 {
        u16::from_be_bytes([self.peek(addr), self.peek(addr.wrapping_add(1))])
    }

    pub fn get(&self, reg: Reg) -> u8 {
        match reg {
            Reg::A => self.a,
            Reg::B => self.b,
        }
    }

    pub fn set(&mut self, reg: Reg, val: u8) {
        match reg {
            Reg::A => self.a = val,
            Reg::B => self.b = val,
        }
    }

    pub fn ip(&self) -> u16 {
        self.ip
    }

    pub fn sp(&self) -> u16 {
        self.sp
    }

    pub fn fp(&self) -> u16 {
        self.fp
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn in_interrupt(&self) -> bool {
        self.in_interrupt
    }
}

// Stack
impl Vm {
    fn push(&mut self, val: u8) {
        self.poke(self.sp, val);
        self.sp = self.sp.wrapping_sub(1);
    }

    fn pop(&mut self) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        self.peek(self.sp)
    }

    fn push16(&mut self, val: u16) {
        let [hi, lo] = val.to_be_bytes();
        self.push(lo);
        self.push(hi);
    }

    fn pop16(&mut self) -> u16 {
        let hi = self.pop();
        let lo = self.pop();
        u16::from_be_bytes([hi, lo])
    }
}

// Interrupt
impl Vm {
    /// Enter the handler of interrupt `n`. Returns whether it was taken.
    ///
    /// Ignored when the image has no vector table or the slot holds no
    /// `jump`. Also ignored while halted or inside another handler.
    pub fn interrupt(&mut self, n: usize) -> bool {
        if !self.vectors || n >= INTERRUPT_VECTORS || self.in_interrupt || self.halted {
            return false;
        }
        let slot = vector_slot(n);
        if self.peek(slot) != u8::from(Opcode::Jump) {
            return false;
        }
        let target = self.peek16(slot.wrapping_add(1));
        tracing::debug!("interrupt {} at {:#06x} -> {:#06x}", n, self.ip, target);

        self.push(self.a);
        self.push(self.b);
        self.push16(self.fp);
        self.push16(self.ip);
        self.fp = self.sp;
        self.ip = target;
        self.in_interrupt = true;
        true
    }
}

// Execution
impl Vm {
    /// Operand byte `i` of the current instruction.
    fn arg(&self, i: u16) -> u8 {
        self.peek(self.ip.wrapping_add(i))
    }

    fn arg16(&self, i: u16) -> u16 {
        self.peek16(self.ip.wrapping_add(i))
    }

    fn reg(&self, id: u8) -> Result<Reg, Fault> {
        Reg::try_from(id).map_err(|_| Fault::UnknownRegister(self.ip, id))
    }

    fn mode(&self, byte: u8) -> Result<Mode, Fault> {
        Mode::try_from(byte).map_err(|_| Fault::UnknownMode(self.ip, byte))
    }

    fn value(&self, op: Opcode, mode: Mode, arg: u8) -> Result<u8, Fault> {
        Ok(match mode {
            Mode::Immediate => arg,
            Mode::Register => self.get(self.reg(arg)?),
            Mode::FramePointerWithOffset => self.peek(sext_add(self.fp, arg)),
            Mode::FramePointerPlusRegister => {
                self.peek(self.fp.wrapping_add(self.get(self.reg(arg)?) as u16))
            }
            Mode::FramePointerMinusRegister => {
                self.peek(self.fp.wrapping_sub(self.get(self.reg(arg)?) as u16))
            }
            Mode::ImmediatePlusRegister | Mode::ImmediateMinusRegister => {
                return Err(Fault::InvalidMode(self.ip, op, mode))
            }
        })
    }

    fn address(&self, op: Opcode, mode: Mode, arg: u8, base: u16) -> Result<u16, Fault> {
        Ok(match mode {
            Mode::Immediate => sext_add(base, arg),
            Mode::Register => return Err(Fault::InvalidMode(self.ip, op, mode)),
            Mode::FramePointerWithOffset => sext_add(self.fp, arg),
            Mode::FramePointerPlusRegister => self.fp.wrapping_add(self.get(self.reg(arg)?) as u16),
            Mode::FramePointerMinusRegister => self.fp.wrapping_sub(self.get(self.reg(arg)?) as u16),
            Mode::ImmediatePlusRegister => base.wrapping_add(self.get(self.reg(arg)?) as u16),
            Mode::ImmediateMinusRegister => base.wrapping_sub(self.get(self.reg(arg)?) as u16),
        })
    }

    /// Execute the instruction at IP.
    ///
    /// Faults are raised before any state changes, leaving IP on the faulting
    /// instruction. A halted VM stays put and reports `halt` again.
    pub fn tick(&mut self) -> Result<Step, Fault> {
        let addr = self.ip;
        if self.halted {
            return Ok(Step {
                addr,
                opcode: Opcode::Halt,
            });
        }

        let byte = self.peek(addr);
        let opcode = Opcode::try_from(byte).map_err(|_| Fault::UnknownOpcode(addr, byte))?;
        tracing::trace!("{:#06x}: {}", addr, opcode);

        let next = match opcode {
            Opcode::Halt => {
                self.halted = true;
                addr
            }
            Opcode::Load => {
                let mode = self.mode(self.arg(1))?;
                let target = self.address(opcode, mode, self.arg(2), self.arg16(3))?;
                let reg = self.reg(self.arg(5))?;
                self.set(reg, self.peek(target));
                addr.wrapping_add(6)
            }
            Opcode::Store => {
                let reg = self.reg(self.arg(1))?;
                let mode = self.mode(self.arg(2))?;
                let target = self.address(opcode, mode, self.arg(3), self.arg16(4))?;
                self.poke(target, self.get(reg));
                addr.wrapping_add(6)
            }
            Opcode::Mov => {
                let reg = self.reg(self.arg(1))?;
                let mode = self.mode(self.arg(2))?;
                let val = self.value(opcode, mode, self.arg(3))?;
                self.set(reg, val);
                addr.wrapping_add(4)
            }
            Opcode::Swap => {
                std::mem::swap(&mut self.a, &mut self.b);
                addr.wrapping_add(1)
            }
            Opcode::Push => {
                let mode = self.mode(self.arg(1))?;
                let val = self.value(opcode, mode, self.arg(2))?;
                self.push(val);
                addr.wrapping_add(3)
            }
            Opcode::Pop => {
                self.a = self.pop();
                addr.wrapping_add(1)
            }
            Opcode::Rand => {
                self.a = self.rng.gen();
                addr.wrapping_add(1)
            }
            Opcode::Jump => self.arg16(1),
            Opcode::Jumpz => match self.a {
                0 => self.arg16(1),
                _ => addr.wrapping_add(3),
            },
            Opcode::Jumpnz => match self.a {
                0 => addr.wrapping_add(3),
                _ => self.arg16(1),
            },
            Opcode::Call => {
                let target = self.arg16(1);
                self.push(self.b);
                self.push16(self.fp);
                self.push16(addr.wrapping_add(3));
                self.fp = self.sp;
                target
            }
            Opcode::Ret => {
                self.sp = self.fp;
                let ip = self.pop16();
                self.fp = self.pop16();
                self.b = self.pop();
                let argc = self.pop();
                self.sp = self.sp.wrapping_add(argc as u16);
                ip
            }
            Opcode::Reti => {
                self.sp = self.fp;
                let ip = self.pop16();
                self.fp = self.pop16();
                self.b = self.pop();
                self.a = self.pop();
                self.in_interrupt = false;
                ip
            }
            op => {
                let alu = Alu::try_from(op).map_err(|_| Fault::UnknownOpcode(addr, byte))?;
                let mode = self.mode(self.arg(1))?;
                let rhs = self.value(op, mode, self.arg(2))?;
                self.a = alu.calc(self.a, rhs).ok_or(Fault::DivideByZero(addr))?;
                addr.wrapping_add(3)
            }
        };
        self.ip = next;

        Ok(Step { addr, opcode })
    }
}

/// `base + arg` with `arg` read as a signed byte.
fn sext_add(base: u16, arg: u8) -> u16 {
    base.wrapping_add(arg as i8 as i16 as u16)
}
