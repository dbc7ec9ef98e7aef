use std::convert::TryFrom;

use {
    crate::{
        definitions::{cpu, display, keyboard, memory},
        devices::{Framebuffer, KeyHandle, Keypad},
        opcode::{self, Instruction, Opcode, Operation, ProgramCounter, ProgramCounterStep},
        timer::{BeepLatch, Timer},
        Config, LoadError, ProcessError, StackError, UnknownOpcodePolicy,
    },
    rand::{rngs::StdRng, RngCore, SeedableRng},
    tinyvec::ArrayVec,
};

/// The font table as it is loaded into memory.
pub type Font = [u8; display::fontset::FONTSET.len()];

/// The ChipSet struct represents the current state
/// of the system, it contains all the structures
/// needed for emulating an instant on the
/// Chip8 CPU.
pub struct ChipSet {
    pub(super) config: Config,
    /// all two bytes long and stored big-endian
    pub(super) opcode: Opcode,
    /// - `0x000-0x1FF` - Chip 8 interpreter (contains font set in emu)
    /// - `0x000-0x050` - Used for the built in `4x5` pixel font set (`0-F`)
    /// - `0x200-0xFFF` - Program ROM and work RAM
    pub(super) memory: Vec<u8>,
    /// `8-bit` data registers named `V0` to `VF`. The `VF` register doubles as a flag for some
    /// instructions; thus, it should be avoided. In an addition operation, `VF` is the carry flag,
    /// while in subtraction, it is the "no borrow" flag. In the draw instruction `VF` is set upon
    /// pixel collision.
    pub(super) registers: [u8; cpu::register::SIZE],
    /// The index for the register, this is a special register entry
    /// called index `I`
    pub(super) index_register: usize,
    /// The program counter is a CPU register in the computer processor which has the address of the
    /// next instruction to be executed from memory.
    pub(super) program_counter: usize,
    /// The stack is only used to store return addresses when subroutines are called. The original
    /// [RCA 1802](https://de.wikipedia.org/wiki/RCA1802) version allocated `48` bytes for up to
    /// `12` levels of nesting; modern implementations usually have more.
    /// (here we are using `16`)
    pub(super) stack: ArrayVec<[usize; cpu::stack::SIZE]>,
    /// Delay timer: This timer is intended to be used for timing the events of games. Its value
    /// can be set and read.
    pub(super) delay_timer: Timer<u8>,
    /// Sound timer: This timer is used for sound effects. A beep is requested when it counts down
    /// to zero.
    pub(super) sound_timer: Timer<u8, BeepLatch>,
    pub(super) framebuffer: Framebuffer,
    pub(super) keypad: Keypad,
    /// This stores the random number generator, used by the chipset.
    /// It is stored into the chipset, so as to enable seeding for tests.
    pub(super) rng: Box<dyn RngCore + Send>,
    /// The amount of cycles run since the last reset.
    pub(super) cycles: u64,
    /// The error that stopped the chipset.
    pub(super) halted: Option<ProcessError>,
}

fn build_rng(config: &Config) -> Box<dyn RngCore + Send> {
    match config.get_seed() {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::rngs::OsRng),
    }
}

fn check_program(program: &[u8]) -> Result<(), LoadError> {
    if program.len() > cpu::PROGRAM_SIZE {
        Err(LoadError::ProgramTooLarge {
            len: program.len(),
            max: cpu::PROGRAM_SIZE,
        })
    } else {
        Ok(())
    }
}

impl ChipSet {
    /// will create a new chipset object with the font loaded and an empty
    /// program
    pub fn new(config: Config) -> Self {
        let mut chip = Self {
            config,
            opcode: 0,
            memory: vec![0; memory::SIZE],
            registers: [0; cpu::register::SIZE],
            index_register: 0,
            program_counter: cpu::PROGRAM_COUNTER,
            stack: ArrayVec::new(),
            delay_timer: Timer::new(0),
            sound_timer: Timer::new(0),
            framebuffer: Framebuffer::new(),
            keypad: Keypad::new(),
            rng: build_rng(&config),
            cycles: 0,
            halted: None,
        };
        chip.load_font(&display::fontset::FONTSET);
        chip
    }

    /// will create a new chipset with the default font and the given program
    pub fn with_program(config: Config, program: &[u8]) -> Result<Self, LoadError> {
        check_program(program)?;
        let mut chip = Self::new(config);
        chip.load_program(program)?;
        Ok(chip)
    }

    /// Resets the chipset and loads the font and the program. If the
    /// program doesn't fit, the chipset is left untouched.
    pub fn initialize(&mut self, font: &Font, program: &[u8]) -> Result<(), LoadError> {
        check_program(program)?;
        self.reset();
        self.load_font(font);
        self.load_program(program)?;
        log::info!("Initialized a program of {} bytes.", program.len());
        Ok(())
    }

    /// Zeroes every part of the state and moves the program counter
    /// to the program start. The font has to be reloaded afterwards.
    pub fn reset(&mut self) {
        self.opcode = 0;
        self.memory.iter_mut().for_each(|byte| *byte = 0);
        self.registers = [0; cpu::register::SIZE];
        self.index_register = 0;
        self.program_counter = cpu::PROGRAM_COUNTER;
        self.stack.clear();
        self.delay_timer.set_value(0);
        self.sound_timer.set_value(0);
        self.sound_timer.callback_mut().take();
        self.framebuffer.reset();
        self.keypad.reset();
        self.rng = build_rng(&self.config);
        self.cycles = 0;
        self.halted = None;
    }

    /// Copies the font into memory at the font location.
    pub fn load_font(&mut self, font: &Font) {
        let location = display::fontset::LOCATION;
        self.memory[location..(location + font.len())].copy_from_slice(font);
    }

    /// write the program data into memory
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), LoadError> {
        check_program(program)?;
        let start = cpu::PROGRAM_COUNTER;
        self.memory[start..(start + program.len())].copy_from_slice(program);
        Ok(())
    }

    /// will get the next opcode from memory
    pub(super) fn set_opcode(&mut self) -> Result<(), ProcessError> {
        // will build the opcode given from the pointer
        self.opcode = opcode::build_opcode(&self.memory, self.program_counter)?;
        Ok(())
    }

    /// will advance the program by a single step
    pub fn step(&mut self) -> Result<Operation, ProcessError> {
        if self.halted.is_some() {
            return Err(ProcessError::Halted);
        }

        match self.cycle() {
            Ok(operation) => {
                self.advance_timers();
                Ok(operation)
            }
            Err(err)
                if err.is_recoverable()
                    && self.config.get_unknown_opcode() == UnknownOpcodePolicy::Skip =>
            {
                log::warn!(
                    "Skipping at {:#06X}: {}",
                    self.program_counter - memory::opcodes::SIZE,
                    err
                );
                self.advance_timers();
                Err(err)
            }
            Err(err) => {
                log::error!("Halting at {:#06X}: {}", self.program_counter, err);
                self.halted = Some(err);
                Err(err)
            }
        }
    }

    /// fetch, decode and execute a single instruction
    fn cycle(&mut self) -> Result<Operation, ProcessError> {
        self.set_opcode()?;
        self.program_counter += memory::opcodes::SIZE;

        let instruction = Instruction::try_from(self.opcode)?;
        log::debug!("opcode {:#06X} => {:?}", self.opcode, instruction);

        let (step, operation) = self.execute(instruction)?;
        ProgramCounter::step(self, step);
        Ok(operation)
    }

    fn advance_timers(&mut self) {
        self.cycles += 1;
        let divider = self.config.get_timer_divider() as u64;
        if divider != 0 && self.cycles % divider == 0 {
            self.tick_timers();
        }
    }

    /// Counts both timers down by one, is called with `60Hz` either by
    /// [`step`](Self::step) or by the host.
    pub fn tick_timers(&mut self) {
        self.delay_timer.tick();
        if self.sound_timer.tick() {
            log::debug!("The sound timer reached zero.");
        }
    }

    /// Will set the value of the given key
    pub fn set_key(&mut self, key: usize, to: bool) {
        self.keypad.set_key(key, to)
    }

    /// A handle for writing keys from an other thread.
    pub fn key_handle(&self) -> KeyHandle {
        self.keypad.handle()
    }

    /// Will get the current state of the keyboard
    pub fn get_keyboard(&self) -> [bool; keyboard::SIZE] {
        self.keypad.get_keys()
    }

    pub fn get_framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn is_dirty(&self) -> bool {
        self.framebuffer.is_dirty()
    }

    pub fn clear_dirty(&mut self) {
        self.framebuffer.clear_dirty()
    }

    /// Returns if a beep was requested since the last call.
    pub fn should_beep(&mut self) -> bool {
        self.sound_timer.callback_mut().take()
    }

    /// will return the sound timer
    pub fn get_sound_timer(&self) -> u8 {
        self.sound_timer.get_value()
    }

    /// will return the delay timer
    pub fn get_delay_timer(&self) -> u8 {
        self.delay_timer.get_value()
    }

    pub fn get_registers(&self) -> &[u8] {
        &self.registers
    }

    pub fn get_index_register(&self) -> usize {
        self.index_register
    }

    pub fn get_program_counter(&self) -> usize {
        self.program_counter
    }

    pub fn get_stack(&self) -> &[usize] {
        &self.stack
    }

    pub fn get_memory(&self) -> &[u8] {
        &self.memory
    }

    pub fn get_cycles(&self) -> u64 {
        self.cycles
    }

    /// The error that halted the chipset if there is one.
    pub fn get_halted(&self) -> Option<ProcessError> {
        self.halted
    }

    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    /// Will push the current pointer to the stack
    pub(super) fn push_stack(&mut self, pointer: usize) -> Result<(), StackError> {
        match self.stack.try_push(pointer) {
            None => Ok(()),
            Some(_) => Err(StackError::Full),
        }
    }

    /// Will pop from the stack
    pub(super) fn pop_stack(&mut self) -> Result<usize, StackError> {
        self.stack.pop().ok_or(StackError::Empty)
    }
}

impl Default for ChipSet {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl ProgramCounter for ChipSet {
    fn step(&mut self, step: ProgramCounterStep) {
        self.program_counter = step.apply(self.program_counter);
    }
}
