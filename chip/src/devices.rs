//! The devices the chipset talks to: the framebuffer it draws into, the
//! keypad it reads and the traits a host implements to present them.
use {
    crate::definitions::{display, keyboard},
    hashbrown::HashMap,
    std::sync::{
        atomic::{AtomicU16, Ordering},
        Arc,
    },
};

#[cfg_attr(test, mockall::automock)]
/// The traits responsible for the display based code
pub trait DisplayCommands {
    /// Will display all from the pixels
    fn display(&mut self, framebuffer: &Framebuffer);
}

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for playing the beep requested by the sound timer
pub trait SoundCommands {
    fn beep(&mut self);
}

/// The graphics of the Chip 8 are black and white and the screen has a total of `2048` pixels
/// `(64 x 32)`. The pixels are stored row by row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    pixels: Box<[[bool; display::WIDTH]; display::HEIGHT]>,
    /// Set whenever the pixels change and a redraw is owed to the host.
    dirty: bool,
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self {
            pixels: Box::new([[false; display::WIDTH]; display::HEIGHT]),
            dirty: false,
        }
    }
}

impl Framebuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all pixels and marks the framebuffer dirty.
    pub fn clear(&mut self) {
        for row in self.pixels.iter_mut() {
            row.iter_mut().for_each(|pixel| *pixel = false);
        }
        self.dirty = true;
    }

    /// Resets to the power on state, which is neither set nor dirty.
    pub(crate) fn reset(&mut self) {
        self.clear();
        self.dirty = false;
    }

    /// XORs a sprite onto the framebuffer, the start position wraps around
    /// the screen, the pixels right of the screen wrap into the same row and
    /// rows below the screen are clipped. Returns `true` if any set pixel
    /// was turned off.
    pub fn draw_sprite(&mut self, x: usize, y: usize, sprite: &[u8]) -> bool {
        let x = x % display::WIDTH;
        let y = y % display::HEIGHT;
        let mut collision = false;

        for (i, row) in sprite.iter().enumerate() {
            let coory = y + i;
            if coory >= display::HEIGHT {
                break;
            }

            for j in 0..display::SPRITE_WIDTH {
                let mask = 0x80 >> j;
                if row & mask == 0 {
                    continue;
                }

                let coorx = (x + j) % display::WIDTH;
                let pixel = &mut self.pixels[coory][coorx];
                collision |= *pixel;
                *pixel = !*pixel;
            }
        }

        self.dirty = true;
        collision
    }

    /// The pixel at `(x, y)`, or `None` outside of the screen.
    pub fn pixel(&self, x: usize, y: usize) -> Option<bool> {
        self.pixels.get(y)?.get(x).copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.pixels.iter().map(|row| &row[..])
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

/// Input is done with a hex keyboard that has 16 keys ranging `0-F`. The `8`, `4`, `6`, and
/// `2` keys are typically used for directional input. Three opcodes are used to detect input.
/// One skips an instruction if a specific key is pressed, while another does the same if a
/// specific key is not pressed. The third waits for a key press, and then stores it in one of
/// the data registers.
///
/// All keys live in a single atomic bitmask, so a reader never sees half of a
/// change written by a [`KeyHandle`](KeyHandle) on another thread.
#[derive(Debug, Default)]
pub struct Keypad {
    keys: Arc<AtomicU16>,
}

impl Keypad {
    pub fn new() -> Self {
        Keypad::default()
    }

    /// A handle that can be moved to the input thread.
    pub fn handle(&self) -> KeyHandle {
        KeyHandle {
            keys: self.keys.clone(),
        }
    }

    pub fn set_key(&self, key: usize, to: bool) {
        self.handle().set_key(key, to)
    }

    pub fn is_pressed(&self, key: usize) -> bool {
        key < keyboard::SIZE && self.snapshot() & (1 << key) != 0
    }

    /// Returns the lowest pressed key if there is one.
    pub fn first_pressed(&self) -> Option<usize> {
        let keys = self.snapshot();
        if keys == 0 {
            None
        } else {
            Some(keys.trailing_zeros() as usize)
        }
    }

    /// Will get the current state of all keys
    pub fn get_keys(&self) -> [bool; keyboard::SIZE] {
        let keys = self.snapshot();
        let mut res = [false; keyboard::SIZE];
        for (i, key) in res.iter_mut().enumerate() {
            *key = keys & (1 << i) != 0;
        }
        res
    }

    pub(crate) fn reset(&self) {
        self.keys.store(0, Ordering::Release);
    }

    fn snapshot(&self) -> u16 {
        self.keys.load(Ordering::Acquire)
    }
}

/// Writes into the [`Keypad`](Keypad) it was created from.
#[derive(Debug, Clone)]
pub struct KeyHandle {
    keys: Arc<AtomicU16>,
}

impl KeyHandle {
    /// Will set the value of the given key, indices outside of `0x0-0xF`
    /// are rejected.
    pub fn set_key(&self, key: usize, to: bool) {
        if key >= keyboard::SIZE {
            log::warn!("Ignoring the key {:#X}, as it is not on the keypad.", key);
            return;
        }

        let mask = 1 << key;
        if to {
            self.keys.fetch_or(mask, Ordering::AcqRel);
        } else {
            self.keys.fetch_and(!mask, Ordering::AcqRel);
        }
    }

    /// Will write all keys in one go.
    pub fn set_keys(&self, keys: &[bool; keyboard::SIZE]) {
        let mask = keys
            .iter()
            .enumerate()
            .filter(|(_, pressed)| **pressed)
            .fold(0u16, |acc, (i, _)| acc | 1 << i);
        self.keys.store(mask, Ordering::Release);
    }
}

/// Maps the keys of a host keyboard onto the hex keypad.
#[derive(Debug, Clone)]
pub struct KeyMap {
    map: HashMap<char, usize>,
}

impl Default for KeyMap {
    /// The left side of a QWERTY keyboard `1234/qwer/asdf/zxcv`
    fn default() -> Self {
        let map = keyboard::HOST_LAYOUT
            .iter()
            .flatten()
            .zip(keyboard::LAYOUT.iter().flatten())
            .map(|(host, key)| (*host, *key))
            .collect();
        Self { map }
    }
}

impl KeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the keypad key a host key is mapped to.
    pub fn bind(&mut self, host: char, key: usize) {
        debug_assert!(key < keyboard::SIZE);
        self.map.insert(host.to_ascii_lowercase(), key);
    }

    pub fn get(&self, host: char) -> Option<usize> {
        self.map.get(&host.to_ascii_lowercase()).copied()
    }
}
