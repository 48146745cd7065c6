use crate::error::{Error, Result};

pub const NUM_KEYS: usize = 16;

/// Key's variants are the 16 keys from the CHIP-8's hexadecimal keyboard.
/// The recommended key mapping is:
///
/// Keypad                   Keyboard
/// +-+-+-+-+                +-+-+-+-+
/// |1|2|3|C|                |1|2|3|4|
/// +-+-+-+-+                +-+-+-+-+
/// |4|5|6|D|                |Q|W|E|R|
/// +-+-+-+-+       =>       +-+-+-+-+
/// |7|8|9|E|                |A|S|D|F|
/// +-+-+-+-+                +-+-+-+-+
/// |A|0|B|F|                |Z|X|C|V|
/// +-+-+-+-+                +-+-+-+-+
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Key {
    Key1,
    Key2,
    Key3,
    C,
    Key4,
    Key5,
    Key6,
    D,
    Key7,
    Key8,
    Key9,
    E,
    A,
    Key0,
    B,
    F,
}

impl Key {
    /// The hex value this key stands for, which is also its keypad index
    pub fn index(self) -> usize {
        match self {
            Key::Key0 => 0x0,
            Key::Key1 => 0x1,
            Key::Key2 => 0x2,
            Key::Key3 => 0x3,
            Key::Key4 => 0x4,
            Key::Key5 => 0x5,
            Key::Key6 => 0x6,
            Key::Key7 => 0x7,
            Key::Key8 => 0x8,
            Key::Key9 => 0x9,
            Key::A => 0xA,
            Key::B => 0xB,
            Key::C => 0xC,
            Key::D => 0xD,
            Key::E => 0xE,
            Key::F => 0xF,
        }
    }
}

/// Implemented by whatever the host reads its input from. The emulator asks it which keys are
/// down and brings the keypad in line with the answer
pub trait AsKeyboard {
    fn keys_down(&self) -> Vec<Key>;
}

/// Up/down state of the 16 keys. Written by the host, read by the interpreter
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Keypad {
    keys: [bool; NUM_KEYS],
}

impl Keypad {
    pub fn new() -> Self {
        Keypad {
            keys: [false; NUM_KEYS],
        }
    }

    pub fn set_key(&mut self, index: usize, pressed: bool) -> Result<()> {
        let key = self
            .keys
            .get_mut(index)
            .ok_or(Error::InvalidKeyIndex { index })?;
        *key = pressed;
        Ok(())
    }

    pub fn is_pressed(&self, index: usize) -> Result<bool> {
        self.keys
            .get(index)
            .copied()
            .ok_or(Error::InvalidKeyIndex { index })
    }

    /// The lowest numbered key that is currently down, if any
    pub fn any_pressed(&self) -> Option<usize> {
        self.keys.iter().position(|&down| down)
    }

    /// Given the keys held down on the host, mark exactly those as down
    pub fn update_with_keys(&mut self, keys: &[Key]) {
        self.keys = [false; NUM_KEYS];
        for key in keys {
            self.keys[key.index()] = true;
        }
    }

    /// Bit i is set when key i is down
    fn mask(&self) -> u16 {
        let mut mask = 0u16;
        for (i, &down) in self.keys.iter().enumerate() {
            if down {
                mask |= 1 << i;
            }
        }
        mask
    }
}

/// Bookkeeping for the blocking "wait for key" instruction (FX0A). Only a key that goes from
/// up to down while we wait counts; a key already held when the wait started has to be released
/// and pressed again
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyWait {
    /// register the pressed key gets stored in
    pub register: u8,
    held: u16,
}

impl KeyWait {
    pub fn new(register: u8, keypad: &Keypad) -> Self {
        KeyWait {
            register,
            held: keypad.mask(),
        }
    }

    /// Look at the keypad again. Returns the newly pressed key if there is one, otherwise
    /// remembers what is held so a release followed by a press is noticed next time
    pub fn poll(&mut self, keypad: &Keypad) -> Option<u8> {
        let now = keypad.mask();
        let pressed = now & !self.held;
        self.held = now;

        if pressed == 0 {
            None
        } else {
            Some(pressed.trailing_zeros() as u8)
        }
    }
}
