use std::sync::Arc;

use parking_lot::Mutex;

use crate::{definitions::keyboard, display::Framebuffer};

#[cfg_attr(test, mockall::automock)]
/// The traits responsible for the display based code
pub trait DisplayCommands {
    /// Will clear the display
    fn clear_display(&mut self);
    /// Will display all from the pixels
    fn display(&mut self, pixels: &Framebuffer);
}

/// Will store the state of the hex keyboard and the
/// last key that was released.
///
/// Input is done with a hex keyboard that has 16 keys ranging `0-F`. The `8`, `4`, `6`, and
/// `2` keys are typically used for directional input. Three opcodes are used to detect input.
/// One skips an instruction if a specific key is pressed, while another does the same if a
/// specific key is not pressed. The third waits for a key release, and then stores it in one of
/// the data registers.
#[derive(Default, Debug)]
pub struct Keyboard {
    keys: [bool; keyboard::SIZE],
    released: Option<u8>,
}

impl Keyboard {
    pub fn new() -> Self {
        Keyboard::default()
    }

    pub fn key_down(&mut self, key: u8) {
        if let Some(entry) = self.keys.get_mut(key as usize) {
            *entry = true;
        } else {
            log::warn!("Ignoring press of unknown key {:#X}", key);
        }
    }

    /// Releases the key and publishes it as the last released key,
    /// any earlier unconsumed release is overwritten.
    pub fn key_up(&mut self, key: u8) {
        if let Some(entry) = self.keys.get_mut(key as usize) {
            *entry = false;
            self.released = Some(key);
        } else {
            log::warn!("Ignoring release of unknown key {:#X}", key);
        }
    }

    pub fn is_down(&self, key: u8) -> bool {
        self.keys.get(key as usize).copied().unwrap_or(false)
    }

    /// The only consuming read of the keyboard.
    pub fn take_released_key(&mut self) -> Option<u8> {
        self.released.take()
    }

    pub fn get_keys(&self) -> &[bool] {
        &self.keys
    }
}

/// A thread safe handle to the [`Keyboard`], the input source and the
/// chip each keep a clone.
#[derive(Clone, Default, Debug)]
pub struct Keypad {
    inner: Arc<Mutex<Keyboard>>,
}

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&self, key: u8) {
        self.inner.lock().key_down(key)
    }

    pub fn key_up(&self, key: u8) {
        self.inner.lock().key_up(key)
    }

    pub fn is_down(&self, key: u8) -> bool {
        self.inner.lock().is_down(key)
    }

    pub fn take_released_key(&self) -> Option<u8> {
        self.inner.lock().take_released_key()
    }

    /// A copy of the current key states.
    pub fn keys(&self) -> [bool; keyboard::SIZE] {
        self.inner.lock().keys
    }
}

/// Maps the physical keyboard onto the hex keypad.
///
/// ```text
/// |1|2|3|C|      |1|2|3|4|
/// |4|5|6|D|  ->  |Q|W|E|R|
/// |7|8|9|E|  ->  |A|S|D|F|
/// |A|0|B|F|      |Z|X|C|V|
/// ```
pub mod keymap {
    use crate::definitions::keyboard::{LAYOUT, PHYSICAL};
    use hashbrown::HashMap;
    use once_cell::sync::Lazy;

    static KEYMAP: Lazy<HashMap<char, u8>> = Lazy::new(|| {
        PHYSICAL
            .iter()
            .flatten()
            .copied()
            .zip(LAYOUT.iter().flatten().copied())
            .collect()
    });

    /// Will return the hex key for the given physical key.
    ///
    /// # Example
    /// ```rust
    /// # use chip::devices::keymap;
    /// assert_eq!(keymap::map('x'), Some(0x0));
    /// assert_eq!(keymap::map('V'), Some(0xF));
    /// assert_eq!(keymap::map('p'), None);
    /// ```
    pub fn map(key: char) -> Option<u8> {
        KEYMAP.get(&key.to_ascii_lowercase()).copied()
    }
}
