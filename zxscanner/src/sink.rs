//! Virtual keyboard output.
//!
//! Key transitions are injected into the host input stack through a
//! uinput device. The device is declared with the whole key vocabulary up
//! front; uinput drops events for codes it was not registered with.

use anyhow::{Context, Result};
use evdev::uinput::VirtualDevice;
use evdev::{AttributeSet, KeyCode, KeyEvent};
use zx_keymap::Key;

const KEY_RELEASE: i32 = 0;
const KEY_PRESS: i32 = 1;

/// Receives key-down/key-up events.
pub trait KeySink {
    /// Emit a press (`pressed = true`) or release of `key`.
    fn emit(&mut self, key: Key, pressed: bool) -> Result<()>;

    /// Keys this sink was declared with.
    fn registered(&self) -> &[Key];
}

/// uinput-backed virtual keyboard.
pub struct UinputKeyboard {
    device: VirtualDevice,
    keys: Vec<Key>,
}

impl UinputKeyboard {
    /// Create and register the virtual device.
    pub fn create(name: &str, keys: &[Key]) -> Result<Self> {
        let mut supported = AttributeSet::<KeyCode>::new();
        for key in keys {
            supported.insert(KeyCode::new(key.code()));
        }

        let device = VirtualDevice::builder()
            .context("opening /dev/uinput (is the uinput module loaded, and can we write to it?)")?
            .name(name)
            .with_keys(&supported)
            .context("declaring keys on the virtual device")?
            .build()
            .context("creating the virtual keyboard")?;

        Ok(Self { device, keys: keys.to_vec() })
    }
}

impl KeySink for UinputKeyboard {
    fn emit(&mut self, key: Key, pressed: bool) -> Result<()> {
        let value = if pressed { KEY_PRESS } else { KEY_RELEASE };
        let event = KeyEvent::new(KeyCode::new(key.code()), value);
        self.device
            .emit(&[*event])
            .with_context(|| format!("emitting {} {}", key.name(), value))
    }

    fn registered(&self) -> &[Key] {
        &self.keys
    }
}
