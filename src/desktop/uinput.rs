//! # uinput Injector
//!
//! Replays controller events on the desktop through a Linux uinput virtual
//! device.
//!
//! ## Device Capabilities
//!
//! | Capability | evdev Code | Driven by |
//! |------------|------------|-----------|
//! | Absolute X/Y | ABS_X, ABS_Y (0 to screen size) | `PointerMove` |
//! | Left button | BTN_LEFT | `PointerPress` / `PointerRelease` |
//! | Arrow keys | KEY_UP, KEY_DOWN, KEY_LEFT, KEY_RIGHT | `KeyPress` |
//! | Volume keys | KEY_VOLUMEUP, KEY_VOLUMEDOWN | `VolumeDelta` |
//!
//! Opening `/dev/uinput` usually requires membership in the `input` group.

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AbsInfo, AbsoluteAxisType, AttributeSet, EventType, InputEvent, Key, UinputAbsSetup};
use tracing::{debug, info};

use crate::controller::events::{ControllerEvent, Direction};
use crate::error::{Result, WiiboardError};

/// Name shown by `evtest` and the compositor.
pub const DEVICE_NAME: &str = "wiiboard pointer";

const KEY_PRESSED: i32 = 1;
const KEY_RELEASED: i32 = 0;

/// Virtual absolute pointer with arrow and volume keys.
pub struct UinputInjector {
    device: VirtualDevice,
}

impl std::fmt::Debug for UinputInjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UinputInjector").finish_non_exhaustive()
    }
}

impl UinputInjector {
    /// Create the virtual device with axes sized to the screen.
    ///
    /// # Errors
    ///
    /// Returns `Injector` if `/dev/uinput` cannot be opened or the device
    /// cannot be registered.
    pub fn new(screen_width: u32, screen_height: u32) -> Result<Self> {
        let mut keys = AttributeSet::<Key>::new();
        for key in [
            Key::BTN_LEFT,
            Key::KEY_UP,
            Key::KEY_DOWN,
            Key::KEY_LEFT,
            Key::KEY_RIGHT,
            Key::KEY_VOLUMEUP,
            Key::KEY_VOLUMEDOWN,
        ] {
            keys.insert(key);
        }

        let abs_x = axis(AbsoluteAxisType::ABS_X, screen_width);
        let abs_y = axis(AbsoluteAxisType::ABS_Y, screen_height);

        let device = VirtualDeviceBuilder::new()
            .and_then(|b| b.name(DEVICE_NAME).with_keys(&keys))
            .and_then(|b| b.with_absolute_axis(&abs_x))
            .and_then(|b| b.with_absolute_axis(&abs_y))
            .and_then(|b| b.build())
            .map_err(|e| WiiboardError::Injector(format!("Failed to create uinput device: {}", e)))?;

        info!("Created uinput device '{}' ({}x{})", DEVICE_NAME, screen_width, screen_height);
        Ok(Self { device })
    }

    /// Inject one controller event. Events without a desktop action are ignored.
    ///
    /// # Errors
    ///
    /// Returns `Injector` if the kernel rejects the write.
    pub fn apply(&mut self, event: &ControllerEvent) -> Result<()> {
        for batch in input_events(event) {
            self.device
                .emit(&batch)
                .map_err(|e| WiiboardError::Injector(format!("Failed to emit {:?}: {}", event, e)))?;
        }

        debug!("Injected {:?}", event);
        Ok(())
    }
}

fn axis(axis: AbsoluteAxisType, extent: u32) -> UinputAbsSetup {
    let max = i32::try_from(extent.saturating_sub(1)).unwrap_or(i32::MAX);
    UinputAbsSetup::new(axis, AbsInfo::new(0, 0, max, 0, 0, 1))
}

fn key(key: Key, value: i32) -> InputEvent {
    InputEvent::new(EventType::KEY, key.code(), value)
}

fn tap(k: Key) -> Vec<Vec<InputEvent>> {
    vec![vec![key(k, KEY_PRESSED)], vec![key(k, KEY_RELEASED)]]
}

/// Input event batches for a controller event; each batch is followed by a
/// SYN_REPORT when emitted.
fn input_events(event: &ControllerEvent) -> Vec<Vec<InputEvent>> {
    match *event {
        ControllerEvent::PointerMove { x, y } => vec![vec![
            InputEvent::new(EventType::ABSOLUTE, AbsoluteAxisType::ABS_X.0, x),
            InputEvent::new(EventType::ABSOLUTE, AbsoluteAxisType::ABS_Y.0, y),
        ]],
        ControllerEvent::PointerPress => vec![vec![key(Key::BTN_LEFT, KEY_PRESSED)]],
        ControllerEvent::PointerRelease => vec![vec![key(Key::BTN_LEFT, KEY_RELEASED)]],
        ControllerEvent::KeyPress(direction) => tap(match direction {
            Direction::Up => Key::KEY_UP,
            Direction::Down => Key::KEY_DOWN,
            Direction::Left => Key::KEY_LEFT,
            Direction::Right => Key::KEY_RIGHT,
        }),
        ControllerEvent::VolumeDelta(delta) if delta > 0 => tap(Key::KEY_VOLUMEUP),
        ControllerEvent::VolumeDelta(delta) if delta < 0 => tap(Key::KEY_VOLUMEDOWN),
        _ => Vec::new(),
    }
}
