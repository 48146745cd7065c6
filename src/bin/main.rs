#[macro_use]
extern crate slog;

use std::error::Error;
use std::fs;
use std::process;
use std::time::{Duration, Instant};

use chip8_vm::graphics::{DEFAULT_BG, DEFAULT_FG};
use chip8_vm::{terminal_logger, AsKeyboard, Config, Emulator, Key, Severity, HEIGHT, WIDTH};
use device_query::{DeviceQuery, DeviceState, Keycode};
use minifb::{Scale, ScaleMode, Window, WindowOptions};
use serde::Deserialize;

/// The left hand side of a QWERTY keyboard standing in for the 4x4 hex keypad
struct Keyboard(pub DeviceState);

impl AsKeyboard for Keyboard {
    fn keys_down(&self) -> Vec<Key> {
        self.0
            .get_keys()
            .iter()
            .filter_map(|key: &Keycode| match key {
                Keycode::Key1 => Some(Key::Key1),
                Keycode::Key2 => Some(Key::Key2),
                Keycode::Key3 => Some(Key::Key3),
                Keycode::Key4 => Some(Key::C),
                Keycode::Q => Some(Key::Key4),
                Keycode::W => Some(Key::Key5),
                Keycode::E => Some(Key::Key6),
                Keycode::R => Some(Key::D),
                Keycode::A => Some(Key::Key7),
                Keycode::S => Some(Key::Key8),
                Keycode::D => Some(Key::Key9),
                Keycode::F => Some(Key::E),
                Keycode::Z => Some(Key::A),
                Keycode::X => Some(Key::Key0),
                Keycode::C => Some(Key::B),
                Keycode::V => Some(Key::F),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct WindowConfig {
    fg_color: u32,
    bg_color: u32,
    scale_factor: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            fg_color: DEFAULT_FG,
            bg_color: DEFAULT_BG,
            scale_factor: 20,
        }
    }
}

impl WindowConfig {
    /// minifb only scales by powers of two, so round down to the nearest one
    fn scale(&self) -> Scale {
        match self.scale_factor {
            0 | 1 => Scale::X1,
            2 | 3 => Scale::X2,
            4..=7 => Scale::X4,
            8..=15 => Scale::X8,
            16..=31 => Scale::X16,
            _ => Scale::X32,
        }
    }
}

/// Everything the optional JSON config file can hold
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HostConfig {
    vm: Config,
    window: WindowConfig,
}

fn read_config(path: Option<&String>) -> Result<HostConfig, Box<dyn Error>> {
    match path {
        Some(path) => Ok(serde_json::from_str(&fs::read_to_string(path)?)?),
        None => Ok(HostConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let logger = terminal_logger(Severity::Info)?;

    let args: Vec<String> = std::env::args().collect();
    let rom_path = match args.get(1) {
        Some(path) => path,
        None => {
            error!(logger, "usage: chip8-vm <rom> [config.json]");
            process::exit(2);
        }
    };
    let config = read_config(args.get(2))?;

    let mut emulator = Emulator::with_config(config.vm, Some(logger.clone()))?;
    emulator.load_program(&fs::read(rom_path)?)?;

    let mut window = Window::new(
        "CHIP-8",
        WIDTH,
        HEIGHT,
        WindowOptions {
            scale: config.window.scale(),
            scale_mode: ScaleMode::AspectRatioStretch,
            ..WindowOptions::default()
        },
    )?;

    // about 60 Hz, the rate the timers run at anyway
    window.limit_update_rate(Some(Duration::from_millis(16)));

    let keyboard = Keyboard(DeviceState::new());
    let mut last_frame = Instant::now();
    let mut beeping = false;

    while window.is_open() && !window.is_key_down(minifb::Key::Escape) {
        emulator.handle_key_input(&keyboard);

        let now = Instant::now();
        let result = emulator.update(now - last_frame);
        last_frame = now;

        if let Err(fault) = result {
            error!(logger, "stopping"; "fault" => %fault);
            break;
        }

        if emulator.sound_active() != beeping {
            beeping = emulator.sound_active();
            info!(logger, "sound"; "on" => beeping);
        }

        // draw the display if it changed, otherwise just pump the window's events
        if emulator.take_redraw() {
            let buffer = emulator
                .graphics()
                .to_rgb(config.window.fg_color, config.window.bg_color);
            window.update_with_buffer(&buffer, WIDTH, HEIGHT)?;
        } else {
            window.update();
        }
    }

    info!(logger, "exiting"; "faulted" => emulator.fault().is_some());
    Ok(())
}
