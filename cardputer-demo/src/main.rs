#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those     holding buffers for the duration of a data transfer."
)]

mod lcd_bus;

use cardputer_display_async::{Console, LcdConfig, LcdDisplay};
use cardputer_keypad_async::{Keypad, PipeSink, ScanConfig, ScanControl};
use embassy_executor::Spawner;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, pipe::Pipe};
use embassy_time::Delay;
use embedded_graphics::{pixelcolor::Rgb565, prelude::*};
use esp_hal::{
    clock::CpuClock,
    gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull},
    spi::{
        master::{Config, Spi},
        Mode,
    },
    time::Rate,
    timer::systimer::SystemTimer,
    Async,
};
use esp_println::println;
use lcd_bus::LcdBus;
use log::{debug, error, info};
use static_cell::ConstStaticCell;

const PIPE_SIZE: usize = 64;
const FRAME_BYTES: usize = LcdConfig::CARDPUTER.buffer_len();

static KEYS: Pipe<CriticalSectionRawMutex, PIPE_SIZE> = Pipe::new();
static CONTROL: ScanControl<CriticalSectionRawMutex> = ScanControl::new();
static FRAME: ConstStaticCell<[u8; FRAME_BYTES]> = ConstStaticCell::new([0; FRAME_BYTES]);

type CardputerKeypad = Keypad<
    'static,
    Output<'static>,
    Input<'static>,
    PipeSink<'static, CriticalSectionRawMutex, PIPE_SIZE>,
>;
type Lcd = LcdDisplay<'static, Output<'static>, Output<'static>>;
type LcdSpi = LcdBus<Spi<'static, Async>, Output<'static>, Delay>;

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    println!("{}", info);
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

/// The main entry point of the application.
#[esp_hal_embassy::main]
async fn main(spawner: Spawner) {
    esp_println::logger::init_logger(log::LevelFilter::Info);

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    let timer0 = SystemTimer::new(peripherals.SYSTIMER);
    esp_hal_embassy::init(timer0.alarm0);
    info!("Peripherals initialized");

    let out = OutputConfig::default();

    // A0, A1, A2 of the 74HC138.
    let address = [
        Output::new(peripherals.GPIO8, Level::Low, out),
        Output::new(peripherals.GPIO9, Level::Low, out),
        Output::new(peripherals.GPIO11, Level::Low, out),
    ];
    let pull_down = InputConfig::default().with_pull(Pull::Down);
    let sense = [
        Input::new(peripherals.GPIO13, pull_down),
        Input::new(peripherals.GPIO15, pull_down),
        Input::new(peripherals.GPIO3, pull_down),
        Input::new(peripherals.GPIO4, pull_down),
        Input::new(peripherals.GPIO5, pull_down),
        Input::new(peripherals.GPIO6, pull_down),
        Input::new(peripherals.GPIO7, pull_down),
    ];
    let keypad = match Keypad::new(address, sense, ScanConfig::default(), PipeSink::new(&KEYS)) {
        Ok(keypad) => keypad,
        Err(e) => {
            error!("Keypad setup failed: {e:?}");
            return;
        }
    };

    let spi = match Spi::new(
        peripherals.SPI2,
        Config::default()
            .with_frequency(Rate::from_mhz(40))
            .with_mode(Mode::_0),
    ) {
        Ok(spi) => spi
            .with_sck(peripherals.GPIO36)
            .with_mosi(peripherals.GPIO35)
            .into_async(),
        Err(e) => {
            error!("SPI setup failed: {e:?}");
            return;
        }
    };
    let cs = Output::new(peripherals.GPIO37, Level::High, out);
    let lcd_spi = LcdBus::new(spi, cs, Delay);

    let dc = Output::new(peripherals.GPIO34, Level::Low, out);
    let rst = Output::new(peripherals.GPIO33, Level::High, out);
    let backlight = Output::new(peripherals.GPIO38, Level::High, out);
    let display = match LcdDisplay::new(dc, Some(rst), FRAME.take(), LcdConfig::default()) {
        Ok(display) => display,
        Err(e) => {
            error!("Frame buffer rejected: {e:?}");
            return;
        }
    };

    if let Err(e) = spawner.spawn(scan_keys(keypad)) {
        error!("Failed to spawn keypad task: {e:?}");
    }
    if let Err(e) = spawner.spawn(terminal(display, lcd_spi, backlight)) {
        error!("Failed to spawn terminal task: {e:?}");
    }
}

/// Scans the keypad until something requests a stop.
#[embassy_executor::task]
async fn scan_keys(mut keypad: CardputerKeypad) {
    keypad.run(&CONTROL).await;
}

/// Echoes translated key bytes onto the LCD.
#[embassy_executor::task]
async fn terminal(mut display: Lcd, mut spi: LcdSpi, _backlight: Output<'static>) {
    if let Err(e) = display.init(&mut spi, &mut Delay).await {
        error!("Display init failed: {e:?}");
        return;
    }
    display.clear(Rgb565::BLACK);
    let mut console = Console::new(display.size(), Rgb565::WHITE, Rgb565::BLACK);
    console.write(&mut display, b"Cardputer ready\n");

    let mut buf = [0u8; PIPE_SIZE];
    loop {
        let n = KEYS.read(&mut buf).await;
        debug!("Terminal input {:?}", &buf[..n]);
        console.write(&mut display, &buf[..n]);
        if let Err(e) = display.flush(&mut spi).await {
            error!("Display flush failed: {e:?}");
        }
    }
}
