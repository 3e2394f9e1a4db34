// This example runs a green dot along a simulated 32 pixel strip.
//
// The simulated peripheral decodes every frame it receives back into colors
// and prints the strip to the terminal, one character per pixel.

use std::{
    io::Write,
    thread,
    time::{Duration, Instant},
};

use log::{LevelFilter, Log};
use ws2812_i2s::{
    encoder,
    protocol::{BYTES_PER_COLOR, BYTES_PER_PIXEL},
    ClockConfig, Color, CompletionNotifier, Neopixel, PixelUpdate, SerialTx, StdDelay,
    ThreadSpawner,
};

const PIXEL_COUNT: u32 = 32;

struct ConsoleTx {
    notifier: Option<CompletionNotifier>,
    frame_time: Duration,
}

impl SerialTx for ConsoleTx {
    type Error = std::io::Error;

    fn configure(&mut self, clock: &ClockConfig) -> Result<(), Self::Error> {
        log::info!(
            "Simulated I2S at {} Hz sample rate ({} bit/s).",
            clock.sample_rate(),
            clock.bit_rate
        );
        self.frame_time = Duration::from_secs(1) / clock.sample_rate();
        Ok(())
    }

    fn enable(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn disable(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn write(&mut self, data: &[u8], _timeout: Duration) -> Result<usize, Self::Error> {
        // Pretend the transfer takes as long as it would on the wire; 4 bytes per stereo frame
        thread::sleep(self.frame_time * (data.len() as u32 / 4));

        let strip: String = (0..PIXEL_COUNT as usize)
            .map(|index| match decode_pixel(data, index) {
                Some(Color::OFF) => '.',
                Some(color) if color.green() > 0 => 'o',
                Some(_) => '*',
                None => '?',
            })
            .collect();

        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "[{}]", strip)?;

        if let Some(notifier) = &self.notifier {
            notifier.notify();
        }
        Ok(data.len())
    }

    fn register_completion(&mut self, notifier: CompletionNotifier) -> bool {
        self.notifier = Some(notifier);
        true
    }
}

fn decode_pixel(frame: &[u8], index: usize) -> Option<Color> {
    let mut channels = [0u8; 3];
    for (channel, value) in channels.iter_mut().enumerate() {
        let mut encoded = [0u8; BYTES_PER_COLOR];
        for (pos, byte) in encoded.iter_mut().enumerate() {
            let offset = index * BYTES_PER_PIXEL + channel * BYTES_PER_COLOR + pos;
            *byte = *frame.get(offset ^ 1)?;
        }
        *value = encoder::decode(&encoded)?;
    }
    let [green, red, blue] = channels;
    Some(Color::rgb(red, green, blue))
}

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let color = match record.level() {
            log::Level::Error => "31",
            log::Level::Warn => "33",
            log::Level::Info => "39",
            log::Level::Debug => "38;5;243",
            log::Level::Trace => "38;5;19",
        };
        eprintln!(
            "\x1b[{}m[{}] {}\x1b[0m",
            color,
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        // Nothing, eprintln already flushes
    }
}

static LOGGER: StderrLogger = StderrLogger;

fn main() {
    if let Err(e) = log::set_logger(&LOGGER) {
        eprintln!("Unable to set logger: {}", e);
    }
    log::set_max_level(LevelFilter::Debug);

    let tx = ConsoleTx {
        notifier: None,
        frame_time: Duration::ZERO,
    };
    let neopixel = match Neopixel::init(PIXEL_COUNT, tx, &ThreadSpawner) {
        Ok(neopixel) => neopixel,
        Err(e) => {
            log::error!("Unable to initialize neopixel driver: {}", e);
            return;
        }
    };

    let refresh_rate = neopixel.refresh_rate();
    log::info!("Refresh rate: {} Hz", refresh_rate);

    // Slow enough to watch
    let step = Duration::from_millis(50).max(Duration::from_secs(1) / refresh_rate);
    let start = Instant::now();
    let mut iteration = 0;
    while start.elapsed() < Duration::from_secs(3) {
        neopixel.set_pixel(&[
            PixelUpdate::new(iteration % PIXEL_COUNT, Color::OFF),
            PixelUpdate::new((iteration + 5) % PIXEL_COUNT, Color::rgb(0, 50, 0)),
        ]);
        iteration += 1;
        thread::sleep(step);
    }

    match neopixel.deinit(&mut StdDelay) {
        Ok(_) => log::info!("Done."),
        Err(e) => log::error!("Teardown failed: {}", e),
    }
}
