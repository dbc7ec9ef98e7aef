use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;

use crate::{
    chip8::ChipSet,
    devices::{DisplayCommands, SoundCommands},
    timer::TimedWorker,
};

/// Will run the chip on a worker, one step per interval. The chip stays
/// shared, so that the host can write keys or inspect it while it runs.
/// Every dirty frame is handed to the display and every requested beep to
/// the sound device. The worker stops once the chip halts.
pub fn run<D, S, W>(chip: Arc<Mutex<ChipSet>>, mut display: D, mut sound: S, interval: Duration) -> W
where
    D: DisplayCommands + Send + 'static,
    S: SoundCommands + Send + 'static,
    W: TimedWorker,
{
    let inner_run = move || {
        let mut chip = chip.lock();

        if let Err(err) = chip.step() {
            if chip.is_halted() {
                log::error!("Stopping the runner: {}", err);
                return false;
            }
        }

        if chip.is_dirty() {
            display.display(chip.get_framebuffer());
            chip.clear_dirty();
        }

        if chip.should_beep() {
            sound.beep();
        }

        true
    };

    let mut worker = W::new();
    log::info!("Starting the runner with an interval of {:?}", interval);
    worker.start(inner_run, interval);

    worker
}
