use opencv::{highgui, prelude::*};

use crate::error::{AccumulatorError, Result};

/// Returned by `wait_key` when no key was pressed within the timeout.
pub const NO_KEY: i32 = -1;

/// Which image a call to [`FrameDisplay::show`] carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Accumulator,
    Warp,
}

/// A surface the run loop renders into and polls keys from.
pub trait FrameDisplay {
    fn show(&mut self, view: View, image: &Mat) -> Result<()>;

    /// Wait up to `delay_ms` for a key press. Returns [`NO_KEY`] when nothing was pressed.
    fn poll_key(&mut self, delay_ms: i32) -> Result<i32>;
}

/// True when `key` (as returned by `wait_key`) is a 'q' press. Only the low byte is compared,
/// since some backends set modifier bits above it.
pub fn is_quit_key(key: i32) -> bool {
    key != NO_KEY && (key & 0xFF) == b'q' as i32
}

/// OpenCV highgui windows. The accumulator window is created up front, the warp window the first
/// time a warped frame is shown. All windows are destroyed on drop.
pub struct HighguiDisplay {
    name: String,
    warp_name: String,
    warp_created: bool,
}

impl HighguiDisplay {
    pub fn new<S: Into<String>>(name: S) -> Result<Self> {
        let name = name.into();
        highgui::named_window(&name, highgui::WINDOW_AUTOSIZE)
            .map_err(|e| AccumulatorError::display(name.clone(), e))?;
        log::info!("Window \"{}\" created", name);
        Ok(Self {
            warp_name: format!("{}-warp", name),
            name,
            warp_created: false,
        })
    }

    fn window_for(&mut self, view: View) -> Result<&str> {
        match view {
            View::Accumulator => Ok(&self.name),
            View::Warp => {
                if !self.warp_created {
                    highgui::named_window(&self.warp_name, highgui::WINDOW_AUTOSIZE)
                        .map_err(|e| AccumulatorError::display(self.warp_name.clone(), e))?;
                    self.warp_created = true;
                    log::info!("Window \"{}\" created", self.warp_name);
                }
                Ok(&self.warp_name)
            }
        }
    }
}

impl FrameDisplay for HighguiDisplay {
    fn show(&mut self, view: View, image: &Mat) -> Result<()> {
        let window = self.window_for(view)?.to_string();
        highgui::imshow(&window, image).map_err(|e| AccumulatorError::display(window, e))
    }

    fn poll_key(&mut self, delay_ms: i32) -> Result<i32> {
        highgui::wait_key(delay_ms).map_err(|e| AccumulatorError::display(self.name.clone(), e))
    }
}

impl Drop for HighguiDisplay {
    fn drop(&mut self) {
        if let Err(e) = highgui::destroy_all_windows() {
            log::error!("Failed to close windows: {}", e);
        }
    }
}
