use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source, source::Buffered};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use color_eyre::eyre::WrapErr;
use log::{info, warn};

/// Volume the fire sound plays at.
const FIRE_VOLUME: f32 = 0.3;

/// Audio manager for playing sound effects
pub struct AudioManager {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    /// Pre-loaded and buffered fire sound
    fire_sound: Buffered<Decoder<BufReader<File>>>,
}

impl AudioManager {
    /// Opens the default output device and buffers the fire sound at `fire_sound`.
    pub fn new(fire_sound: &Path) -> color_eyre::Result<Self> {
        let (stream, stream_handle) =
            OutputStream::try_default().wrap_err("opening audio output")?;

        let file = File::open(fire_sound)
            .wrap_err_with(|| format!("opening {}", fire_sound.display()))?;
        let source = Decoder::new(BufReader::new(file))
            .wrap_err_with(|| format!("decoding {}", fire_sound.display()))?;

        Ok(Self {
            _stream: stream,
            stream_handle,
            fire_sound: source.buffered(),
        })
    }

    /// Like [`AudioManager::new`], but a missing device or file means no audio.
    pub fn try_new(fire_sound: &Path) -> Option<Self> {
        match Self::new(fire_sound) {
            Ok(manager) => {
                info!("audio ready");
                Some(manager)
            }
            Err(err) => {
                warn!("continuing without audio: {err:#}");
                None
            }
        }
    }

    pub fn play_fire_sound(&self) {
        self.play_fire_sound_volume(FIRE_VOLUME);
    }

    pub fn play_fire_sound_volume(&self, volume: f32) {
        // Playback errors are not worth interrupting the game for
        if let Ok(sink) = Sink::try_new(&self.stream_handle) {
            sink.set_volume(volume);
            // Cloning a buffered source only clones references
            sink.append(self.fire_sound.clone());
            sink.detach();
        }
    }
}
