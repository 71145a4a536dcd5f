pub mod backend;
pub mod file;
pub mod recorder;

pub use backend::{
    AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioFrame, AudioSource, FileBackend,
    MicrophoneBackend,
};
pub use file::AudioFile;
pub use recorder::{AnswerRecorder, RecorderConfig};
