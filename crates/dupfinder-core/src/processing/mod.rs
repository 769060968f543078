// Core modules
mod core;

pub mod batch_processor;
pub mod perceptual;
pub mod progress;
pub mod types;

// Expose hash algorithms
pub use self::core::{calculate_dhash, calculate_fingerprint, calculate_phash, calculate_whash};

// Expose the fingerprint engine
pub use perceptual::{compute_fingerprint, fingerprint_from_file, HashOutcome};
pub use types::{Fingerprint, HashAlgorithm, DEFAULT_HASH_SIZE, MAX_HASH_SIZE};

// Reexport batch functionality
pub use batch_processor::{
    compute_fingerprint_set, compute_fingerprint_set_on, compute_fingerprint_set_with,
    process_image_batch, process_images_in_batches, BatchConfig,
};
pub use progress::HashProgress;
