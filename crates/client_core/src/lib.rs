//! Client-side image classification workflow: validate a picked file, encode
//! it, send it to the classification service and turn the answer into a
//! ranked prediction list, with every step observable as a
//! [`SubmissionView`].

pub mod config;
pub mod encoder;
pub mod error;
pub mod interpreter;
pub mod service;
pub mod session;
pub mod source;
pub mod submission;
pub mod validator;

pub use config::{load_settings, ClientSettings};
pub use encoder::{DecodedImage, EncodedImage};
pub use error::{ClassifyError, EncodingError, ValidationError};
pub use interpreter::{Classification, PredictionSet};
pub use service::{fetch_service_info, ClassifierService, HttpClassifierService};
pub use session::ClassifierSession;
pub use source::SourceFile;
pub use submission::{SubmissionStatus, SubmissionView};
pub use validator::{validate, FileDescriptor, Validation};
