pub mod dictionary;

pub use dictionary::{ClassDictionary, PORTRAIT_PREFIX, PORTRAIT_SUFFIX};
