pub mod classifier;
pub mod extractor;
pub mod fill;
pub mod form_model;
pub mod label_inference;
pub mod signature;
pub mod text_aggregator;
