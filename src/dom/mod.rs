pub mod document;
pub mod dom_model;
pub mod parser;
pub mod serializer;
