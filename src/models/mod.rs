pub mod audit;
pub mod classification;
pub mod document;
