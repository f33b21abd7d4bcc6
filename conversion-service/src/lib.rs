//! Word-to-PDF conversion service: upload a document, convert it with an
//! external office suite, download the PDF.
pub mod config;
pub mod converter;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
