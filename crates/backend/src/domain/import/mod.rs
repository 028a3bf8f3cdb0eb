pub mod excel;
pub mod service;
pub mod template;
