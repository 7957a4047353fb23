pub mod context;
pub mod dictata;
pub mod entity;
pub mod event;
pub mod lexica;
