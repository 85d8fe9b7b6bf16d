// Biblioteca do envio de pedidos via DocuSign
// Expõe módulos para uso em testes e no binário

pub mod config;
pub mod models;
pub mod services;
pub mod utils;
