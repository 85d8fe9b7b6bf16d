use serde::{Deserialize, Serialize};
use crate::utils::{AppError, AppResult};

/// Produto vendável com preço inteiro (sem centavos)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub price: u64,
}

impl Product {
    pub fn new(name: impl Into<String>, price: u64) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }

    /// Preço como aparece no documento gerado: `$100`
    pub fn display_price(&self) -> String {
        format!("${}", self.price)
    }
}

/// Lista de preços fixa usada durante toda a execução
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCatalog {
    products: Vec<Product>,
}

impl ProductCatalog {
    /// Monta um catálogo, rejeitando nomes repetidos e preços zerados
    pub fn new(products: Vec<Product>) -> AppResult<Self> {
        for (index, product) in products.iter().enumerate() {
            if product.name.trim().is_empty() {
                return Err(AppError::ValidationError("Produto sem nome no catálogo".to_string()));
            }
            if product.price == 0 {
                return Err(AppError::ValidationError(format!(
                    "Preço do produto '{}' deve ser positivo",
                    product.name
                )));
            }
            if products[..index].iter().any(|p| p.name == product.name) {
                return Err(AppError::ValidationError(format!(
                    "Produto duplicado no catálogo: {}",
                    product.name
                )));
            }
        }

        Ok(Self { products })
    }

    /// Catálogo padrão de serviços
    pub fn standard() -> Self {
        Self {
            products: vec![
                Product::new("Basic Service", 100),
                Product::new("Premium Service", 250),
                Product::new("Enterprise Solution", 500),
            ],
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, name: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.name == name)
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.products.iter().position(|p| p.name == name)
    }
}

impl Default for ProductCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
