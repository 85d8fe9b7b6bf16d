//! Pedido montado pelo operador: produtos escolhidos e destinatário.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use crate::models::catalog::{Product, ProductCatalog};
use crate::utils::{AppError, AppResult};

static EMAIL_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").ok());

/// Verifica o formato do e-mail do signatário
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.as_ref().map_or(false, |re| re.is_match(email))
}

/// Produtos escolhidos, sempre na ordem do catálogo e sem repetição.
///
/// O total nunca é armazenado: é recalculado a partir dos produtos.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct OrderSelection {
    products: Vec<Product>,
}

impl OrderSelection {
    /// Seleciona pelo nome; nomes fora do catálogo são erro de validação
    pub fn from_names<S: AsRef<str>>(catalog: &ProductCatalog, names: &[S]) -> AppResult<Self> {
        let mut positions = Vec::with_capacity(names.len());

        for name in names {
            let name = name.as_ref().trim();
            let position = catalog
                .position(name)
                .ok_or_else(|| AppError::ValidationError(format!("Produto desconhecido: {}", name)))?;
            if !positions.contains(&position) {
                positions.push(position);
            }
        }

        positions.sort_unstable();
        let products = positions
            .into_iter()
            .map(|i| catalog.products()[i].clone())
            .collect();

        Ok(Self { products })
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn total_amount(&self) -> u64 {
        self.products.iter().map(|p| p.price).sum()
    }

    pub fn product_names(&self) -> Vec<&str> {
        self.products.iter().map(|p| p.name.as_str()).collect()
    }

    /// Nomes separados por vírgula, como vão no campo de texto do signatário
    pub fn joined_names(&self) -> String {
        self.product_names().join(", ")
    }

    /// Rejeita pedidos sem nenhum produto
    pub fn validate(&self) -> AppResult<()> {
        if self.is_empty() {
            return Err(AppError::ValidationError("Selecione ao menos um produto".to_string()));
        }
        Ok(())
    }
}

/// Signatário do envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipient {
    pub email: String,
    pub name: String,
}

impl Recipient {
    /// Normaliza (trim) e valida e-mail e nome
    pub fn new(email: &str, name: &str) -> AppResult<Self> {
        let email = email.trim();
        let name = name.trim();

        if email.is_empty() || name.is_empty() {
            return Err(AppError::ValidationError("E-mail e nome são obrigatórios".to_string()));
        }

        if !is_valid_email(email) {
            return Err(AppError::ValidationError(format!("E-mail inválido: {}", email)));
        }

        Ok(Self {
            email: email.to_string(),
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_keeps_catalog_order_and_dedups() {
        let catalog = ProductCatalog::standard();
        let selection = OrderSelection::from_names(
            &catalog,
            &["Enterprise Solution", "Basic Service", "Enterprise Solution"],
        )
        .unwrap();

        assert_eq!(selection.product_names(), vec!["Basic Service", "Enterprise Solution"]);
        assert_eq!(selection.total_amount(), 600);
        assert_eq!(selection.joined_names(), "Basic Service, Enterprise Solution");
    }

    #[test]
    fn test_total_matches_sum_for_every_subset() {
        let catalog = ProductCatalog::standard();
        let names: Vec<&str> = catalog.products().iter().map(|p| p.name.as_str()).collect();

        for mask in 0u8..8 {
            let chosen: Vec<&str> = names
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1u8 << *i) != 0)
                .map(|(_, n)| *n)
                .collect();
            let expected: u64 = chosen.iter().filter_map(|n| catalog.get(n)).map(|p| p.price).sum();

            let selection = OrderSelection::from_names(&catalog, &chosen).unwrap();
            assert_eq!(selection.total_amount(), expected);
        }
    }

    #[test]
    fn test_unknown_product_is_rejected() {
        let catalog = ProductCatalog::standard();
        let result = OrderSelection::from_names(&catalog, &["Gold Plan"]);
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_empty_selection_fails_validation() {
        let selection = OrderSelection::default();
        assert_eq!(selection.total_amount(), 0);
        assert!(matches!(selection.validate(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_recipient_trims_and_validates() {
        let recipient = Recipient::new("  ana@example.com ", " Ana Souza ").unwrap();
        assert_eq!(recipient.email, "ana@example.com");
        assert_eq!(recipient.name, "Ana Souza");

        assert!(Recipient::new("ana@example", "Ana").is_err());
        assert!(Recipient::new("not-an-email", "Ana").is_err());
        assert!(Recipient::new("ana@example.com", "  ").is_err());
        assert!(Recipient::new("", "Ana").is_err());
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("first.last+tag@sub.example.co"));
        assert!(!is_valid_email("a b@example.com"));
        assert!(!is_valid_email("@example.com"));
    }
}
