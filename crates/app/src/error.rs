//! Error taxonomy surfaced to the UI.

use thiserror::Error;

use almox_auth::{AuthError, AuthzError};
use almox_core::DomainError;
use almox_infra::StoreError;
use almox_reports::{ExportError, format_quantidade};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("barcode '{0}' is already registered")]
    DuplicateCode(String),

    #[error("insufficient stock (requested: {requested}, available: {available})")]
    InsufficientStock { requested: f64, available: f64 },

    #[error("{0} not found")]
    NotFound(String),

    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    #[error(transparent)]
    Authentication(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl From<DomainError> for AppError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(messages) => AppError::Validation(messages),
            DomainError::InvalidId(msg) => AppError::Validation(vec![msg]),
            DomainError::InvariantViolation(msg) => AppError::Invariant(msg),
            DomainError::InsufficientStock { requested, available } => {
                AppError::InsufficientStock { requested, available }
            }
        }
    }
}

impl AppError {
    /// Single display string for the user, in Portuguese.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(messages) => messages.join("\n"),
            AppError::DuplicateCode(codigo) => {
                format!("Já existe um item cadastrado com o código {codigo}.")
            }
            AppError::InsufficientStock { available, .. } => format!(
                "Estoque insuficiente. Quantidade disponível: {}.",
                format_quantidade(*available)
            ),
            AppError::NotFound(_) => "Item não encontrado.".to_string(),
            AppError::Invariant(_) => "Operação inválida para o estado atual do item.".to_string(),
            AppError::Forbidden(_) => "Você não tem permissão para realizar esta ação.".to_string(),
            AppError::Authentication(err) => match err {
                AuthError::InvalidCredentials => "E-mail ou senha inválidos.".to_string(),
                AuthError::MissingEmail => "Informe o e-mail.".to_string(),
                AuthError::Unavailable(_) => {
                    "Serviço de autenticação indisponível. Tente novamente mais tarde.".to_string()
                }
            },
            AppError::Store(err) => match err {
                StoreError::Conflict(_) => {
                    "O item foi alterado por outro usuário. Tente novamente.".to_string()
                }
                StoreError::Unavailable(_) => {
                    "Não foi possível conectar ao banco de dados. Verifique sua conexão.".to_string()
                }
                StoreError::NotFound { .. } => "Registro não encontrado.".to_string(),
                StoreError::InvalidDocument(_) | StoreError::Serialization(_) => {
                    "Erro ao ler os dados armazenados.".to_string()
                }
            },
            AppError::Export(err) => match err {
                ExportError::Empty => "Não há dados para exportar.".to_string(),
                _ => "Erro ao gerar o arquivo de exportação.".to_string(),
            },
        }
    }
}
