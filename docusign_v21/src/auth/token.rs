use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use crate::error::{EsignError, EsignResult};

/// Margem antes da expiração em que o token já é tratado como inválido
pub const EXPIRY_GRACE_SECONDS: i64 = 300;

/// Token OAuth2 persistido localmente
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub expires_in: i64,
    /// Momento em que o token foi salvo (a DocuSign não informa)
    #[serde(alias = "timestamp", deserialize_with = "deserialize_issued_at")]
    pub issued_at: DateTime<Utc>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Aceita RFC 3339 e o formato ISO sem fuso gravado por versões antigas (hora local)
fn deserialize_issued_at<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(parsed.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(serde::de::Error::custom)?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| serde::de::Error::custom(format!("horário local inexistente: {}", raw)))
}

impl TokenRecord {
    /// Instante exato de expiração informado pelo provedor
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.issued_at + Duration::seconds(self.expires_in)
    }

    /// Válido em `now` se ainda faltam mais de 5 minutos para expirar
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at() - Duration::seconds(EXPIRY_GRACE_SECONDS)
    }

    /// Segundos restantes até a expiração (zero se já expirou)
    pub fn seconds_to_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at() - now).num_seconds().max(0)
    }
}

/// Resposta do endpoint `/oauth/token`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub expires_in: i64,
}

impl TokenResponse {
    /// Carimba o horário local de emissão.
    ///
    /// Se o provedor não devolver um refresh token, mantém `fallback_refresh`.
    pub fn into_record(self, issued_at: DateTime<Utc>, fallback_refresh: Option<&str>) -> TokenRecord {
        let refresh_token = self
            .refresh_token
            .filter(|t| !t.is_empty())
            .or_else(|| fallback_refresh.map(str::to_string))
            .unwrap_or_default();

        TokenRecord {
            access_token: self.access_token,
            refresh_token,
            token_type: self.token_type,
            expires_in: self.expires_in,
            issued_at,
        }
    }
}

/// Slot único em disco para o token.
///
/// Um único processo por arquivo: não há lock entre processos.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Grava o token (arquivo temporário no mesmo diretório + rename)
    pub fn persist(&self, record: &TokenRecord) -> EsignResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(tmp.as_file_mut(), record)?;
        tmp.as_file_mut().flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| EsignError::Io(e.error))?;

        log::info!("💾 Token salvo em {}", self.path.display());
        Ok(())
    }

    /// Lê o token salvo; `None` se o arquivo não existe
    pub fn load(&self) -> EsignResult<Option<TokenRecord>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| EsignError::corrupt_store(self.path.display().to_string(), e.to_string()))
    }

    /// Remove o arquivo de token. Retorna se algo foi removido.
    pub fn delete(&self) -> bool {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                log::info!("🗑️ Token removido de {}", self.path.display());
                true
            }
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => {
                log::warn!("⚠️ Não foi possível remover {}: {}", self.path.display(), e);
                false
            }
        }
    }
}
